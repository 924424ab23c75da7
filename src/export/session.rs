use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task;
use tracing::{debug, info, warn};

use crate::composition::render::RenderConfiguration;
use crate::composition::timeline::Composition;
use crate::error::ExportError;
use crate::overlay::OverlayImage;

/// Encode quality preset; a single fixed choice, not user-tunable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    HighestQuality,
}

impl QualityPreset {
    /// Constant rate factor for the x264 encoder
    fn crf(&self) -> u8 {
        match self {
            Self::HighestQuality => 17,
        }
    }

    fn encoder_speed(&self) -> &'static str {
        match self {
            Self::HighestQuality => "slow",
        }
    }
}

/// Output container; one fixed choice per build, selected through config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    Mov,
    Mp4,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mov => "mov",
            Self::Mp4 => "mp4",
        }
    }
}

/// Terminal state of an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Completed,
    Failed(Option<String>),
    Cancelled,
    Unknown,
}

/// One asynchronous encode/mux job
///
/// Owns all per-export state: the composition, the render configuration, the
/// overlay bitmap, and a uniquely named temp directory, so concurrent
/// sessions never share anything mutable. The temp directory is removed on
/// drop whether the job succeeded or not.
pub struct ExportSession {
    composition: Composition,
    render_config: RenderConfiguration,
    overlay: OverlayImage,
    destination: PathBuf,
    preset: QualityPreset,
    container: ContainerFormat,
    optimize_for_network_use: bool,
    temp_dir: PathBuf,
}

impl ExportSession {
    /// Instantiate the encoder for the given composition and preset
    ///
    /// Fails with [`ExportError::ExportSessionCreationFailed`] when the
    /// ffmpeg binary is unavailable or the destination is unusable.
    /// Overwrite behavior is fail-if-exists.
    pub fn new(
        composition: Composition,
        render_config: RenderConfiguration,
        overlay: OverlayImage,
        destination: PathBuf,
        preset: QualityPreset,
        container: ContainerFormat,
        optimize_for_network_use: bool,
    ) -> Result<Self, ExportError> {
        if !Self::check_ffmpeg_available() {
            return Err(ExportError::ExportSessionCreationFailed {
                reason: "ffmpeg not found; please install FFmpeg".to_string(),
            });
        }

        Self::validate_destination(&destination)?;

        let temp_dir = Self::unique_temp_dir();

        Ok(Self {
            composition,
            render_config,
            overlay,
            destination,
            preset,
            container,
            optimize_for_network_use,
            temp_dir,
        })
    }

    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Reject destinations that already exist or whose parent directory is
    /// missing
    fn validate_destination(destination: &Path) -> Result<(), ExportError> {
        if destination.exists() {
            return Err(ExportError::ExportSessionCreationFailed {
                reason: format!("destination already exists: {}", destination.display()),
            });
        }
        if let Some(parent) = destination.parent() {
            // An empty parent means a bare file name, resolved against the
            // working directory
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ExportError::ExportSessionCreationFailed {
                    reason: format!(
                        "destination parent directory does not exist: {}",
                        parent.display()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Pick a uniquely named temp directory for one export, so concurrent
    /// sessions never share scratch state
    fn unique_temp_dir() -> PathBuf {
        let mut rng = SmallRng::from_entropy();
        std::env::temp_dir().join(format!("overlay-export-{:08x}", rng.gen::<u32>()))
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Run the job to its terminal state
    ///
    /// The single suspension point of the pipeline: the caller suspends on a
    /// oneshot channel that the job fires exactly once with its terminal
    /// status — success or failure, never both, never zero times.
    pub async fn export(self) -> Result<PathBuf, ExportError> {
        let destination = self.destination.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let status = self.run().await;
            // The receiver may have been dropped; nothing to do then
            let _ = tx.send(status);
        });

        // A dropped sender means the job died without reporting, which maps
        // to the unrecognized-terminal-state case
        let status = rx.await.unwrap_or(ExportStatus::Unknown);
        Self::resolve_status(status, destination)
    }

    /// Map a terminal job status onto the export result
    pub(crate) fn resolve_status(
        status: ExportStatus,
        destination: PathBuf,
    ) -> Result<PathBuf, ExportError> {
        match status {
            ExportStatus::Completed => Ok(destination),
            ExportStatus::Failed(underlying) => {
                warn!(
                    "Export job failed: {}",
                    underlying.as_deref().unwrap_or("no diagnostic")
                );
                Err(ExportError::ExportFailed { underlying })
            }
            ExportStatus::Cancelled | ExportStatus::Unknown => {
                warn!("Export job ended in an unrecognized terminal state");
                Err(ExportError::ExportFailed { underlying: None })
            }
        }
    }

    async fn run(&self) -> ExportStatus {
        if let Err(e) = std::fs::create_dir_all(&self.temp_dir) {
            return ExportStatus::Failed(Some(format!("cannot create temp directory: {}", e)));
        }

        let overlay_path = self.temp_dir.join("overlay.png");
        if let Err(e) = self.overlay.write_png(&overlay_path) {
            return ExportStatus::Failed(Some(e.to_string()));
        }

        let args = self.build_ffmpeg_args(&overlay_path);
        debug!("ffmpeg {}", args.join(" "));
        info!(
            "Exporting {:.1}s composition to {:?} ({} container)",
            self.composition.duration().seconds(),
            self.destination,
            self.container.as_str()
        );

        let mut cmd = Command::new("ffmpeg");
        cmd.args(&args);

        let output = match task::spawn_blocking(move || cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return ExportStatus::Failed(Some(format!("ffmpeg execution failed: {}", e)))
            }
            Err(e) => return ExportStatus::Failed(Some(format!("encode task failed: {}", e))),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return ExportStatus::Failed(Some(tail));
        }

        if !self.destination.is_file() {
            return ExportStatus::Failed(Some("encoder reported success but wrote no output".to_string()));
        }

        info!("Export complete: {:?}", self.destination);
        ExportStatus::Completed
    }

    /// Lower the composition, layer graph, and render configuration into an
    /// ffmpeg invocation
    ///
    /// The layer graph becomes a `-filter_complex` chain: aspect-fill
    /// scale+crop of the overlay into the lower-half rect, an optional
    /// transpose for the 270° orientation correction, and an overlay pass
    /// pinned at (0, height/2).
    pub(crate) fn build_ffmpeg_args(&self, overlay_path: &Path) -> Vec<String> {
        let graph = &self.render_config.layer_graph;
        let overlay_w = graph.overlay.width.round() as u32;
        let overlay_h = graph.overlay.height.round() as u32;
        let overlay_y = graph.overlay.y.round() as u32;

        let mut chain = String::from("[1:v]");
        if !graph.overlay_rotation.is_identity() {
            // transpose=2 rotates 90° counterclockwise, i.e. the fixed 270°
            // clockwise correction
            chain.push_str("transpose=2,");
        }
        chain.push_str(&format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}[ovl];\
             [0:v][ovl]overlay=0:{y}[vout]",
            w = overlay_w,
            h = overlay_h,
            y = overlay_y,
        ));

        let audio_index = self
            .composition
            .audio_track
            .segments()
            .first()
            .map(|s| s.source_index)
            .unwrap_or(1);
        let video_source = self
            .composition
            .video_track
            .segments()
            .first()
            .map(|s| s.source_path.display().to_string())
            .unwrap_or_default();

        let mut args = vec![
            "-i".to_string(),
            video_source,
            "-i".to_string(),
            overlay_path.display().to_string(),
            "-filter_complex".to_string(),
            chain,
            "-map".to_string(),
            "[vout]".to_string(),
            "-map".to_string(),
            format!("0:{}", audio_index),
            "-r".to_string(),
            self.render_config.frame_rate().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            self.preset.encoder_speed().to_string(),
            "-crf".to_string(),
            self.preset.crf().to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
        ];

        if self.optimize_for_network_use {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }

        args.push("-f".to_string());
        args.push(self.container.as_str().to_string());
        // Fail rather than overwrite if the destination appeared meanwhile
        args.push("-n".to_string());
        args.push(self.destination.display().to_string());

        args
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        if self.temp_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.temp_dir) {
                warn!("Failed to remove temp directory {:?}: {}", self.temp_dir, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Dimensions, MediaTime, SourceAsset, SourceTrack, TrackKind};
    use crate::composition::layer::LayerGraph;
    use crate::composition::timeline::TimelineComposer;
    use crate::overlay::ImageOrientation;
    use std::path::PathBuf;

    fn test_session(
        rotated: bool,
        destination: PathBuf,
        optimize: bool,
    ) -> ExportSession {
        let duration = MediaTime::new(6000, 600);
        let asset = SourceAsset {
            path: PathBuf::from("subway.mov"),
            duration,
            video_track: SourceTrack {
                kind: TrackKind::Video,
                index: 0,
                duration,
                natural_size: Some(Dimensions::new(1080, 1920)),
            },
            audio_track: SourceTrack {
                kind: TrackKind::Audio,
                index: 1,
                duration,
                natural_size: None,
            },
        };
        let composition = TimelineComposer::compose(&asset).unwrap();
        let orientation = if rotated {
            ImageOrientation::Right
        } else {
            ImageOrientation::Up
        };
        let overlay = OverlayImage::with_orientation(orientation);
        let layer_graph = LayerGraph::build(Dimensions::new(1080, 1920), &overlay);
        let render_config = RenderConfiguration::new(
            &composition,
            Dimensions::new(1080, 1920),
            30,
            layer_graph,
        );

        // Bypass `new()` so the tests do not depend on an installed ffmpeg
        ExportSession {
            composition,
            render_config,
            overlay,
            destination,
            preset: QualityPreset::HighestQuality,
            container: ContainerFormat::Mov,
            optimize_for_network_use: optimize,
            temp_dir: std::env::temp_dir().join("overlay-export-test"),
        }
    }

    #[test]
    fn filter_graph_pins_overlay_to_the_lower_half() {
        let session = test_session(false, PathBuf::from("out.mov"), true);
        let args = session.build_ffmpeg_args(Path::new("overlay.png"));
        let chain = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        assert!(chain.contains("scale=1080:960:force_original_aspect_ratio=increase"));
        assert!(chain.contains("crop=1080:960"));
        assert!(chain.contains("overlay=0:960"));
        assert!(!chain.contains("transpose"));
    }

    #[test]
    fn rotation_branch_adds_a_transpose_pass() {
        let session = test_session(true, PathBuf::from("out.mov"), true);
        let args = session.build_ffmpeg_args(Path::new("overlay.png"));
        let chain = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];

        assert!(chain.starts_with("[1:v]transpose=2,"));
    }

    #[test]
    fn network_optimization_toggles_faststart() {
        let with = test_session(false, PathBuf::from("out.mov"), true);
        let args = with.build_ffmpeg_args(Path::new("overlay.png"));
        assert!(args.contains(&"+faststart".to_string()));

        let without = test_session(false, PathBuf::from("out.mov"), false);
        let args = without.build_ffmpeg_args(Path::new("overlay.png"));
        assert!(!args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn args_carry_preset_rate_and_container() {
        let session = test_session(false, PathBuf::from("out.mov"), true);
        let args = session.build_ffmpeg_args(Path::new("overlay.png"));

        let pairs: Vec<(String, String)> = args
            .windows(2)
            .map(|w| (w[0].clone(), w[1].clone()))
            .collect();
        assert!(pairs.contains(&("-r".to_string(), "30".to_string())));
        assert!(pairs.contains(&("-crf".to_string(), "17".to_string())));
        assert!(pairs.contains(&("-f".to_string(), "mov".to_string())));
        assert!(pairs.contains(&("-map".to_string(), "0:1".to_string())));
        // Fail-if-exists, never silent overwrite
        assert!(args.contains(&"-n".to_string()));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn existing_destination_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("already-there.mov");
        std::fs::write(&existing, b"stale").unwrap();

        let err = ExportSession::validate_destination(&existing).unwrap_err();
        assert!(matches!(err, ExportError::ExportSessionCreationFailed { .. }));
    }

    #[test]
    fn missing_parent_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no-such-subdir").join("out.mov");

        let err = ExportSession::validate_destination(&dest).unwrap_err();
        assert!(matches!(
            err,
            ExportError::ExportSessionCreationFailed { ref reason, .. }
                if reason.contains("parent directory")
        ));
    }

    #[test]
    fn fresh_destination_under_existing_parent_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ExportSession::validate_destination(&dir.path().join("out.mov")).is_ok());
        // Bare file names resolve against the working directory
        assert!(ExportSession::validate_destination(Path::new("fresh-out.mov")).is_ok());
    }

    #[test]
    fn status_resolution_maps_terminal_states() {
        let dest = PathBuf::from("out.mov");

        assert_eq!(
            ExportSession::resolve_status(ExportStatus::Completed, dest.clone()).unwrap(),
            dest
        );

        let err = ExportSession::resolve_status(
            ExportStatus::Failed(Some("boom".to_string())),
            dest.clone(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExportError::ExportFailed { underlying: Some(ref s) } if s == "boom"
        ));

        for status in [ExportStatus::Cancelled, ExportStatus::Unknown] {
            let err = ExportSession::resolve_status(status, dest.clone()).unwrap_err();
            assert!(matches!(err, ExportError::ExportFailed { underlying: None }));
        }
    }

    #[tokio::test]
    async fn completion_channel_fires_exactly_once() {
        // The suspension-point discipline: one terminal status, exactly one
        // resumption, for success and failure alike
        for status in [
            ExportStatus::Completed,
            ExportStatus::Failed(Some("engineered failure".to_string())),
        ] {
            let (tx, rx) = oneshot::channel();
            let sent = status.clone();
            tokio::spawn(async move {
                tx.send(sent).ok();
            });

            let received = rx.await.expect("job must report a terminal status");
            assert_eq!(received, status);
        }
    }

    #[tokio::test]
    async fn dropped_job_reads_as_unknown_terminal_state() {
        let (tx, rx) = oneshot::channel::<ExportStatus>();
        drop(tx);

        let status = rx.await.unwrap_or(ExportStatus::Unknown);
        let err =
            ExportSession::resolve_status(status, PathBuf::from("out.mov")).unwrap_err();
        assert!(matches!(err, ExportError::ExportFailed { underlying: None }));
    }

    #[test]
    fn concurrent_sessions_own_distinct_temp_dirs() {
        // Random suffixes keep concurrent exports from colliding
        let a = ExportSession::unique_temp_dir();
        let b = ExportSession::unique_temp_dir();

        assert_ne!(a, b);
        for dir in [&a, &b] {
            let name = dir.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with("overlay-export-"), "unexpected name: {}", name);
        }
    }
}
