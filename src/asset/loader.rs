use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tokio::task;
use tracing::{debug, info};

use crate::asset::types::{Dimensions, MediaTime, SourceAsset, SourceTrack, TrackKind};
use crate::error::{ExportError, Result};

/// Canonical timescale used when a stream reports only floating-point seconds
const FALLBACK_TIMESCALE: i32 = 600;

/// Read-only prober for source video containers
///
/// Uses the external `ffprobe` binary and parses its JSON output into a
/// [`SourceAsset`]. Both a video and an audio track are required; absence of
/// either is a [`ExportError::TrackCreationFailed`].
pub struct AssetLoader;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    duration_ts: Option<i64>,
    time_base: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl AssetLoader {
    pub fn check_ffprobe_available() -> bool {
        Command::new("ffprobe")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Probe the source container for its tracks, duration, and natural size
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<SourceAsset> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(ExportError::AssetCreationFailed {
                path: path.display().to_string(),
            }
            .into());
        }

        if !Self::check_ffprobe_available() {
            return Err(ExportError::AssetCreationFailed {
                path: format!("{}: ffprobe not found; please install FFmpeg", path.display()),
            }
            .into());
        }

        debug!("Probing source asset: {:?}", path);

        let probe_path = path.clone();
        let output = task::spawn_blocking(move || {
            Command::new("ffprobe")
                .args([
                    "-v",
                    "quiet",
                    "-print_format",
                    "json",
                    "-show_streams",
                    "-show_format",
                ])
                .arg(&probe_path)
                .output()
        })
        .await
        .map_err(|e| ExportError::AssetCreationFailed {
            path: format!("{}: probe task failed: {}", path.display(), e),
        })?
        .map_err(|e| ExportError::AssetCreationFailed {
            path: format!("{}: ffprobe execution failed: {}", path.display(), e),
        })?;

        if !output.status.success() {
            return Err(ExportError::AssetCreationFailed {
                path: path.display().to_string(),
            }
            .into());
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let asset = Self::parse_probe_output(&json, &path)?;

        info!(
            "Source asset: {:.1}s, {}x{}, video stream {} + audio stream {}",
            asset.duration.seconds(),
            asset.natural_size().width,
            asset.natural_size().height,
            asset.video_track.index,
            asset.audio_track.index
        );

        Ok(asset)
    }

    /// Parse ffprobe JSON into a source asset
    ///
    /// Pure function of the probe output so track-absence scenarios are
    /// testable without a real container.
    pub(crate) fn parse_probe_output(
        json: &str,
        path: &Path,
    ) -> std::result::Result<SourceAsset, ExportError> {
        let probe: ProbeOutput =
            serde_json::from_str(json).map_err(|_| ExportError::AssetCreationFailed {
                path: format!("{}: unreadable probe output", path.display()),
            })?;

        let container_duration = probe
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok());

        let video = Self::first_track(&probe, "video", container_duration);
        let audio = Self::first_track(&probe, "audio", container_duration);

        let video_track = video.ok_or_else(|| ExportError::TrackCreationFailed {
            kind: "video".to_string(),
            path: path.display().to_string(),
        })?;
        let audio_track = audio.ok_or_else(|| ExportError::TrackCreationFailed {
            kind: "audio".to_string(),
            path: path.display().to_string(),
        })?;

        if video_track.natural_size.is_none() {
            return Err(ExportError::TrackCreationFailed {
                kind: "video".to_string(),
                path: format!("{}: video stream reports no frame size", path.display()),
            });
        }

        Ok(SourceAsset {
            path: path.to_path_buf(),
            duration: video_track.duration,
            video_track,
            audio_track,
        })
    }

    fn first_track(
        probe: &ProbeOutput,
        codec_type: &str,
        container_duration: Option<f64>,
    ) -> Option<SourceTrack> {
        let stream = probe.streams.iter().find(|s| s.codec_type == codec_type)?;

        let kind = match codec_type {
            "video" => TrackKind::Video,
            _ => TrackKind::Audio,
        };

        let duration = Self::stream_duration(stream, container_duration)?;

        let natural_size = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Dimensions::new(w, h)),
            _ => None,
        };

        Some(SourceTrack {
            kind,
            index: stream.index,
            duration,
            natural_size,
        })
    }

    /// Exact rational duration where the stream reports one, otherwise the
    /// container duration in the fallback timescale
    fn stream_duration(stream: &ProbeStream, container_duration: Option<f64>) -> Option<MediaTime> {
        if let (Some(ts), Some(time_base)) = (stream.duration_ts, stream.time_base.as_deref()) {
            if let Some(timescale) = Self::parse_time_base(time_base) {
                return Some(MediaTime::new(ts, timescale));
            }
        }

        let seconds = stream
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .or(container_duration)?;

        Some(MediaTime::from_seconds(seconds, FALLBACK_TIMESCALE))
    }

    /// Parse a time base of the form "1/15360" into its denominator
    fn parse_time_base(time_base: &str) -> Option<i32> {
        let (num, den) = time_base.split_once('/')?;
        if num.trim() != "1" {
            return None;
        }
        let den: i32 = den.trim().parse().ok()?;
        if den > 0 {
            Some(den)
        } else {
            None
        }
    }
}
