use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::asset::{AssetLoader, SourceAsset};
use crate::composition::job::{CompositionJob, JobState};
use crate::composition::layer::LayerGraph;
use crate::composition::render::RenderConfiguration;
use crate::composition::timeline::{Composition, TimelineComposer};
use crate::config::Config;
use crate::error::Result;
use crate::export::ExportSession;
use crate::overlay::OverlayImage;

/// Main engine that burns an overlay image into a video and exports it
///
/// The pipeline is strictly sequential; each stage's output is the next
/// stage's required input and any failure short-circuits with a typed error:
/// 1. Asset Loading - probe source tracks, duration, natural size
/// 2. Timeline Composition - copy both source tracks into a new composition
/// 3. Layer Graph - build the parent/video/overlay tree with orientation fix
/// 4. Render Configuration - frame size, frame rate, instruction binding
/// 5. Export Job - asynchronous encode/mux to the destination file
pub struct OverlayEngine {
    config: Config,
}

impl OverlayEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Burn `image_bytes` into the lower half of the video at `video_path`
    /// and export the result to `output_path`
    ///
    /// Returns the output path on success. Every per-export value (job,
    /// composition, layer graph, temp files) is owned by this call, so
    /// concurrent exports never share mutable state.
    pub async fn export<P: AsRef<Path>>(
        &self,
        image_bytes: &[u8],
        video_path: P,
        output_path: P,
    ) -> Result<PathBuf> {
        let video_path = video_path.as_ref();
        let output_path = output_path.as_ref().to_path_buf();

        info!("Starting overlay export");
        info!("   Source: {:?}", video_path);
        info!("   Output: {:?}", output_path);

        let mut job = CompositionJob::new();

        let result = self
            .run_pipeline(&mut job, image_bytes, video_path, output_path)
            .await;

        match &result {
            Ok(path) => {
                job.advance(JobState::Completed);
                info!("Overlay export complete: {:?}", path);
            }
            Err(e) => {
                job.fail();
                // The error is surfaced to the caller too; logging here is
                // the floor, not the ceiling, of failure visibility
                warn!("Overlay export failed: {}", e);
            }
        }

        result
    }

    async fn run_pipeline(
        &self,
        job: &mut CompositionJob,
        image_bytes: &[u8],
        video_path: &Path,
        output_path: PathBuf,
    ) -> Result<PathBuf> {
        // Stage 1: probe the source asset
        let asset = self.load_asset(video_path).await?;

        // Stage 2: copy the full source timeline into a new composition
        let composition = self.compose_timeline(&asset)?;
        job.advance(JobState::TracksInserted);

        // Stage 3: decode the overlay and build the layer graph
        let overlay = self.load_overlay(image_bytes)?;
        let layer_graph = LayerGraph::build(asset.natural_size(), &overlay);

        // Stage 4: bind the layer graph into a render configuration
        let render_config = RenderConfiguration::new(
            &composition,
            asset.natural_size(),
            self.config.video.frame_rate,
            layer_graph,
        );
        job.advance(JobState::GraphBound);

        // Stage 5: run the export job to a terminal state
        let session = ExportSession::new(
            composition,
            render_config,
            overlay,
            output_path,
            self.config.export.quality,
            self.config.export.container,
            self.config.export.optimize_for_network_use,
        )?;
        job.advance(JobState::Exporting);

        let path = session.export().await?;
        Ok(path)
    }

    async fn load_asset(&self, video_path: &Path) -> Result<SourceAsset> {
        info!("Step 1: Probing source asset...");
        let asset = AssetLoader::load(video_path).await?;
        info!(
            "   Loaded: {:.1}s, {}x{}",
            asset.duration.seconds(),
            asset.natural_size().width,
            asset.natural_size().height
        );
        Ok(asset)
    }

    fn compose_timeline(&self, asset: &SourceAsset) -> Result<Composition> {
        info!("Step 2: Composing timeline...");
        let composition = TimelineComposer::compose(asset)?;
        Ok(composition)
    }

    fn load_overlay(&self, image_bytes: &[u8]) -> Result<OverlayImage> {
        info!("Step 3: Decoding overlay image...");
        let overlay = OverlayImage::decode(image_bytes)?;
        info!(
            "   Decoded: {}x{}, rotation needed: {}",
            overlay.dimensions().width,
            overlay.dimensions().height,
            overlay.needs_rotation()
        );
        Ok(overlay)
    }
}
