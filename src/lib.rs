//! # Overlay-Compositor
//!
//! Burn a still image into the lower half of a video and export the result
//! through an asynchronous ffmpeg job.
//!
//! The pipeline takes a source video and a decoded still image, builds a
//! fresh timeline composition from the source's video and audio tracks,
//! constructs a parent/video/overlay layer graph (with a fixed orientation
//! correction for one EXIF case), binds it into a render configuration, and
//! drives an asynchronous encode/mux job to a terminal state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use overlay_compositor::{composition::OverlayEngine, config::Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = OverlayEngine::new(Config::default());
//! let image = std::fs::read("caption.png")?;
//! let output = engine.export(&image, "subway.mov", "story.mov").await?;
//! println!("exported {:?}", output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`asset`] - Read-only probing of the source container
//! - [`overlay`] - Overlay image decoding and orientation
//! - [`composition`] - Timeline, layer graph, render config, and the engine
//! - [`export`] - The asynchronous export job
//! - [`library`] - The consumed save-to-library boundary
//! - [`config`] - Configuration management
//!
//! Failure anywhere in the pipeline short-circuits with one kind from the
//! closed [`error::ExportError`] taxonomy; there is no partial success and
//! no automatic retry.

pub mod asset;
pub mod composition;
pub mod config;
pub mod error;
pub mod export;
pub mod library;
pub mod overlay;

// Re-export commonly used types for convenience
pub use crate::{
    composition::OverlayEngine,
    config::Config,
    error::{CompositorError, ExportError, Result},
    export::{ContainerFormat, ExportSession, QualityPreset},
    overlay::OverlayImage,
};
