//! # Export Module
//!
//! Drives the asynchronous encode/mux job that writes the final container
//! file. This is the only suspension point in the pipeline.

pub mod session;

pub use session::{ContainerFormat, ExportSession, ExportStatus, QualityPreset};
