//! # Composition Module
//!
//! Timeline composition, layer-graph construction, render configuration,
//! and the pipeline engine that drives an export end to end.

pub mod engine;
pub mod job;
pub mod layer;
pub mod render;
pub mod timeline;

pub use engine::OverlayEngine;
pub use job::{CompositionJob, JobState};
pub use layer::{ContentsGravity, LayerGraph, Rect, Rotation};
pub use render::{Instruction, LayerInstruction, RenderConfiguration};
pub use timeline::{Composition, CompositionTrack, TimelineComposer, TrackSegment};
