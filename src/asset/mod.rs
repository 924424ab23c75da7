//! # Source Asset Module
//!
//! Read-only probing of the source video container: track discovery,
//! duration, and natural frame size.

pub mod loader;
pub mod types;

pub use loader::AssetLoader;
pub use types::{Dimensions, MediaTime, SourceAsset, SourceTrack, TimeRange, TrackKind};
