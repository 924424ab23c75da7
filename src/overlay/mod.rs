//! # Overlay Image Module
//!
//! Decodes the still image that gets burned into the video and derives its
//! orientation flag from stored EXIF metadata.

mod exif;
pub mod image;

pub use image::{ImageOrientation, OverlayImage};
