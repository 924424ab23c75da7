use std::path::Path;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::asset::Dimensions;
use crate::error::ExportError;
use crate::overlay::exif;

/// Stored orientation of a still image, per the EXIF orientation values 1-8
///
/// Only `Right` (a photo captured with the right edge now at the top) gets a
/// correction transform downstream; every other value is treated as "no
/// rotation needed". Upside-down and mirrored inputs pass through
/// uncorrected — a known gap, not a guarantee of visual correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrientation {
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl ImageOrientation {
    /// Map a raw EXIF orientation value; anything out of range reads as `Up`
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => Self::Up,
        }
    }

    /// Whether the overlay layer needs the fixed 270° correction
    pub fn needs_rotation(&self) -> bool {
        matches!(self, Self::Right)
    }
}

/// A decoded overlay bitmap plus its orientation flag
///
/// Owned exclusively by the layer graph builder for the duration of one
/// export.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    bitmap: RgbaImage,
    orientation: ImageOrientation,
}

impl OverlayImage {
    /// Decode raw image bytes into a usable bitmap
    ///
    /// The orientation flag comes from the image's stored EXIF metadata;
    /// formats without one (PNG, stripped JPEG) read as `Up`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ExportError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ExportError::ImageLoadingFailed {
                reason: e.to_string(),
            })?;

        let orientation = exif::orientation_value(bytes)
            .map(ImageOrientation::from_exif)
            .unwrap_or(ImageOrientation::Up);

        let bitmap = decoded.to_rgba8();
        debug!(
            "Decoded overlay image: {}x{}, orientation {:?}",
            bitmap.width(),
            bitmap.height(),
            orientation
        );

        Ok(Self { bitmap, orientation })
    }

    /// Read and decode an overlay image from disk
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExportError::ImageLoadingFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;
        Self::decode(&bytes)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.bitmap.width(), self.bitmap.height())
    }

    pub fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    pub fn needs_rotation(&self) -> bool {
        self.orientation.needs_rotation()
    }

    #[cfg(test)]
    pub(crate) fn with_orientation(orientation: ImageOrientation) -> Self {
        Self {
            bitmap: RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255])),
            orientation,
        }
    }

    /// Serialize the bitmap as PNG at the given path
    ///
    /// The export session feeds this to the encoder; PNG keeps the alpha
    /// channel intact.
    pub fn write_png(&self, path: &Path) -> Result<(), ExportError> {
        self.bitmap.save_with_format(path, image::ImageFormat::Png).map_err(|e| {
            warn!("Failed to serialize overlay bitmap: {}", e);
            ExportError::ImageLoadingFailed {
                reason: format!("could not serialize overlay bitmap: {}", e),
            }
        })
    }
}
