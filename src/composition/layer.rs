use std::f64::consts::PI;

use tracing::debug;

use crate::asset::Dimensions;
use crate::overlay::OverlayImage;

/// An axis-aligned layer frame in output-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Rotation applied to the overlay layer
///
/// Only two transforms exist: identity, and the fixed 270° (1.5π radian)
/// correction for images stored with the right edge at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Identity,
    Clockwise270,
}

impl Rotation {
    pub fn radians(&self) -> f64 {
        match self {
            Self::Identity => 0.0,
            Self::Clockwise270 => 1.5 * PI,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

/// How overlay contents fill their layer frame
///
/// Fixed policy: scale to fill while preserving aspect ratio, cropping
/// overflow. Never letterboxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentsGravity {
    ResizeAspectFill,
}

/// The parent/video/overlay layer tree rendered on top of decoded frames
///
/// `parent` is sized to the output frame, `video` receives the decoded
/// frames and occupies the full frame, `overlay` holds the still image and
/// occupies exactly the lower half of the frame.
#[derive(Debug, Clone)]
pub struct LayerGraph {
    pub parent: Rect,
    pub video: Rect,
    pub overlay: Rect,
    pub overlay_rotation: Rotation,
    pub overlay_gravity: ContentsGravity,
}

impl LayerGraph {
    /// Construct the three-layer graph for the given output frame size
    ///
    /// Lower-half overlay placement is fixed policy, not configurable.
    pub fn build(frame: Dimensions, overlay: &OverlayImage) -> Self {
        let w = frame.width as f64;
        let h = frame.height as f64;

        let overlay_rotation = if overlay.needs_rotation() {
            Rotation::Clockwise270
        } else {
            Rotation::Identity
        };

        debug!(
            "Layer graph: frame {}x{}, overlay rotation {:?}",
            frame.width, frame.height, overlay_rotation
        );

        Self {
            parent: Rect::new(0.0, 0.0, w, h),
            video: Rect::new(0.0, 0.0, w, h),
            overlay: Rect::new(0.0, h / 2.0, w, h / 2.0),
            overlay_rotation,
            overlay_gravity: ContentsGravity::ResizeAspectFill,
        }
    }

    /// Scaled size of the overlay contents under aspect-fill
    ///
    /// The returned size covers the overlay frame in both dimensions; the
    /// excess in one dimension is cropped by the layer bounds.
    pub fn overlay_fill_size(&self, contents: Dimensions) -> (f64, f64) {
        if contents.width == 0 || contents.height == 0 {
            return (self.overlay.width, self.overlay.height);
        }

        let scale_x = self.overlay.width / contents.width as f64;
        let scale_y = self.overlay.height / contents.height as f64;
        let scale = scale_x.max(scale_y);

        (contents.width as f64 * scale, contents.height as f64 * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::ImageOrientation;

    #[test]
    fn overlay_occupies_exactly_the_lower_half() {
        let overlay = OverlayImage::with_orientation(ImageOrientation::Up);

        for (w, h) in [(1080, 1920), (1920, 1080), (640, 480), (1, 2), (333, 777)] {
            let graph = LayerGraph::build(Dimensions::new(w, h), &overlay);

            let half = h as f64 / 2.0;
            assert_eq!(graph.overlay, Rect::new(0.0, half, w as f64, half));
            // Never overlapping the top half, never exceeding frame bounds
            assert!(graph.overlay.y >= half);
            assert!(graph.parent.contains(&graph.overlay));
            assert_eq!(graph.video, graph.parent);
        }
    }

    #[test]
    fn rotation_is_270_degrees() {
        assert_eq!(Rotation::Clockwise270.radians(), 1.5 * PI);
        assert_eq!(Rotation::Identity.radians(), 0.0);
    }

    #[test]
    fn only_right_orientation_gets_the_correction_transform() {
        // Known limitation asserted explicitly: upside-down and mirrored
        // inputs get identity too, they are not corrected
        let all = [
            ImageOrientation::Up,
            ImageOrientation::UpMirrored,
            ImageOrientation::Down,
            ImageOrientation::DownMirrored,
            ImageOrientation::LeftMirrored,
            ImageOrientation::Right,
            ImageOrientation::RightMirrored,
            ImageOrientation::Left,
        ];

        for orientation in all {
            let overlay = OverlayImage::with_orientation(orientation);
            let graph = LayerGraph::build(Dimensions::new(1080, 1920), &overlay);

            if orientation == ImageOrientation::Right {
                assert_eq!(graph.overlay_rotation, Rotation::Clockwise270);
            } else {
                assert!(
                    graph.overlay_rotation.is_identity(),
                    "{:?} must not be corrected",
                    orientation
                );
            }
        }
    }

    #[test]
    fn aspect_fill_covers_the_overlay_frame() {
        let overlay = OverlayImage::with_orientation(ImageOrientation::Up);
        let graph = LayerGraph::build(Dimensions::new(1000, 1000), &overlay);

        // Wide contents: height is the binding dimension
        let (w, h) = graph.overlay_fill_size(Dimensions::new(2000, 500));
        assert_eq!(h, 500.0);
        assert_eq!(w, 2000.0);
        assert!(w >= graph.overlay.width && h >= graph.overlay.height);

        // Tall contents: width is the binding dimension
        let (w, h) = graph.overlay_fill_size(Dimensions::new(100, 400));
        assert_eq!(w, 1000.0);
        assert_eq!(h, 4000.0);
        assert!(w >= graph.overlay.width && h >= graph.overlay.height);
    }

    #[test]
    fn degenerate_contents_fall_back_to_frame_size() {
        let overlay = OverlayImage::with_orientation(ImageOrientation::Up);
        let graph = LayerGraph::build(Dimensions::new(800, 600), &overlay);

        let (w, h) = graph.overlay_fill_size(Dimensions::new(0, 0));
        assert_eq!((w, h), (800.0, 300.0));
    }
}
