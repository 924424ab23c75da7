use crate::asset::{Dimensions, MediaTime, TimeRange, TrackKind};
use crate::composition::layer::LayerGraph;
use crate::composition::timeline::Composition;

/// Binds one composition track to a timed instruction
#[derive(Debug, Clone)]
pub struct LayerInstruction {
    pub track_kind: TrackKind,
}

/// A timed segment of the render timeline
#[derive(Debug, Clone)]
pub struct Instruction {
    pub time_range: TimeRange,
    pub layer_instructions: Vec<LayerInstruction>,
}

/// The frame size, frame rate, and layer-graph binding applied at export
///
/// Pure data assembly: exactly one instruction spans the full composition
/// duration and carries exactly one layer instruction referencing the
/// composition's video track. Multi-segment timelines are not supported.
#[derive(Debug, Clone)]
pub struct RenderConfiguration {
    pub render_size: Dimensions,
    /// Duration of one output frame; 1/30 s at the default frame rate
    pub frame_duration: MediaTime,
    /// Post-processing animation pass applied on top of decoded frames
    pub layer_graph: LayerGraph,
    pub instructions: Vec<Instruction>,
}

impl RenderConfiguration {
    /// Assemble the render configuration for a composed timeline
    pub fn new(
        composition: &Composition,
        render_size: Dimensions,
        frame_rate: i32,
        layer_graph: LayerGraph,
    ) -> Self {
        let instruction = Instruction {
            time_range: TimeRange::from_zero(composition.duration()),
            layer_instructions: vec![LayerInstruction {
                track_kind: TrackKind::Video,
            }],
        };

        Self {
            render_size,
            frame_duration: MediaTime::new(1, frame_rate),
            layer_graph,
            instructions: vec![instruction],
        }
    }

    pub fn frame_rate(&self) -> i32 {
        self.frame_duration.timescale
    }
}
