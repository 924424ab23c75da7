use std::path::PathBuf;

use tracing::{debug, info};

use crate::asset::{MediaTime, SourceAsset, SourceTrack, TimeRange, TrackKind};
use crate::error::ExportError;

/// One copied span within a composition track
#[derive(Debug, Clone)]
pub struct TrackSegment {
    /// Container the media is copied from
    pub source_path: PathBuf,
    /// Stream index within the source container
    pub source_index: u32,
    /// Span of the source track being copied
    pub source_range: TimeRange,
    /// Insertion point on the composition timeline
    pub at: MediaTime,
}

/// A mutable media stream inside a composition
#[derive(Debug, Clone)]
pub struct CompositionTrack {
    pub kind: TrackKind,
    segments: Vec<TrackSegment>,
}

impl CompositionTrack {
    fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            segments: Vec::new(),
        }
    }

    /// Copy a span of a source track onto this track at the given time
    ///
    /// The range must lie within the source track; a zero-length range is
    /// accepted (it inserts trivially and sorts itself out at export).
    pub fn insert_time_range(
        &mut self,
        range: TimeRange,
        source_path: &PathBuf,
        source: &SourceTrack,
        at: MediaTime,
    ) -> Result<(), ExportError> {
        if source.kind != self.kind {
            return Err(ExportError::TimeRangeInsertionFailed {
                reason: format!(
                    "cannot insert a {} track into a {} track",
                    source.kind.as_str(),
                    self.kind.as_str()
                ),
            });
        }

        if range.start.seconds() < 0.0 || range.duration.seconds() < 0.0 {
            return Err(ExportError::TimeRangeInsertionFailed {
                reason: "negative time range".to_string(),
            });
        }

        // Half-frame tolerance absorbs timescale conversion jitter between
        // the container and per-stream durations
        let tolerance = 1.0 / 60.0;
        if range.end_seconds() > source.duration.seconds() + tolerance {
            return Err(ExportError::TimeRangeInsertionFailed {
                reason: format!(
                    "range ends at {:.3}s but the source {} track is {:.3}s long",
                    range.end_seconds(),
                    source.kind.as_str(),
                    source.duration.seconds()
                ),
            });
        }

        self.segments.push(TrackSegment {
            source_path: source_path.clone(),
            source_index: source.index,
            source_range: range,
            at,
        });

        Ok(())
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// Total inserted duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.at.seconds() + s.source_range.duration.seconds())
            .fold(0.0, f64::max)
    }
}

/// An in-memory timeline container built fresh per export
///
/// Holds exactly one video track and one audio track, both populated from
/// the source asset at time zero for its full duration.
#[derive(Debug, Clone)]
pub struct Composition {
    pub video_track: CompositionTrack,
    pub audio_track: CompositionTrack,
    duration: MediaTime,
}

impl Composition {
    pub fn duration(&self) -> MediaTime {
        self.duration
    }
}

/// Builds a composition from a probed source asset
pub struct TimelineComposer;

impl TimelineComposer {
    /// Copy the full time range of the source's video and audio tracks into
    /// a new composition, both starting at time zero
    ///
    /// All-or-nothing: if either insertion fails, no composition is
    /// returned, so a partially-populated timeline can never reach the next
    /// stage.
    pub fn compose(asset: &SourceAsset) -> Result<Composition, ExportError> {
        let range = asset.full_range();
        debug!(
            "Composing timeline: full range 0.0-{:.3}s",
            range.duration.seconds()
        );

        let mut video_track = CompositionTrack::new(TrackKind::Video);
        let mut audio_track = CompositionTrack::new(TrackKind::Audio);

        video_track.insert_time_range(range, &asset.path, &asset.video_track, MediaTime::zero())?;
        audio_track.insert_time_range(range, &asset.path, &asset.audio_track, MediaTime::zero())?;

        info!(
            "Timeline composed: video {:.3}s, audio {:.3}s",
            video_track.duration_seconds(),
            audio_track.duration_seconds()
        );

        Ok(Composition {
            video_track,
            audio_track,
            duration: range.duration,
        })
    }
}
