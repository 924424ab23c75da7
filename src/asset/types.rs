use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A rational time value: `value / timescale` seconds
///
/// Media durations are carried as rationals rather than floats so that a
/// full-asset copy uses the exact source duration with no rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: i32,
}

impl MediaTime {
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Time zero in the canonical media timescale
    pub const fn zero() -> Self {
        Self { value: 0, timescale: 600 }
    }

    pub fn seconds(&self) -> f64 {
        if self.timescale == 0 {
            return 0.0;
        }
        self.value as f64 / self.timescale as f64
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Construct from seconds at the given timescale, rounding to the
    /// nearest tick
    pub fn from_seconds(seconds: f64, timescale: i32) -> Self {
        Self {
            value: (seconds * timescale as f64).round() as i64,
            timescale,
        }
    }
}

/// A (start, duration) pair in a rational time base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl TimeRange {
    pub const fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// The full-asset range: start = 0, duration = the given duration
    pub fn from_zero(duration: MediaTime) -> Self {
        Self {
            start: MediaTime::zero(),
            duration,
        }
    }

    pub fn end_seconds(&self) -> f64 {
        self.start.seconds() + self.duration.seconds()
    }
}

/// Frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Media stream kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// A single media stream belonging to the source asset (read-only)
#[derive(Debug, Clone)]
pub struct SourceTrack {
    pub kind: TrackKind,
    /// Stream index within the source container
    pub index: u32,
    pub duration: MediaTime,
    /// Present for video tracks only
    pub natural_size: Option<Dimensions>,
}

/// A probed source video file
///
/// Immutable once loaded; created per export call and discarded afterwards.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub duration: MediaTime,
    pub video_track: SourceTrack,
    pub audio_track: SourceTrack,
}

impl SourceAsset {
    /// Natural frame size of the first video track
    pub fn natural_size(&self) -> Dimensions {
        self.video_track
            .natural_size
            .unwrap_or(Dimensions::new(0, 0))
    }

    /// The full time range of the asset, starting at zero
    pub fn full_range(&self) -> TimeRange {
        TimeRange::from_zero(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_time_seconds() {
        assert_eq!(MediaTime::new(1, 30).seconds(), 1.0 / 30.0);
        assert_eq!(MediaTime::new(6000, 600).seconds(), 10.0);
        assert_eq!(MediaTime::zero().seconds(), 0.0);
    }

    #[test]
    fn media_time_zero_timescale_does_not_divide_by_zero() {
        assert_eq!(MediaTime::new(5, 0).seconds(), 0.0);
    }

    #[test]
    fn media_time_from_seconds_rounds() {
        let t = MediaTime::from_seconds(10.0, 600);
        assert_eq!(t.value, 6000);
        assert_eq!(t.timescale, 600);
    }

    #[test]
    fn full_range_starts_at_zero() {
        let range = TimeRange::from_zero(MediaTime::new(3000, 600));
        assert!(range.start.is_zero());
        assert_eq!(range.end_seconds(), 5.0);
    }
}
