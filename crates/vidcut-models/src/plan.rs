//! Segment plans for trimmed and chunked downloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Filename used for the single-segment (whole video) plan.
pub const FULL_VIDEO_FILENAME: &str = "full_video.mp4";

/// One `[start, end)` window of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// 1-based position within the plan.
    pub index: u32,

    /// Window start in seconds.
    pub start: f64,

    /// Window end in seconds. The final segment is clamped to the
    /// total duration.
    pub end: f64,

    /// Suggested download filename, `part_{index}.mp4` (or
    /// `full_video.mp4` for a whole-video plan).
    pub filename: String,
}

impl Segment {
    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, contiguous set of segments covering `[0, duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentPlan {
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    /// Number of segments in the plan.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
