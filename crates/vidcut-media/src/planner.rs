//! Segment planning.
//!
//! Turns a total duration and a chunk size into the ordered list of
//! `[start, end)` windows a multi-part download will use.

use vidcut_models::plan::FULL_VIDEO_FILENAME;
use vidcut_models::{Segment, SegmentPlan};

use crate::error::{MediaError, MediaResult};

/// Compute the segment plan for a video.
///
/// `chunk_duration == 0` means one whole-video segment. Otherwise the
/// plan holds `ceil(duration / chunk_duration)` contiguous segments,
/// the last clamped to `duration`.
///
/// Callers should have rejected non-positive durations upstream, but
/// the planner defends anyway with [`MediaError::InvalidDuration`].
pub fn plan(duration: f64, chunk_duration: u32) -> MediaResult<SegmentPlan> {
    if duration <= 0.0 {
        return Err(MediaError::InvalidDuration(duration));
    }

    if chunk_duration == 0 {
        return Ok(SegmentPlan {
            segments: vec![Segment {
                index: 1,
                start: 0.0,
                end: duration,
                filename: FULL_VIDEO_FILENAME.to_string(),
            }],
        });
    }

    let chunk = chunk_duration as f64;
    let count = (duration / chunk).ceil() as u32;

    let segments = (0..count)
        .map(|i| {
            let start = i as f64 * chunk;
            let end = ((i + 1) as f64 * chunk).min(duration);
            Segment {
                index: i + 1,
                start,
                end,
                filename: format!("part_{}.mp4", i + 1),
            }
        })
        .collect();

    Ok(SegmentPlan { segments })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_video_plan() {
        let plan = plan(10.0, 0).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.segments[0].index, 1);
        assert_eq!(plan.segments[0].start, 0.0);
        assert_eq!(plan.segments[0].end, 10.0);
        assert_eq!(plan.segments[0].filename, "full_video.mp4");
    }

    #[test]
    fn test_even_split() {
        let plan = plan(10.0, 5).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.segments[0].start, 0.0);
        assert_eq!(plan.segments[0].end, 5.0);
        assert_eq!(plan.segments[1].start, 5.0);
        assert_eq!(plan.segments[1].end, 10.0);
        assert_eq!(plan.segments[1].filename, "part_2.mp4");
    }

    #[test]
    fn test_last_segment_clamped() {
        let plan = plan(11.5, 5).unwrap();
        assert_eq!(plan.len(), 3);
        let last = plan.segments.last().unwrap();
        assert_eq!(last.start, 10.0);
        assert_eq!(last.end, 11.5);
        assert!(last.duration() < 5.0);
    }

    #[test]
    fn test_count_is_ceiling() {
        for (duration, chunk, expected) in [
            (10.0, 5, 2),
            (10.1, 5, 3),
            (4.9, 5, 1),
            (600.0, 7, 86),
            (0.5, 1, 1),
        ] {
            let plan = plan(duration, chunk).unwrap();
            assert_eq!(
                plan.len(),
                expected,
                "duration={} chunk={}",
                duration,
                chunk
            );
        }
    }

    #[test]
    fn test_windows_cover_duration_without_gaps() {
        let duration = 127.3;
        let plan = plan(duration, 10).unwrap();

        assert_eq!(plan.segments[0].start, 0.0);
        for pair in plan.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "no gaps or overlaps");
        }
        assert_eq!(plan.segments.last().unwrap().end, duration);

        let indices: Vec<u32> = plan.segments.iter().map(|s| s.index).collect();
        let expected: Vec<u32> = (1..=plan.len() as u32).collect();
        assert_eq!(indices, expected, "1-based contiguous indices");
    }

    #[test]
    fn test_invalid_duration_rejected() {
        for chunk in [0, 5] {
            assert!(matches!(
                plan(0.0, chunk),
                Err(MediaError::InvalidDuration(_))
            ));
            assert!(matches!(
                plan(-3.0, chunk),
                Err(MediaError::InvalidDuration(_))
            ));
        }
    }
}
