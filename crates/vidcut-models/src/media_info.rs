//! Resolved media metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Title used for the unresolved sentinel.
pub const UNRESOLVED_TITLE: &str = "Error";

/// Title used when extraction succeeded but reported no title.
pub const DEFAULT_TITLE: &str = "video";

/// Result of resolving a user-supplied video URL.
///
/// Constructed fresh per request and discarded afterwards; resolution
/// results are never cached.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaInfo {
    /// Total duration in seconds. `0.0` means unknown (or total failure).
    pub duration: f64,

    /// Video title.
    pub title: String,

    /// Direct URL of the selected stream. `None` when every extraction
    /// strategy failed.
    pub primary_url: Option<String>,

    /// Direct URL of a separate audio stream. Present only when the
    /// primary stream is video-only and a complementary audio-only
    /// stream was found.
    pub audio_url: Option<String>,

    /// Selectable renditions, deduplicated by height, best first.
    pub formats: Vec<FormatDescriptor>,
}

impl MediaInfo {
    /// Sentinel returned when the whole strategy cascade failed.
    ///
    /// Callers must treat this as an error, not proceed with it.
    pub fn unresolved() -> Self {
        Self {
            duration: 0.0,
            title: UNRESOLVED_TITLE.to_string(),
            primary_url: None,
            audio_url: None,
            formats: Vec::new(),
        }
    }

    /// Whether resolution produced a usable stream location.
    pub fn is_resolved(&self) -> bool {
        self.primary_url.is_some()
    }
}

/// One selectable rendition from the extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormatDescriptor {
    /// Opaque identifier assigned by the extraction engine.
    pub format_id: String,

    /// Frame height in pixels. Entries without a height never make it
    /// into the catalog.
    pub height: u32,

    /// Frame width in pixels, when reported.
    pub width: Option<u32>,

    /// Human-readable label, e.g. `"1080p (24.3MB) (Video Only)"`.
    pub label: String,

    /// Container extension, e.g. `"mp4"`.
    pub ext: Option<String>,

    /// True when the stream carries no audio track and needs muxing
    /// with a separate audio stream for playback.
    pub video_only: bool,
}

/// Map a pixel height to the conventional resolution name.
///
/// Heights between the standard ladder rungs fall back to `"{height}p"`.
pub fn resolution_label(height: u32) -> String {
    match height {
        1000..=1100 => "1080p".to_string(),
        700..=750 => "720p".to_string(),
        450..=500 => "480p".to_string(),
        330..=390 => "360p".to_string(),
        220..=270 => "240p".to_string(),
        130..=160 => "144p".to_string(),
        h => format!("{}p", h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_label_bands() {
        assert_eq!(resolution_label(1080), "1080p");
        assert_eq!(resolution_label(1000), "1080p");
        assert_eq!(resolution_label(1100), "1080p");
        assert_eq!(resolution_label(720), "720p");
        assert_eq!(resolution_label(480), "480p");
        assert_eq!(resolution_label(360), "360p");
        assert_eq!(resolution_label(240), "240p");
        assert_eq!(resolution_label(144), "144p");
        // Outside every band: literal height
        assert_eq!(resolution_label(2160), "2160p");
        assert_eq!(resolution_label(600), "600p");
    }

    #[test]
    fn test_unresolved_sentinel() {
        let info = MediaInfo::unresolved();
        assert_eq!(info.duration, 0.0);
        assert_eq!(info.title, UNRESOLVED_TITLE);
        assert!(info.primary_url.is_none());
        assert!(!info.is_resolved());
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_media_info_serializes() {
        let info = MediaInfo {
            duration: 10.5,
            title: "clip".to_string(),
            primary_url: Some("https://cdn.example/v.mp4".to_string()),
            audio_url: None,
            formats: vec![],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["duration"], 10.5);
        assert_eq!(json["primary_url"], "https://cdn.example/v.mp4");
    }
}
