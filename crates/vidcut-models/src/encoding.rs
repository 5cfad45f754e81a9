//! Video encoding configuration.
//!
//! Every cut re-encodes. Stream-copy is deliberately not offered:
//! copying at an arbitrary cut point produces frozen leading frames
//! whenever the cut misses a keyframe.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Preset for file-producing cuts (trim, split)
pub const FILE_PRESET: &str = "fast";
/// Preset for live pipe streaming, where first-byte latency matters
pub const STREAM_PRESET: &str = "superfast";
/// Fixed quality factor for all cuts
pub const DEFAULT_CRF: u8 = 23;

/// Video encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "superfast")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    FILE_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self::file()
    }
}

impl EncodingConfig {
    /// Configuration for file-producing cuts (trim to file, splitter).
    pub fn file() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: FILE_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }

    /// Configuration for pipe streaming: fastest practical preset so
    /// the first fragment flows before the whole output exists.
    pub fn streaming() -> Self {
        Self {
            preset: STREAM_PRESET.to_string(),
            ..Self::file()
        }
    }
}
