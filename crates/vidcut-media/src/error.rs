//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during resolution and transcoding.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    /// Every strategy in the extraction cascade failed.
    ///
    /// Resolution itself reports this as the unresolved `MediaInfo`
    /// sentinel; callers that need a hard error map it to this variant.
    #[error("every extraction strategy failed for the requested URL")]
    ResolutionExhausted,

    /// A time window where `end <= start`.
    #[error("invalid window: end ({end}) must be greater than start ({start})")]
    InvalidWindow { start: f64, end: f64 },

    /// A non-positive duration reached the segment planner.
    #[error("invalid duration: {0} (must be > 0)")]
    InvalidDuration(f64),

    /// The transcoder exited non-zero before producing any output.
    /// Failures after the first byte are logged, never surfaced.
    #[error("transcode failed: {message}")]
    TranscodeFailure {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    /// The two-stage pre-fetch failed; no bytes were streamed.
    #[error("source fetch failed: {0}")]
    FetchFailure(String),

    #[error("FFprobe command failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl MediaError {
    /// Create a transcode failure error.
    pub fn transcode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscodeFailure {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a fetch failure error.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::FetchFailure(message.into())
    }

    /// Whether this error is the caller's fault (bad request) rather
    /// than a processing failure. Boundary layers use this for their
    /// client/server error classification.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidWindow { .. } | Self::InvalidDuration(_)
        )
    }
}
