//! Whole-file trimming.
//!
//! Produces a standalone MP4 of a `[start, end)` window, written to a
//! uuid-named file under the configured temp dir. The boundary layer
//! sends the file and then removes it via [`crate::temp::cleanup_file`].

use std::path::PathBuf;
use tracing::info;

use vidcut_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegInput, FfmpegOutput, FfmpegRunner};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::temp;

/// Download and trim a direct stream URL into a local MP4.
///
/// Re-encodes (fast preset, fixed quality, AAC) for frame accuracy at
/// arbitrary cut points. Returns the output path; the caller owns its
/// post-delivery cleanup.
pub async fn trim_to_file(
    direct_url: &str,
    start: f64,
    end: f64,
    config: &MediaConfig,
) -> MediaResult<PathBuf> {
    if end <= start {
        return Err(MediaError::InvalidWindow { start, end });
    }
    let duration = end - start;

    tokio::fs::create_dir_all(&config.temp_dir).await?;
    let output = temp::fresh_artifact(&config.temp_dir, "mp4");

    info!(
        start,
        duration,
        output = %output.display(),
        "Trimming {}",
        direct_url
    );

    let cmd = FfmpegCommand::new(
        FfmpegInput::new(direct_url)
            .window(start, duration)
            .browser_headers(direct_url),
        FfmpegOutput::File(output.clone()),
    )
    .encoding(&EncodingConfig::file());

    match FfmpegRunner::new().run(&cmd).await {
        Ok(()) => {
            info!("Trim complete: {}", output.display());
            Ok(output)
        }
        Err(e) => {
            temp::cleanup_file(&output).await;
            Err(e)
        }
    }
}
