//! FFprobe duration fallback.
//!
//! When the extraction engine reports no duration (common for direct
//! CDN URLs) we probe the stream itself. Probe failure is non-fatal at
//! the call site; the resolver treats it as duration unknown.

use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output, reduced to the format section.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a media URL or local path for its duration in seconds.
pub async fn probe_duration(target: &str) -> MediaResult<f64> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::ProbeFailed {
            message: "FFprobe reported no duration".to_string(),
            stderr: None,
        })?;

    Ok(duration)
}
