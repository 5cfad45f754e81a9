//! Two-stage source fetch.
//!
//! Certain CDNs (YouTube's googlevideo hosts in particular) reject the
//! transcoder's range/seek requests on their direct links. For those
//! platforms the source is fully fetched to a transient local file via
//! the extraction engine's own download path, and the windowed encode
//! runs against the local copy instead.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::command::BROWSER_USER_AGENT;
use crate::error::{MediaError, MediaResult};

/// Hosts whose direct links are not reliably seekable by the
/// transcoder and need the two-stage path.
const PREFETCH_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "googlevideo.com"];

/// Whether a resolved stream URL requires the two-stage fetch.
pub fn requires_prefetch(url: &str) -> bool {
    PREFETCH_HOSTS.iter().any(|host| url.contains(host))
}

/// Format selector for the real download: honor a requested format id,
/// muxing in the best audio, else fall back to the best muxed mp4.
pub fn format_selector(format_id: Option<&str>) -> String {
    match format_id {
        Some(id) => format!("{}+bestaudio/best", id),
        None => "best[mp4]/best".to_string(),
    }
}

/// Fetch the full source into `dest` using the extraction engine.
///
/// `origin_url` is the original page URL, not the resolved CDN link;
/// the engine re-authenticates the download itself. The caller owns
/// `dest` cleanup (success or failure) via its temp guard.
pub async fn fetch_source(
    origin_url: &str,
    format_id: Option<&str>,
    dest: &Path,
    cookies: Option<&Path>,
) -> MediaResult<()> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let selector = format_selector(format_id);
    info!(
        url = %origin_url,
        format = %selector,
        dest = %dest.display(),
        "Pre-fetching source for two-stage streaming"
    );

    let dest_str = dest.to_string_lossy();
    let mut args: Vec<String> = vec![
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        "--user-agent".to_string(),
        BROWSER_USER_AGENT.to_string(),
        "-f".to_string(),
        selector,
        "-o".to_string(),
        dest_str.to_string(),
    ];

    if let Some(cookies) = cookies {
        args.push("--cookies".to_string());
        args.push(cookies.to_string_lossy().to_string());
    }

    args.push(origin_url.to_string());

    let output = Command::new("yt-dlp")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);
        return Err(MediaError::fetch_failed(format!(
            "source fetch failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !dest.exists() {
        return Err(MediaError::fetch_failed("fetch output file not created"));
    }

    let size = dest.metadata()?.len();
    info!(
        dest = %dest.display(),
        size_mb = size as f64 / (1024.0 * 1024.0),
        "Source fetched"
    );

    Ok(())
}
