//! Media pipeline configuration.
//!
//! The credential blob is explicit configuration handed to the resolver
//! at construction, not ad-hoc environment reads at call time. It is
//! materialized to a cookies file at most once per process; concurrent
//! callers share the same file.

use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Name of the env var carrying the optional credential/cookie blob.
pub const COOKIES_ENV: &str = "VIDCUT_COOKIES";

/// Name of the env var overriding the scratch directory.
pub const TEMP_DIR_ENV: &str = "VIDCUT_TEMP_DIR";

/// Minimum size for a plausible cookies blob (bytes).
/// A real Netscape cookies file is at least ~50 bytes.
const MIN_COOKIES_LEN: usize = 50;

/// Guards the once-per-process cookies file write.
static COOKIES_FILE: OnceLock<Mutex<Option<PathBuf>>> = OnceLock::new();

/// Configuration for the resolution and transcode pipelines.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory for all scratch artifacts (trims, archives, fetches).
    pub temp_dir: PathBuf,

    /// Optional Netscape-format cookie blob for authenticating
    /// extraction-engine requests.
    pub cookies_blob: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("vidcut"),
            cookies_blob: None,
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            temp_dir: std::env::var(TEMP_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("vidcut")),
            cookies_blob: std::env::var(COOKIES_ENV).ok(),
        }
    }

    /// Path to the materialized cookies file, writing it on first use.
    ///
    /// Returns `None` when no blob is configured or the blob does not
    /// look like a Netscape cookies file. The file is written once per
    /// process lifetime and shared by concurrent requests; it is not
    /// deleted until process exit.
    pub async fn cookies_file(&self) -> Option<PathBuf> {
        let blob = self.cookies_blob.as_deref()?;

        if blob.len() < MIN_COOKIES_LEN || !is_valid_netscape_cookies(blob) {
            debug!("Configured cookie blob is not a valid Netscape cookies file, skipping");
            return None;
        }

        let cell = COOKIES_FILE.get_or_init(|| Mutex::new(None));
        let mut guard = cell.lock().await;

        if let Some(path) = guard.as_ref() {
            if path.exists() {
                return Some(path.clone());
            }
        }

        let path = self
            .temp_dir
            .join(format!("cookies_{}.txt", uuid::Uuid::new_v4()));
        if let Err(e) = tokio::fs::create_dir_all(&self.temp_dir).await {
            warn!("Failed to create temp dir for cookies file: {}", e);
            return None;
        }
        match tokio::fs::write(&path, blob).await {
            Ok(()) => {
                debug!("Materialized cookies file at {}", path.display());
                *guard = Some(path.clone());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to write cookies file: {}", e);
                None
            }
        }
    }
}

/// Validate that a cookie blob appears to be in Netscape format.
///
/// Netscape cookies files either start with "# Netscape HTTP Cookie File"
/// or contain tab-separated lines with domain entries.
pub fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() >= 6 {
            return true;
        }
    }

    false
}
