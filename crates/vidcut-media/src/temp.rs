//! Scratch artifact lifecycle.
//!
//! Every artifact written to shared storage gets a fresh uuid-based
//! name so concurrent requests cannot collide. Deletion failures are
//! logged, never escalated to the caller.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MediaResult;

/// Build a fresh uuid-named artifact path under `dir`.
///
/// `ext` is the bare extension ("mp4", "zip").
pub fn fresh_artifact(dir: &Path, ext: &str) -> PathBuf {
    dir.join(format!("{}.{}", Uuid::new_v4(), ext))
}

/// Create a fresh uuid-named scratch directory under `dir`.
pub async fn fresh_scratch_dir(dir: &Path) -> MediaResult<PathBuf> {
    let path = dir.join(Uuid::new_v4().to_string());
    tokio::fs::create_dir_all(&path).await?;
    Ok(path)
}

/// Post-response cleanup hook for whole-file downloads.
///
/// Invoked by the boundary layer once a returned file has been sent.
pub async fn cleanup_file(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Cleaned up file: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Error cleaning up file {}: {}", path.display(), e),
    }
}

/// Remove a scratch directory and everything in it, best effort.
pub async fn remove_scratch_dir(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!("Removed scratch dir: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Error removing scratch dir {}: {}", path.display(), e),
    }
}

/// Guard that removes a transient file when dropped.
///
/// Used for the two-stage fetch file, which must disappear whether the
/// stream was drained, abandoned, or failed.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed transient file: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Error removing transient file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
