//! Batch splitting into a zip archive.
//!
//! One transcoding run with the segment muxer writes a chunk file per
//! window into a private scratch directory; the chunks are then zipped
//! flat and the scratch directory removed. The archive is never left
//! partially written when transcoding fails.

use std::path::{Path, PathBuf};
use tracing::info;

use vidcut_models::EncodingConfig;

use crate::command::{self, FfmpegCommand, FfmpegInput, FfmpegOutput, FfmpegRunner};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::temp;

/// Split a direct stream URL into `chunk_duration`-second chunks and
/// return the path of a deflate-compressed zip of all of them.
///
/// Timestamps are reset per chunk so each one plays independently from
/// zero; chunks are re-encoded for accuracy at the cut points.
pub async fn split_to_archive(
    direct_url: &str,
    chunk_duration: u32,
    config: &MediaConfig,
) -> MediaResult<PathBuf> {
    if chunk_duration == 0 {
        return Err(MediaError::InvalidDuration(0.0));
    }

    tokio::fs::create_dir_all(&config.temp_dir).await?;
    let work_dir = temp::fresh_scratch_dir(&config.temp_dir).await?;

    info!(
        chunk_duration,
        work_dir = %work_dir.display(),
        "Splitting {}",
        direct_url
    );

    let cmd = FfmpegCommand::new(
        FfmpegInput::new(direct_url).browser_headers(direct_url),
        FfmpegOutput::Segments {
            pattern: command::segment_pattern(&work_dir),
            segment_time: chunk_duration,
        },
    )
    .encoding(&EncodingConfig::file());

    if let Err(e) = FfmpegRunner::new().run(&cmd).await {
        temp::remove_scratch_dir(&work_dir).await;
        return Err(e);
    }

    let zip_path = temp::fresh_artifact(&config.temp_dir, "zip");
    let result = {
        let work_dir = work_dir.clone();
        let zip_path = zip_path.clone();
        tokio::task::spawn_blocking(move || archive_segments(&work_dir, &zip_path))
            .await
            .map_err(|e| MediaError::Io(std::io::Error::other(e)))?
    };

    temp::remove_scratch_dir(&work_dir).await;

    match result {
        Ok(count) => {
            info!(
                entries = count,
                archive = %zip_path.display(),
                "Split archive ready"
            );
            Ok(zip_path)
        }
        Err(e) => {
            temp::cleanup_file(&zip_path).await;
            Err(e)
        }
    }
}

/// Append every `.mp4` in `work_dir` to a new deflate zip at
/// `zip_path`, flat (no directories inside the archive). Returns the
/// number of entries written.
pub fn archive_segments(work_dir: &Path, zip_path: &Path) -> MediaResult<usize> {
    use std::io::{Read, Write};

    let mut chunks: Vec<PathBuf> = std::fs::read_dir(work_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|e| e == "mp4").unwrap_or(false))
        .collect();
    chunks.sort();

    let file = std::fs::File::create(zip_path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let mut buf = Vec::new();
    for chunk in &chunks {
        let name = chunk
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| MediaError::FileNotFound(chunk.clone()))?;

        buf.clear();
        std::fs::File::open(chunk)?.read_to_end(&mut buf)?;
        zip.start_file(name, options)?;
        zip.write_all(&buf)?;
    }

    zip.finish()?;
    Ok(chunks.len())
}
