//! Live segment streaming.
//!
//! Drives one transcoder process per request and relays its stdout as
//! 64 KiB chunks with bounded memory. The process is killed explicitly
//! when the consumer stops reading; a non-zero exit after bytes have
//! already flowed downstream is logged but not surfaced, because the
//! response is committed by then.

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout};
use tracing::{debug, info, warn};

use vidcut_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegInput, FfmpegOutput};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::prefetch;
use crate::temp::{self, TempFileGuard};

/// Size of one relay read. Large enough to amortize syscalls, small
/// enough to keep first-byte latency and memory bounded.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Produce a finite, non-restartable byte stream of the `[start, end)`
/// window of a resolved stream.
///
/// Direct mode windows the CDN URL(s) at the transcoder input stage.
/// When the primary URL belongs to a platform whose CDN rejects seek
/// requests, the source is first fully fetched to a transient file
/// (two-stage mode); a fetch failure aborts with no bytes sent and no
/// file left behind.
pub async fn stream_segment(
    primary_url: &str,
    start: f64,
    end: f64,
    audio_url: Option<&str>,
    origin_url: Option<&str>,
    format_id: Option<&str>,
    config: &MediaConfig,
) -> MediaResult<SegmentStream> {
    if end <= start {
        return Err(MediaError::InvalidWindow { start, end });
    }
    let duration = end - start;
    let referer = origin_url.unwrap_or(primary_url);

    info!(
        start,
        end,
        audio = audio_url.is_some(),
        "Streaming segment from {}",
        primary_url
    );

    let encoding = EncodingConfig::streaming();
    let (cmd, fetch_guard) = if prefetch::requires_prefetch(primary_url) {
        // Two-stage: full fetch, then a local windowed encode.
        tokio::fs::create_dir_all(&config.temp_dir).await?;
        let dest = temp::fresh_artifact(&config.temp_dir, "mp4");
        let guard = TempFileGuard::new(dest.clone());

        let origin = origin_url.unwrap_or(primary_url);
        let cookies = config.cookies_file().await;
        prefetch::fetch_source(origin, format_id, &dest, cookies.as_deref()).await?;

        let cmd = FfmpegCommand::new(
            FfmpegInput::new(dest.to_string_lossy()).window(start, duration),
            FfmpegOutput::Pipe,
        )
        .encoding(&encoding);
        (cmd, Some(guard))
    } else {
        let mut cmd = FfmpegCommand::new(
            FfmpegInput::new(primary_url)
                .window(start, duration)
                .browser_headers(referer),
            FfmpegOutput::Pipe,
        );
        if let Some(audio) = audio_url {
            cmd = cmd
                .add_input(
                    FfmpegInput::new(audio)
                        .window(start, duration)
                        .browser_headers(referer),
                )
                .map_split_streams();
        }
        (cmd.encoding(&encoding), None)
    };

    SegmentStream::spawn(cmd, fetch_guard)
}

/// A running transcode whose output is pulled chunk by chunk.
///
/// Owns the child process; dropping the stream kills the process, and
/// the optional fetch guard removes the two-stage transient file.
pub struct SegmentStream {
    child: Child,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    bytes_sent: u64,
    finished: bool,
    _fetch_guard: Option<TempFileGuard>,
}

impl SegmentStream {
    fn spawn(cmd: FfmpegCommand, fetch_guard: Option<TempFileGuard>) -> MediaResult<Self> {
        let mut child = cmd.spawn_piped()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::transcode_failed("stdout not captured", None, None))?;
        let stderr = child.stderr.take();

        Ok(Self {
            child,
            stdout,
            stderr,
            bytes_sent: 0,
            finished: false,
            _fetch_guard: fetch_guard,
        })
    }

    /// Total bytes handed to the consumer so far.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Pull the next chunk, at most [`STREAM_CHUNK_SIZE`] bytes.
    ///
    /// `Ok(None)` means the stream ended and the process was reaped.
    /// A transcoder failure before the first byte is a hard error; a
    /// failure after output already flowed is logged only.
    pub async fn next_chunk(&mut self) -> MediaResult<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        let n = match self.stdout.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                // Consumer side broke or the pipe died: do not let the
                // transcoder run against a closed pipe.
                self.shutdown().await;
                return Err(MediaError::Io(e));
            }
        };

        if n == 0 {
            self.finish().await?;
            return Ok(None);
        }

        buf.truncate(n);
        self.bytes_sent += n as u64;
        Ok(Some(buf))
    }

    /// End of output: reap the process and classify its exit.
    async fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;
        let status = self.child.wait().await?;

        if status.success() {
            return Ok(());
        }

        let stderr = match self.stderr.take() {
            Some(mut pipe) => {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text).await;
                Some(text)
            }
            None => None,
        };

        if self.bytes_sent > 0 {
            // Degraded half-failure: bytes are already downstream, the
            // response is committed.
            warn!(
                exit_code = ?status.code(),
                bytes_sent = self.bytes_sent,
                "Transcoder exited non-zero after streaming began: {}",
                stderr.as_deref().unwrap_or("")
            );
            Ok(())
        } else {
            Err(MediaError::transcode_failed(
                "transcoder exited before producing output",
                stderr,
                status.code(),
            ))
        }
    }

    /// Kill the transcoder. Used on consumer disconnect; also safe
    /// after normal completion.
    pub async fn shutdown(&mut self) {
        self.finished = true;
        if let Err(e) = self.child.start_kill() {
            debug!("Transcoder already gone: {}", e);
        }
        let _ = self.child.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MediaConfig {
        MediaConfig {
            temp_dir: std::env::temp_dir().join("vidcut-test"),
            cookies_blob: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_window_rejected() {
        for (start, end) in [(5.0, 5.0), (10.0, 5.0), (0.0, 0.0), (0.0, -1.0)] {
            let result = stream_segment(
                "https://cdn.example/v.mp4",
                start,
                end,
                None,
                None,
                None,
                &test_config(),
            )
            .await;
            assert!(
                matches!(result, Err(MediaError::InvalidWindow { .. })),
                "start={} end={}",
                start,
                end
            );
        }
    }

    #[tokio::test]
    #[ignore = "requires ffmpeg and network access"]
    async fn test_stream_direct_sample() {
        let mut stream = stream_segment(
            "https://test-videos.co.uk/vids/bigbuckbunny/mp4/h264/360/Big_Buck_Bunny_360_10s_1MB.mp4",
            0.0,
            2.0,
            None,
            None,
            None,
            &test_config(),
        )
        .await
        .unwrap();

        let mut total = 0usize;
        while let Some(chunk) = stream.next_chunk().await.unwrap() {
            assert!(chunk.len() <= STREAM_CHUNK_SIZE);
            total += chunk.len();
        }
        assert!(total > 0, "streamed {} bytes", total);
    }

    #[tokio::test]
    #[ignore = "requires yt-dlp; exercises the failed-prefetch path"]
    async fn test_two_stage_fetch_failure_leaves_no_file() {
        let config = test_config();
        let result = stream_segment(
            "https://www.youtube.com/watch?v=nonexistent-video-id-000",
            0.0,
            5.0,
            None,
            None,
            None,
            &config,
        )
        .await;
        assert!(matches!(result, Err(MediaError::FetchFailure(_))));

        // No transient fetch file may survive the failure.
        let mut entries = tokio::fs::read_dir(&config.temp_dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(
                entry.path().extension().map(|e| e != "mp4").unwrap_or(true),
                "leftover fetch file: {:?}",
                entry.path()
            );
        }
    }
}
