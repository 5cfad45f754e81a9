//! FFmpeg command builder and runner.
//!
//! The builder covers the three output shapes the pipeline needs: a
//! single MP4 file on disk, a fragmented MP4 byte stream on stdout, and
//! a segmented-muxer set of files named by a numeric pattern.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use vidcut_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};

/// Synthetic browser user agent attached to network inputs. CDNs
/// reject the default ffmpeg agent far more often.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One time-windowed input (HTTP(S) URL or local path).
#[derive(Debug, Clone)]
pub struct FfmpegInput {
    /// URL or local path
    source: String,
    /// Input-stage seek (`-ss` before `-i`), for fast seeking
    seek: Option<f64>,
    /// Input-stage duration clamp (`-t` before `-i`)
    duration: Option<f64>,
    /// User agent header for network sources
    user_agent: Option<String>,
    /// Referer header for network sources
    referer: Option<String>,
}

impl FfmpegInput {
    /// Create an input bound to a URL or local path.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            seek: None,
            duration: None,
            user_agent: None,
            referer: None,
        }
    }

    /// Apply a `[start, start+duration)` window at the input stage.
    pub fn window(mut self, start: f64, duration: f64) -> Self {
        self.seek = Some(start);
        self.duration = Some(duration);
        self
    }

    /// Attach browser-emulation headers (user agent + referer).
    pub fn browser_headers(mut self, referer: impl Into<String>) -> Self {
        self.user_agent = Some(BROWSER_USER_AGENT.to_string());
        self.referer = Some(referer.into());
        self
    }

    fn push_args(&self, args: &mut Vec<String>) {
        if let Some(ua) = &self.user_agent {
            args.push("-user_agent".to_string());
            args.push(ua.clone());
        }
        if let Some(referer) = &self.referer {
            args.push("-referer".to_string());
            args.push(referer.clone());
        }
        if let Some(seek) = self.seek {
            args.push("-ss".to_string());
            args.push(format!("{:.3}", seek));
        }
        if let Some(duration) = self.duration {
            args.push("-t".to_string());
            args.push(format!("{:.3}", duration));
        }
        args.push("-i".to_string());
        args.push(self.source.clone());
    }
}

/// Where the transcode output goes.
#[derive(Debug, Clone)]
pub enum FfmpegOutput {
    /// Single MP4 file on disk.
    File(PathBuf),
    /// Fragmented MP4 on stdout, streamable before the encode finishes.
    Pipe,
    /// Segment muxer writing one file per `segment_time` seconds,
    /// timestamps reset so each chunk plays from zero.
    Segments {
        pattern: PathBuf,
        segment_time: u32,
    },
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    output: FfmpegOutput,
    /// Extra output arguments (after all inputs)
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: FfmpegInput, output: FfmpegOutput) -> Self {
        Self {
            inputs: vec![input],
            output,
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a second (or further) input.
    pub fn add_input(mut self, input: FfmpegInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Apply re-encode settings from an [`EncodingConfig`].
    pub fn encoding(self, encoding: &EncodingConfig) -> Self {
        self.output_arg("-c:v")
            .output_arg(&encoding.codec)
            .output_arg("-preset")
            .output_arg(&encoding.preset)
            .output_arg("-crf")
            .output_arg(encoding.crf.to_string())
            .output_arg("-c:a")
            .output_arg(&encoding.audio_codec)
    }

    /// Map video from input 0 and audio from input 1, truncating the
    /// output to the shorter of the two. Used when a video-only stream
    /// is muxed with a separate audio stream.
    pub fn map_split_streams(self) -> Self {
        self.output_arg("-map")
            .output_arg("0:v:0")
            .output_arg("-map")
            .output_arg("1:a:0")
            .output_arg("-shortest")
    }

    /// Number of inputs currently configured.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Build the command-line arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            input.push_args(&mut args);
        }

        args.extend(self.output_args.clone());

        match &self.output {
            FfmpegOutput::File(path) => {
                args.push(path.to_string_lossy().to_string());
            }
            FfmpegOutput::Pipe => {
                // Fragmented MP4 so the first bytes flow before the
                // whole output exists.
                args.push("-movflags".to_string());
                args.push("frag_keyframe+empty_moov".to_string());
                args.push("-f".to_string());
                args.push("mp4".to_string());
                args.push("pipe:1".to_string());
            }
            FfmpegOutput::Segments {
                pattern,
                segment_time,
            } => {
                args.push("-f".to_string());
                args.push("segment".to_string());
                args.push("-segment_time".to_string());
                args.push(segment_time.to_string());
                args.push("-reset_timestamps".to_string());
                args.push("1".to_string());
                args.push(pattern.to_string_lossy().to_string());
            }
        }

        args
    }

    /// Spawn the transcoder with stdout piped, for streaming reads.
    pub fn spawn_piped(&self) -> MediaResult<Child> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = self.build_args();
        debug!("Spawning FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        Ok(child)
    }
}

/// Runner for FFmpeg commands that produce files on disk.
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = if let Some(timeout_secs) = self.timeout_secs {
            let timeout = tokio::time::timeout(
                std::time::Duration::from_secs(timeout_secs),
                child.wait_with_output(),
            );
            match timeout.await {
                Ok(result) => result?,
                Err(_) => {
                    // wait_with_output consumed the child; kill_on_drop
                    // reaps the process when the future is dropped.
                    warn!(
                        "FFmpeg timed out after {} seconds, killing process",
                        timeout_secs
                    );
                    return Err(MediaError::Timeout(timeout_secs));
                }
            }
        } else {
            child.wait_with_output().await?
        };

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(MediaError::transcode_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr),
                output.status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Check if yt-dlp is available.
pub fn check_ytdlp() -> MediaResult<PathBuf> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)
}

/// Build the segment file pattern inside a scratch directory.
pub fn segment_pattern(dir: &Path) -> PathBuf {
    dir.join("segment_%03d.mp4")
}
