#![deny(unreachable_patterns)]
//! Resolution and transcode pipelines for vidcut.
//!
//! This crate provides:
//! - The strategy cascade resolver (yt-dlp client-profile fallback)
//! - Format catalog construction from raw stream metadata
//! - Segment planning for trimmed and chunked downloads
//! - Type-safe FFmpeg command building for file, pipe and segment
//!   outputs
//! - Live segment streaming with supervised subprocess teardown
//! - Batch splitting into zip archives
//! - Scratch artifact lifecycle

pub mod command;
pub mod config;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod planner;
pub mod prefetch;
pub mod probe;
pub mod splitter;
pub mod stream;
pub mod temp;
pub mod trim;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegInput, FfmpegOutput, FfmpegRunner};
pub use config::MediaConfig;
pub use error::{MediaError, MediaResult};
pub use extractor::{build_media_info, RawFormat, RawInfo, Resolver};
pub use formats::build_catalog;
pub use planner::plan;
pub use prefetch::requires_prefetch;
pub use probe::probe_duration;
pub use splitter::split_to_archive;
pub use stream::{stream_segment, SegmentStream, STREAM_CHUNK_SIZE};
pub use temp::{cleanup_file, TempFileGuard};
pub use trim::trim_to_file;
