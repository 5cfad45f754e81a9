//! Shared data models for the vidcut backend.
//!
//! This crate provides Serde-serializable types for:
//! - Resolved media metadata and selectable formats
//! - Segment plans for trimming and chunked downloads
//! - Extraction client profiles (the cascade order)
//! - Encoding configuration

pub mod encoding;
pub mod media_info;
pub mod plan;
pub mod profile;

// Re-export common types
pub use encoding::EncodingConfig;
pub use media_info::{FormatDescriptor, MediaInfo};
pub use plan::{Segment, SegmentPlan};
pub use profile::ClientProfile;
