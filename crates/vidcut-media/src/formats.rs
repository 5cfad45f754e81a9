//! Format catalog construction.
//!
//! Pure functions over the raw per-stream metadata returned by the
//! extraction engine: deduplicate by height, label, sort, and the
//! audio/primary stream selection scans.

use std::collections::HashMap;

use vidcut_models::media_info::resolution_label;
use vidcut_models::FormatDescriptor;

use crate::extractor::RawFormat;

/// Whether a codec field reports an actual track.
///
/// The engine reports a missing track either by omitting the field or
/// with the literal string "none".
pub fn has_codec(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

/// Whether a raw stream is video-only (video track, no audio track).
pub fn is_video_only(format: &RawFormat) -> bool {
    has_codec(format.vcodec.as_deref()) && !has_codec(format.acodec.as_deref())
}

/// Whether a raw stream is audio-only (audio track, no video track).
pub fn is_audio_only(format: &RawFormat) -> bool {
    has_codec(format.acodec.as_deref()) && !has_codec(format.vcodec.as_deref())
}

/// Build the selectable-format catalog from raw stream descriptors.
///
/// Streams without a height are dropped. When several streams share a
/// height, the later one in iteration order wins. The result is sorted
/// by height descending.
pub fn build_catalog(raw: &[RawFormat]) -> Vec<FormatDescriptor> {
    let mut by_height: HashMap<u32, FormatDescriptor> = HashMap::new();

    for format in raw {
        let height = match format.height {
            Some(h) if h > 0 => h,
            _ => continue,
        };

        let video_only = is_video_only(format);
        let mut label = resolution_label(height);
        if let Some(size) = format.filesize {
            label.push_str(&format!(" ({:.1}MB)", size as f64 / (1024.0 * 1024.0)));
        }
        if video_only {
            label.push_str(" (Video Only)");
        }

        by_height.insert(
            height,
            FormatDescriptor {
                format_id: format.format_id.clone(),
                height,
                width: format.width,
                label,
                ext: format.ext.clone(),
                video_only,
            },
        );
    }

    let mut catalog: Vec<FormatDescriptor> = by_height.into_values().collect();
    catalog.sort_by(|a, b| b.height.cmp(&a.height));
    catalog
}

/// Find the direct URL of the stream with an exact format id match.
pub fn find_format_url<'a>(raw: &'a [RawFormat], format_id: &str) -> Option<&'a str> {
    raw.iter()
        .find(|f| f.format_id == format_id)
        .and_then(|f| f.url.as_deref())
}

/// Select a complementary audio stream for a video-only primary.
///
/// Scans in iteration order and short-circuits on the first `m4a`
/// audio-only stream; otherwise the last audio-only stream scanned
/// wins.
pub fn select_audio_url(raw: &[RawFormat]) -> Option<String> {
    let mut fallback: Option<&RawFormat> = None;

    for format in raw {
        if !is_audio_only(format) || format.url.is_none() {
            continue;
        }
        if format.ext.as_deref() == Some("m4a") {
            return format.url.clone();
        }
        fallback = Some(format);
    }

    fallback.and_then(|f| f.url.clone())
}
