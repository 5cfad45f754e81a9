//! Strategy cascade resolver.
//!
//! Turns an opaque video URL into a [`MediaInfo`] catalog by trying an
//! ordered list of extraction client profiles until one yields usable
//! metadata. Per-strategy failures are logged and swallowed; only when
//! every profile fails does resolution return the unresolved sentinel.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use vidcut_models::{ClientProfile, MediaInfo};
use vidcut_models::media_info::DEFAULT_TITLE;

use crate::command::BROWSER_USER_AGENT;
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::formats;
use crate::probe;

/// Top-level `yt-dlp --dump-single-json` payload. Only the fields the
/// pipeline reads are modeled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfo {
    pub title: Option<String>,
    pub duration: Option<f64>,
    /// Direct URL of the engine's default-selected format.
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

impl RawInfo {
    /// Whether this extraction produced anything a caller can use.
    pub fn is_usable(&self) -> bool {
        self.url.is_some() || !self.formats.is_empty()
    }
}

/// One raw per-stream descriptor from the extraction engine.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFormat {
    pub format_id: String,
    pub url: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub ext: Option<String>,
    pub filesize: Option<u64>,
}

/// URL resolver backed by the extraction engine.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: MediaConfig,
}

impl Resolver {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Resolve a video URL to playable stream locations and metadata.
    ///
    /// Never fails on a single strategy; when the whole cascade is
    /// exhausted the result is [`MediaInfo::unresolved`], which callers
    /// must treat as an error, not proceed with.
    pub async fn resolve(&self, url: &str, format_id: Option<&str>) -> MediaInfo {
        if let Err(e) = crate::command::check_ytdlp() {
            warn!("Extraction engine unavailable: {}", e);
            return MediaInfo::unresolved();
        }

        let cookies = self.config.cookies_file().await;

        let outcome = run_cascade(|profile| {
            self.attempt_profile(url, profile, cookies.as_deref())
        })
        .await;

        let (profile, raw) = match outcome {
            Some(hit) => hit,
            None => {
                warn!(url = %url, "Every extraction strategy failed");
                return MediaInfo::unresolved();
            }
        };

        info!(url = %url, profile = %profile, "Extraction succeeded");
        self.post_process(raw, format_id).await
    }

    /// One cascade attempt: metadata-only extraction with a profile.
    async fn attempt_profile(
        &self,
        url: &str,
        profile: ClientProfile,
        cookies: Option<&Path>,
    ) -> MediaResult<RawInfo> {
        let mut args: Vec<String> = vec![
            "--dump-single-json".to_string(),
            "--simulate".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--user-agent".to_string(),
            BROWSER_USER_AGENT.to_string(),
        ];

        // The default profile omits client selection entirely and lets
        // the engine run its own format resolution.
        if let Some(client) = profile.player_client() {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        if let Some(cookies) = cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        args.push(url.to_string());

        debug!(profile = %profile, "Attempting extraction");

        let output = Command::new("yt-dlp")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::fetch_failed(format!(
                "extraction failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        let raw: RawInfo = serde_json::from_slice(&output.stdout)?;
        if !raw.is_usable() {
            return Err(MediaError::fetch_failed("extraction returned no streams"));
        }

        Ok(raw)
    }

    /// Normalize a successful extraction into a [`MediaInfo`].
    async fn post_process(&self, raw: RawInfo, format_id: Option<&str>) -> MediaInfo {
        let mut info = build_media_info(&raw, format_id);

        // Duration fallback: probe the resolved stream directly. Probe
        // failure leaves duration at 0, non-fatal.
        if info.duration <= 0.0 {
            if let Some(primary) = info.primary_url.clone() {
                info!("Extraction missing duration, probing stream directly");
                match probe::probe_duration(&primary).await {
                    Ok(duration) => info.duration = duration,
                    Err(e) => warn!("Duration probe failed: {}", e),
                }
            }
        }

        info
    }
}

/// Build a [`MediaInfo`] from a usable raw extraction, without the
/// duration probe fallback. Pure with respect to the raw input.
pub fn build_media_info(raw: &RawInfo, format_id: Option<&str>) -> MediaInfo {
    let primary_url = format_id
        .and_then(|id| formats::find_format_url(&raw.formats, id))
        .map(String::from)
        .or_else(|| raw.url.clone());

    MediaInfo {
        duration: raw.duration.unwrap_or(0.0),
        title: raw
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        primary_url,
        audio_url: formats::select_audio_url(&raw.formats),
        formats: formats::build_catalog(&raw.formats),
    }
}

/// Attempt-until-success driver over the fixed profile cascade.
///
/// Attempts run strictly in sequence; the first usable result wins and
/// no later profile is tried. Failures are logged and counted, never
/// raised.
pub async fn run_cascade<T, F, Fut>(mut attempt: F) -> Option<(ClientProfile, T)>
where
    F: FnMut(ClientProfile) -> Fut,
    Fut: Future<Output = MediaResult<T>>,
{
    for profile in ClientProfile::CASCADE {
        match attempt(profile).await {
            Ok(value) => {
                metrics::counter!("vidcut_extract_attempts_total", "profile" => profile.to_string(), "outcome" => "success").increment(1);
                return Some((profile, value));
            }
            Err(e) => {
                metrics::counter!("vidcut_extract_attempts_total", "profile" => profile.to_string(), "outcome" => "failure").increment(1);
                warn!(profile = %profile, "Extraction strategy failed: {}", e);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn raw_with(url: Option<&str>, formats: Vec<RawFormat>) -> RawInfo {
        RawInfo {
            title: Some("clip".to_string()),
            duration: Some(10.0),
            url: url.map(String::from),
            formats,
        }
    }

    fn audio_format(id: &str, ext: &str) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            url: Some(format!("https://cdn.example/{}", id)),
            height: None,
            width: None,
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            ext: Some(ext.to_string()),
            filesize: None,
        }
    }

    #[tokio::test]
    async fn test_cascade_stops_at_first_success() {
        let calls = RefCell::new(Vec::new());
        let result = run_cascade(|profile| {
            calls.borrow_mut().push(profile);
            async move {
                if profile == ClientProfile::Android {
                    Ok(42u32)
                } else {
                    Err(MediaError::fetch_failed("nope"))
                }
            }
        })
        .await;

        assert_eq!(result, Some((ClientProfile::Android, 42)));
        assert_eq!(
            *calls.borrow(),
            vec![
                ClientProfile::Default,
                ClientProfile::Web,
                ClientProfile::Android
            ],
            "no strategy after the first success is attempted"
        );
    }

    #[tokio::test]
    async fn test_cascade_first_profile_success_is_single_call() {
        let calls = RefCell::new(0u32);
        let result = run_cascade(|_| {
            *calls.borrow_mut() += 1;
            async { Ok(()) }
        })
        .await;
        assert!(result.is_some());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_cascade_exhaustion_returns_none() {
        let calls = RefCell::new(0u32);
        let result: Option<(ClientProfile, ())> = run_cascade(|_| {
            *calls.borrow_mut() += 1;
            async { Err(MediaError::fetch_failed("down")) }
        })
        .await;
        assert!(result.is_none());
        assert_eq!(*calls.borrow() as usize, ClientProfile::CASCADE.len());
    }

    #[test]
    fn test_build_media_info_uses_engine_default_url() {
        let raw = raw_with(Some("https://cdn.example/default"), vec![]);
        let info = build_media_info(&raw, None);
        assert_eq!(
            info.primary_url.as_deref(),
            Some("https://cdn.example/default")
        );
        assert_eq!(info.title, "clip");
        assert_eq!(info.duration, 10.0);
    }

    #[test]
    fn test_build_media_info_format_id_match_overrides_default() {
        let mut video = audio_format("137", "mp4");
        video.vcodec = Some("avc1".to_string());
        video.acodec = Some("none".to_string());
        video.height = Some(1080);
        let raw = raw_with(Some("https://cdn.example/default"), vec![video]);

        let info = build_media_info(&raw, Some("137"));
        assert_eq!(info.primary_url.as_deref(), Some("https://cdn.example/137"));

        // Unknown id falls back to the engine default
        let info = build_media_info(&raw, Some("9999"));
        assert_eq!(
            info.primary_url.as_deref(),
            Some("https://cdn.example/default")
        );
    }

    #[test]
    fn test_build_media_info_selects_audio_companion() {
        let raw = raw_with(
            Some("https://cdn.example/default"),
            vec![audio_format("opus", "webm"), audio_format("140", "m4a")],
        );
        let info = build_media_info(&raw, None);
        assert_eq!(info.audio_url.as_deref(), Some("https://cdn.example/140"));
    }

    #[test]
    fn test_build_media_info_defaults_missing_title() {
        let raw = RawInfo {
            title: None,
            duration: None,
            url: Some("https://cdn.example/v".to_string()),
            formats: vec![],
        };
        let info = build_media_info(&raw, None);
        assert_eq!(info.title, DEFAULT_TITLE);
        assert_eq!(info.duration, 0.0);
    }

    #[test]
    fn test_raw_info_usability() {
        assert!(!RawInfo::default().is_usable());
        assert!(raw_with(Some("https://cdn.example/v"), vec![]).is_usable());
        assert!(raw_with(None, vec![audio_format("140", "m4a")]).is_usable());
    }

    #[test]
    fn test_raw_info_parses_engine_json() {
        let json = r#"{
            "title": "Sample",
            "duration": 9.97,
            "url": "https://cdn.example/best",
            "formats": [
                {"format_id": "140", "url": "https://cdn.example/140",
                 "vcodec": "none", "acodec": "mp4a.40.2", "ext": "m4a",
                 "filesize": 160000},
                {"format_id": "137", "url": "https://cdn.example/137",
                 "height": 1080, "width": 1920, "vcodec": "avc1.640028",
                 "acodec": "none", "ext": "mp4"}
            ],
            "uploader": "ignored",
            "extractor": "ignored"
        }"#;
        let raw: RawInfo = serde_json::from_str(json).unwrap();
        assert!(raw.is_usable());
        assert_eq!(raw.formats.len(), 2);
        assert_eq!(raw.formats[1].height, Some(1080));
    }

    #[tokio::test]
    #[ignore = "requires yt-dlp and network access"]
    async fn test_resolve_public_sample() {
        let resolver = Resolver::new(MediaConfig::default());
        let info = resolver
            .resolve("https://www.youtube.com/watch?v=aqz-KE-bpKQ", None)
            .await;
        assert!(info.is_resolved());
        assert!(info.duration > 0.0);
        assert!(!info.formats.is_empty());
    }
}
