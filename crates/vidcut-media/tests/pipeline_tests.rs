//! Pipeline integration tests.
//!
//! The non-ignored tests exercise the pure seams across crate
//! boundaries. The ignored tests run the real tools against a short
//! public sample video and need `ffmpeg`, `ffprobe`, `yt-dlp` and
//! network access.

use vidcut_media::{planner, MediaConfig, MediaError};

const SAMPLE_URL: &str =
    "https://test-videos.co.uk/vids/bigbuckbunny/mp4/h264/360/Big_Buck_Bunny_360_10s_1MB.mp4";

fn sample_config(dir: &tempfile::TempDir) -> MediaConfig {
    MediaConfig {
        temp_dir: dir.path().to_path_buf(),
        cookies_blob: None,
    }
}

#[test]
fn plan_on_ten_second_video_with_five_second_chunks() {
    let plan = planner::plan(10.0, 5).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!((plan.segments[0].start, plan.segments[0].end), (0.0, 5.0));
    assert_eq!((plan.segments[1].start, plan.segments[1].end), (5.0, 10.0));
}

#[test]
fn plan_rejects_unknown_duration() {
    // A failed resolution reports duration 0; planning must refuse it.
    assert!(matches!(
        planner::plan(0.0, 5),
        Err(MediaError::InvalidDuration(_))
    ));
}

#[tokio::test]
#[ignore = "requires ffprobe and network access"]
async fn probe_then_plan_sample_video() {
    let duration = vidcut_media::probe_duration(SAMPLE_URL).await.unwrap();
    assert!((duration - 10.0).abs() < 1.0);

    let plan = planner::plan(duration, 5).unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.segments.last().unwrap().end, duration);
}

#[tokio::test]
#[ignore = "requires ffmpeg, ffprobe and network access"]
async fn trim_sample_video_to_playable_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = sample_config(&dir);

    let path = vidcut_media::trim_to_file(SAMPLE_URL, 0.0, 5.0, &config)
        .await
        .unwrap();
    assert!(path.metadata().unwrap().len() > 0);

    let duration = vidcut_media::probe_duration(&path.to_string_lossy())
        .await
        .unwrap();
    assert!((duration - 5.0).abs() < 1.0, "trimmed duration {}", duration);

    vidcut_media::cleanup_file(&path).await;
    assert!(!path.exists());
}

#[tokio::test]
#[ignore = "requires ffmpeg and network access"]
async fn split_sample_video_into_two_chunk_archive() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = sample_config(&dir);

    let zip_path = vidcut_media::split_to_archive(SAMPLE_URL, 5, &config)
        .await
        .unwrap();

    let bytes = std::fs::read(&zip_path).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");

    let file = std::fs::File::open(&zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 2);

    // Each entry is an independently playable MP4: unpack, then probe.
    let mut unpacked = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let out = dir.path().join(entry.name());
        let mut dest = std::fs::File::create(&out).unwrap();
        std::io::copy(&mut entry, &mut dest).unwrap();
        unpacked.push(out);
    }
    drop(archive);

    for out in unpacked {
        let duration = vidcut_media::probe_duration(&out.to_string_lossy())
            .await
            .unwrap();
        assert!(duration > 0.0);
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg and network access"]
async fn stream_sample_segment_yields_fragmented_mp4() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = sample_config(&dir);

    let mut stream =
        vidcut_media::stream_segment(SAMPLE_URL, 0.0, 3.0, None, None, None, &config)
            .await
            .unwrap();

    let first = stream.next_chunk().await.unwrap().expect("first chunk");
    // 'ftyp' box near the start of the fragmented MP4 header
    assert!(first.windows(4).take(16).any(|w| w == b"ftyp"));

    let mut total = first.len();
    while let Some(chunk) = stream.next_chunk().await.unwrap() {
        total += chunk.len();
    }
    assert!(total > first.len());
}
