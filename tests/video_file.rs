//! FFmpeg-backed source tests.
//!
//! Tests that need real media are skipped unless
//! `tests/fixtures/sample_video.mp4` exists.

use std::path::Path;

use extract_frames::{
    ExportJob, ExportOptions, ExtractError, FrameSource, TimeSpec, VideoFile, export_frames,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn missing_file_is_a_video_open_error() {
    let result = VideoFile::open("tests/fixtures/does_not_exist.mp4");
    assert!(matches!(result, Err(ExtractError::VideoOpen { .. })));
}

#[test]
fn garbage_file_is_rejected() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("noise.mp4");
    std::fs::write(&path, b"definitely not a video container").unwrap();

    match VideoFile::open(&path) {
        Err(ExtractError::VideoOpen { path: reported, .. })
        | Err(ExtractError::UnsupportedFormat { path: reported, .. }) => {
            assert_eq!(reported, path);
        }
        Err(other) => panic!("Unexpected error: {other}"),
        Ok(_) => panic!("Garbage input should not open"),
    }
}

#[test]
fn sample_metadata_is_usable() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoFile::open(path).expect("open");
    let info = video.info();
    assert!(info.width > 0 && info.height > 0);
    assert!(info.frames_per_second > 0.0);
    assert!(info.frame_count > 0);
    assert!(!info.codec.is_empty());
}

#[test]
fn frames_decode_at_video_resolution() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("open");
    let (width, height) = (video.info().width, video.info().height);
    let last = video.info().frame_count - 1;

    // Forward, then a backward seek, then forward again.
    for frame_number in [0, 1, last / 2, 2, last / 2 + 1] {
        let image = video
            .read_frame(frame_number)
            .expect("read_frame")
            .expect("frame inside the stream");
        assert_eq!((image.width(), image.height()), (width, height), "frame {frame_number}");
    }
}

#[test]
fn exporting_the_first_second() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut video = VideoFile::open(path).expect("open");
    let options = ExportOptions::new().with_output_root(temporary_directory.path());
    let job = ExportJob::plan(
        path,
        2,
        None,
        Some(TimeSpec::from_seconds(1.0).unwrap()),
        video.info(),
        &options,
    )
    .expect("plan");

    let report = export_frames(&mut video, &job, &options).expect("export");
    assert_eq!(report.saved.len() + report.skipped.len(), job.expected_image_count() as usize);
    for &frame_number in &report.saved {
        assert!(job.frame_path(frame_number).is_file());
    }
}
