//! Synthetic frame source shared by the integration tests.

#![allow(dead_code)]

use std::{collections::HashSet, time::Duration};

use extract_frames::{ExtractError, FrameSource, VideoInfo};
use image::{DynamicImage, Rgb, RgbImage};

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 4;

/// A video whose frames are solid colours derived from their index.
pub struct SyntheticVideo {
    pub info: VideoInfo,
    /// Frames that fail to decode.
    pub corrupt: HashSet<u64>,
    /// Frames at or past this index report end of stream.
    pub decodable_frames: u64,
    /// Every index passed to `read_frame`, in call order.
    pub reads: Vec<u64>,
    /// Frame index that makes `read_frame` fail fatally.
    pub fatal_at: Option<u64>,
    /// Runs after each successful read.
    pub after_read: Option<Box<dyn FnMut(u64)>>,
}

impl SyntheticVideo {
    pub fn new(seconds: u64, frames_per_second: f64) -> Self {
        let duration = Duration::from_secs(seconds);
        let frame_count = VideoInfo::estimated_frame_count(duration, frames_per_second);
        Self {
            info: VideoInfo {
                width: WIDTH,
                height: HEIGHT,
                frames_per_second,
                frame_count,
                duration,
                codec: "synthetic".to_string(),
            },
            corrupt: HashSet::new(),
            decodable_frames: frame_count,
            reads: Vec::new(),
            fatal_at: None,
            after_read: None,
        }
    }

    /// The two-minute 30 fps clip used throughout the README examples.
    pub fn two_minutes() -> Self {
        Self::new(120, 30.0)
    }
}

impl FrameSource for SyntheticVideo {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self, frame_number: u64) -> Result<Option<DynamicImage>, ExtractError> {
        self.reads.push(frame_number);

        if self.fatal_at == Some(frame_number) {
            return Err(ExtractError::FfmpegError("demuxer exploded".to_string()));
        }
        if frame_number >= self.decodable_frames {
            return Ok(None);
        }
        if self.corrupt.contains(&frame_number) {
            return Err(ExtractError::FrameDecode {
                frame_number,
                reason: "corrupt packet".to_string(),
            });
        }

        let shade = (frame_number % 251) as u8;
        let image = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([shade, 255 - shade, 0]));
        if let Some(hook) = self.after_read.as_mut() {
            hook(frame_number);
        }
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }
}

/// Sorted file names inside `dir`.
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
