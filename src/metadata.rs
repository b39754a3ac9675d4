//! Video stream metadata.
//!
//! [`VideoInfo`] is read once when a [`VideoFile`](crate::VideoFile) is
//! opened and cached for the lifetime of the source.

use std::time::Duration;

/// Metadata for the video stream frames are exported from.
///
/// # Example
///
/// ```no_run
/// use extract_frames::{FrameSource, VideoFile};
///
/// let video = VideoFile::open("input.mp4")?;
/// let info = video.info();
/// println!("{:.2} fps, {} frames", info.frames_per_second, info.frame_count);
/// # Ok::<(), extract_frames::ExtractError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (average rate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames, taken from the container when it records one
    /// and otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Duration of the video stream.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

impl VideoInfo {
    /// Estimate the frame count from a duration and frame rate.
    pub fn estimated_frame_count(duration: Duration, frames_per_second: f64) -> u64 {
        if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second).round() as u64
        } else {
            0
        }
    }
}
