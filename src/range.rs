//! Time window to frame index conversion.
//!
//! [`FrameRange::resolve`] turns an optional start/end [`TimeSpec`] pair
//! into a half-open range of frame indices `[start_index, end_index)`.
//! Indices are computed with round-half-up (`floor(seconds * fps + 0.5)`),
//! so a timestamp that falls exactly between two frames selects the later
//! one.
//!
//! With a 120 s, 30 fps video the default window is `[0, 3600)`, and
//! `0:50..1:10` is `[1500, 2100)`.

use std::iter::StepBy;
use std::ops::Range;

use crate::{error::ExtractError, timestamp::TimeSpec};

// Products like 0.5 * 3.0 may land a hair below the exact half.
const ROUNDING_EPSILON: f64 = 1e-9;

/// A half-open range of frame indices.
///
/// `start_index < end_index` always holds; a range never selects zero
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    start_index: u64,
    end_index: u64,
}

impl FrameRange {
    /// Build a range from explicit indices.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidRange`] if `start_index >= end_index`.
    pub fn new(start_index: u64, end_index: u64) -> Result<Self, ExtractError> {
        if start_index >= end_index {
            return Err(ExtractError::InvalidRange(format!(
                "start frame {start_index} must be before end frame {end_index}"
            )));
        }
        Ok(Self {
            start_index,
            end_index,
        })
    }

    /// Resolve a time window against a video's frame rate and frame count.
    ///
    /// `start` defaults to the beginning of the video and `end` to its last
    /// frame. The end index is clamped to `total_frames`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidRange`] when the frame rate is not a
    /// positive number, the video has no frames, the start lies at or past
    /// the end of the video, or the window is empty or inverted.
    pub fn resolve(
        start: Option<TimeSpec>,
        end: Option<TimeSpec>,
        frames_per_second: f64,
        total_frames: u64,
    ) -> Result<Self, ExtractError> {
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(ExtractError::InvalidRange(format!(
                "frame rate must be positive, got {frames_per_second}"
            )));
        }
        if total_frames == 0 {
            return Err(ExtractError::InvalidRange(
                "video has no frames".to_string(),
            ));
        }

        let start_time = start.unwrap_or(TimeSpec::ZERO);
        let start_index = seconds_to_frame_index(start_time.seconds(), frames_per_second);
        if start_index >= total_frames {
            return Err(ExtractError::InvalidRange(format!(
                "start timestamp {start_time} exceeds video length ({total_frames} frames)"
            )));
        }

        let end_index = match end {
            Some(end_time) => {
                let index = seconds_to_frame_index(end_time.seconds(), frames_per_second)
                    .min(total_frames);
                if index == start_index {
                    return Err(ExtractError::InvalidRange(format!(
                        "end timestamp {end_time} equal to start timestamp {start_time}"
                    )));
                }
                if index < start_index {
                    return Err(ExtractError::InvalidRange(format!(
                        "end timestamp {end_time} prior to start timestamp {start_time}"
                    )));
                }
                index
            }
            None => total_frames,
        };

        log::debug!(
            "Resolved {start_time}..{} at {frames_per_second:.3} fps \
             to [{start_index}, {end_index})",
            end.map(|e| e.to_string()).unwrap_or_else(|| "end".to_string()),
        );

        Self::new(start_index, end_index)
    }

    /// First selected frame index.
    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    /// One past the last frame index in the window.
    pub fn end_index(&self) -> u64 {
        self.end_index
    }

    /// Number of frame indices in the window.
    pub fn span(&self) -> u64 {
        self.end_index - self.start_index
    }

    /// Whether `frame_number` lies inside the window.
    pub fn contains(&self, frame_number: u64) -> bool {
        (self.start_index..self.end_index).contains(&frame_number)
    }

    /// Frame indices selected at the given stride.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidStride`] if `stride` is zero.
    pub fn frame_numbers(&self, stride: u64) -> Result<StepBy<Range<u64>>, ExtractError> {
        if stride == 0 {
            return Err(ExtractError::InvalidStride);
        }
        Ok((self.start_index..self.end_index).step_by(stride as usize))
    }

    /// How many frames [`frame_numbers`](FrameRange::frame_numbers) yields:
    /// `ceil(span / stride)`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidStride`] if `stride` is zero.
    pub fn selected_count(&self, stride: u64) -> Result<u64, ExtractError> {
        if stride == 0 {
            return Err(ExtractError::InvalidStride);
        }
        Ok(self.span().div_ceil(stride))
    }
}

/// Round-half-up conversion of a timestamp to a frame index.
pub fn seconds_to_frame_index(seconds: f64, frames_per_second: f64) -> u64 {
    let exact = seconds * frames_per_second;
    (exact + 0.5 + ROUNDING_EPSILON).floor().max(0.0) as u64
}
