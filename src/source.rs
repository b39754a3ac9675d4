//! The frame source seam.
//!
//! The export loop only needs two things from a video: its metadata and a
//! way to fetch the decoded frame at a given index. [`FrameSource`] captures
//! exactly that, so the loop can run against the FFmpeg-backed
//! [`VideoFile`](crate::VideoFile) or against any other decoder.

use image::DynamicImage;

use crate::{error::ExtractError, metadata::VideoInfo};

/// A seekable source of decoded video frames.
pub trait FrameSource {
    /// Metadata of the underlying video stream.
    fn info(&self) -> &VideoInfo;

    /// Decode the frame at `frame_number`.
    ///
    /// Calls are expected in increasing frame order, but implementations
    /// must also handle backward requests (by seeking).
    ///
    /// Returns `Ok(None)` once the stream is exhausted before
    /// `frame_number` was reached.
    ///
    /// # Errors
    ///
    /// [`ExtractError::FrameDecode`] means only this frame is unavailable and
    /// later frames may still be read. Any other error is fatal for the
    /// source.
    fn read_frame(&mut self, frame_number: u64) -> Result<Option<DynamicImage>, ExtractError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn info(&self) -> &VideoInfo {
        (**self).info()
    }

    fn read_frame(&mut self, frame_number: u64) -> Result<Option<DynamicImage>, ExtractError> {
        (**self).read_frame(frame_number)
    }
}
