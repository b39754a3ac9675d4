//! Error types for the `extract-frames` crate.
//!
//! [`ExtractError`] is returned by every fallible operation: time parsing,
//! range resolution, opening the video, creating the output directory and
//! writing frames. Most variants abort a run; [`ExtractError::FrameDecode`]
//! is the exception and is downgraded to a warning by the export loop.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `extract-frames` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// A time token was neither plain seconds nor `mm:ss`.
    #[error("Invalid timestamp, got {input:?} (expected seconds or mm:ss)")]
    InvalidTimeFormat {
        /// The token as supplied by the user.
        input: String,
    },

    /// The requested window does not select any frame of the video.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A stride of zero was provided.
    #[error("Stride must be greater than zero")]
    InvalidStride,

    /// The video file could not be opened.
    #[error("Unable to open video at {path}: {reason}")]
    VideoOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened, but frame rate or frame count could not be determined.
    #[error("Unsupported video format at {path}: {reason}")]
    UnsupportedFormat {
        /// Path of the offending file.
        path: PathBuf,
        /// What could not be determined.
        reason: String,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreation {
        /// Directory that was being created.
        path: PathBuf,
        /// The filesystem error.
        #[source]
        source: IoError,
    },

    /// The output directory already exists and renaming is disabled.
    #[error("Output directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    /// A single frame could not be decoded.
    #[error("Failed to decode frame {frame_number}: {reason}")]
    FrameDecode {
        /// The frame index that was requested.
        frame_number: u64,
        /// Why the frame could not be produced.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while writing frames.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image encoding error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ExtractError {
    fn from(error: FfmpegError) -> Self {
        ExtractError::FfmpegError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let error = ExtractError::InvalidTimeFormat {
            input: "1:2:3".to_string(),
        };
        assert!(error.to_string().contains("\"1:2:3\""));

        let error = ExtractError::DirectoryExists(PathBuf::from("/tmp/clip_frames"));
        assert!(error.to_string().contains("/tmp/clip_frames"));

        let error = ExtractError::FrameDecode {
            frame_number: 42,
            reason: "corrupt packet".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to decode frame 42: corrupt packet"
        );
    }

    #[test]
    fn directory_creation_exposes_source() {
        use std::error::Error;

        let error = ExtractError::DirectoryCreation {
            path: PathBuf::from("out"),
            source: IoError::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.source().is_some());
    }
}
