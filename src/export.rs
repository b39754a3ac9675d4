//! The export loop.
//!
//! [`export_frames`] walks the frames an [`ExportJob`] selects, reads each
//! one from a [`FrameSource`], and writes it as a JPEG. A frame that fails to
//! decode is logged, recorded in the [`ExportReport`], and skipped. Failing
//! to create the directory or to write an image aborts the export.
//!
//! # Example
//!
//! ```no_run
//! use extract_frames::{ExportJob, ExportOptions, FrameSource, TimeSpec, VideoFile, export_frames};
//!
//! let mut video = VideoFile::open("clip.mp4")?;
//! let options = ExportOptions::new();
//! let job = ExportJob::plan(
//!     "clip.mp4",
//!     5,
//!     Some("0:50".parse::<TimeSpec>()?),
//!     Some("1:10".parse::<TimeSpec>()?),
//!     video.info(),
//!     &options,
//! )?;
//! let report = export_frames(&mut video, &job, &options)?;
//! println!("saved {} frames to {}", report.saved.len(), report.output_dir.display());
//! # Ok::<(), extract_frames::ExtractError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{
    configuration::ExportOptions,
    error::ExtractError,
    job::ExportJob,
    output::create_directory,
    progress::ProgressTracker,
    source::FrameSource,
};

/// Why a selected frame produced no image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The decoder could not produce this frame.
    Decode(String),
    /// The stream ended before this frame was reached.
    EndOfStream,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SkipReason::Decode(reason) => write!(f, "{reason}"),
            SkipReason::EndOfStream => write!(f, "stream ended before this frame"),
        }
    }
}

/// A selected frame that was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFrame {
    /// Index of the frame.
    pub frame_number: u64,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExportReport {
    /// Directory the images were written to.
    pub output_dir: PathBuf,
    /// Number of frames the job selected.
    pub expected: u64,
    /// Indices of the frames written, in order.
    pub saved: Vec<u64>,
    /// Selected frames that produced no image.
    pub skipped: Vec<SkippedFrame>,
    /// Whether the export stopped early because it was cancelled.
    pub interrupted: bool,
}

impl ExportReport {
    /// `true` when every selected frame was written.
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.skipped.is_empty() && self.saved.len() as u64 == self.expected
    }
}

/// Run an export job against a frame source.
///
/// Creates the job's output directory, then writes one
/// `frame_<index>.jpg` per selected frame. Cancellation is checked before
/// each frame, so an interrupted export never leaves a partial image.
///
/// # Errors
///
/// - [`ExtractError::DirectoryExists`] or [`ExtractError::DirectoryCreation`]
///   if the output directory cannot be created.
/// - [`ExtractError::ImageError`] or [`ExtractError::IoError`] if an image
///   cannot be written.
/// - Any non-[`FrameDecode`](ExtractError::FrameDecode) error from the source.
pub fn export_frames<S: FrameSource + ?Sized>(
    source: &mut S,
    job: &ExportJob,
    options: &ExportOptions,
) -> Result<ExportReport, ExtractError> {
    let expected = job.expected_image_count();
    create_directory(job.output_dir())?;

    let mut report = ExportReport {
        output_dir: job.output_dir().to_path_buf(),
        expected,
        saved: Vec::with_capacity(expected as usize),
        skipped: Vec::new(),
        interrupted: false,
    };
    let mut tracker = ProgressTracker::new(options.progress.clone(), expected, options.batch_size);
    let mut frame_numbers = job.frame_numbers();

    while let Some(frame_number) = frame_numbers.next() {
        if options.is_cancelled() {
            log::info!("Export cancelled before frame {frame_number}");
            report.interrupted = true;
            break;
        }

        match source.read_frame(frame_number) {
            Ok(Some(image)) => {
                let path = job.frame_path(frame_number);
                write_jpeg(&image, &path, options.jpeg_quality)?;
                log::debug!("Saved frame {frame_number} -> {}", path.display());
                report.saved.push(frame_number);
                tracker.saved(frame_number);
            }
            Ok(None) => {
                let remaining: Vec<u64> = std::iter::once(frame_number)
                    .chain(frame_numbers.by_ref())
                    .collect();
                log::warn!(
                    "Stream ended at frame {frame_number}; skipping {} remaining frame(s)",
                    remaining.len()
                );
                for &missing in &remaining {
                    tracker.skipped(missing);
                }
                report
                    .skipped
                    .extend(remaining.into_iter().map(|missing| SkippedFrame {
                        frame_number: missing,
                        reason: SkipReason::EndOfStream,
                    }));
                break;
            }
            Err(ExtractError::FrameDecode { reason, .. }) => {
                log::warn!("Skipping frame {frame_number}: {reason}");
                report.skipped.push(SkippedFrame {
                    frame_number,
                    reason: SkipReason::Decode(reason),
                });
                tracker.skipped(frame_number);
            }
            Err(error) => return Err(error),
        }
    }

    tracker.finish();

    log::info!(
        "Exported {}/{} frame(s) to {} ({} skipped{})",
        report.saved.len(),
        expected,
        report.output_dir.display(),
        report.skipped.len(),
        if report.interrupted { ", interrupted" } else { "" },
    );

    Ok(report)
}

/// Encode an image as JPEG at the given quality (1–100).
///
/// The image is encoded into `<path>.part` and renamed into place, so a
/// failed write never leaves a truncated file at `path`.
///
/// # Errors
///
/// Returns [`ExtractError::IoError`] if the file cannot be created, flushed
/// or renamed, or [`ExtractError::ImageError`] if encoding fails.
pub fn write_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), ExtractError> {
    let partial = partial_path(path);
    if let Err(error) = encode_jpeg(image, &partial, quality) {
        let _ = fs::remove_file(&partial);
        return Err(error);
    }
    fs::rename(&partial, path)?;
    Ok(())
}

fn encode_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), ExtractError> {
    let mut writer = BufWriter::new(File::create(path)?);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        match image {
            DynamicImage::ImageRgb8(rgb) => encoder.encode_image(rgb)?,
            other => encoder.encode_image(&other.to_rgb8())?,
        }
    }
    writer.flush()?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn written_file_replaces_the_partial_one() {
        let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temporary_directory.path().join("frame_000001.jpg");
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));

        write_jpeg(&image, &path, 90).unwrap();

        assert!(path.is_file());
        assert!(!partial_path(&path).exists());
        assert_eq!(image::open(&path).unwrap().width(), 8);
    }

    #[test]
    fn failed_encode_leaves_nothing_behind() {
        let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temporary_directory.path().join("frame_000002.jpg");
        // Wider than a JPEG can describe.
        let image = DynamicImage::ImageRgb8(RgbImage::new(u32::from(u16::MAX) + 1, 1));

        let result = write_jpeg(&image, &path, 90);

        assert!(matches!(result, Err(ExtractError::ImageError(_))));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temporary_directory.path().join("absent").join("frame_000003.jpg");
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));

        assert!(matches!(write_jpeg(&image, &path, 90), Err(ExtractError::IoError(_))));
    }

    #[test]
    fn partial_name_keeps_the_directory() {
        assert_eq!(
            partial_path(Path::new("out/frame_000007.jpg")),
            PathBuf::from("out/frame_000007.jpg.part")
        );
    }
}
