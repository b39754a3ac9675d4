//! # extract-frames
//!
//! Export every n-th frame of a video, optionally within a time window, as
//! JPEG stills in an auto-named directory next to the video.
//!
//! Decoding is done by FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) and encoding by the
//! [`image`](https://crates.io/crates/image) crate. This crate handles
//! everything between them: parsing the window, mapping it to frame
//! indices, naming the output, and running the export loop.
//!
//! ## Quick Start
//!
//! ```no_run
//! use extract_frames::{ExportJob, ExportOptions, FrameSource, TimeSpec, VideoFile, export_frames};
//!
//! let mut video = VideoFile::open("clip.mp4")?;
//! let options = ExportOptions::new();
//!
//! // Every 5th frame between 0:50 and 1:10.
//! let job = ExportJob::plan(
//!     "clip.mp4",
//!     5,
//!     Some(TimeSpec::parse("0:50")?),
//!     Some(TimeSpec::parse("1:10")?),
//!     video.info(),
//!     &options,
//! )?;
//! let report = export_frames(&mut video, &job, &options)?;
//! println!("{} images in {}", report.saved.len(), report.output_dir.display());
//! # Ok::<(), extract_frames::ExtractError>(())
//! ```
//!
//! ## Frame windows
//!
//! Windows are half-open: `[start_index, end_index)`. Timestamps map to
//! frame indices with round-half-up, and a job writes
//! `ceil((end_index - start_index) / stride)` images. A two-minute 30 fps
//! video exported in full writes 3600 images, `frame_000000.jpg` through
//! `frame_003599.jpg`.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
mod conversion;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod job;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod range;
pub mod source;
pub mod timestamp;
pub mod video;

pub use configuration::{DEFAULT_JPEG_QUALITY, ExportOptions};
pub use error::ExtractError;
pub use export::{ExportReport, SkipReason, SkippedFrame, export_frames, write_jpeg};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use job::ExportJob;
pub use metadata::VideoInfo;
pub use output::CollisionPolicy;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use range::FrameRange;
pub use source::FrameSource;
pub use timestamp::TimeSpec;
pub use video::VideoFile;
