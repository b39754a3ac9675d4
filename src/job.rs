//! Export job planning.
//!
//! An [`ExportJob`] is the immutable plan for one run: which video, which
//! frames, and which directory they go to. [`ExportJob::plan`] derives it
//! from the user's stride and time window; [`export_frames`](crate::export_frames)
//! consumes it.

use std::{
    iter::StepBy,
    ops::Range,
    path::{Path, PathBuf},
};

use crate::{
    configuration::ExportOptions,
    error::ExtractError,
    metadata::VideoInfo,
    output::{directory_name, plan_directory},
    range::FrameRange,
    timestamp::TimeSpec,
};

/// Minimum zero-padding of frame numbers in file names.
const MIN_FRAME_NUMBER_WIDTH: usize = 6;

/// A fully resolved export: video, stride, frame range, and output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    video_path: PathBuf,
    stride: u64,
    range: FrameRange,
    output_dir: PathBuf,
}

impl ExportJob {
    /// Build a job from already resolved parts.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidStride`] if `stride` is zero.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        video_path: P,
        stride: u64,
        range: FrameRange,
        output_dir: Q,
    ) -> Result<Self, ExtractError> {
        if stride == 0 {
            return Err(ExtractError::InvalidStride);
        }
        Ok(Self {
            video_path: video_path.as_ref().to_path_buf(),
            stride,
            range,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Resolve a stride and time window against a video and pick the output
    /// directory.
    ///
    /// The directory is not created here; that happens right before the first
    /// frame is written.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidStride`] if `stride` is zero.
    /// - [`ExtractError::InvalidRange`] if the window selects no frames.
    /// - [`ExtractError::DirectoryExists`] if the directory name is taken and
    ///   the collision policy is [`Fail`](crate::CollisionPolicy::Fail).
    pub fn plan<P: AsRef<Path>>(
        video_path: P,
        stride: u64,
        start: Option<TimeSpec>,
        end: Option<TimeSpec>,
        info: &VideoInfo,
        options: &ExportOptions,
    ) -> Result<Self, ExtractError> {
        if stride == 0 {
            return Err(ExtractError::InvalidStride);
        }
        let video_path = video_path.as_ref();
        let range = FrameRange::resolve(start, end, info.frames_per_second, info.frame_count)?;

        let stem = video_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let parent = match &options.output_root {
            Some(root) => root.clone(),
            None => video_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        };

        let base_name = directory_name(&stem, stride, &range);
        let output_dir = plan_directory(&parent, &base_name, options.collision_policy)?;

        log::info!(
            "Planned export of every {stride} frame(s) in [{}, {}) to {}",
            range.start_index(),
            range.end_index(),
            output_dir.display(),
        );

        Self::new(video_path, stride, range, output_dir)
    }

    /// The source video.
    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Export every `stride`-th frame of the range.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// The frame window.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Directory the images are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Selected frame indices, in increasing order.
    pub fn frame_numbers(&self) -> StepBy<Range<u64>> {
        (self.range.start_index()..self.range.end_index()).step_by(self.stride as usize)
    }

    /// Number of images the job writes when every frame decodes.
    pub fn expected_image_count(&self) -> u64 {
        self.range.span().div_ceil(self.stride)
    }

    /// File name for a frame, zero-padded so names sort in frame order.
    pub fn frame_file_name(&self, frame_number: u64) -> String {
        let width = MIN_FRAME_NUMBER_WIDTH.max(digit_count(self.range.end_index()));
        format!("frame_{frame_number:0width$}.jpg")
    }

    /// Full output path for a frame.
    pub fn frame_path(&self, frame_number: u64) -> PathBuf {
        self.output_dir.join(self.frame_file_name(frame_number))
    }
}

fn digit_count(mut value: u64) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}
