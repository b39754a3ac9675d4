//! FFmpeg-backed [`FrameSource`].
//!
//! [`VideoFile`] opens a video with `ffmpeg-next`, caches its [`VideoInfo`],
//! and decodes frames on demand. Requests in increasing order are served by
//! decoding forward. A request behind the current position, or far ahead of
//! it, seeks to the nearest keyframe first and then decodes forward.
//!
//! # Example
//!
//! ```no_run
//! use extract_frames::{FrameSource, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! if let Some(image) = video.read_frame(1500)? {
//!     image.save("frame_1500.png")?;
//! }
//! # Ok::<(), extract_frames::ExtractError>(())
//! ```

use std::{
    cmp::Ordering,
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    conversion::{
        frame_number_to_seek_timestamp, frame_to_buffer, pts_to_frame_number, pts_to_seconds,
        rational_to_f64, stream_start_pts,
    },
    error::ExtractError,
    metadata::VideoInfo,
    source::FrameSource,
};

/// Forward gaps larger than this are bridged with a seek instead of decoding.
const SEEK_AHEAD_FRAMES: u64 = 120;

/// Consecutive demuxer read errors tolerated before the stream is treated as
/// exhausted.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// An opened video file that decodes frames by index.
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    /// PTS of frame 0, in `time_base` units.
    start_pts: i64,
    info: VideoInfo,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    /// Index of the frame held in `decoded_frame` that has not been consumed.
    pending: Option<u64>,
    /// Index of the most recently decoded frame since the last seek.
    cursor: Option<u64>,
    eof_sent: bool,
    file_path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("cursor", &self.cursor)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file for frame extraction.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, selects the best video
    /// stream, and reads its frame rate, frame count, and duration.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::VideoOpen`] if the file cannot be opened or demuxed.
    /// - [`ExtractError::UnsupportedFormat`] if it has no decodable video
    ///   stream, or its frame rate or frame count cannot be determined.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| ExtractError::VideoOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ExtractError::VideoOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let unsupported = |reason: String| ExtractError::UnsupportedFormat {
            path: file_path.clone(),
            reason,
        };

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| unsupported("no video stream found".to_string()))?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = stream_start_pts(stream.start_time());

        let mut frames_per_second = rational_to_f64(stream.avg_frame_rate());
        if frames_per_second <= 0.0 {
            frames_per_second = rational_to_f64(stream.rate());
        }
        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(unsupported("frame rate could not be determined".to_string()));
        }

        let duration = if stream.duration() > 0 {
            Duration::from_secs_f64(pts_to_seconds(stream.duration(), time_base).max(0.0))
        } else if input_context.duration() > 0 {
            Duration::from_micros(input_context.duration() as u64)
        } else {
            Duration::ZERO
        };

        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            VideoInfo::estimated_frame_count(duration, frames_per_second)
        };
        if frame_count == 0 {
            return Err(unsupported("frame count could not be determined".to_string()));
        }

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| unsupported(format!("invalid codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| unsupported(format!("no decoder for video stream: {error}")))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(unsupported("video stream has zero dimensions".to_string()));
        }

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let info = VideoInfo {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::info!(
            "Opened video: {} ({}x{}, {:.3} fps, {} frames, {:.2}s, codec={})",
            file_path.display(),
            info.width,
            info.height,
            info.frames_per_second,
            info.frame_count,
            info.duration.as_secs_f64(),
            info.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            start_pts,
            info,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            pending: None,
            cursor: None,
            eof_sent: false,
            file_path,
        })
    }

    /// Path the video was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Seek to the keyframe at or before `frame_number`.
    fn seek_to(&mut self, frame_number: u64) -> Result<(), ExtractError> {
        let timestamp = frame_number_to_seek_timestamp(
            frame_number,
            self.start_pts,
            self.time_base,
            self.info.frames_per_second,
        );
        log::debug!("Seeking to frame {frame_number} (ts={timestamp}us)");

        self.input_context.seek(timestamp, ..timestamp)?;
        self.decoder.flush();
        self.pending = None;
        self.cursor = None;
        self.eof_sent = false;
        Ok(())
    }

    /// Decode the next frame into `decoded_frame`.
    ///
    /// Returns `false` once the stream is fully drained.
    fn decode_next(&mut self) -> Result<bool, ExtractError> {
        let mut read_errors = 0;

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let frame_number = match self
                    .decoded_frame
                    .timestamp()
                    .or_else(|| self.decoded_frame.pts())
                {
                    Some(pts) => pts_to_frame_number(
                        pts,
                        self.start_pts,
                        self.time_base,
                        self.info.frames_per_second,
                    ),
                    None => self.cursor.map_or(0, |cursor| cursor + 1),
                };
                self.pending = Some(frame_number);
                self.cursor = Some(frame_number);
                return Ok(true);
            }

            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        log::warn!(
                            "Skipping undecodable packet (pts={:?}): {error}",
                            packet.pts()
                        );
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    log::debug!("Demuxer read error ({read_errors}): {error}");
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        log::warn!(
                            "Giving up on {} after repeated read errors",
                            self.file_path.display()
                        );
                        self.decoder.send_eof()?;
                        self.eof_sent = true;
                    }
                }
            }
        }
    }

    /// Scale the pending frame to RGB24 and wrap it as an image.
    fn convert_current_frame(&mut self, frame_number: u64) -> Result<DynamicImage, ExtractError> {
        self.scaler
            .run(&self.decoded_frame, &mut self.scaled_frame)
            .map_err(|error| ExtractError::FrameDecode {
                frame_number,
                reason: format!("pixel format conversion failed: {error}"),
            })?;

        let width = self.info.width;
        let height = self.info.height;
        let buffer = frame_to_buffer(&self.scaled_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ExtractError::FrameDecode {
                frame_number,
                reason: "decoded frame data does not match video dimensions".to_string(),
            }
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl FrameSource for VideoFile {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self, frame_number: u64) -> Result<Option<DynamicImage>, ExtractError> {
        if seek_needed(frame_number, self.pending, self.cursor) {
            if let Err(error) = self.seek_to(frame_number) {
                if !can_decode_forward_to(frame_number, self.cursor) {
                    return Err(ExtractError::FrameDecode {
                        frame_number,
                        reason: format!("seek failed: {error}"),
                    });
                }
                log::debug!("Seek to frame {frame_number} failed, decoding forward: {error}");
            }
        }

        loop {
            if let Some(current) = self.pending {
                match pending_action(current, frame_number) {
                    PendingAction::Use => {
                        self.pending = None;
                        return self.convert_current_frame(frame_number).map(Some);
                    }
                    PendingAction::Missing => {
                        return Err(ExtractError::FrameDecode {
                            frame_number,
                            reason: format!(
                                "missing from stream (next decodable frame is {current})"
                            ),
                        });
                    }
                    PendingAction::Discard => self.pending = None,
                }
            }

            if !self.decode_next()? {
                return Ok(None);
            }
        }
    }
}

/// Whether reaching `target` takes a seek rather than decoding forward.
///
/// `pending` is a decoded frame not yet handed out, `cursor` the last frame
/// decoded since the previous seek.
fn seek_needed(target: u64, pending: Option<u64>, cursor: Option<u64>) -> bool {
    if pending == Some(target) {
        return false;
    }
    match cursor {
        None => target > SEEK_AHEAD_FRAMES,
        Some(cursor) => target <= cursor || target - cursor > SEEK_AHEAD_FRAMES,
    }
}

/// After a failed seek, decoding forward still works if `target` lies ahead
/// of everything decoded so far.
fn can_decode_forward_to(target: u64, cursor: Option<u64>) -> bool {
    cursor.is_none_or(|cursor| target > cursor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    /// The pending frame is the target.
    Use,
    /// The stream skipped past the target.
    Missing,
    /// The pending frame precedes the target; decode on.
    Discard,
}

fn pending_action(pending: u64, target: u64) -> PendingAction {
    match pending.cmp(&target) {
        Ordering::Equal => PendingAction::Use,
        Ordering::Greater => PendingAction::Missing,
        Ordering::Less => PendingAction::Discard,
    }
}
