//! Internal conversion helpers.
//!
//! Pixel-data copying and timestamp arithmetic shared by the FFmpeg-backed
//! [`VideoFile`](crate::VideoFile).

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer,
/// dropping any row padding.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in data.chunks(stride).take(height as usize) {
            buffer.extend_from_slice(&row[..row_bytes]);
        }
        buffer
    }
}

/// Convert a rational (frame rate or time base) to a float, `0.0` when the
/// denominator is zero.
pub(crate) fn rational_to_f64(value: Rational) -> f64 {
    if value.denominator() == 0 {
        0.0
    } else {
        value.numerator() as f64 / value.denominator() as f64
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * rational_to_f64(time_base)
}

/// `AV_NOPTS_VALUE`: the stream does not record a start time.
const NO_PTS: i64 = i64::MIN;

/// The PTS frame 0 is presented at. Missing or negative start times count
/// as 0.
pub(crate) fn stream_start_pts(start_time: i64) -> i64 {
    if start_time == NO_PTS { 0 } else { start_time.max(0) }
}

/// Map a PTS value to the nearest frame index, counting from the stream's
/// first PTS.
pub(crate) fn pts_to_frame_number(
    pts: i64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let seconds = pts_to_seconds(pts.saturating_sub(start_pts), time_base);
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Seek target for a frame in AV_TIME_BASE (microseconds), as expected by
/// `Input::seek` with no stream selected.
pub(crate) fn frame_number_to_seek_timestamp(
    frame_number: u64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> i64 {
    let seconds =
        frame_number as f64 / frames_per_second + pts_to_seconds(start_pts, time_base);
    (seconds * 1_000_000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_maps_to_nearest_frame() {
        let time_base = Rational::new(1, 90_000);
        assert_eq!(pts_to_frame_number(0, 0, time_base, 30.0), 0);
        assert_eq!(pts_to_frame_number(3_000, 0, time_base, 30.0), 1);
        // 2999 ticks is a rounding error away from frame 1, not frame 0.
        assert_eq!(pts_to_frame_number(2_999, 0, time_base, 30.0), 1);
        assert_eq!(pts_to_frame_number(-3_000, 0, time_base, 30.0), 0);
    }

    #[test]
    fn frame_numbers_count_from_the_stream_start() {
        // MPEG-TS style stream whose first frame is presented at 1.4 s.
        let time_base = Rational::new(1, 90_000);
        let start = 126_000;
        assert_eq!(pts_to_frame_number(126_000, start, time_base, 30.0), 0);
        assert_eq!(pts_to_frame_number(129_000, start, time_base, 30.0), 1);
        assert_eq!(pts_to_frame_number(126_000 + 50 * 90_000, start, time_base, 30.0), 1500);
        assert_eq!(pts_to_frame_number(0, start, time_base, 30.0), 0);
    }

    #[test]
    fn seek_timestamp_is_microseconds() {
        let time_base = Rational::new(1, 90_000);
        assert_eq!(frame_number_to_seek_timestamp(1500, 0, time_base, 30.0), 50_000_000);
        assert_eq!(frame_number_to_seek_timestamp(0, 0, time_base, 25.0), 0);
        assert_eq!(frame_number_to_seek_timestamp(0, 126_000, time_base, 30.0), 1_400_000);
        assert_eq!(
            frame_number_to_seek_timestamp(1500, 126_000, time_base, 30.0),
            51_400_000
        );
    }

    #[test]
    fn missing_or_negative_start_is_zero() {
        assert_eq!(stream_start_pts(i64::MIN), 0);
        assert_eq!(stream_start_pts(-1_024), 0);
        assert_eq!(stream_start_pts(126_000), 126_000);
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(rational_to_f64(Rational::new(30, 0)), 0.0);
        assert_eq!(rational_to_f64(Rational::new(30_000, 1_001)), 30_000.0 / 1_001.0);
    }
}
