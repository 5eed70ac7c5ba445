//! Internal utility functions.
//!
//! Helpers for pixel-data copying and rational/timestamp conversion shared
//! by the decoder and the sampler.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// The result can be passed directly to [`image::RgbImage::from_raw`].
pub fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Convert an FFmpeg rational to `f64`, or `None` for a zero denominator
/// or a non-positive value.
pub fn rational_to_f64(rational: Rational) -> Option<f64> {
    if rational.denominator() == 0 {
        return None;
    }
    let value = rational.numerator() as f64 / rational.denominator() as f64;
    (value > 0.0).then_some(value)
}

/// Rescale a stream-time-base value to a [`Duration`]. Negative values
/// clamp to zero.
pub fn stream_time_to_duration(value: i64, time_base: Rational) -> Duration {
    let seconds = value as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

/// Playback timestamp of a tick at the given frame rate.
pub fn tick_to_timestamp(tick: u64, frames_per_second: f64) -> Duration {
    if frames_per_second > 0.0 {
        Duration::from_secs_f64(tick as f64 / frames_per_second)
    } else {
        Duration::ZERO
    }
}
