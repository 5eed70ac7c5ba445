//! In-memory frame sources shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use framesift::{FrameSource, SiftError};
use image::{Rgb, RgbImage};

pub const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// Plays back a fixed list of frames, optionally failing part-way.
pub struct ScriptedSource {
    frames: VecDeque<RgbImage>,
    frames_per_second: f64,
    announced_frames: Option<u64>,
    fail_after: Option<usize>,
    reads: usize,
}

impl ScriptedSource {
    pub fn new(frames: Vec<RgbImage>, frames_per_second: f64) -> Self {
        Self {
            frames: frames.into(),
            frames_per_second,
            announced_frames: None,
            fail_after: None,
            reads: 0,
        }
    }

    /// Report `count` frames from [`FrameSource::frame_count`], whatever the
    /// actual length.
    pub fn announcing(mut self, count: u64) -> Self {
        self.announced_frames = Some(count);
        self
    }

    /// Fail with a decode error once `reads` frames have been handed out.
    pub fn failing_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl FrameSource for ScriptedSource {
    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn frame_count(&self) -> Option<u64> {
        self.announced_frames
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, SiftError> {
        if self.fail_after == Some(self.reads) {
            return Err(SiftError::VideoDecodeError("corrupt packet".to_string()));
        }
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.reads += 1;
        }
        Ok(frame)
    }
}

/// A uniform gray frame.
pub fn gray_frame(width: u32, height: u32, level: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([level, level, level]))
}

/// A high-contrast textured frame whose luma equals its channel value.
pub fn textured_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let level = ((x * 37 + y * 91) % 256) as u8;
        Rgb([level, level, level])
    })
}

/// The photographic negative of `frame`.
pub fn inverted(frame: &RgbImage) -> RgbImage {
    let mut negative = frame.clone();
    for pixel in negative.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = 255 - *channel;
        }
    }
    negative
}

/// `count` copies of `frame`.
pub fn repeated(frame: &RgbImage, count: usize) -> Vec<RgbImage> {
    vec![frame.clone(); count]
}
