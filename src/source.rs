//! Decoded frame sources.
//!
//! [`FrameSource`] is the seam between decoding and sifting: anything that
//! can hand out RGB frames in playback order, together with a nominal frame
//! rate, can be sampled. [`VideoFile`] is the FFmpeg-backed implementation.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{FrameSource, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! while let Some(frame) = video.read_frame()? {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{error::SiftError, metadata::VideoMetadata, utilities};

/// A finite, sequential producer of decoded frames.
pub trait FrameSource {
    /// Nominal playback rate in frames per second.
    fn frames_per_second(&self) -> f64;

    /// Total number of frames, if known ahead of time.
    fn frame_count(&self) -> Option<u64> {
        None
    }

    /// Where the frames come from, for error reports. `None` for sources
    /// that are not backed by a file.
    fn location(&self) -> Option<&Path> {
        None
    }

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` at end of stream. An `Err` means decoding failed
    /// and no further frames will be produced.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, SiftError>;
}

/// An opened video file, decoded sequentially into RGB frames.
///
/// The demuxer, decoder and scaler are released when the value is dropped,
/// which happens on every exit path of an extraction that owns it.
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    /// `(format, width, height)` the scaler was built for.
    scaler_input: (Pixel, u32, u32),
    video_stream_index: usize,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    exhausted: bool,
    path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file for sequential decoding.
    ///
    /// Initialises FFmpeg (idempotent), opens the container, selects the best
    /// video stream and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`SiftError::StreamOpen`] if the file cannot be opened or its
    ///   decoder cannot be created.
    /// - [`SiftError::NoVideoStream`] if the file contains no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SiftError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video: {}", path.display());

        let open_error = |reason: String| SiftError::StreamOpen {
            path: path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, decoder, frames_per_second, stream_frames, stream_duration) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(SiftError::NoVideoStream)?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| {
                    open_error(format!("Failed to read video codec parameters: {error}"))
                })?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

            let frames_per_second = utilities::rational_to_f64(stream.avg_frame_rate())
                .or_else(|| utilities::rational_to_f64(stream.rate()))
                .unwrap_or(0.0);

            let stream_duration = if stream.duration() > 0 {
                utilities::stream_time_to_duration(stream.duration(), stream.time_base())
            } else {
                Duration::ZERO
            };

            (
                stream.index(),
                decoder,
                frames_per_second,
                stream.frames().max(0) as u64,
                stream_duration,
            )
        };

        let duration = if stream_duration.is_zero() && input_context.duration() > 0 {
            Duration::from_micros(input_context.duration() as u64)
        } else {
            stream_duration
        };

        let frame_count = if stream_frames > 0 {
            stream_frames
        } else {
            (duration.as_secs_f64() * frames_per_second).round() as u64
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create RGB converter: {error}")))?;

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec: decoder.id().name().to_string(),
        };

        log::debug!(
            "Video stream {video_stream_index}: {}x{} @ {:.3} fps, {} frames [{}]",
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            scaler_input: (decoder.format(), width, height),
            decoder,
            scaler,
            video_stream_index,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            exhausted: false,
            path,
        })
    }

    /// Metadata cached at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the video was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convert the current `decoded_frame` to an [`RgbImage`] at its native
    /// size.
    ///
    /// A mid-stream resolution change rebuilds the scaler instead of
    /// squeezing the frame back into the opening dimensions.
    fn convert_decoded_frame(&mut self) -> Result<RgbImage, SiftError> {
        let source = (
            self.decoded_frame.format(),
            self.decoded_frame.width(),
            self.decoded_frame.height(),
        );
        let (format, width, height) = source;

        if source != self.scaler_input {
            log::warn!(
                "Decoded frame changed to {width}x{height} (was {}x{})",
                self.scaler_input.1,
                self.scaler_input.2,
            );
            self.scaler = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler_input = source;
            self.rgb_frame = VideoFrame::empty();
        }

        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let buffer = utilities::frame_to_buffer(&self.rgb_frame, width, height, 3);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            SiftError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

impl FrameSource for VideoFile {
    fn frames_per_second(&self) -> f64 {
        self.metadata.frames_per_second
    }

    fn frame_count(&self) -> Option<u64> {
        (self.metadata.frame_count > 0).then_some(self.metadata.frame_count)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, SiftError> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return self.convert_decoded_frame().map(Some);
            }

            if self.eof_sent {
                self.exhausted = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            SiftError::VideoDecodeError(format!("Rejected packet: {error}"))
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(SiftError::VideoDecodeError(format!(
                        "Failed to read packet: {error}"
                    )));
                }
            }
        }
    }
}
