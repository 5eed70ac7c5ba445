//! Error types for the `framesift` crate.
//!
//! This module defines [`SiftError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry the context needed to
//! diagnose a failed run: file paths, frame dimensions, the offending
//! configuration value, or the upstream FFmpeg message.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
///
/// Every public method that can fail returns `Result<T, SiftError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    /// The video resource could not be opened or decoded at all.
    #[error("Failed to open video at {path}: {reason}")]
    StreamOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The sampling period `round(frames_per_second × interval)` is zero, or
    /// either factor is not positive.
    #[error("Invalid sampling interval {interval:?} (frame rate: {frames_per_second:?})")]
    InvalidInterval {
        /// The configured sampling interval.
        interval: Duration,
        /// The nominal frame rate reported by the stream, when known.
        frames_per_second: Option<f64>,
    },

    /// The similarity threshold lies outside `[0, 1]`.
    #[error("Similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// The output image extension does not map to a known image format.
    #[error("Unsupported output image format: {0}")]
    UnsupportedImageFormat(String),

    /// A candidate frame does not have the dimensions of the held reference.
    #[error(
        "Incompatible frame: expected {}x{}, found {}x{}",
        expected.0, expected.1, found.0, found.1
    )]
    IncompatibleFrame {
        /// `(width, height)` of the held reference frame.
        expected: (u32, u32),
        /// `(width, height)` of the offending candidate.
        found: (u32, u32),
    },

    /// A retained frame could not be written to the output directory.
    #[error("Failed to write frame to {path}: {reason}")]
    OutputWrite {
        /// Destination of the artifact.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred outside of artifact writing.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for SiftError {
    fn from(error: FfmpegError) -> Self {
        SiftError::FfmpegError(error.to_string())
    }
}
