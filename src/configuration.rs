//! Extraction configuration.
//!
//! [`ExtractionOptions`] is a builder carrying everything a sifting run
//! needs: the sampling interval, the similarity threshold, where and how
//! retained frames are written, and the operational hooks (progress
//! callback, cancellation token).
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framesift::{CancellationToken, ExtractionOptions, FirstFramePolicy};
//!
//! let token = CancellationToken::new();
//! let options = ExtractionOptions::new()
//!     .with_interval(Duration::from_secs(2))
//!     .with_threshold(0.75)
//!     .with_output_directory("slides")
//!     .with_image_extension("png")
//!     .with_first_frame(FirstFramePolicy::Retain)
//!     .with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SiftError;
use crate::output::rgb_encoder_for;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// What the gate does with the very first candidate of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstFramePolicy {
    /// Write the opening candidate and use it as the reference. This is the
    /// default.
    #[default]
    Retain,
    /// Use the opening candidate as the reference without writing it. Only
    /// candidates that differ from it are emitted.
    SeedOnly,
}

/// Configuration for a sifting run.
///
/// All values are checked by [`validate`](ExtractionOptions::validate)
/// before any frame is decoded.
#[derive(Clone)]
pub struct ExtractionOptions {
    pub(crate) interval: Duration,
    pub(crate) threshold: f64,
    pub(crate) output_directory: PathBuf,
    pub(crate) image_extension: String,
    pub(crate) file_prefix: String,
    pub(crate) first_frame: FirstFramePolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ExtractionOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionOptions")
            .field("interval", &self.interval)
            .field("threshold", &self.threshold)
            .field("output_directory", &self.output_directory)
            .field("image_extension", &self.image_extension)
            .field("file_prefix", &self.file_prefix)
            .field("first_frame", &self.first_frame)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionOptions {
    /// Create options with default settings.
    ///
    /// Defaults: 5 second interval, threshold 0.6, output to `frames/` as
    /// `frame_<n>.jpg`, first frame retained, no progress callback, no
    /// cancellation, batch size 1.
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            threshold: DEFAULT_THRESHOLD,
            output_directory: PathBuf::from("frames"),
            image_extension: "jpg".to_string(),
            file_prefix: "frame".to_string(),
            first_frame: FirstFramePolicy::Retain,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the playback-time distance between candidate ticks.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the similarity cutoff. Candidates scoring strictly below it
    /// against the held reference are retained.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the directory retained frames are written to. It is created if
    /// absent.
    #[must_use]
    pub fn with_output_directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        self.output_directory = directory.as_ref().to_path_buf();
        self
    }

    /// Set the image file extension, which also selects the encoder
    /// (`jpg`, `png`, `bmp`, `tiff`, ...). A leading dot is ignored.
    #[must_use]
    pub fn with_image_extension(mut self, extension: &str) -> Self {
        self.image_extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self
    }

    /// Set the file name prefix placed before the ordinal.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self
    }

    /// Choose how the opening candidate is handled.
    #[must_use]
    pub fn with_first_frame(mut self, policy: FirstFramePolicy) -> Self {
        self.first_frame = policy;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the run stops at the next tick and
    /// returns [`SiftError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires, in candidates.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The configured similarity threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The configured output directory.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Check every value that can be checked without opening the video.
    ///
    /// # Errors
    ///
    /// - [`SiftError::InvalidThreshold`] if the threshold is outside
    ///   `[0, 1]` or NaN.
    /// - [`SiftError::InvalidInterval`] if the interval is zero.
    /// - [`SiftError::UnsupportedImageFormat`] if the extension is unknown
    ///   or its encoder cannot write 8-bit RGB.
    pub fn validate(&self) -> Result<(), SiftError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SiftError::InvalidThreshold(self.threshold));
        }
        if self.interval.is_zero() {
            return Err(SiftError::InvalidInterval {
                interval: self.interval,
                frames_per_second: None,
            });
        }
        rgb_encoder_for(&self.image_extension)?;
        Ok(())
    }
}
