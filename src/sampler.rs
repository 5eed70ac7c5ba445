//! Fixed-interval frame sampling.
//!
//! [`FrameSampler`] walks a [`FrameSource`] in decode order and yields one
//! [`Candidate`] every [`SamplingPeriod`] frames, starting with tick 0.
//! Frames between due ticks are decoded and dropped; there is no seeking.
//!
//! The sampler is a lazy, non-restartable [`Iterator`]. When the source runs
//! dry, fails to decode, or the run is cancelled, iteration ends and the
//! reason is available from [`FrameSampler::termination`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framesift::{FrameSampler, VideoFile};
//!
//! let video = VideoFile::open("input.mp4")?;
//! let mut sampler = FrameSampler::new(video, Duration::from_secs(5))?;
//! for candidate in &mut sampler {
//!     println!("tick {} at {:?}", candidate.tick, candidate.timestamp);
//! }
//! println!("stopped: {:?}", sampler.termination());
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::time::Duration;

use image::RgbImage;

use crate::{error::SiftError, progress::CancellationToken, source::FrameSource, utilities};

/// Number of decoded frames between two candidates: `round(fps × interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPeriod(u64);

impl SamplingPeriod {
    /// Compute the period for a frame rate and a sampling interval.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidInterval`] if either value is not
    /// positive or the product rounds to zero frames.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use framesift::SamplingPeriod;
    ///
    /// let period = SamplingPeriod::new(30.0, Duration::from_secs(5))?;
    /// assert_eq!(period.frames(), 150);
    /// assert!(period.is_due(300));
    /// assert!(!period.is_due(299));
    /// # Ok::<(), framesift::SiftError>(())
    /// ```
    pub fn new(frames_per_second: f64, interval: Duration) -> Result<Self, SiftError> {
        let invalid = || SiftError::InvalidInterval {
            interval,
            frames_per_second: Some(frames_per_second),
        };

        if !frames_per_second.is_finite() || frames_per_second <= 0.0 || interval.is_zero() {
            return Err(invalid());
        }

        let frames = (frames_per_second * interval.as_secs_f64()).round();
        if !frames.is_finite() || frames < 1.0 {
            return Err(invalid());
        }

        Ok(Self(frames as u64))
    }

    /// Frames per period. Always at least 1.
    pub fn frames(self) -> u64 {
        self.0
    }

    /// Whether `tick` is a sampling instant.
    pub fn is_due(self, tick: u64) -> bool {
        tick % self.0 == 0
    }
}

/// A frame that survived the interval filter.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Decode index of the frame within the stream.
    pub tick: u64,
    /// Nominal playback time of the frame.
    pub timestamp: Duration,
    /// The decoded frame.
    pub frame: RgbImage,
}

/// Why a sampler stopped producing candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTermination {
    /// The source reported end of stream.
    EndOfStream,
    /// The source failed to decode; frames up to the failure were sampled.
    DecodeError(String),
    /// The cancellation token fired at a tick boundary.
    Cancelled,
}

/// Lazy iterator over the due ticks of a [`FrameSource`].
///
/// Owns the source, so dropping the sampler releases the underlying video.
pub struct FrameSampler<S: FrameSource> {
    source: S,
    period: SamplingPeriod,
    frames_per_second: f64,
    next_tick: u64,
    cancellation: Option<CancellationToken>,
    termination: Option<StreamTermination>,
}

impl<S: FrameSource> FrameSampler<S> {
    /// Create a sampler over `source`, taking the frame rate from the source.
    ///
    /// Nothing is decoded until the first call to [`next`](Iterator::next).
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidInterval`] if the sampling period rounds
    /// to zero frames.
    pub fn new(source: S, interval: Duration) -> Result<Self, SiftError> {
        let frames_per_second = source.frames_per_second();
        let period = SamplingPeriod::new(frames_per_second, interval)?;
        log::debug!(
            "Sampling every {} frame(s) ({interval:?} at {frames_per_second:.3} fps)",
            period.frames(),
        );

        Ok(Self {
            source,
            period,
            frames_per_second,
            next_tick: 0,
            cancellation: None,
            termination: None,
        })
    }

    /// Stop at the next tick boundary once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The sampling period in frames.
    pub fn period(&self) -> SamplingPeriod {
        self.period
    }

    /// Number of frames decoded so far, sampled or not.
    pub fn decoded_ticks(&self) -> u64 {
        self.next_tick
    }

    /// The reason iteration stopped, or `None` while frames may still come.
    pub fn termination(&self) -> Option<&StreamTermination> {
        self.termination.as_ref()
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn stop(&mut self, termination: StreamTermination) -> Option<Candidate> {
        self.termination = Some(termination);
        None
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }

        loop {
            if self
                .cancellation
                .as_ref()
                .is_some_and(|token| token.is_cancelled())
            {
                log::debug!("Sampling cancelled at tick {}", self.next_tick);
                return self.stop(StreamTermination::Cancelled);
            }

            let frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return self.stop(StreamTermination::EndOfStream),
                Err(error) => {
                    log::warn!("Decoding stopped at tick {}: {error}", self.next_tick);
                    return self.stop(StreamTermination::DecodeError(error.to_string()));
                }
            };

            let tick = self.next_tick;
            self.next_tick += 1;

            if self.period.is_due(tick) {
                return Some(Candidate {
                    tick,
                    timestamp: utilities::tick_to_timestamp(tick, self.frames_per_second),
                    frame,
                });
            }
        }
    }
}
