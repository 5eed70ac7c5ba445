//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring a sifting run,
//! [`CancellationToken`] for cooperative cancellation, and [`ProgressInfo`]
//! for progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesift::{ExtractionOptions, ProgressCallback, ProgressInfo, SiftError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("tick {}: {} kept of {} sampled", info.decoded_ticks, info.retained, info.sampled);
//!     }
//! }
//!
//! let options = ExtractionOptions::new().with_progress(Arc::new(PrintProgress));
//! let summary = framesift::extract_distinct_frames_from_path("input.mp4", &options)?;
//! # Ok::<(), SiftError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of a sifting run.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::ExtractionOptions::with_batch_size) candidates.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames decoded so far, sampled or not.
    pub decoded_ticks: u64,
    /// Candidates offered to the similarity gate so far.
    pub sampled: u64,
    /// Frames retained (written) so far.
    pub retained: u64,
    /// Expected number of candidates, if the frame count is known.
    pub expected_candidates: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if the expected count is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
    /// Tick of the most recent candidate.
    pub current_tick: Option<u64>,
    /// Playback timestamp of the most recent candidate.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be [`Send`] and [`Sync`] because the pipelined
/// extraction reports from a worker thread.
///
/// Progress callbacks observe but cannot halt the run. Use
/// [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called after every batch of candidates.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when nothing is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the
/// associated run. The sampler checks the token before decoding each tick,
/// never in the middle of a frame.
///
/// # Example
///
/// ```
/// use framesift::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks run counters and emits callbacks at the configured cadence.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    expected_candidates: Option<u64>,
    batch_size: u64,
    start_time: Instant,
    since_last_report: u64,
    pub(crate) sampled: u64,
    pub(crate) retained: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        expected_candidates: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            expected_candidates,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            since_last_report: 0,
            sampled: 0,
            retained: 0,
        }
    }

    /// Record one candidate and fire the callback once a batch is complete.
    pub(crate) fn advance(
        &mut self,
        decoded_ticks: u64,
        tick: u64,
        timestamp: Duration,
        retained: bool,
    ) {
        self.sampled += 1;
        if retained {
            self.retained += 1;
        }
        self.since_last_report += 1;

        if self.since_last_report >= self.batch_size {
            self.report(decoded_ticks, Some(tick), Some(timestamp));
            self.since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self, decoded_ticks: u64) {
        self.report(decoded_ticks, None, None);
    }

    fn report(&self, decoded_ticks: u64, tick: Option<u64>, timestamp: Option<Duration>) {
        let percentage = self
            .expected_candidates
            .filter(|&total| total > 0)
            .map(|total| (self.sampled.min(total) as f32 / total as f32) * 100.0);

        let info = ProgressInfo {
            decoded_ticks,
            sampled: self.sampled,
            retained: self.retained,
            expected_candidates: self.expected_candidates,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_tick: tick,
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
