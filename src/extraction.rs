//! End-to-end sifting: sample, compare, write.
//!
//! [`extract_distinct_frames`] drives a [`FrameSampler`] over any
//! [`FrameSource`], passes every candidate through a [`SimilarityGate`] and
//! writes the retained ones with a [`FrameWriter`]. Everything runs on the
//! calling thread, one frame at a time. See [`crate::stream`] (feature
//! `async`) for the pipelined variant.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framesift::ExtractionOptions;
//!
//! let options = ExtractionOptions::new()
//!     .with_interval(Duration::from_secs(5))
//!     .with_threshold(0.6)
//!     .with_output_directory("frames");
//!
//! let summary = framesift::extract_distinct_frames_from_path("lecture.mp4", &options)?;
//! println!("kept {} of {} sampled frames", summary.retained, summary.sampled);
//! # Ok::<(), framesift::SiftError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    configuration::ExtractionOptions,
    error::SiftError,
    gate::SimilarityGate,
    output::FrameWriter,
    progress::ProgressTracker,
    sampler::{Candidate, FrameSampler, StreamTermination},
    source::{FrameSource, VideoFile},
};

/// How the stream ended for a run that returned successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunTermination {
    /// Every frame of the stream was decoded.
    EndOfStream,
    /// Decoding failed part-way; frames sampled before the failure were
    /// processed normally.
    DecodeError(String),
}

/// Result of a completed run.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractionSummary {
    /// Frames decoded, sampled or not.
    pub decoded_ticks: u64,
    /// Candidates offered to the gate.
    pub sampled: u64,
    /// Candidates retained and written.
    pub retained: u64,
    /// Artifact paths, in retention order.
    pub artifacts: Vec<PathBuf>,
    /// How the stream ended.
    pub termination: RunTermination,
}

impl ExtractionSummary {
    /// `true` if the whole stream was decoded.
    pub fn is_complete(&self) -> bool {
        self.termination == RunTermination::EndOfStream
    }
}

/// Sift frames from `source` according to `options`.
///
/// Options and the sampling period are validated before the first frame is
/// decoded. The source is consumed and released before this function
/// returns, whatever the outcome.
///
/// # Errors
///
/// - [`SiftError::InvalidThreshold`], [`SiftError::InvalidInterval`] or
///   [`SiftError::UnsupportedImageFormat`] for bad configuration.
/// - [`SiftError::IncompatibleFrame`] if a candidate changes resolution.
/// - [`SiftError::OutputWrite`] if an artifact cannot be written. Earlier
///   artifacts stay on disk.
/// - [`SiftError::Cancelled`] if the cancellation token fires.
///
/// - [`SiftError::StreamOpen`] if the very first frame fails to decode.
///
/// A decode failure after at least one frame is not an error; it is
/// reported in [`ExtractionSummary::termination`].
pub fn extract_distinct_frames<S: FrameSource>(
    source: S,
    options: &ExtractionOptions,
) -> Result<ExtractionSummary, SiftError> {
    options.validate()?;

    let expected_candidates = source.frame_count();
    let mut sampler = FrameSampler::new(source, options.interval)?;
    if let Some(token) = &options.cancellation {
        sampler = sampler.with_cancellation(token.clone());
    }
    let period = sampler.period().frames();

    let mut run = SiftRun::new(options, expected_candidates.map(|count| count.div_ceil(period)))?;

    while let Some(candidate) = sampler.next() {
        run.offer(sampler.decoded_ticks(), candidate)?;
    }

    let decoded_ticks = sampler.decoded_ticks();
    let termination = sampler
        .termination()
        .cloned()
        .unwrap_or(StreamTermination::EndOfStream);
    let location = source_location(sampler.source());
    drop(sampler);

    run.finish(decoded_ticks, termination, location)
}

/// Open `path` with FFmpeg and sift it. See [`extract_distinct_frames`].
///
/// # Errors
///
/// [`SiftError::StreamOpen`] or [`SiftError::NoVideoStream`] if the video
/// cannot be opened, plus everything [`extract_distinct_frames`] returns.
pub fn extract_distinct_frames_from_path<P: AsRef<Path>>(
    path: P,
    options: &ExtractionOptions,
) -> Result<ExtractionSummary, SiftError> {
    options.validate()?;
    VideoFile::open(path)?.extract_distinct_frames(options)
}

impl VideoFile {
    /// Sift this video. See [`extract_distinct_frames`].
    ///
    /// # Errors
    ///
    /// Same as [`extract_distinct_frames`].
    pub fn extract_distinct_frames(
        self,
        options: &ExtractionOptions,
    ) -> Result<ExtractionSummary, SiftError> {
        log::debug!("Sifting {}", self.path().display());
        extract_distinct_frames(self, options)
    }
}

/// Gate, writer and counters of one run. The single owner of the held
/// reference.
pub(crate) struct SiftRun {
    gate: SimilarityGate,
    writer: FrameWriter,
    tracker: ProgressTracker,
    artifacts: Vec<PathBuf>,
}

impl SiftRun {
    pub(crate) fn new(
        options: &ExtractionOptions,
        expected_candidates: Option<u64>,
    ) -> Result<Self, SiftError> {
        let gate = SimilarityGate::new(options.threshold, options.first_frame)?;
        let writer = FrameWriter::create(
            &options.output_directory,
            &options.file_prefix,
            &options.image_extension,
        )?;
        log::debug!(
            "Writing distinct frames to {} (threshold {})",
            writer.directory().display(),
            options.threshold,
        );

        Ok(Self {
            gate,
            writer,
            tracker: ProgressTracker::new(
                options.progress.clone(),
                expected_candidates,
                options.batch_size,
            ),
            artifacts: Vec::new(),
        })
    }

    /// Decide on one candidate and write it if retained.
    pub(crate) fn offer(
        &mut self,
        decoded_ticks: u64,
        candidate: Candidate,
    ) -> Result<(), SiftError> {
        let decision = self.gate.evaluate(candidate.tick, &candidate.frame)?;
        let retained = decision.is_retained();
        if retained {
            let path = self.writer.write(&candidate.frame)?;
            self.artifacts.push(path);
        }

        self.tracker
            .advance(decoded_ticks, candidate.tick, candidate.timestamp, retained);
        Ok(())
    }

    /// A decode error before the first frame means the stream was never
    /// readable, which is reported against `location` as an open failure.
    pub(crate) fn finish(
        mut self,
        decoded_ticks: u64,
        termination: StreamTermination,
        location: PathBuf,
    ) -> Result<ExtractionSummary, SiftError> {
        let termination = match termination {
            StreamTermination::DecodeError(reason) if decoded_ticks == 0 => {
                return Err(SiftError::StreamOpen {
                    path: location,
                    reason,
                });
            }
            StreamTermination::EndOfStream => RunTermination::EndOfStream,
            StreamTermination::DecodeError(reason) => RunTermination::DecodeError(reason),
            StreamTermination::Cancelled => return Err(SiftError::Cancelled),
        };

        self.tracker.finish(decoded_ticks);

        log::debug!(
            "Kept {} of {} candidates ({} frames decoded)",
            self.tracker.retained,
            self.tracker.sampled,
            decoded_ticks,
        );

        Ok(ExtractionSummary {
            decoded_ticks,
            sampled: self.tracker.sampled,
            retained: self.tracker.retained,
            artifacts: self.artifacts,
            termination,
        })
    }
}

pub(crate) fn source_location<S: FrameSource>(source: &S) -> PathBuf {
    source
        .location()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
