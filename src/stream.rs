//! Pipelined sifting for async callers.
//!
//! Decoding usually dominates a run. With the `async` feature, decoding and
//! sampling run on one blocking thread while a second blocking thread owns
//! the [`SimilarityGate`](crate::SimilarityGate) and writes retained
//! frames. The two are connected by a small bounded channel: once it holds
//! `capacity` candidates the decoder blocks until the consumer catches up,
//! so memory stays bounded by a handful of frames.
//!
//! Only the consumer thread ever touches the held reference.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{ExtractionOptions, SiftError};
//!
//! # async fn example() -> Result<(), SiftError> {
//! let summary = framesift::extract_file_pipelined(
//!     "input.mp4",
//!     ExtractionOptions::new(),
//!     None,
//! )
//! .await?;
//! println!("kept {} frames", summary.retained);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio::{
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};

use crate::{
    configuration::ExtractionOptions,
    error::SiftError,
    extraction::{ExtractionSummary, SiftRun, source_location},
    sampler::{Candidate, FrameSampler, StreamTermination},
    source::{FrameSource, VideoFile},
};

/// Default bounded-channel capacity between the decoder and the gate.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// What the decode thread reports when it stops.
struct ProducerOutcome {
    decoded_ticks: u64,
    termination: StreamTermination,
    location: PathBuf,
}

/// Sift frames with decoding and comparison on separate threads.
///
/// `open` runs on the decode thread, so the source itself never crosses
/// threads. `capacity` bounds the number of in-flight candidates (default
/// [`DEFAULT_QUEUE_CAPACITY`], minimum 1).
///
/// # Errors
///
/// Same as [`extract_distinct_frames`](crate::extract_distinct_frames),
/// plus any error returned by `open`.
///
/// # Panics
///
/// A panic on either worker thread, including one raised by `open` or the
/// source, resumes on the caller.
pub async fn extract_distinct_frames_pipelined<F, S>(
    open: F,
    options: ExtractionOptions,
    capacity: Option<usize>,
) -> Result<ExtractionSummary, SiftError>
where
    F: FnOnce() -> Result<S, SiftError> + Send + 'static,
    S: FrameSource + 'static,
{
    options.validate()?;

    let capacity = capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY).max(1);
    let (sender, receiver) = tokio::sync::mpsc::channel(capacity);
    let (setup_sender, setup_receiver) = tokio::sync::oneshot::channel();

    let producer_options = options.clone();
    let producer = tokio::task::spawn_blocking(move || {
        decode_candidates(open, &producer_options, setup_sender, &sender)
    });

    // The consumer starts only once the sampler exists, so configuration
    // errors surface before the output directory is touched.
    let expected_candidates = match setup_receiver.await {
        Ok(Ok(expected)) => expected,
        Ok(Err(error)) => {
            let _ = producer.await;
            return Err(error);
        }
        Err(_) => {
            return Err(join_task(producer)
                .await
                .err()
                .unwrap_or(SiftError::Cancelled));
        }
    };

    let consumer = tokio::task::spawn_blocking(move || {
        consume_candidates(receiver, &options, expected_candidates)
    });

    let run = join_task(consumer).await;
    let outcome = join_task(producer).await;

    let run = run?;
    let outcome = outcome?;
    run.finish(outcome.decoded_ticks, outcome.termination, outcome.location)
}

/// Open `path` with FFmpeg on the decode thread and sift it pipelined.
/// See [`extract_distinct_frames_pipelined`].
///
/// # Errors
///
/// Same as [`extract_distinct_frames_pipelined`].
pub async fn extract_file_pipelined<P: Into<PathBuf>>(
    path: P,
    options: ExtractionOptions,
    capacity: Option<usize>,
) -> Result<ExtractionSummary, SiftError> {
    let path = path.into();
    extract_distinct_frames_pipelined(move || VideoFile::open(path), options, capacity).await
}

/// Await a worker, re-raising its panic on the caller. A worker that was
/// aborted by runtime shutdown reports [`SiftError::Cancelled`].
async fn join_task<T>(task: JoinHandle<Result<T, SiftError>>) -> Result<T, SiftError> {
    match task.await {
        Ok(result) => result,
        Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
        Err(_) => Err(SiftError::Cancelled),
    }
}

/// Decode thread: open the source, sample it, and push candidates until the
/// stream ends or the consumer hangs up.
fn decode_candidates<F, S>(
    open: F,
    options: &ExtractionOptions,
    setup: tokio::sync::oneshot::Sender<Result<Option<u64>, SiftError>>,
    sender: &Sender<(u64, Candidate)>,
) -> Result<ProducerOutcome, SiftError>
where
    F: FnOnce() -> Result<S, SiftError>,
    S: FrameSource,
{
    let prepared = open().and_then(|source| {
        let frame_count = source.frame_count();
        let sampler = FrameSampler::new(source, options.interval)?;
        let expected = frame_count.map(|count| count.div_ceil(sampler.period().frames()));
        Ok((sampler, expected))
    });

    let (mut sampler, expected) = match prepared {
        Ok(prepared) => prepared,
        Err(error) => {
            let _ = setup.send(Err(error));
            return Ok(ProducerOutcome {
                decoded_ticks: 0,
                termination: StreamTermination::EndOfStream,
                location: PathBuf::new(),
            });
        }
    };

    if let Some(token) = &options.cancellation {
        sampler = sampler.with_cancellation(token.clone());
    }
    if setup.send(Ok(expected)).is_err() {
        return Err(SiftError::Cancelled);
    }

    while let Some(candidate) = sampler.next() {
        if sender
            .blocking_send((sampler.decoded_ticks(), candidate))
            .is_err()
        {
            // Consumer stopped on an error of its own; it reports that.
            break;
        }
    }

    Ok(ProducerOutcome {
        decoded_ticks: sampler.decoded_ticks(),
        termination: sampler
            .termination()
            .cloned()
            .unwrap_or(StreamTermination::EndOfStream),
        location: source_location(sampler.source()),
    })
}

/// Compare-and-write thread: the only owner of the gate.
fn consume_candidates(
    mut receiver: Receiver<(u64, Candidate)>,
    options: &ExtractionOptions,
    expected_candidates: Option<u64>,
) -> Result<SiftRun, SiftError> {
    let mut run = SiftRun::new(options, expected_candidates)?;
    while let Some((decoded_ticks, candidate)) = receiver.blocking_recv() {
        run.offer(decoded_ticks, candidate)?;
    }
    Ok(run)
}
