//! # framesift
//!
//! Sample a video at a fixed interval and keep only the frames that differ
//! structurally from the last frame kept.
//!
//! `framesift` decodes a video with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, offers one
//! frame per sampling interval to a similarity gate, and writes each frame
//! the gate retains as a numbered image (`frame_0.jpg`, `frame_1.jpg`, ...).
//! Similarity is the mean structural similarity index (SSIM) of the two
//! frames' luma channels. This is handy for turning lectures, slide decks
//! and screen recordings into a set of distinct stills.
//!
//! ## Quick Start
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
//! let summary = framesift::extract_distinct_frames_from_path("input.mp4", &options)?;
//! println!("kept {} frames", summary.retained);
//! # Ok::<(), framesift::SiftError>(())
//! ```
//!
//! ## Building blocks
//!
//! - [`FrameSampler`]: lazy iterator yielding every `round(fps × interval)`-th
//!   decoded frame, starting at tick 0
//! - [`SimilarityGate`]: holds the last retained frame and decides keep or
//!   discard for each candidate
//! - [`to_intensity`] and [`structural_similarity`]: the pure scoring functions
//! - [`FrameWriter`]: atomic, sequentially numbered image output
//! - [`FrameSource`]: the decoding seam; [`VideoFile`] implements it with
//!   FFmpeg
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | [`extract_distinct_frames_pipelined`] decodes and compares on separate threads via Tokio |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod error;
pub mod extraction;
pub mod ffmpeg;
pub mod gate;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod sampler;
pub mod similarity;
pub mod source;
#[cfg(feature = "async")]
pub mod stream;
mod utilities;

pub use configuration::{DEFAULT_INTERVAL, DEFAULT_THRESHOLD, ExtractionOptions, FirstFramePolicy};
pub use error::SiftError;
pub use extraction::{
    ExtractionSummary, RunTermination, extract_distinct_frames, extract_distinct_frames_from_path,
};
pub use ffmpeg::{DecoderLogLevel, set_decoder_log_level};
pub use gate::{GateDecision, SimilarityGate};
pub use metadata::VideoMetadata;
pub use output::FrameWriter;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use sampler::{Candidate, FrameSampler, SamplingPeriod, StreamTermination};
pub use similarity::{SSIM_WINDOW, structural_similarity, to_intensity};
pub use source::{FrameSource, VideoFile};
#[cfg(feature = "async")]
pub use stream::{
    DEFAULT_QUEUE_CAPACITY, extract_distinct_frames_pipelined, extract_file_pipelined,
};
