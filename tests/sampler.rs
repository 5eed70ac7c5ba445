//! Fixed-interval sampling tests.

mod common;

use std::{path::Path, time::Duration};

use common::{SAMPLE_VIDEO, ScriptedSource, gray_frame, repeated};
use framesift::{
    CancellationToken, FrameSampler, SamplingPeriod, SiftError, StreamTermination, VideoFile,
};

// ── SamplingPeriod ─────────────────────────────────────────────────

#[test]
fn period_is_rate_times_interval() {
    let period = SamplingPeriod::new(30.0, Duration::from_secs(5)).unwrap();
    assert_eq!(period.frames(), 150);
}

#[test]
fn period_rounds_fractional_products() {
    // 29.97 × 5 = 149.85
    let period = SamplingPeriod::new(29.97, Duration::from_secs(5)).unwrap();
    assert_eq!(period.frames(), 150);

    let period = SamplingPeriod::new(10.0, Duration::from_millis(140)).unwrap();
    assert_eq!(period.frames(), 1);
}

#[test]
fn period_due_ticks_are_multiples() {
    let period = SamplingPeriod::new(30.0, Duration::from_secs(5)).unwrap();
    let due: Vec<u64> = (0..=450).filter(|&tick| period.is_due(tick)).collect();
    assert_eq!(due, vec![0, 150, 300, 450]);
}

#[test]
fn zero_interval_is_rejected() {
    let result = SamplingPeriod::new(30.0, Duration::ZERO);
    assert!(matches!(result, Err(SiftError::InvalidInterval { .. })));
}

#[test]
fn interval_rounding_to_zero_frames_is_rejected() {
    let result = SamplingPeriod::new(10.0, Duration::from_millis(40));
    assert!(matches!(result, Err(SiftError::InvalidInterval { .. })));
}

#[test]
fn non_positive_frame_rate_is_rejected() {
    for rate in [0.0, -25.0, f64::NAN, f64::INFINITY] {
        let result = SamplingPeriod::new(rate, Duration::from_secs(1));
        assert!(
            matches!(result, Err(SiftError::InvalidInterval { .. })),
            "rate {rate} should be rejected"
        );
    }
}

// ── FrameSampler ───────────────────────────────────────────────────

#[test]
fn sampler_yields_due_ticks_in_order() {
    let source = ScriptedSource::new(repeated(&gray_frame(8, 8, 100), 451), 30.0);
    let sampler = FrameSampler::new(source, Duration::from_secs(5)).unwrap();

    let ticks: Vec<u64> = sampler.map(|candidate| candidate.tick).collect();
    assert_eq!(ticks, vec![0, 150, 300, 450]);
}

#[test]
fn sampler_reports_timestamps() {
    let source = ScriptedSource::new(repeated(&gray_frame(4, 4, 0), 301), 30.0);
    let sampler = FrameSampler::new(source, Duration::from_secs(5)).unwrap();

    let timestamps: Vec<Duration> = sampler.map(|candidate| candidate.timestamp).collect();
    assert_eq!(
        timestamps,
        vec![
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(10)
        ]
    );
}

#[test]
fn first_tick_is_always_due() {
    let source = ScriptedSource::new(vec![gray_frame(4, 4, 7)], 60.0);
    let mut sampler = FrameSampler::new(source, Duration::from_secs(10)).unwrap();

    let first = sampler.next().expect("tick 0 should be sampled");
    assert_eq!(first.tick, 0);
    assert!(sampler.next().is_none());
    assert_eq!(sampler.termination(), Some(&StreamTermination::EndOfStream));
}

#[test]
fn early_end_of_stream_is_not_an_error() {
    // Five due ticks were expected, the stream stops after three.
    let source = ScriptedSource::new(repeated(&gray_frame(8, 8, 50), 400), 30.0).announcing(750);
    let mut sampler = FrameSampler::new(source, Duration::from_secs(5)).unwrap();

    let candidates: Vec<_> = sampler.by_ref().collect();
    assert_eq!(candidates.len(), 3);
    assert_eq!(sampler.decoded_ticks(), 400);
    assert_eq!(sampler.termination(), Some(&StreamTermination::EndOfStream));
}

#[test]
fn empty_stream_yields_nothing() {
    let source = ScriptedSource::new(Vec::new(), 25.0);
    let mut sampler = FrameSampler::new(source, Duration::from_secs(1)).unwrap();

    assert!(sampler.next().is_none());
    assert_eq!(sampler.decoded_ticks(), 0);
    assert_eq!(sampler.termination(), Some(&StreamTermination::EndOfStream));
}

#[test]
fn decode_error_stops_sampling() {
    let source = ScriptedSource::new(repeated(&gray_frame(8, 8, 50), 40), 10.0).failing_after(25);
    let mut sampler = FrameSampler::new(source, Duration::from_secs(1)).unwrap();

    let ticks: Vec<u64> = sampler.by_ref().map(|candidate| candidate.tick).collect();
    assert_eq!(ticks, vec![0, 10, 20]);
    assert_eq!(sampler.decoded_ticks(), 25);
    assert!(matches!(
        sampler.termination(),
        Some(StreamTermination::DecodeError(reason)) if reason.contains("corrupt packet")
    ));

    // Iteration stays finished.
    assert!(sampler.next().is_none());
}

#[test]
fn cancellation_stops_at_next_tick() {
    let token = CancellationToken::new();
    let source = ScriptedSource::new(repeated(&gray_frame(8, 8, 50), 100), 10.0);
    let mut sampler = FrameSampler::new(source, Duration::from_secs(1))
        .unwrap()
        .with_cancellation(token.clone());

    assert_eq!(sampler.next().map(|candidate| candidate.tick), Some(0));
    token.cancel();
    assert!(sampler.next().is_none());
    assert_eq!(sampler.termination(), Some(&StreamTermination::Cancelled));
    assert_eq!(sampler.source().reads(), 1);
}

#[test]
fn nothing_is_decoded_before_first_pull() {
    let source = ScriptedSource::new(repeated(&gray_frame(4, 4, 0), 10), 10.0);
    let sampler = FrameSampler::new(source, Duration::from_secs(1)).unwrap();

    assert_eq!(sampler.source().reads(), 0);
    assert_eq!(sampler.termination(), None);
    assert_eq!(sampler.period().frames(), 10);
}

#[test]
fn sampler_over_video_file() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let video = VideoFile::open(SAMPLE_VIDEO).expect("Failed to open test video");
    let width = video.metadata().width;
    let height = video.metadata().height;
    let mut sampler = FrameSampler::new(video, Duration::from_secs(1)).unwrap();

    let candidates: Vec<_> = sampler.by_ref().collect();
    assert!(!candidates.is_empty());
    assert_eq!(candidates[0].tick, 0);
    for candidate in &candidates {
        assert_eq!(candidate.frame.dimensions(), (width, height));
    }
    assert_eq!(sampler.termination(), Some(&StreamTermination::EndOfStream));
}
