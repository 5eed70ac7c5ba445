//! Benchmarks for luma reduction, SSIM scoring and full sifting runs.
//!
//! Run with: cargo bench
//!
//! The file-backed benchmark requires `tests/fixtures/sample_video.mp4`.

use std::{hint::black_box, path::Path, time::Duration};

use criterion::Criterion;
use framesift::{ExtractionOptions, structural_similarity, to_intensity};
use image::{Rgb, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn synthetic_frame(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let level = ((x * 37 + y * 91 + seed) % 256) as u8;
        Rgb([level, level.wrapping_add(40), level.wrapping_mul(3)])
    })
}

fn benchmark_intensity(criterion: &mut Criterion) {
    let frame = synthetic_frame(1280, 720, 0);

    criterion.bench_function("to_intensity 1280x720", |bencher| {
        bencher.iter(|| to_intensity(black_box(&frame)));
    });
}

fn benchmark_similarity(criterion: &mut Criterion) {
    let reference = to_intensity(&synthetic_frame(1280, 720, 0));
    let candidate = to_intensity(&synthetic_frame(1280, 720, 17));

    criterion.bench_function("structural_similarity 1280x720", |bencher| {
        bencher.iter(|| {
            structural_similarity(black_box(&reference), black_box(&candidate)).unwrap()
        });
    });

    let reference = to_intensity(&synthetic_frame(1920, 1080, 0));
    let candidate = to_intensity(&synthetic_frame(1920, 1080, 17));

    criterion.bench_function("structural_similarity 1920x1080", |bencher| {
        bencher.iter(|| {
            structural_similarity(black_box(&reference), black_box(&candidate)).unwrap()
        });
    });
}

fn benchmark_file_extraction(criterion: &mut Criterion) {
    framesift::set_decoder_log_level(framesift::DecoderLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let mut group = criterion.benchmark_group("file extraction");
    group.sample_size(10);
    group.bench_function("sift sample video (1 s interval)", |bencher| {
        bencher.iter(|| {
            let directory = tempfile::tempdir().unwrap();
            let options = ExtractionOptions::new()
                .with_interval(Duration::from_secs(1))
                .with_output_directory(directory.path());
            framesift::extract_distinct_frames_from_path(SAMPLE_VIDEO, &options).unwrap()
        });
    });
    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_intensity,
    benchmark_similarity,
    benchmark_file_extraction,
);
criterion::criterion_main!(benches);
