//! Extraction options tests.

use std::time::Duration;

use framesift::{
    CancellationToken, DEFAULT_INTERVAL, DEFAULT_THRESHOLD, ExtractionOptions, FirstFramePolicy,
    SiftError,
};

#[test]
fn defaults() {
    let options = ExtractionOptions::default();
    assert_eq!(options.interval(), DEFAULT_INTERVAL);
    assert_eq!(options.interval(), Duration::from_secs(5));
    assert_eq!(options.threshold(), DEFAULT_THRESHOLD);
    assert_eq!(options.output_directory(), std::path::Path::new("frames"));
    assert!(options.validate().is_ok());
    assert_eq!(FirstFramePolicy::default(), FirstFramePolicy::Retain);
}

#[test]
fn builder_overrides() {
    let options = ExtractionOptions::new()
        .with_interval(Duration::from_millis(2500))
        .with_threshold(0.8)
        .with_output_directory("slides");

    assert_eq!(options.interval(), Duration::from_millis(2500));
    assert_eq!(options.threshold(), 0.8);
    assert_eq!(options.output_directory(), std::path::Path::new("slides"));
}

#[test]
fn threshold_bounds_are_inclusive() {
    assert!(ExtractionOptions::new().with_threshold(0.0).validate().is_ok());
    assert!(ExtractionOptions::new().with_threshold(1.0).validate().is_ok());
}

#[test]
fn threshold_out_of_range() {
    for threshold in [-0.01, 1.01, f64::NAN] {
        let result = ExtractionOptions::new().with_threshold(threshold).validate();
        assert!(matches!(result, Err(SiftError::InvalidThreshold(_))));
    }
}

#[test]
fn zero_interval() {
    let result = ExtractionOptions::new()
        .with_interval(Duration::ZERO)
        .validate();
    assert!(matches!(
        result,
        Err(SiftError::InvalidInterval {
            frames_per_second: None,
            ..
        })
    ));
}

#[test]
fn image_extensions() {
    for extension in ["jpg", "jpeg", "png", ".png", "PNG", "bmp", "tiff"] {
        let result = ExtractionOptions::new()
            .with_image_extension(extension)
            .validate();
        assert!(result.is_ok(), "{extension} should be accepted");
    }

    let result = ExtractionOptions::new()
        .with_image_extension("docx")
        .validate();
    assert!(matches!(result, Err(SiftError::UnsupportedImageFormat(ext)) if ext == "docx"));
}

#[test]
fn debug_output_omits_callbacks() {
    let options = ExtractionOptions::new()
        .with_cancellation(CancellationToken::new())
        .with_batch_size(0);
    let debug = format!("{options:?}");

    assert!(debug.contains("ExtractionOptions"));
    assert!(debug.contains("has_cancellation: true"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn image_extensions_without_rgb_encoder() {
    for extension in ["ff", "exr", "hdr"] {
        let result = ExtractionOptions::new()
            .with_image_extension(extension)
            .validate();
        assert!(
            matches!(result, Err(SiftError::UnsupportedImageFormat(ref ext)) if ext == extension),
            "{extension} should be rejected, got {result:?}"
        );
    }
}
