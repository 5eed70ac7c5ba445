//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for files that
//! cannot be sifted.

use framesift::{ExtractionOptions, SiftError, VideoFile};

#[test]
fn open_nonexistent_file() {
    let result = VideoFile::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video"),
        "Error message should mention the open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = VideoFile::open(&invalid_file_path);
    assert!(
        matches!(
            result,
            Err(SiftError::StreamOpen { .. }) | Err(SiftError::NoVideoStream)
        ),
        "Expected an open error for an invalid video file"
    );
}

#[test]
fn extraction_from_missing_path_creates_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frames");
    let options = ExtractionOptions::new().with_output_directory(&output);

    let result = framesift::extract_distinct_frames_from_path("missing.mp4", &options);
    assert!(matches!(result, Err(SiftError::StreamOpen { .. })));
    assert!(!output.exists());
}

#[test]
fn configuration_errors_take_precedence_over_open_errors() {
    let options = ExtractionOptions::new().with_threshold(2.0);

    let result = framesift::extract_distinct_frames_from_path("missing.mp4", &options);
    assert!(matches!(result, Err(SiftError::InvalidThreshold(_))));
}

#[test]
fn error_messages_carry_context() {
    let error = SiftError::InvalidThreshold(1.5);
    assert!(error.to_string().contains("1.5"));

    let error = SiftError::UnsupportedImageFormat("docx".to_string());
    assert!(error.to_string().contains("docx"));

    let error = SiftError::OutputWrite {
        path: "frames/frame_3.jpg".into(),
        reason: "disk full".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("frame_3.jpg") && message.contains("disk full"));
}

#[test]
fn decoder_log_level_parsing() {
    use framesift::DecoderLogLevel;

    assert_eq!("warn".parse::<DecoderLogLevel>(), Ok(DecoderLogLevel::Warning));
    assert_eq!("QUIET".parse::<DecoderLogLevel>(), Ok(DecoderLogLevel::Quiet));
    assert!("loud".parse::<DecoderLogLevel>().is_err());

    for level in [
        DecoderLogLevel::Quiet,
        DecoderLogLevel::Fatal,
        DecoderLogLevel::Warning,
        DecoderLogLevel::Trace,
    ] {
        assert_eq!(level.to_string().parse::<DecoderLogLevel>(), Ok(level));
    }
    assert_eq!(DecoderLogLevel::Warning.name(), "warning");
}
