//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoFile`](crate::VideoFile) is
//! opened and cached for the lifetime of the source.

use std::time::Duration;

/// Metadata for the video stream being sifted.
///
/// # Example
///
/// ```no_run
/// use framesift::VideoFile;
///
/// let video = VideoFile::open("input.mp4").unwrap();
/// let metadata = video.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frames per second. Zero when the container reports none.
    pub frames_per_second: f64,
    /// Number of frames, as reported by the stream or estimated from the
    /// duration.
    pub frame_count: u64,
    /// Playback duration of the stream.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Number of candidates a full pass will offer the gate when sampling
    /// every `period` frames, or `None` when the frame count is unknown.
    pub fn expected_candidates(&self, period: u64) -> Option<u64> {
        if self.frame_count == 0 || period == 0 {
            return None;
        }
        Some(self.frame_count.div_ceil(period))
    }
}
