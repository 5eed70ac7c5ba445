//! Writing retained frames to disk.
//!
//! [`FrameWriter`] numbers artifacts in retention order (`frame_0.jpg`,
//! `frame_1.jpg`, ...) and writes each one atomically: the image is encoded
//! into a temporary file inside the output directory and renamed into place
//! only once complete, so a crash never leaves a truncated image behind.

use std::{
    fs,
    io::{BufWriter, Cursor, Write},
    path::{Path, PathBuf},
};

use image::{ImageFormat, RgbImage};
use tempfile::NamedTempFile;

use crate::error::SiftError;

/// Sequentially numbered, atomically written image artifacts.
#[derive(Debug)]
pub struct FrameWriter {
    directory: PathBuf,
    prefix: String,
    extension: String,
    format: ImageFormat,
    next_ordinal: u64,
}

impl FrameWriter {
    /// Prepare `directory` (creating it if absent) for `<prefix>_<n>.<extension>`
    /// artifacts.
    ///
    /// # Errors
    ///
    /// - [`SiftError::UnsupportedImageFormat`] if `extension` has no
    ///   encoder for 8-bit RGB.
    /// - [`SiftError::OutputWrite`] if the directory cannot be created.
    pub fn create<P: AsRef<Path>>(
        directory: P,
        prefix: &str,
        extension: &str,
    ) -> Result<Self, SiftError> {
        let directory = directory.as_ref().to_path_buf();
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        let format = rgb_encoder_for(&extension)?;

        fs::create_dir_all(&directory).map_err(|error| SiftError::OutputWrite {
            path: directory.clone(),
            reason: format!("cannot create output directory: {error}"),
        })?;

        Ok(Self {
            directory,
            prefix: prefix.to_string(),
            extension,
            format,
            next_ordinal: 0,
        })
    }

    /// Path the next artifact will be written to.
    pub fn next_path(&self) -> PathBuf {
        self.directory.join(format!(
            "{}_{}.{}",
            self.prefix, self.next_ordinal, self.extension
        ))
    }

    /// Number of artifacts written so far.
    pub fn written(&self) -> u64 {
        self.next_ordinal
    }

    /// The output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Encode `frame` as the next artifact and return its path.
    ///
    /// The ordinal advances only after the file is in place.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::OutputWrite`] if encoding, writing or renaming
    /// fails. No partial file is left at the destination.
    pub fn write(&mut self, frame: &RgbImage) -> Result<PathBuf, SiftError> {
        let path = self.next_path();
        let write_error = |reason: String| SiftError::OutputWrite {
            path: path.clone(),
            reason,
        };

        let staging = NamedTempFile::new_in(&self.directory)
            .map_err(|error| write_error(format!("cannot create temporary file: {error}")))?;

        let mut writer = BufWriter::new(staging);
        frame
            .write_to(&mut writer, self.format)
            .map_err(|error| write_error(error.to_string()))?;
        writer
            .flush()
            .map_err(|error| write_error(error.to_string()))?;
        let staging = writer
            .into_inner()
            .map_err(|error| write_error(error.error().to_string()))?;

        staging
            .persist(&path)
            .map_err(|error| write_error(error.error.to_string()))?;

        self.next_ordinal += 1;
        log::info!("Saved frame to {}", path.display());
        Ok(path)
    }
}

/// Resolve `extension` to a format that can encode 8-bit RGB frames.
///
/// Some writable formats only accept other color types (Farbfeld wants
/// 16-bit RGBA, OpenEXR and Radiance HDR want floats), so a one-pixel frame
/// is encoded as a trial.
pub(crate) fn rgb_encoder_for(extension: &str) -> Result<ImageFormat, SiftError> {
    let unsupported = || SiftError::UnsupportedImageFormat(extension.to_string());
    let format = ImageFormat::from_extension(extension)
        .filter(|format| format.can_write())
        .ok_or_else(unsupported)?;

    RgbImage::new(1, 1)
        .write_to(&mut Cursor::new(Vec::new()), format)
        .map_err(|_| unsupported())?;
    Ok(format)
}
