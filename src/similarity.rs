//! Intensity reduction and structural similarity.
//!
//! Both functions here are pure. [`to_intensity`] collapses an RGB frame to
//! one 8-bit luma channel; [`structural_similarity`] scores two luma frames
//! of equal size.
//!
//! The score is the mean structural similarity index (SSIM) over every
//! `7 × 7` window that fits entirely inside the frame:
//!
//! ```text
//!            (2·μx·μy + C1) · (2·σxy + C2)
//! SSIM = ─────────────────────────────────────
//!        (μx² + μy² + C1) · (σx² + σy² + C2)
//! ```
//!
//! with window means `μ`, sample variances `σ²` and covariance `σxy`
//! (normalised by `n − 1`), `C1 = (0.01·255)²` and `C2 = (0.03·255)²`.
//! Frames smaller than the window use the largest odd window that fits.
//!
//! # Example
//!
//! ```
//! use framesift::{structural_similarity, to_intensity};
//! use image::{Rgb, RgbImage};
//!
//! let frame = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 64]));
//! let gray = to_intensity(&frame);
//! let score = structural_similarity(&gray, &gray)?;
//! assert_eq!(score, 1.0);
//! # Ok::<(), framesift::SiftError>(())
//! ```

use image::{GrayImage, Luma, RgbImage};

use crate::error::SiftError;

/// Side length of the square comparison window.
pub const SSIM_WINDOW: u32 = 7;

/// Dynamic range of 8-bit samples.
const DATA_RANGE: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Reduce an RGB frame to luma using the ITU-R BT.601 weights
/// `Y = 0.299·R + 0.587·G + 0.114·B`, rounded to the nearest integer.
pub fn to_intensity(frame: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (output, pixel) in gray.pixels_mut().zip(frame.pixels()) {
        let [red, green, blue] = pixel.0;
        let weighted = 299 * u32::from(red) + 587 * u32::from(green) + 114 * u32::from(blue);
        *output = Luma([((weighted + 500) / 1000) as u8]);
    }
    gray
}

/// Mean SSIM of `candidate` against `reference`, in `[-1, 1]`.
///
/// Identical inputs score exactly `1.0`. Empty frames score `1.0`.
///
/// # Errors
///
/// Returns [`SiftError::IncompatibleFrame`] if the two frames differ in size.
pub fn structural_similarity(
    reference: &GrayImage,
    candidate: &GrayImage,
) -> Result<f64, SiftError> {
    if reference.dimensions() != candidate.dimensions() {
        return Err(SiftError::IncompatibleFrame {
            expected: reference.dimensions(),
            found: candidate.dimensions(),
        });
    }

    let (width, height) = reference.dimensions();
    if width == 0 || height == 0 {
        return Ok(1.0);
    }

    let mut window = SSIM_WINDOW.min(width).min(height);
    if window % 2 == 0 {
        window -= 1;
    }

    let constants = Constants::new(window);
    let width = width as usize;
    let height = height as usize;
    let window = window as usize;
    let x_pixels = reference.as_raw();
    let y_pixels = candidate.as_raw();

    // Per-column sums over the current band of `window` rows.
    let mut columns = vec![Sums::default(); width];
    for row in 0..window {
        add_row(&mut columns, x_pixels, y_pixels, row, width);
    }

    let mut total = 0.0;
    let mut windows = 0u64;

    for top in 0..=(height - window) {
        if top > 0 {
            remove_row(&mut columns, x_pixels, y_pixels, top - 1, width);
            add_row(&mut columns, x_pixels, y_pixels, top + window - 1, width);
        }

        let mut sums = Sums::default();
        for column in &columns[..window] {
            sums.add(column);
        }

        for left in 0..=(width - window) {
            if left > 0 {
                sums.subtract(&columns[left - 1]);
                sums.add(&columns[left + window - 1]);
            }
            total += constants.index(&sums);
            windows += 1;
        }
    }

    Ok(total / windows as f64)
}

/// Exact integer moments of a pixel set.
#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    x: u64,
    y: u64,
    xx: u64,
    yy: u64,
    xy: u64,
}

impl Sums {
    fn add(&mut self, other: &Sums) {
        self.x += other.x;
        self.y += other.y;
        self.xx += other.xx;
        self.yy += other.yy;
        self.xy += other.xy;
    }

    fn subtract(&mut self, other: &Sums) {
        self.x -= other.x;
        self.y -= other.y;
        self.xx -= other.xx;
        self.yy -= other.yy;
        self.xy -= other.xy;
    }

    fn add_pixel(&mut self, x: u8, y: u8) {
        let (x, y) = (u64::from(x), u64::from(y));
        self.x += x;
        self.y += y;
        self.xx += x * x;
        self.yy += y * y;
        self.xy += x * y;
    }

    fn remove_pixel(&mut self, x: u8, y: u8) {
        let (x, y) = (u64::from(x), u64::from(y));
        self.x -= x;
        self.y -= y;
        self.xx -= x * x;
        self.yy -= y * y;
        self.xy -= x * y;
    }
}

fn add_row(columns: &mut [Sums], x_pixels: &[u8], y_pixels: &[u8], row: usize, width: usize) {
    let start = row * width;
    for (column, (&x, &y)) in columns
        .iter_mut()
        .zip(x_pixels[start..start + width].iter().zip(&y_pixels[start..start + width]))
    {
        column.add_pixel(x, y);
    }
}

fn remove_row(columns: &mut [Sums], x_pixels: &[u8], y_pixels: &[u8], row: usize, width: usize) {
    let start = row * width;
    for (column, (&x, &y)) in columns
        .iter_mut()
        .zip(x_pixels[start..start + width].iter().zip(&y_pixels[start..start + width]))
    {
        column.remove_pixel(x, y);
    }
}

/// Per-window constants.
struct Constants {
    samples: f64,
    covariance_norm: f64,
    c1: f64,
    c2: f64,
}

impl Constants {
    fn new(window: u32) -> Self {
        let samples = f64::from(window * window);
        let covariance_norm = if samples > 1.0 {
            samples / (samples - 1.0)
        } else {
            1.0
        };
        Self {
            samples,
            covariance_norm,
            c1: (K1 * DATA_RANGE).powi(2),
            c2: (K2 * DATA_RANGE).powi(2),
        }
    }

    fn index(&self, sums: &Sums) -> f64 {
        let n = self.samples;
        let mean_x = sums.x as f64 / n;
        let mean_y = sums.y as f64 / n;
        let variance_x = self.covariance_norm * (sums.xx as f64 / n - mean_x * mean_x);
        let variance_y = self.covariance_norm * (sums.yy as f64 / n - mean_y * mean_y);
        let covariance = self.covariance_norm * (sums.xy as f64 / n - mean_x * mean_y);

        let numerator = (2.0 * mean_x * mean_y + self.c1) * (2.0 * covariance + self.c2);
        let denominator =
            (mean_x * mean_x + mean_y * mean_y + self.c1) * (variance_x + variance_y + self.c2);
        numerator / denominator
    }
}
