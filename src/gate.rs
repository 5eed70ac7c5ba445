//! The similarity gate: the keep-or-discard decision.
//!
//! [`SimilarityGate`] owns the held reference, the intensity image of the
//! most recently retained candidate. Each new candidate is compared against
//! it and retained only when its structural similarity falls below the
//! threshold. Discarded candidates never replace the reference, so a slow
//! drift of near-identical frames is measured against the last frame that
//! was actually kept rather than against its immediate predecessor.

use image::{GrayImage, RgbImage};

use crate::{
    configuration::FirstFramePolicy,
    error::SiftError,
    similarity::{structural_similarity, to_intensity},
};

/// Outcome of offering one candidate to the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// The candidate must be emitted and is now the held reference. `score`
    /// is `None` for the opening candidate, which has nothing to compare to.
    Retain {
        /// Similarity against the previous reference.
        score: Option<f64>,
    },
    /// The opening candidate became the reference without being emitted
    /// ([`FirstFramePolicy::SeedOnly`]).
    Seed,
    /// The candidate is too similar to the reference and is dropped.
    Discard {
        /// Similarity against the held reference.
        score: f64,
    },
}

impl GateDecision {
    /// Whether the candidate should be written out.
    pub fn is_retained(&self) -> bool {
        matches!(self, GateDecision::Retain { .. })
    }
}

/// The reference frame a candidate is compared with.
#[derive(Debug, Clone)]
struct HeldReference {
    tick: u64,
    intensity: GrayImage,
}

/// Stateful keep-or-discard filter over sampled candidates.
///
/// # Example
///
/// ```
/// use framesift::{FirstFramePolicy, GateDecision, SimilarityGate};
/// use image::{Rgb, RgbImage};
///
/// let mut gate = SimilarityGate::new(0.6, FirstFramePolicy::Retain)?;
/// let gray = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
///
/// assert!(gate.evaluate(0, &gray)?.is_retained());
/// assert!(!gate.evaluate(10, &gray)?.is_retained());
/// assert_eq!(gate.held_tick(), Some(0));
/// # Ok::<(), framesift::SiftError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityGate {
    threshold: f64,
    first_frame: FirstFramePolicy,
    held: Option<HeldReference>,
}

impl SimilarityGate {
    /// Create a gate with an empty reference.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidThreshold`] if `threshold` is outside
    /// `[0, 1]` or NaN.
    pub fn new(threshold: f64, first_frame: FirstFramePolicy) -> Result<Self, SiftError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SiftError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            first_frame,
            held: None,
        })
    }

    /// Offer the candidate decoded at `tick`.
    ///
    /// The held reference changes only when the decision is
    /// [`GateDecision::Retain`] or [`GateDecision::Seed`].
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::IncompatibleFrame`] if the candidate's
    /// dimensions differ from the held reference. The reference is left
    /// untouched.
    pub fn evaluate(&mut self, tick: u64, candidate: &RgbImage) -> Result<GateDecision, SiftError> {
        let Some(held) = &self.held else {
            self.held = Some(HeldReference {
                tick,
                intensity: to_intensity(candidate),
            });
            return Ok(match self.first_frame {
                FirstFramePolicy::Retain => GateDecision::Retain { score: None },
                FirstFramePolicy::SeedOnly => GateDecision::Seed,
            });
        };

        if held.intensity.dimensions() != candidate.dimensions() {
            return Err(SiftError::IncompatibleFrame {
                expected: held.intensity.dimensions(),
                found: candidate.dimensions(),
            });
        }

        let intensity = to_intensity(candidate);
        let score = structural_similarity(&held.intensity, &intensity)?;
        log::trace!("tick {tick}: ssim {score:.4} against tick {}", held.tick);

        // Anti-correlated frames score below zero; a threshold of 0 still
        // means "never retain".
        if score.max(0.0) < self.threshold {
            self.held = Some(HeldReference { tick, intensity });
            Ok(GateDecision::Retain { score: Some(score) })
        } else {
            Ok(GateDecision::Discard { score })
        }
    }

    /// Tick of the held reference, if any candidate has been seen.
    pub fn held_tick(&self) -> Option<u64> {
        self.held.as_ref().map(|held| held.tick)
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Forget the held reference, as if no candidate had been seen.
    pub fn reset(&mut self) {
        self.held = None;
    }
}
