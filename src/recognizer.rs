//! Classifier facade: strokes in, digit labels out.
//!
//! [`DigitRecognizer`] owns the compiled network and orchestrates the
//! full pipeline: normalize → rasterize → infer → label. Construction
//! front-loads every fatal failure (missing or truncated weights,
//! parameter shape mismatches); after that the only per-call failure is
//! degenerate input, surfaced as `None`.

use crate::network::{Network, ScoreVector, CLASS_COUNT, INPUT_DIM};
use crate::normalize::{normalize_digit, DigitStrokes};
use crate::raster::{render, ImageSize};
use crate::weights::WeightStore;
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Human-readable digit label, one of `"0"` through `"9"`.
pub type DigitLabel = &'static str;

/// The ten class labels; index equals the digit's integer value.
pub const LABELS: [DigitLabel; CLASS_COUNT] =
    ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Label for a network output index.
#[must_use]
pub fn label_for_class(class: usize) -> Option<DigitLabel> {
    LABELS.get(class).copied()
}

/// Network output index for a label. Inverse of [`label_for_class`].
#[must_use]
pub fn class_for_label(label: &str) -> Option<usize> {
    LABELS.iter().position(|&candidate| candidate == label)
}

/// A recognized digit with the winning class's raw logit.
///
/// The confidence is not a calibrated probability; no softmax is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: DigitLabel,
    pub confidence: f32,
}

/// Digit classifier over the trained convolutional network.
///
/// Classification takes `&mut self` because the network reuses its
/// scratch buffers between calls; give each concurrent consumer its own
/// (cloned) instance.
#[derive(Debug, Clone)]
pub struct DigitRecognizer {
    network: Network,
    image_size: ImageSize,
}

impl DigitRecognizer {
    /// Build a recognizer from a validated weight store.
    ///
    /// # Errors
    ///
    /// Returns an error when the decoded parameters do not match the
    /// fixed layer shapes.
    pub fn new(store: &WeightStore) -> Result<Self> {
        Ok(Self {
            network: Network::compile(store)?,
            image_size: ImageSize::new(INPUT_DIM, INPUT_DIM),
        })
    }

    /// Build a recognizer straight from a weight blob on disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RecognizerError::AssetLoad`] or
    /// [`crate::RecognizerError::WeightBlobTruncated`] for a missing or
    /// short blob, plus any error from [`DigitRecognizer::new`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let store = WeightStore::from_file(path)?;
        Self::new(&store)
    }

    /// Raster dimensions fed to the network.
    #[must_use]
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    /// Classify one digit sample.
    ///
    /// Returns `None` only when normalization rejects the sample as
    /// degenerate (a stroke with near-zero arc length); the caller
    /// typically shows that as "unknown". Everything past normalization
    /// is deterministic and cannot fail per call.
    pub fn classify_digit(&mut self, digit: &DigitStrokes) -> Option<Classification> {
        let normalized = normalize_digit(digit).ok()?;
        let image = render(&normalized, self.image_size, 0.0);
        let scores = self.network.infer(&image.to_input());
        let (class, confidence) = winning_class(&scores);
        Some(Classification {
            label: label_for_class(class)?,
            confidence,
        })
    }

    /// Classify several digit samples as one string, all or nothing.
    ///
    /// If any sample fails to classify the whole call returns `None`;
    /// callers composing a multi-digit number get no partial reads.
    pub fn classify_multiple_digits(
        &mut self,
        samples: &[DigitStrokes],
    ) -> Option<Vec<DigitLabel>> {
        samples
            .iter()
            .map(|sample| self.classify_digit(sample).map(|c| c.label))
            .collect()
    }
}

/// Argmax over the logits with strict `>` comparison: ties go to the
/// lowest class index.
fn winning_class(scores: &ScoreVector) -> (usize, f32) {
    let mut best = (0, scores[0]);
    for (class, &score) in scores.iter().enumerate().skip(1) {
        if score > best.1 {
            best = (class, score);
        }
    }
    best
}
