//! Error types for digit recognition operations.
//!
//! Failures come in two tiers. Degenerate input (a stroke too short to
//! resample) is the only per-call error a caller is expected to handle;
//! everything else signals a broken deployment; a missing or truncated
//! weight blob cannot be retried into working.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recognition operations.
pub type Result<T> = std::result::Result<T, RecognizerError>;

/// Errors that can occur while loading weights or classifying strokes.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// Weight blob file not found or unreadable.
    #[error("failed to load weight asset {path}: {source}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Weight blob is shorter than the fixed parameter layout requires.
    #[error("weight blob truncated: {actual} bytes, {required} required")]
    WeightBlobTruncated { required: usize, actual: usize },

    /// A stroke's total arc length is below the resampling threshold.
    #[error("degenerate stroke: arc length {arc_length} below minimum {minimum}")]
    DegenerateStroke { arc_length: f32, minimum: f32 },

    /// Input vector size does not match what a layer expects.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl RecognizerError {
    /// Create an asset load error for the given path.
    #[must_use]
    pub fn asset_load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::AssetLoad {
            path: path.into(),
            source,
        }
    }

    /// Create a degenerate stroke error.
    #[must_use]
    pub fn degenerate_stroke(arc_length: f32, minimum: f32) -> Self {
        Self::DegenerateStroke {
            arc_length,
            minimum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_truncated_blob() {
        let err = RecognizerError::WeightBlobTruncated {
            required: 13_098_536,
            actual: 128,
        };
        assert_eq!(
            err.to_string(),
            "weight blob truncated: 128 bytes, 13098536 required"
        );
    }

    #[test]
    fn test_error_display_degenerate_stroke() {
        let err = RecognizerError::degenerate_stroke(0.25, 1.0);
        assert_eq!(
            err.to_string(),
            "degenerate stroke: arc length 0.25 below minimum 1"
        );
    }

    #[test]
    fn test_error_display_asset_load() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RecognizerError::asset_load("/missing/trained.dat", io);
        assert!(err.to_string().contains("/missing/trained.dat"));
    }
}
