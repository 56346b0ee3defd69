//! Loading and slicing the trained parameter blob.
//!
//! The network's parameters live in one flat file of little-endian `f32`
//! values at fixed byte offsets. That offset table is a hard contract
//! with the trained model: get one offset wrong and the network runs
//! happily on garbage. The blob is validated against the full required
//! length once at load time; per-layer views are decoded from byte
//! ranges that the load-time check already proved in bounds.

use crate::error::{RecognizerError, Result};
use std::path::Path;

/// Byte range of one parameter array inside the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamView {
    /// Byte offset of the first `f32`.
    pub offset: usize,
    /// Number of `f32` values.
    pub count: usize,
}

impl ParamView {
    /// Create a view covering `count` floats starting at `offset` bytes.
    #[must_use]
    pub const fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    /// Byte offset one past the end of this view.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.count * 4
    }
}

/// Conv1 kernel weights: 32 filters × 1 channel × 5×5.
pub const CONV1_WEIGHTS: ParamView = ParamView::new(0, 32 * 5 * 5);
/// Conv1 biases, one per output channel.
pub const CONV1_BIAS: ParamView = ParamView::new(3200, 32);
/// Conv2 kernel weights: 64 filters × 32 channels × 5×5.
pub const CONV2_WEIGHTS: ParamView = ParamView::new(3328, 64 * 32 * 5 * 5);
/// Conv2 biases.
pub const CONV2_BIAS: ParamView = ParamView::new(208_128, 64);
/// FC1 weights: 3136 inputs × 1024 outputs.
pub const FC1_WEIGHTS: ParamView = ParamView::new(208_384, 3136 * 1024);
/// FC1 biases.
pub const FC1_BIAS: ParamView = ParamView::new(13_053_440, 1024);
/// FC2 weights: 1024 inputs × 10 outputs.
pub const FC2_WEIGHTS: ParamView = ParamView::new(13_057_536, 1024 * 10);
/// FC2 biases.
pub const FC2_BIAS: ParamView = ParamView::new(13_098_496, 10);

/// Total size of the trained parameter file in bytes.
pub const WEIGHT_BLOB_LEN: usize = 13_098_536;

/// Immutable, validated parameter blob shared by all inference calls.
#[derive(Debug, Clone)]
pub struct WeightStore {
    blob: Vec<u8>,
}

impl WeightStore {
    /// Adopt an in-memory blob, e.g. one embedded with `include_bytes!()`.
    ///
    /// # Errors
    ///
    /// Returns [`RecognizerError::WeightBlobTruncated`] when the buffer is
    /// shorter than [`WEIGHT_BLOB_LEN`].
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let blob = bytes.into();
        if blob.len() < WEIGHT_BLOB_LEN {
            return Err(RecognizerError::WeightBlobTruncated {
                required: WEIGHT_BLOB_LEN,
                actual: blob.len(),
            });
        }
        Ok(Self { blob })
    }

    /// Read the blob from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`RecognizerError::AssetLoad`] when the file is missing or
    /// unreadable, and [`RecognizerError::WeightBlobTruncated`] when it is
    /// shorter than [`WEIGHT_BLOB_LEN`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let blob = std::fs::read(path)
            .map_err(|source| RecognizerError::asset_load(path, source))?;
        Self::from_bytes(blob)
    }

    /// Decode one parameter array from its byte range.
    ///
    /// Views are structural constants whose ranges were bounds-checked
    /// against [`WEIGHT_BLOB_LEN`] when the store was built, so decoding
    /// cannot run out of the buffer.
    #[must_use]
    pub fn decode(&self, view: ParamView) -> Vec<f32> {
        self.blob[view.offset..view.end()]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Total blob length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blob.len()
    }

    /// True when the blob holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }
}
