//! # digitink
//!
//! Handwritten digit recognition from raw ink strokes. The pipeline
//! turns variable-length, variable-speed point samples into a digit
//! label with a confidence score:
//!
//! 1. **Normalize**: arc-length resampling into a canonical
//!    scale/position-invariant frame ([`normalize`]).
//! 2. **Rasterize**: draw the normalized strokes into a 28×28 grayscale
//!    buffer ([`raster`]).
//! 3. **Infer**: run the buffer through a fixed conv→pool→conv→pool→
//!    fc→fc network with pre-trained weights ([`network`], [`weights`]).
//! 4. **Label**: argmax over the ten class logits ([`recognizer`]).
//!
//! The weight blob is a fixed 13 MB asset produced offline by the
//! training pipeline; it is loaded and validated once at recognizer
//! construction and reused for the process lifetime.
//!
//! ## Example
//!
//! ```ignore
//! use digitink::prelude::*;
//!
//! let mut recognizer = DigitRecognizer::from_file("trained.dat")?;
//! let digit: DigitStrokes = capture_strokes();
//! match recognizer.classify_digit(&digit) {
//!     Some(c) => println!("{} ({:.2})", c.label, c.confidence),
//!     None => println!("Unknown"),
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod network;
pub mod normalize;
pub mod raster;
pub mod recognizer;
pub mod weights;

pub use error::{RecognizerError, Result};

/// Re-exports for convenient access.
pub mod prelude {
    pub use crate::error::{RecognizerError, Result};
    pub use crate::geometry::Point;
    pub use crate::normalize::{normalize_digit, DigitStrokes, Stroke};
    pub use crate::raster::{render, GrayscaleImage, ImageSize};
    pub use crate::recognizer::{Classification, DigitLabel, DigitRecognizer};
    pub use crate::weights::WeightStore;
}
