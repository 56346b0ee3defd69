//! Stroke normalization: arc-length resampling into a canonical frame.
//!
//! Raw strokes arrive with whatever point density the capture layer
//! produced: fast pen movement gives sparse points, slow movement gives
//! dense ones. Normalization removes both the sampling artifacts and the
//! position/scale of the drawing:
//!
//! 1. each stroke is resampled at even intervals of cumulative path
//!    length (32 segments per stroke), and
//! 2. the whole digit is translated to its bounding-box center and scaled
//!    so the longer bounding-box dimension spans exactly 1.0.
//!
//! The result is deterministic and independent of where on screen the
//! digit was drawn or how large it was.

use crate::error::{RecognizerError, Result};
use crate::geometry::Point;

/// One continuous pen/finger motion, sampled in temporal order.
pub type Stroke = Vec<Point>;

/// One or more strokes together forming one character.
pub type DigitStrokes = Vec<Stroke>;

/// Number of arc-length segments each stroke is divided into.
pub const TARGET_SEGMENT_COUNT: usize = 32;

/// Resampled strokes shorter than this are dropped from the digit.
pub const MIN_RESAMPLED_POINTS: usize = 30;

/// Minimum total arc length for a stroke to be resampled at all.
pub const MIN_ARC_LENGTH: f32 = 1.0;

/// Normalize a digit sample into the canonical coordinate frame.
///
/// Each stroke is resampled by arc length, then all strokes are remapped
/// as `(point - bbox_center) * scale` where the scale maps the longer
/// bounding-box dimension to 1.0. A zero-extent axis contributes no
/// scaling instead of producing a non-finite factor.
///
/// A resampled stroke with fewer than [`MIN_RESAMPLED_POINTS`] points is
/// dropped silently while the rest of the digit is still normalized.
///
/// # Errors
///
/// Returns [`RecognizerError::DegenerateStroke`] when any stroke's total
/// arc length is below [`MIN_ARC_LENGTH`] (for example a single-point
/// stroke), or when no stroke survives resampling. The whole sample is
/// rejected, never partially normalized.
pub fn normalize_digit(digit: &DigitStrokes) -> Result<DigitStrokes> {
    let mut resampled_digit: DigitStrokes = Vec::with_capacity(digit.len());
    for stroke in digit {
        let resampled = resample_stroke(stroke)?;
        if resampled.len() >= MIN_RESAMPLED_POINTS {
            resampled_digit.push(resampled);
        }
        // else: too-short strokes contribute nothing, the rest of the
        // digit still goes through
    }

    let Some((top_left, bottom_right)) = bounding_box(&resampled_digit) else {
        return Err(RecognizerError::degenerate_stroke(0.0, MIN_ARC_LENGTH));
    };

    let extent = bottom_right - top_left;
    let center = top_left + extent * 0.5;

    let x_scale = finite_or_one(1.0 / extent.x);
    let y_scale = finite_or_one(1.0 / extent.y);
    let scale = x_scale.min(y_scale);

    Ok(resampled_digit
        .into_iter()
        .map(|stroke| {
            stroke
                .into_iter()
                .map(|point| (point - center) * scale)
                .collect()
        })
        .collect())
}

/// Resample one stroke at `arc_length / 32` intervals.
///
/// Walks the raw polyline accumulating distance and emits a linearly
/// interpolated point every time the accumulated distance crosses another
/// multiple of the step, which yields about `TARGET_SEGMENT_COUNT - 1`
/// evenly spaced points.
///
/// # Errors
///
/// Returns [`RecognizerError::DegenerateStroke`] when the stroke's total
/// arc length is below [`MIN_ARC_LENGTH`].
fn resample_stroke(stroke: &Stroke) -> Result<Stroke> {
    let mut total_distance: f32 = 0.0;
    for pair in stroke.windows(2) {
        total_distance += pair[0].distance_to(pair[1]);
    }
    if total_distance < MIN_ARC_LENGTH {
        return Err(RecognizerError::degenerate_stroke(
            total_distance,
            MIN_ARC_LENGTH,
        ));
    }

    let distance_per_point = total_distance / TARGET_SEGMENT_COUNT as f32;
    let mut new_points: Stroke = Vec::with_capacity(TARGET_SEGMENT_COUNT);

    let mut distance_covered: f32 = 0.0;
    let mut distance_so_far: f32 = 0.0;
    for pair in stroke.windows(2) {
        let (last_point, point) = (pair[0], pair[1]);
        let next_distance = last_point.distance_to(point);
        let new_total_distance = distance_so_far + next_distance;
        while distance_covered + distance_per_point < new_total_distance {
            distance_covered += distance_per_point;
            let ratio = (distance_covered - distance_so_far) / next_distance;
            new_points.push(last_point + (point - last_point) * ratio);
        }
        distance_so_far = new_total_distance;
    }

    Ok(new_points)
}

/// Axis-aligned bounding box over all points of all strokes, or `None`
/// when there are no points at all.
fn bounding_box(digit: &DigitStrokes) -> Option<(Point, Point)> {
    let mut top_left: Option<Point> = None;
    let mut bottom_right: Option<Point> = None;
    for stroke in digit {
        for &point in stroke {
            top_left = Some(match top_left {
                Some(captured) => Point::new(captured.x.min(point.x), captured.y.min(point.y)),
                None => point,
            });
            bottom_right = Some(match bottom_right {
                Some(captured) => Point::new(captured.x.max(point.x), captured.y.max(point.y)),
                None => point,
            });
        }
    }
    Some((top_left?, bottom_right?))
}

fn finite_or_one(scale: f32) -> f32 {
    if scale.is_finite() {
        scale
    } else {
        1.0
    }
}
