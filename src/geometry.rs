//! 2D point arithmetic and small geometric utilities.
//!
//! Everything in here is plain value math over [`Point`]: vector operators,
//! distances, projection onto line segments, and a brute-force angle
//! optimizer. Stroke capture layers feed arbitrary screen coordinates in;
//! no particular range is assumed.

use std::f32::consts::PI;
use std::ops::{Add, Mul, Sub};

/// A 2D coordinate. Pure value, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a point from its coordinates.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product with another point interpreted as a vector.
    #[must_use]
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared vector length.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared_to(self, other: Point) -> f32 {
        (self - other).length_squared()
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        self.distance_squared_to(other).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Squared distance from `test` to the segment from `start` to `end`.
///
/// The segment is parameterized as `start + t * (end - start)`; the
/// projection of `test` is clamped to `t` in [0, 1] so points beyond
/// either endpoint measure against that endpoint.
#[must_use]
pub fn shortest_distance_squared_to_segment(start: Point, end: Point, test: Point) -> f32 {
    let segment = end - start;
    let segment_length_squared = segment.length_squared();
    if segment_length_squared == 0.0 {
        return start.distance_squared_to(test);
    }

    let t = (test - start).dot(segment) / segment_length_squared;
    if t < 0.0 {
        start.distance_squared_to(test)
    } else if t > 1.0 {
        end.distance_squared_to(test)
    } else {
        let projection = start + segment * t;
        projection.distance_squared_to(test)
    }
}

/// Number of candidate angles swept over a full turn by [`optimize_angles`].
const ANGLE_SWEEP_STEPS: f32 = 270.0;

/// Find the rotation (and optional vertical flip) that best aligns a set of
/// adjustable angles with their targets.
///
/// Sweeps [0, 2π) in 270 steps, scoring each candidate by the summed
/// `1 - cos` error over all pairs, and returns the rotation with the lowest
/// total error. A flip is only considered when more than one angle pair is
/// given. An empty input yields `(0.0, false)`.
#[must_use]
pub fn optimize_angles(angles: &[(f32, f32)]) -> (f32, bool) {
    if angles.is_empty() {
        return (0.0, false);
    }

    let mut min_error: Option<f64> = None;
    let mut min_angle: f32 = 0.0;
    let mut min_flip = false;
    let angle_step = 2.0 * PI / ANGLE_SWEEP_STEPS;

    let possible_flips: &[bool] = if angles.len() > 1 {
        &[false, true]
    } else {
        &[false]
    };

    for &flip in possible_flips {
        let mut test_angle: f32 = 0.0;
        while test_angle < 2.0 * PI {
            let mut error: f64 = 0.0;
            for &(changeable, target) in angles {
                let difference = if flip {
                    -changeable - target
                } else {
                    changeable - target
                };
                error += 1.0 - f64::from(test_angle + difference).cos();
            }
            if min_error.is_none_or(|current| error < current) {
                min_error = Some(error);
                min_angle = if flip { -test_angle } else { test_angle };
                min_flip = flip;
            }
            test_angle += angle_step;
        }
    }

    (min_angle, min_flip)
}
