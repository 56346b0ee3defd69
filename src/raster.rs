//! Rasterization of normalized strokes into a grayscale pixel buffer.
//!
//! Normalized digits live in a frame roughly spanning [-0.5, 0.5]; the
//! rasterizer maps that frame into pixel space with a 0.8 shrink (so the
//! strokes never clip the border), a vertical flip to match a top-left
//! origin, and draws each stroke as a connected white polyline two pixels
//! wide on a black background.

use crate::geometry::{shortest_distance_squared_to_segment, Point};
use crate::normalize::DigitStrokes;

/// Pixel dimensions of a rasterized digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    /// Create an image size.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Single-channel 8-bit image, row-major with a top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    pixels: Vec<u8>,
    size: ImageSize,
}

/// Stroke width in pixels at the raster resolution.
const STROKE_WIDTH: f32 = 2.0;

/// Fraction of the frame the normalized digit is shrunk into.
const FRAME_SCALE: f32 = 0.8;

impl GrayscaleImage {
    /// Create an all-black image.
    #[must_use]
    pub fn black(size: ImageSize) -> Self {
        Self {
            pixels: vec![0; size.pixel_count()],
            size,
        }
    }

    /// Image dimensions.
    #[must_use]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Raw row-major pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel value at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.size.width && y < self.size.height {
            Some(self.pixels[y * self.size.width + x])
        } else {
            None
        }
    }

    /// Convert to the network's input representation: `f32` in [0, 1].
    #[must_use]
    pub fn to_input(&self) -> Vec<f32> {
        self.pixels.iter().map(|&p| f32::from(p) / 255.0).collect()
    }

    fn set_white(&mut self, x: usize, y: usize) {
        if x < self.size.width && y < self.size.height {
            self.pixels[y * self.size.width + x] = u8::MAX;
        }
    }
}

/// Render normalized strokes into a fresh grayscale image.
///
/// `rotation_angle` rotates every point before the pixel mapping; pass
/// `0.0` for baseline classification. The mapping is
/// `(rotated * 0.8 + 0.5) * dimension` with the vertical axis flipped.
#[must_use]
pub fn render(normalized: &DigitStrokes, size: ImageSize, rotation_angle: f32) -> GrayscaleImage {
    let mut image = GrayscaleImage::black(size);
    let cos_angle = rotation_angle.cos();
    let sin_angle = rotation_angle.sin();

    let transform = |point: Point| -> Point {
        let rotated = Point::new(
            cos_angle * point.x + sin_angle * point.y,
            cos_angle * point.y + sin_angle * point.x,
        );
        Point::new(
            (rotated.x * FRAME_SCALE + 0.5) * size.width as f32,
            size.height as f32 - (rotated.y * FRAME_SCALE + 0.5) * size.height as f32,
        )
    };

    for stroke in normalized {
        for pair in stroke.windows(2) {
            stamp_segment(&mut image, transform(pair[0]), transform(pair[1]));
        }
    }

    image
}

/// Paint every pixel whose center lies within half a stroke width of the
/// segment.
fn stamp_segment(image: &mut GrayscaleImage, start: Point, end: Point) {
    let radius = STROKE_WIDTH / 2.0;
    let radius_squared = radius * radius;

    let min_x = (start.x.min(end.x) - radius).floor().max(0.0) as usize;
    let max_x = (start.x.max(end.x) + radius).ceil() as usize;
    let min_y = (start.y.min(end.y) - radius).floor().max(0.0) as usize;
    let max_y = (start.y.max(end.y) + radius).ceil() as usize;

    for y in min_y..=max_y.min(image.size.height.saturating_sub(1)) {
        for x in min_x..=max_x.min(image.size.width.saturating_sub(1)) {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if shortest_distance_squared_to_segment(start, end, center) <= radius_squared {
                image.set_white(x, y);
            }
        }
    }
}
