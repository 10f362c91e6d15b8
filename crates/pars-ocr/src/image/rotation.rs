//! Orientation correction.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::core::config::RotationConfig;
use crate::ocr::backend::{OrientationDetector, RotationEstimate};

const TRIG_EPSILON: f64 = 1e-10;

pub struct RotationCorrector<'a> {
    detector: &'a dyn OrientationDetector,
    config: RotationConfig,
}

impl<'a> RotationCorrector<'a> {
    pub fn new(detector: &'a dyn OrientationDetector, config: RotationConfig) -> Self {
        Self { detector, config }
    }

    /// Detect the page orientation and rotate the page upright.
    ///
    /// Never fails: when the detector has no estimate the input is returned
    /// untouched.
    pub fn correct(&self, image: DynamicImage) -> DynamicImage {
        let estimate = match self.detector.detect(&image, &self.config) {
            Ok(estimate) => estimate,
            Err(e) => {
                tracing::warn!(
                    stage = "rotation",
                    detector = self.detector.name(),
                    error = %e,
                    "Orientation detection failed, keeping image as is"
                );
                return image;
            }
        };

        tracing::info!(stage = "rotation", degrees = estimate.degrees, "Detected rotation angle");
        rotate_clockwise(image, estimate)
    }
}

/// Rotate clockwise by `estimate.degrees`, growing the canvas so no content is
/// cropped. Uncovered areas are filled white.
pub fn rotate_clockwise(image: DynamicImage, estimate: RotationEstimate) -> DynamicImage {
    if estimate.is_noop() {
        return image;
    }

    match estimate.degrees % 360 {
        90 => image.rotate90(),
        180 => image.rotate180(),
        270 => image.rotate270(),
        degrees => rotate_arbitrary(&image, degrees as f64),
    }
}

/// Canvas that holds a `width` x `height` image rotated by `degrees`.
pub fn rotated_canvas(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let radians = degrees.to_radians();
    let sin = snap(radians.sin().abs());
    let cos = snap(radians.cos().abs());
    let (w, h) = (f64::from(width), f64::from(height));

    let new_width = (h * sin + w * cos).floor() as u32;
    let new_height = (h * cos + w * sin).floor() as u32;
    (new_width, new_height)
}

fn snap(value: f64) -> f64 {
    if value < TRIG_EPSILON { 0.0 } else { value }
}

fn rotate_arbitrary(image: &DynamicImage, degrees: f64) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let (new_width, new_height) = rotated_canvas(width, height, degrees);
    if width == 0 || height == 0 || new_width == 0 || new_height == 0 {
        return image.clone();
    }

    // Pixel-centre coordinates: rotate about the old centre, land on the new one.
    let old_cx = (width as f32 - 1.0) / 2.0;
    let old_cy = (height as f32 - 1.0) / 2.0;
    let new_cx = (new_width as f32 - 1.0) / 2.0;
    let new_cy = (new_height as f32 - 1.0) / 2.0;

    let projection = Projection::translate(new_cx, new_cy)
        * Projection::rotate((degrees as f32).to_radians())
        * Projection::translate(-old_cx, -old_cy);

    match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(new_width, new_height);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([255]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        other => {
            let rgba = other.to_rgba8();
            let mut out = RgbaImage::new(new_width, new_height);
            warp_into(&rgba, &projection, Interpolation::Bilinear, Rgba([255, 255, 255, 255]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    }
}
