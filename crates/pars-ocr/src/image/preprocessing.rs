//! Page cleanup ahead of recognition.
//!
//! The chain is fixed: grayscale, upscale small scans, median blur, adaptive
//! mean threshold. Each step is a plain function returning `Result`, and
//! [`Preprocessor::normalize`] turns a failing step into a degraded result
//! instead of an error.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::median_filter;

use super::debug::StageObserver;
use super::threshold::adaptive_mean_threshold;
use crate::core::config::PreprocessingConfig;
use crate::{ParsOcrError, Result};

pub const STEP_ORIGINAL: &str = "00_original";
pub const STEP_GRAYSCALE: &str = "01_grayscale";
pub const STEP_RESIZED: &str = "02_resized";
pub const STEP_MEDIAN_BLUR: &str = "03_median_blur";
pub const STEP_THRESHOLD: &str = "04_adaptive_threshold";

pub struct Preprocessor {
    config: PreprocessingConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Run the cleanup chain.
    ///
    /// Never fails. When a step errors, the error is logged and the image as it
    /// was before that step is returned; the remaining steps are skipped.
    pub fn normalize(&self, image: DynamicImage) -> DynamicImage {
        self.normalize_observed(image, None)
    }

    /// Like [`normalize`](Self::normalize), reporting each intermediate image.
    pub fn normalize_observed(&self, image: DynamicImage, observer: Option<&dyn StageObserver>) -> DynamicImage {
        let observe = |step: &str, image: &DynamicImage| {
            if let Some(observer) = observer {
                observer.observe(step, image);
            }
        };
        observe(STEP_ORIGINAL, &image);

        let gray = match to_grayscale(&image) {
            Ok(gray) => gray,
            Err(e) => return degraded(STEP_GRAYSCALE, e, image),
        };
        let current = DynamicImage::ImageLuma8(gray);
        observe(STEP_GRAYSCALE, &current);

        let config = &self.config;
        let steps: [(&str, &dyn Fn(&GrayImage) -> Result<GrayImage>); 3] = [
            (STEP_RESIZED, &|img| upscale_to_min_long_edge(img, config.min_long_edge)),
            (STEP_MEDIAN_BLUR, &|img| median_blur(img, config.median_kernel)),
            (STEP_THRESHOLD, &|img| {
                binarize(img, config.threshold_block_size, config.threshold_offset)
            }),
        ];

        let mut current = current;
        for (step, run) in steps {
            let next = match current.as_luma8() {
                Some(gray) => run(gray),
                None => Err(ParsOcrError::image_processing("Expected a grayscale image")),
            };
            match next {
                Ok(next) => {
                    current = DynamicImage::ImageLuma8(next);
                    observe(step, &current);
                }
                Err(e) => return degraded(step, e, current),
            }
        }

        current
    }
}

fn degraded(step: &str, error: ParsOcrError, last_good: DynamicImage) -> DynamicImage {
    tracing::error!(
        stage = "preprocess",
        step,
        error = %error,
        "Preprocessing step failed, continuing with the last good image"
    );
    last_good
}

/// Rec.601 luminance (0.299 R + 0.587 G + 0.114 B).
///
/// `DynamicImage::to_luma8` uses Rec.709 weights, so colour input is converted
/// here with 14-bit fixed-point 601 coefficients. Gray input passes through.
pub fn to_grayscale(image: &DynamicImage) -> Result<GrayImage> {
    ensure_not_empty(image.width(), image.height())?;
    if !image.color().has_color() {
        return Ok(image.to_luma8());
    }

    let rgb = image.to_rgb8();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([rec601_luma(r, g, b)])
    }))
}

const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Scale up so the longer side equals `min_long_edge`. Images already that
/// large are returned unchanged.
pub fn upscale_to_min_long_edge(image: &GrayImage, min_long_edge: u32) -> Result<GrayImage> {
    let (width, height) = image.dimensions();
    ensure_not_empty(width, height)?;

    let Some((new_width, new_height)) = upscaled_dimensions(width, height, min_long_edge) else {
        return Ok(image.clone());
    };

    Ok(imageops::resize(image, new_width, new_height, FilterType::CatmullRom))
}

/// Target size for an image whose longer side is below `min_long_edge`.
pub fn upscaled_dimensions(width: u32, height: u32, min_long_edge: u32) -> Option<(u32, u32)> {
    let long = width.max(height);
    if long == 0 || long >= min_long_edge {
        return None;
    }

    let scale = f64::from(min_long_edge) / f64::from(long);
    let scale_short = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, min_long_edge);

    if width >= height {
        Some((min_long_edge, scale_short(height)))
    } else {
        Some((scale_short(width), min_long_edge))
    }
}

pub fn median_blur(image: &GrayImage, kernel: u32) -> Result<GrayImage> {
    ensure_not_empty(image.width(), image.height())?;
    if kernel == 0 || kernel % 2 == 0 {
        return Err(ParsOcrError::image_processing(format!(
            "Median kernel must be a positive odd number, got {}",
            kernel
        )));
    }

    let radius = kernel / 2;
    Ok(median_filter(image, radius, radius))
}

pub fn binarize(image: &GrayImage, block_size: u32, offset: i32) -> Result<GrayImage> {
    ensure_not_empty(image.width(), image.height())?;
    if block_size < 3 || block_size % 2 == 0 {
        return Err(ParsOcrError::image_processing(format!(
            "Threshold block size must be odd and at least 3, got {}",
            block_size
        )));
    }

    Ok(adaptive_mean_threshold(image, block_size, offset))
}

fn ensure_not_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ParsOcrError::image_processing(format!(
            "Image has no pixels ({}x{})",
            width, height
        )));
    }
    Ok(())
}
