//! Recognition and orientation capabilities.
//!
//! The pipeline only talks to OCR engines through these two traits, so the
//! image stages and the hypothesis runner can be exercised with in-memory
//! doubles. The Tesseract implementations live in [`crate::ocr::tesseract`]
//! behind the `tesseract` feature.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::error::OcrError;
use super::types::{RecognitionConfig, RecognizedToken};
use crate::core::config::RotationConfig;

/// Runs text recognition on a prepared page image.
///
/// Implementations must not mutate shared state between calls: every
/// segmentation-mode hypothesis is an independent invocation.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use pars_ocr::ocr::{OcrError, RecognitionConfig, RecognizedToken, TextRecognizer};
///
/// struct Canned;
///
/// impl TextRecognizer for Canned {
///     fn name(&self) -> &str {
///         "canned"
///     }
///
///     fn recognize(&self, _image: &DynamicImage, _config: &RecognitionConfig) -> Result<Vec<RecognizedToken>, OcrError> {
///         Ok(vec![RecognizedToken::new("12345", 91.0)])
///     }
/// }
/// ```
pub trait TextRecognizer {
    /// Backend name used in log records.
    fn name(&self) -> &str;

    /// Return every word the engine found, in detection order, unfiltered.
    fn recognize(&self, image: &DynamicImage, config: &RecognitionConfig) -> Result<Vec<RecognizedToken>, OcrError>;
}

/// Estimates how far a page must be rotated to read upright.
pub trait OrientationDetector {
    fn name(&self) -> &str;

    /// An `Err` means no estimate is available, which is different from an
    /// upright page (`RotationEstimate::UPRIGHT`).
    fn detect(&self, image: &DynamicImage, config: &RotationConfig) -> Result<RotationEstimate, OcrError>;
}

/// Clockwise rotation, in degrees, that brings the page upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEstimate {
    pub degrees: u32,
}

impl RotationEstimate {
    pub const UPRIGHT: RotationEstimate = RotationEstimate { degrees: 0 };

    pub fn new(degrees: u32) -> Self {
        Self { degrees }
    }

    /// Whether applying this rotation would leave the page unchanged.
    pub fn is_noop(&self) -> bool {
        self.degrees % 360 == 0
    }
}
