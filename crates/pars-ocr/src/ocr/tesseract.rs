//! Tesseract-backed recognizer and orientation detector.
//!
//! A fresh `TesseractAPI` handle is created per call. Handles are cheap next to
//! a recognition pass and this keeps every segmentation mode independent of the
//! variables set by the previous one.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use kreuzberg_tesseract::{TessOrientation, TessPageSegMode, TesseractAPI};

use super::backend::{OrientationDetector, RotationEstimate, TextRecognizer};
use super::error::OcrError;
use super::tessdata::{ensure_languages_installed, resolve_tessdata_dir};
use super::tsv::parse_tsv_tokens;
use super::types::{RecognitionConfig, RecognizedToken};
use crate::core::config::RotationConfig;
use crate::image::preprocessing::to_grayscale;

pub struct TesseractEngine {
    tessdata_dir: PathBuf,
}

impl TesseractEngine {
    /// Create an engine, resolving tessdata from `tessdata_dir`,
    /// `TESSDATA_PREFIX` or the usual install locations.
    pub fn new(tessdata_dir: Option<&Path>) -> Result<Self, OcrError> {
        let tessdata_dir = resolve_tessdata_dir(tessdata_dir).ok_or_else(|| {
            OcrError::BackendUnavailable(
                "Could not locate tessdata. Set TESSDATA_PREFIX or configure tessdata_dir".to_string(),
            )
        })?;

        tracing::debug!(tessdata = %tessdata_dir.display(), version = %TesseractAPI::version(), "Tesseract engine ready");
        Ok(Self { tessdata_dir })
    }

    pub fn tessdata_dir(&self) -> &Path {
        &self.tessdata_dir
    }

    pub fn version() -> String {
        TesseractAPI::version()
    }

    fn init_api(&self, languages: &str) -> Result<TesseractAPI, OcrError> {
        ensure_languages_installed(&self.tessdata_dir, languages)?;

        let datapath = self.tessdata_dir.to_string_lossy();
        let api = TesseractAPI::new();
        api.init(datapath.as_ref(), languages).map_err(|e| {
            OcrError::TesseractInitializationFailed(format!("Failed to initialize language '{}': {}", languages, e))
        })?;
        Ok(api)
    }

    fn set_gray_image(api: &TesseractAPI, image: &DynamicImage, dpi: u32) -> Result<(), OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::ProcessingFailed("Cannot run OCR on an empty image".to_string()));
        }
        let gray = to_grayscale(image).map_err(|e| OcrError::ProcessingFailed(e.to_string()))?;
        let (width, height) = gray.dimensions();

        api.set_image(gray.as_raw(), width as i32, height as i32, 1, width as i32)
            .map_err(|e| OcrError::ProcessingFailed(format!("Failed to set image: {}", e)))?;
        api.set_source_resolution(dpi as i32)
            .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set source resolution: {}", e)))?;
        Ok(())
    }
}

impl TextRecognizer for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage, config: &RecognitionConfig) -> Result<Vec<RecognizedToken>, OcrError> {
        let api = self.init_api(&config.language)?;

        api.set_variable("tessedit_ocr_engine_mode", &config.engine_mode.to_string())
            .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set engine mode: {}", e)))?;

        api.set_page_seg_mode(TessPageSegMode::from_int(config.mode.as_u8() as i32))
            .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set PSM mode {}: {}", config.mode, e)))?;

        if config.preserve_interword_spaces {
            api.set_variable("preserve_interword_spaces", "1").map_err(|e| {
                OcrError::InvalidConfiguration(format!("Failed to set preserve_interword_spaces: {}", e))
            })?;
        }

        for (name, value) in &config.variables {
            api.set_variable(name, value)
                .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set {}: {}", name, e)))?;
        }

        Self::set_gray_image(&api, image, config.dpi)?;

        api.recognize()
            .map_err(|e| OcrError::ProcessingFailed(format!("Failed to recognize text: {}", e)))?;

        let tsv = api
            .get_tsv_text(0)
            .map_err(|e| OcrError::ProcessingFailed(format!("Failed to extract TSV: {}", e)))?;

        Ok(parse_tsv_tokens(&tsv))
    }
}

impl OrientationDetector for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract-osd"
    }

    fn detect(&self, image: &DynamicImage, config: &RotationConfig) -> Result<RotationEstimate, OcrError> {
        let api = self.init_api(&config.languages)?;

        api.set_page_seg_mode(TessPageSegMode::PSM_AUTO_OSD)
            .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set OSD mode: {}", e)))?;

        Self::set_gray_image(&api, image, config.dpi)?;

        let page_iter = api
            .analyze_layout()
            .map_err(|e| OcrError::OrientationDetectionFailed(format!("Layout analysis failed: {}", e)))?;
        page_iter.begin();

        let (orientation, _, _, _) = page_iter
            .orientation()
            .map_err(|e| OcrError::OrientationDetectionFailed(format!("No orientation estimate: {}", e)))?;

        Ok(rotation_for(orientation))
    }
}

/// Map where the top of the page points to the clockwise rotation that fixes it.
fn rotation_for(orientation: TessOrientation) -> RotationEstimate {
    match orientation {
        TessOrientation::ORIENTATION_PAGE_RIGHT => RotationEstimate::new(270),
        TessOrientation::ORIENTATION_PAGE_DOWN => RotationEstimate::new(180),
        TessOrientation::ORIENTATION_PAGE_LEFT => RotationEstimate::new(90),
        _ => RotationEstimate::UPRIGHT,
    }
}
