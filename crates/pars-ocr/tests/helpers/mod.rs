//! Shared fixtures for integration tests.
//!
//! Backends here are in-memory stand-ins for Tesseract and Pdfium so the
//! pipeline can be driven without native libraries.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, GrayImage, Luma};
use pars_ocr::core::config::RotationConfig;
use pars_ocr::ocr::{
    OcrError, OrientationDetector, RecognitionConfig, RecognizedToken, RotationEstimate, SegmentationMode,
    TextRecognizer,
};
use pars_ocr::pdf::{PageRasterizer, PdfError};
use pars_ocr::{OutputConfig, PipelineConfig};
use tracing_subscriber::fmt::MakeWriter;

/// One recognizer invocation as seen by [`FakeRecognizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerCall {
    pub mode: SegmentationMode,
    pub width: u32,
    pub height: u32,
}

/// Reports "12345" for any page with dark pixels and only a non-text region
/// for blank pages, the way Tesseract does.
#[derive(Default)]
pub struct FakeRecognizer {
    pub calls: RefCell<Vec<RecognizerCall>>,
    pub failing_mode: Option<SegmentationMode>,
}

impl FakeRecognizer {
    pub fn failing_on(mode: SegmentationMode) -> Self {
        Self {
            failing_mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn modes_called(&self) -> Vec<u8> {
        self.calls.borrow().iter().map(|call| call.mode.as_u8()).collect()
    }
}

impl TextRecognizer for FakeRecognizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn recognize(&self, image: &DynamicImage, config: &RecognitionConfig) -> Result<Vec<RecognizedToken>, OcrError> {
        self.calls.borrow_mut().push(RecognizerCall {
            mode: config.mode,
            width: image.width(),
            height: image.height(),
        });

        if Some(config.mode) == self.failing_mode {
            return Err(OcrError::ProcessingFailed(format!("psm {} exploded", config.mode)));
        }

        let has_ink = image.to_luma8().pixels().any(|p| p[0] < 128);
        if !has_ink {
            return Ok(vec![RecognizedToken::new("", -1.0)]);
        }

        Ok(vec![
            RecognizedToken::new("12345", 80.0 + config.mode.as_u8() as f64),
            RecognizedToken::new("~", 12.0),
        ])
    }
}

/// Always answers with the same estimate, or fails when `degrees` is `None`.
pub struct FakeDetector {
    pub degrees: Option<u32>,
    pub calls: RefCell<usize>,
}

impl FakeDetector {
    pub fn upright() -> Self {
        Self::rotating(0)
    }

    pub fn rotating(degrees: u32) -> Self {
        Self {
            degrees: Some(degrees),
            calls: RefCell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            degrees: None,
            calls: RefCell::new(0),
        }
    }
}

impl OrientationDetector for FakeDetector {
    fn name(&self) -> &str {
        "fake-osd"
    }

    fn detect(&self, _image: &DynamicImage, _config: &RotationConfig) -> Result<RotationEstimate, OcrError> {
        *self.calls.borrow_mut() += 1;
        self.degrees
            .map(RotationEstimate::new)
            .ok_or_else(|| OcrError::OrientationDetectionFailed("Too few characters".to_string()))
    }
}

/// Hands back pre-built pages, or an error when `pages` is `None`.
pub struct FakeRasterizer {
    pub pages: Option<Vec<DynamicImage>>,
}

impl PageRasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake-pdf"
    }

    fn rasterize(&self, _path: &Path) -> Result<Vec<DynamicImage>, PdfError> {
        self.pages
            .clone()
            .ok_or_else(|| PdfError::InvalidPdf("trailer not found".to_string()))
    }
}

/// A white page with a few solid dark bars, large enough to skip upscaling.
pub fn inked_page(width: u32, height: u32) -> DynamicImage {
    let page = GrayImage::from_fn(width, height, |x, y| {
        let in_bar = (200..260).contains(&(y % 400)) && x > 100 && x < width - 100;
        if in_bar { Luma([0]) } else { Luma([255]) }
    });
    DynamicImage::ImageLuma8(page)
}

pub fn blank_page(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255])))
}

pub fn save_png(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).expect("write fixture image");
    path
}

/// Default configuration writing results under `root/output`.
pub fn config_in(root: &Path) -> PipelineConfig {
    PipelineConfig {
        output: OutputConfig {
            output_dir: root.join("output"),
            ..OutputConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a scoped subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
