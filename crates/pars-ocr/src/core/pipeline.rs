//! Document orchestration.
//!
//! [`PageOrchestrator`] runs load, cleanup, rotation and multi-mode
//! recognition for each page and writes the per-mode result files. PDFs are
//! rasterized first and their pages processed one after another.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use super::config::PipelineConfig;
use super::output::ResultWriter;
use crate::image::debug::{DebugImageSink, StageObserver};
use crate::image::load::load_image;
use crate::image::preprocessing::Preprocessor;
use crate::image::rotation::RotationCorrector;
use crate::ocr::backend::{OrientationDetector, TextRecognizer};
use crate::ocr::hypotheses::{Hypotheses, RecognitionHypothesesRunner};
use crate::ocr::types::SegmentationMode;
use crate::pdf::PageRasterizer;
use crate::{ParsOcrError, Result};

/// Debug step name for the image handed to the recognizer.
pub const STEP_FINAL: &str = "10_final";

/// Result of one segmentation mode for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeOutput {
    pub mode: SegmentationMode,
    pub confidence: f64,
    pub text: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub source: PathBuf,
    /// Ordered by mode. Modes whose recognition failed are absent.
    pub modes: Vec<ModeOutput>,
}

impl ImageReport {
    pub fn mode(&self, mode: SegmentationMode) -> Option<&ModeOutput> {
        self.modes.iter().find(|output| output.mode == mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFailure {
    /// 1-based page number.
    pub page: usize,
    pub error: String,
}

/// Everything produced for one input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub pages: Vec<ImageReport>,
    pub failed_pages: Vec<PageFailure>,
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub source: PathBuf,
    pub report: Option<DocumentReport>,
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sequences the page pipeline over images and PDFs.
///
/// # Example
///
/// ```rust,no_run
/// # use pars_ocr::{PageOrchestrator, PipelineConfig};
/// # use pars_ocr::ocr::{OrientationDetector, TextRecognizer};
/// # fn run(recognizer: &dyn TextRecognizer, detector: &dyn OrientationDetector) -> pars_ocr::Result<()> {
/// let orchestrator = PageOrchestrator::new(PipelineConfig::default(), recognizer, detector)?;
/// let report = orchestrator.process_image_file("scan.tiff")?;
/// for output in &report.modes {
///     println!("psm {}: {:.2}%", output.mode, output.confidence);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PageOrchestrator<'a> {
    config: PipelineConfig,
    preprocessor: Preprocessor,
    recognizer: &'a dyn TextRecognizer,
    detector: &'a dyn OrientationDetector,
    rasterizer: Option<&'a dyn PageRasterizer>,
    writer: ResultWriter,
    debug: Option<DebugImageSink>,
}

impl<'a> PageOrchestrator<'a> {
    /// Validate `config` and wire the backends together.
    pub fn new(
        config: PipelineConfig,
        recognizer: &'a dyn TextRecognizer,
        detector: &'a dyn OrientationDetector,
    ) -> Result<Self> {
        config.validate()?;

        let debug = config.output.debug_dir.as_deref().map(DebugImageSink::new);
        if let Some(sink) = &debug {
            tracing::info!(path = %sink.run_dir().display(), "Saving debug images");
        }

        Ok(Self {
            preprocessor: Preprocessor::new(config.preprocessing.clone()),
            writer: ResultWriter::new(config.output.output_dir.clone()),
            config,
            recognizer,
            detector,
            rasterizer: None,
            debug,
        })
    }

    /// Enable PDF input.
    pub fn with_rasterizer(mut self, rasterizer: &'a dyn PageRasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn debug_run_dir(&self) -> Option<&Path> {
        self.debug.as_ref().map(DebugImageSink::run_dir)
    }

    /// Load, clean, rotate and recognize one image without writing anything
    /// but debug images.
    pub fn recognize_image(&self, path: impl AsRef<Path>) -> Result<Hypotheses> {
        let path = path.as_ref();
        let image = load_image(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), stage = "load", error = %e, "Failed to load image");
        })?;
        Ok(self.recognize_loaded(path, image))
    }

    fn recognize_loaded(&self, path: &Path, image: DynamicImage) -> Hypotheses {
        let observer = self.debug.as_ref().map(|sink| sink.for_source(path));
        let observer = observer.as_ref().map(|o| o as &dyn StageObserver);

        tracing::info!(path = %path.display(), stage = "preprocess", "Preprocessing image");
        let cleaned = self.preprocessor.normalize_observed(image, observer);

        let upright = if self.config.rotation.enabled {
            RotationCorrector::new(self.detector, self.config.rotation.clone()).correct(cleaned)
        } else {
            cleaned
        };
        if let Some(observer) = observer {
            observer.observe(STEP_FINAL, &upright);
        }

        let runner = RecognitionHypothesesRunner::new(self.recognizer, self.config.recognition.clone());
        runner.recognize(&upright)
    }

    /// Run the full flow for one raster image and write one file per mode.
    pub fn process_image_file(&self, path: impl AsRef<Path>) -> Result<ImageReport> {
        let path = path.as_ref();
        let _span = tracing::info_span!("image", path = %path.display()).entered();

        let hypotheses = self.recognize_image(path)?;

        let mut modes = Vec::with_capacity(hypotheses.len());
        for (mode, result) in hypotheses {
            let output_path = self.writer.write(path, mode, &result)?;
            modes.push(ModeOutput {
                mode,
                confidence: result.confidence,
                text: result.text,
                output_path,
            });
        }

        Ok(ImageReport {
            source: path.to_path_buf(),
            modes,
        })
    }

    /// Rasterize a PDF, save each page as `<stem>_<n>.tiff` and process the
    /// pages in order. A failing page is recorded and the next one still runs.
    pub fn process_pdf(&self, path: impl AsRef<Path>) -> Result<DocumentReport> {
        let path = path.as_ref();
        let _span = tracing::info_span!("document", path = %path.display()).entered();

        let rasterizer = self.rasterizer.ok_or_else(|| {
            ParsOcrError::MissingDependency("PDF input requires a page rasterizer (enable the `pdf` feature)".to_string())
        })?;

        tracing::info!(path = %path.display(), backend = rasterizer.name(), "Converting PDF to images");
        let pages = rasterizer.rasterize(path).map_err(|e| {
            tracing::error!(path = %path.display(), stage = "rasterize", error = %e, "Failed to rasterize PDF");
            ParsOcrError::from(e)
        })?;

        let artifact_dir = self.page_artifact_dir(path);
        std::fs::create_dir_all(&artifact_dir)?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let mut report = DocumentReport {
            source: path.to_path_buf(),
            pages: Vec::with_capacity(pages.len()),
            failed_pages: Vec::new(),
        };

        for (index, page) in pages.into_iter().enumerate() {
            let number = index + 1;
            let page_path = artifact_dir.join(format!("{}_{}.tiff", stem, number));
            let _page_span = tracing::info_span!("page", number).entered();

            let outcome = save_page(&page, &page_path).and_then(|()| {
                drop(page);
                self.process_image_file(&page_path)
            });

            match outcome {
                Ok(page_report) => report.pages.push(page_report),
                Err(e) => {
                    tracing::error!(
                        path = %page_path.display(),
                        page = number,
                        error = %e,
                        "Failed to process PDF page, continuing with the next one"
                    );
                    report.failed_pages.push(PageFailure {
                        page: number,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Dispatch on the extension: `.pdf` (any case) goes through
    /// [`process_pdf`](Self::process_pdf), everything else is treated as an image.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<DocumentReport> {
        let path = path.as_ref();
        if is_pdf(path) {
            return self.process_pdf(path);
        }

        let page = self.process_image_file(path)?;
        Ok(DocumentReport {
            source: path.to_path_buf(),
            pages: vec![page],
            failed_pages: Vec::new(),
        })
    }

    /// Process documents one after another. A fatal error only affects the
    /// document it came from.
    pub fn process_batch<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<BatchItemResult> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                match self.process_path(path) {
                    Ok(report) => BatchItemResult {
                        source: path.to_path_buf(),
                        report: Some(report),
                        error: None,
                    },
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "Document failed");
                        BatchItemResult {
                            source: path.to_path_buf(),
                            report: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }

    fn page_artifact_dir(&self, pdf_path: &Path) -> PathBuf {
        match &self.config.output.page_artifact_dir {
            Some(dir) => dir.clone(),
            None => pdf_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn save_page(page: &DynamicImage, path: &Path) -> Result<()> {
    page.save_with_format(path, ImageFormat::Tiff).map_err(|e| match e {
        image::ImageError::IoError(io) => ParsOcrError::Io(io),
        other => ParsOcrError::image_processing_with_source(format!("Failed to save {}", path.display()), other),
    })?;
    tracing::info!(path = %path.display(), "Saved page image");
    Ok(())
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
