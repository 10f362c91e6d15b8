//! pars-ocr: OCR for scanned Persian documents.
//!
//! A page goes through a fixed cleanup chain (grayscale, upscale, median blur,
//! adaptive threshold), is rotated upright, and is then recognized once per
//! page-segmentation mode of the selected profile. Each mode's text and mean
//! confidence is written to its own result file so the best hypothesis can be
//! picked afterwards.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pars_ocr::ocr::TesseractEngine;
//! use pars_ocr::{PageOrchestrator, PipelineConfig};
//!
//! let config = PipelineConfig::discover()?.unwrap_or_default();
//! let engine = TesseractEngine::new(config.tessdata_dir.as_deref())?;
//! let orchestrator = PageOrchestrator::new(config, &engine, &engine)?;
//! let report = orchestrator.process_path("letter.tiff")?;
//! # Ok::<(), pars_ocr::ParsOcrError>(())
//! ```
//!
//! # Features
//!
//! - `tesseract`: [`ocr::TesseractEngine`], recognition and orientation
//!   detection through Tesseract.
//! - `pdf`: [`pdf::PdfiumRasterizer`], PDF input through Pdfium.
//! - `full`: both.

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod image;
pub mod ocr;
pub mod pdf;

pub use error::{ParsOcrError, Result};

pub use core::config::{OutputConfig, PdfConfig, PipelineConfig, PreprocessingConfig, RotationConfig};
pub use core::output::ResultWriter;
pub use core::pipeline::{BatchItemResult, DocumentReport, ImageReport, ModeOutput, PageFailure, PageOrchestrator};

pub use ocr::{ProfilePreset, RecognitionProfile, RecognitionResult, SegmentationMode};
