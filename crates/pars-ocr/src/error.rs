//! Error types for pars-ocr.
//!
//! Every fallible library operation returns [`ParsOcrError`]. The pipeline
//! distinguishes between failures that abort a document and failures that only
//! degrade one stage:
//!
//! - `Io`, `ImageLoad` and `Pdf` are fatal to the document being processed.
//! - `ImageProcessing` errors come from a single preprocessing or rotation
//!   step; the pipeline logs them and continues with the last good image.
//! - `Ocr` errors come from the recognition or orientation backends; a failed
//!   segmentation mode is skipped, its siblings still run.
//!
//! System I/O errors always bubble up unchanged through the `Io` variant.
//!
//! # Example
//!
//! ```rust
//! use pars_ocr::{ParsOcrError, Result};
//!
//! fn read_page(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!     if bytes.is_empty() {
//!         return Err(ParsOcrError::image_load(format!("Empty image file: {}", path)));
//!     }
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `ParsOcrError`.
pub type Result<T> = std::result::Result<T, ParsOcrError>;

/// Main error type for all pars-ocr operations.
#[derive(Debug, Error)]
pub enum ParsOcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image load error: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("PDF error: {message}")]
    Pdf {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),
}

impl From<crate::ocr::error::OcrError> for ParsOcrError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        ParsOcrError::Ocr {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for ParsOcrError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        ParsOcrError::Pdf {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl ParsOcrError {
    error_constructor!(image_load, ImageLoad);
    error_constructor!(pdf, Pdf);
    error_constructor!(ocr, Ocr);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(validation, Validation);

    /// Whether this error aborts the document it was raised for.
    pub fn is_fatal_to_document(&self) -> bool {
        matches!(
            self,
            ParsOcrError::Io(_) | ParsOcrError::ImageLoad { .. } | ParsOcrError::Pdf { .. }
        )
    }
}
