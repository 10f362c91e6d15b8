//! Text recognition.
//!
//! Backends plug in through [`TextRecognizer`] and [`OrientationDetector`];
//! [`RecognitionHypothesesRunner`] runs every segmentation mode of a
//! [`RecognitionProfile`] against one page.

pub mod backend;
pub mod error;
pub mod hypotheses;
pub mod tessdata;
#[cfg(feature = "tesseract")]
pub mod tesseract;
pub mod tsv;
pub mod types;

pub use backend::{OrientationDetector, RotationEstimate, TextRecognizer};
pub use error::OcrError;
pub use hypotheses::{Hypotheses, RecognitionHypothesesRunner};
pub use tessdata::{ensure_languages_installed, resolve_tessdata_dir, split_languages};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;
pub use tsv::parse_tsv_tokens;
pub use types::{
    ProfilePreset, RecognitionConfig, RecognitionProfile, RecognitionResult, RecognizedToken, SegmentationMode,
};
