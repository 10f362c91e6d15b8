use std::fmt;

/// Errors raised by recognition and orientation backends.
#[derive(Debug, Clone)]
pub enum OcrError {
    TesseractInitializationFailed(String),
    InvalidConfiguration(String),
    InvalidLanguageCode(String),
    OrientationDetectionFailed(String),
    ProcessingFailed(String),
    BackendUnavailable(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TesseractInitializationFailed(msg) => {
                write!(f, "Tesseract initialization failed: {}", msg)
            }
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvalidLanguageCode(msg) => write!(f, "Invalid language code: {}", msg),
            Self::OrientationDetectionFailed(msg) => write!(f, "Orientation detection failed: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
            Self::BackendUnavailable(msg) => write!(f, "OCR backend unavailable: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}
