use std::fmt;

/// Errors raised while turning a PDF into page images.
#[derive(Debug, Clone)]
pub enum PdfError {
    InvalidPdf(String),
    PasswordRequired,
    PageNotFound(usize),
    RenderingFailed(String),
    LibraryUnavailable(String),
    IOError(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PasswordRequired => write!(f, "PDF is password-protected"),
            PdfError::PageNotFound(page) => write!(f, "Page {} not found", page),
            PdfError::RenderingFailed(msg) => write!(f, "Page rendering failed: {}", msg),
            PdfError::LibraryUnavailable(msg) => write!(f, "Pdfium unavailable: {}", msg),
            PdfError::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            PdfError::InvalidPdf("corrupted header".to_string()).to_string(),
            "Invalid PDF: corrupted header"
        );
        assert_eq!(PdfError::PasswordRequired.to_string(), "PDF is password-protected");
        assert_eq!(PdfError::PageNotFound(4).to_string(), "Page 4 not found");
        assert_eq!(
            PdfError::LibraryUnavailable("libpdfium.so not found".to_string()).to_string(),
            "Pdfium unavailable: libpdfium.so not found"
        );
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(PdfError::RenderingFailed("oom".to_string()));
        assert_eq!(err.to_string(), "Page rendering failed: oom");
    }
}
