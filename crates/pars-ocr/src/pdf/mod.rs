//! PDF rasterization.
//!
//! The pipeline depends on [`PageRasterizer`] only. The Pdfium-backed
//! implementation is compiled with the `pdf` feature.

pub mod error;
#[cfg(feature = "pdf")]
pub mod rendering;

use std::path::Path;

use image::DynamicImage;

pub use error::PdfError;
#[cfg(feature = "pdf")]
pub use rendering::{PageRenderOptions, PdfiumRasterizer};

/// Renders every page of a PDF, in page order.
pub trait PageRasterizer {
    fn name(&self) -> &str;

    /// The first image is page 1. Any error aborts the whole document.
    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>, PdfError>;
}
