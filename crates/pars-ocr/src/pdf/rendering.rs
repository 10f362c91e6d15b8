use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};

use super::PageRasterizer;
use super::error::{PdfError, Result};
use crate::core::config::PdfConfig;

const PDF_POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRenderOptions {
    pub target_dpi: i32,
    pub max_image_dimension: i32,
    pub auto_adjust_dpi: bool,
    pub min_dpi: i32,
    pub max_dpi: i32,
}

impl Default for PageRenderOptions {
    fn default() -> Self {
        Self::from(&PdfConfig::default())
    }
}

impl From<&PdfConfig> for PageRenderOptions {
    fn from(config: &PdfConfig) -> Self {
        Self {
            target_dpi: config.target_dpi,
            max_image_dimension: config.max_image_dimension,
            auto_adjust_dpi: config.auto_adjust_dpi,
            min_dpi: config.min_dpi,
            max_dpi: config.max_dpi,
        }
    }
}

impl PageRenderOptions {
    /// DPI to render a page of the given size (in PDF points) at.
    pub fn dpi_for(&self, width_points: f64, height_points: f64) -> i32 {
        if self.auto_adjust_dpi {
            calculate_optimal_dpi(
                width_points,
                height_points,
                self.target_dpi,
                self.max_image_dimension,
                self.min_dpi,
                self.max_dpi,
            )
        } else {
            self.target_dpi
        }
    }
}

/// Rasterizes PDFs with Pdfium.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    options: PageRenderOptions,
}

impl PdfiumRasterizer {
    /// Bind to Pdfium in `config.library_dir`, or the system library when unset.
    pub fn new(config: &PdfConfig) -> Result<Self> {
        let bindings = match &config.library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfError::LibraryUnavailable(e.to_string()))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            options: PageRenderOptions::from(config),
        })
    }

    pub fn options(&self) -> &PageRenderOptions {
        &self.options
    }

    fn render_page(&self, page: &PdfPage, index: usize) -> Result<DynamicImage> {
        let width_points = page.width().value;
        let height_points = page.height().value;
        let dpi = self.options.dpi_for(width_points as f64, height_points as f64);
        let scale = dpi as f64 / PDF_POINTS_PER_INCH;

        let config = PdfRenderConfig::new()
            .set_target_width(((width_points as f64 * scale) as i32).max(1))
            .set_target_height(((height_points as f64 * scale) as i32).max(1))
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::RenderingFailed(format!("Failed to render page {}: {}", index + 1, e)))?;

        tracing::debug!(page = index + 1, dpi, "Rendered PDF page");
        Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>> {
        let bytes = std::fs::read(path).map_err(|e| PdfError::IOError(format!("{}: {}", path.display(), e)))?;

        let document = self.pdfium.load_pdf_from_byte_slice(&bytes, None).map_err(|e| {
            let message = e.to_string();
            if message.to_lowercase().contains("password") {
                PdfError::PasswordRequired
            } else {
                PdfError::InvalidPdf(message)
            }
        })?;

        let mut images = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            images.push(self.render_page(&page, index)?);
        }

        if images.is_empty() {
            return Err(PdfError::PageNotFound(1));
        }
        Ok(images)
    }
}

/// Highest DPI not above `target_dpi` at which neither side exceeds
/// `max_dimension` pixels, clamped to `[min_dpi, max_dpi]`.
pub fn calculate_optimal_dpi(
    page_width: f64,
    page_height: f64,
    target_dpi: i32,
    max_dimension: i32,
    min_dpi: i32,
    max_dpi: i32,
) -> i32 {
    let width_inches = page_width / PDF_POINTS_PER_INCH;
    let height_inches = page_height / PDF_POINTS_PER_INCH;

    let width_at_target = (width_inches * target_dpi as f64) as i32;
    let height_at_target = (height_inches * target_dpi as f64) as i32;

    if width_at_target <= max_dimension && height_at_target <= max_dimension {
        return target_dpi.clamp(min_dpi, max_dpi);
    }

    let width_limited = (max_dimension as f64 / width_inches) as i32;
    let height_limited = (max_dimension as f64 / height_inches) as i32;

    width_limited.min(height_limited).clamp(min_dpi, max_dpi)
}
