use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::{ParsOcrError, Result};

/// Decode a raster image from disk, sniffing the format from its content.
///
/// Missing files surface as `Io`; undecodable content as `ImageLoad`.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(ParsOcrError::Io)?;

    reader
        .decode()
        .map_err(|e| ParsOcrError::image_load_with_source(format!("Failed to decode {}", path.display()), e))
}
