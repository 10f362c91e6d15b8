//! Result files.

use std::path::{Path, PathBuf};

use crate::Result;
use crate::ocr::types::{RecognitionResult, SegmentationMode};

/// Writes one UTF-8 text file per image and segmentation mode.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `out_<image file name>_psm<mode>.txt` inside the output directory.
    pub fn result_path(&self, image_path: &Path, mode: SegmentationMode) -> PathBuf {
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.output_dir.join(format!("out_{}_psm{}.txt", file_name, mode))
    }

    /// Write (or overwrite) the result for one mode. I/O errors are returned
    /// unchanged.
    pub fn write(&self, image_path: &Path, mode: SegmentationMode, result: &RecognitionResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.result_path(image_path, mode);
        std::fs::write(&path, render(result))?;

        tracing::info!(path = %path.display(), psm = %mode, "Saved OCR result");
        Ok(path)
    }
}

/// File body: confidence header, blank line, recognized text.
pub fn render(result: &RecognitionResult) -> String {
    format!("OCR Confidence: {:.2}%\n\n{}", result.confidence, result.text)
}
