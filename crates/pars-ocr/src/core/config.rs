//! Pipeline configuration.
//!
//! All sections default to the values the pipeline was tuned with, so an empty
//! file (or no file at all) yields a working configuration.

use crate::ocr::types::RecognitionProfile;
use crate::{ParsOcrError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`PipelineConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "pars-ocr.toml";

/// Top-level configuration for a pipeline run.
///
/// # Example
///
/// ```rust
/// use pars_ocr::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.preprocessing.min_long_edge, 1200);
/// assert_eq!(config.rotation.languages, "fas+eng");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocessing: PreprocessingConfig,
    pub rotation: RotationConfig,
    pub recognition: RecognitionProfile,
    pub output: OutputConfig,
    pub pdf: PdfConfig,
    /// Directory holding `*.traineddata`. Falls back to `TESSDATA_PREFIX` and
    /// the usual install locations when unset.
    pub tessdata_dir: Option<PathBuf>,
}

/// Parameters of the fixed cleanup chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Images whose longer side is shorter than this are upscaled to it.
    pub min_long_edge: u32,
    /// Median filter window side, odd.
    pub median_kernel: u32,
    /// Adaptive threshold neighbourhood side, odd and at least 3.
    pub threshold_block_size: u32,
    /// Constant subtracted from the neighbourhood mean.
    pub threshold_offset: i32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            min_long_edge: 1200,
            median_kernel: 3,
            threshold_block_size: 17,
            threshold_offset: 3,
        }
    }
}

impl PreprocessingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_long_edge == 0 {
            return Err(ParsOcrError::validation("min_long_edge must be greater than 0"));
        }
        if self.median_kernel == 0 || self.median_kernel % 2 == 0 {
            return Err(ParsOcrError::validation(format!(
                "median_kernel must be a positive odd number, got {}",
                self.median_kernel
            )));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return Err(ParsOcrError::validation(format!(
                "threshold_block_size must be odd and at least 3, got {}",
                self.threshold_block_size
            )));
        }
        Ok(())
    }
}

/// Orientation detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub enabled: bool,
    /// Resolution hint handed to the detector.
    pub dpi: u32,
    /// Script set the detector is initialised with.
    pub languages: String,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: 300,
            languages: "fas+eng".to_string(),
        }
    }
}

/// Where results and artifacts go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// Root for per-step debug images. Disabled when unset.
    pub debug_dir: Option<PathBuf>,
    /// Where rasterized PDF pages are saved. Defaults to the PDF's directory.
    pub page_artifact_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            debug_dir: None,
            page_artifact_dir: None,
        }
    }
}

/// PDF rasterization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub target_dpi: i32,
    /// Upper bound for either side of a rendered page, in pixels.
    pub max_image_dimension: i32,
    pub auto_adjust_dpi: bool,
    pub min_dpi: i32,
    pub max_dpi: i32,
    /// Directory containing the Pdfium shared library. System lookup when unset.
    pub library_dir: Option<PathBuf>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            target_dpi: 200,
            max_image_dimension: 65536,
            auto_adjust_dpi: true,
            min_dpi: 72,
            max_dpi: 600,
            library_dir: None,
        }
    }
}

impl PdfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_dpi <= 0 || self.max_dpi < self.min_dpi {
            return Err(ParsOcrError::validation(format!(
                "Invalid PDF DPI range {}-{}",
                self.min_dpi, self.max_dpi
            )));
        }
        if self.target_dpi <= 0 {
            return Err(ParsOcrError::validation("PDF target_dpi must be positive"));
        }
        if self.max_image_dimension <= 0 {
            return Err(ParsOcrError::validation("PDF max_image_dimension must be positive"));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Check every section, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.preprocessing.validate()?;

        if self.rotation.dpi == 0 {
            return Err(ParsOcrError::validation("Rotation DPI hint must be positive"));
        }
        if self.rotation.enabled && self.rotation.languages.trim().is_empty() {
            return Err(ParsOcrError::validation("Rotation languages cannot be empty"));
        }

        self.recognition.validate().map_err(ParsOcrError::validation)?;
        self.pdf.validate()?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ParsOcrError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| ParsOcrError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| ParsOcrError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ParsOcrError::validation(format!(
                "Unsupported config file format: {}. Use .toml, .yaml or .json",
                path.display()
            ))),
        }
    }

    /// Discover `pars-ocr.toml` in the current directory or its parents.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(ParsOcrError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Using discovered config");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ParsOcrError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
