use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tesseract page segmentation mode.
///
/// Each mode is an assumption about the page layout handed to the recognizer.
/// Serialized as its numeric value so configuration files read `modes = [3, 4, 6, 11]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SegmentationMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl SegmentationMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(Self::OsdOnly),
            1 => Ok(Self::AutoOsd),
            2 => Ok(Self::AutoOnly),
            3 => Ok(Self::Auto),
            4 => Ok(Self::SingleColumn),
            5 => Ok(Self::SingleBlockVertical),
            6 => Ok(Self::SingleBlock),
            7 => Ok(Self::SingleLine),
            8 => Ok(Self::SingleWord),
            9 => Ok(Self::CircleWord),
            10 => Ok(Self::SingleChar),
            11 => Ok(Self::SparseText),
            12 => Ok(Self::SparseTextOsd),
            13 => Ok(Self::RawLine),
            _ => Err(format!("Invalid PSM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Modes that only run orientation detection and never produce text.
    pub fn is_osd_only(&self) -> bool {
        matches!(self, Self::OsdOnly)
    }
}

impl TryFrom<u8> for SegmentationMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<SegmentationMode> for u8 {
    fn from(mode: SegmentationMode) -> Self {
        mode.as_u8()
    }
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A single word reported by the recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedToken {
    pub text: String,
    /// Whole-number score 0-100, or -1 for regions the engine did not treat
    /// as text.
    pub confidence: f64,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            left: 0,
            top: 0,
            width: 0,
            height: 0,
        }
    }
}

/// Outcome of one segmentation-mode hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Tokens that passed the confidence floor, in detection order.
    pub tokens: Vec<RecognizedToken>,
    pub text: String,
    /// Mean confidence of `tokens`, always within `[0, 100]`.
    pub confidence: f64,
}

impl RecognitionResult {
    /// Filter `tokens` by `min_confidence` (strictly greater) and aggregate.
    ///
    /// Token scores are compared and averaged as whole numbers; any fraction is
    /// truncated first.
    pub fn from_tokens(tokens: Vec<RecognizedToken>, min_confidence: f64) -> Self {
        let kept: Vec<RecognizedToken> = tokens
            .into_iter()
            .map(|mut t| {
                t.confidence = t.confidence.trunc();
                t
            })
            .filter(|t| t.confidence > min_confidence)
            .collect();

        if kept.is_empty() {
            return Self::empty();
        }

        let text = kept.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
        let sum: f64 = kept.iter().map(|t| t.confidence).sum();
        let confidence = (sum / kept.len() as f64).clamp(0.0, 100.0);

        Self {
            tokens: kept,
            text,
            confidence,
        }
    }

    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            text: String::new(),
            confidence: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Named recognition profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilePreset {
    /// Modes 3, 4, 6, 11 with a token floor of 20.
    Primary,
    /// Adds sparse-text modes 12 and 13, raises the floor to 30 and enables
    /// heavy noise removal in the recognizer.
    Tuned,
}

impl FromStr for ProfilePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "tuned" => Ok(Self::Tuned),
            other => Err(format!("Unknown recognition profile '{}'. Expected 'primary' or 'tuned'", other)),
        }
    }
}

/// The set of hypotheses to run and how each one is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionProfile {
    pub modes: Vec<SegmentationMode>,
    /// Tokens must score strictly above this to count.
    pub min_confidence: f64,
    pub language: String,
    /// Tesseract OCR engine mode (3 = default, based on what is available).
    pub engine_mode: u8,
    pub dpi: u32,
    pub preserve_interword_spaces: bool,
    /// Extra Tesseract variables, applied verbatim.
    pub variables: BTreeMap<String, String>,
}

impl Default for RecognitionProfile {
    fn default() -> Self {
        Self::primary()
    }
}

impl RecognitionProfile {
    pub fn primary() -> Self {
        Self {
            modes: vec![
                SegmentationMode::Auto,
                SegmentationMode::SingleColumn,
                SegmentationMode::SingleBlock,
                SegmentationMode::SparseText,
            ],
            min_confidence: 20.0,
            language: "fas".to_string(),
            engine_mode: 3,
            dpi: 300,
            preserve_interword_spaces: true,
            variables: BTreeMap::new(),
        }
    }

    pub fn tuned() -> Self {
        let mut variables = BTreeMap::new();
        variables.insert("textord_heavy_nr".to_string(), "1".to_string());
        variables.insert("textord_min_linesize".to_string(), "2.5".to_string());

        Self {
            modes: vec![
                SegmentationMode::Auto,
                SegmentationMode::SingleColumn,
                SegmentationMode::SingleBlock,
                SegmentationMode::SparseText,
                SegmentationMode::SparseTextOsd,
                SegmentationMode::RawLine,
            ],
            min_confidence: 30.0,
            variables,
            ..Self::primary()
        }
    }

    pub fn preset(preset: ProfilePreset) -> Self {
        match preset {
            ProfilePreset::Primary => Self::primary(),
            ProfilePreset::Tuned => Self::tuned(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.modes.is_empty() {
            return Err("Recognition profile must list at least one segmentation mode".to_string());
        }

        for (index, mode) in self.modes.iter().enumerate() {
            if mode.is_osd_only() {
                return Err(format!("Segmentation mode {} only detects orientation and yields no text", mode));
            }
            if self.modes[..index].contains(mode) {
                return Err(format!("Segmentation mode {} is listed more than once", mode));
            }
        }

        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(format!(
                "min_confidence must be within 0-100, got {}",
                self.min_confidence
            ));
        }

        if self.language.trim().is_empty() {
            return Err("Recognition language cannot be empty".to_string());
        }

        if self.engine_mode > 3 {
            return Err(format!("Invalid OCR engine mode: {}. Must be 0-3", self.engine_mode));
        }

        if self.dpi == 0 {
            return Err("Recognition DPI hint must be positive".to_string());
        }

        Ok(())
    }

    /// Recognizer configuration for one hypothesis of this profile.
    pub fn config_for(&self, mode: SegmentationMode) -> RecognitionConfig {
        RecognitionConfig {
            mode,
            language: self.language.clone(),
            engine_mode: self.engine_mode,
            dpi: self.dpi,
            preserve_interword_spaces: self.preserve_interword_spaces,
            variables: self.variables.clone(),
        }
    }
}

/// Everything the recognizer needs for a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    pub mode: SegmentationMode,
    pub language: String,
    pub engine_mode: u8,
    pub dpi: u32,
    pub preserve_interword_spaces: bool,
    pub variables: BTreeMap<String, String>,
}

impl fmt::Display for RecognitionConfig {
    /// Renders the equivalent `tesseract` command-line options.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--oem {} --psm {} -l {} --dpi {}",
            self.engine_mode, self.mode, self.language, self.dpi
        )?;
        if self.preserve_interword_spaces {
            write!(f, " -c preserve_interword_spaces=1")?;
        }
        for (name, value) in &self.variables {
            write!(f, " -c {}={}", name, value)?;
        }
        Ok(())
    }
}
