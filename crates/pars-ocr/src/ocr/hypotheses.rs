//! Multi-hypothesis recognition.
//!
//! Recognition accuracy on scanned Persian pages varies with the layout
//! assumption handed to the engine, so every mode of the selected profile is
//! run and all results are returned. Picking a winner is left to the caller.

use std::collections::BTreeMap;

use image::DynamicImage;

use super::backend::TextRecognizer;
use super::types::{RecognitionProfile, RecognitionResult, SegmentationMode};

/// Results keyed by segmentation mode. A mode whose recognizer call failed is
/// absent.
pub type Hypotheses = BTreeMap<SegmentationMode, RecognitionResult>;

pub struct RecognitionHypothesesRunner<'a> {
    recognizer: &'a dyn TextRecognizer,
    profile: RecognitionProfile,
}

impl<'a> RecognitionHypothesesRunner<'a> {
    pub fn new(recognizer: &'a dyn TextRecognizer, profile: RecognitionProfile) -> Self {
        Self { recognizer, profile }
    }

    pub fn profile(&self) -> &RecognitionProfile {
        &self.profile
    }

    pub fn recognize(&self, image: &DynamicImage) -> Hypotheses {
        let mut results = Hypotheses::new();

        for &mode in &self.profile.modes {
            let config = self.profile.config_for(mode);
            tracing::debug!(
                stage = "recognize",
                backend = self.recognizer.name(),
                psm = %mode,
                config = %config,
                "Running recognition hypothesis"
            );

            let tokens = match self.recognizer.recognize(image, &config) {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::error!(stage = "recognize", psm = %mode, error = %e, "Recognition failed, skipping mode");
                    continue;
                }
            };

            let total = tokens.len();
            let result = RecognitionResult::from_tokens(tokens, self.profile.min_confidence);
            tracing::info!(
                stage = "recognize",
                psm = %mode,
                tokens = total,
                kept = result.tokens.len(),
                "PSM {} - OCR completed with average confidence: {:.2}%",
                mode,
                result.confidence
            );

            results.insert(mode, result);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::error::OcrError;
    use crate::ocr::types::{RecognitionConfig, RecognizedToken};
    use image::GrayImage;
    use std::cell::RefCell;

    struct ScriptedRecognizer {
        calls: RefCell<Vec<SegmentationMode>>,
        failing: Option<SegmentationMode>,
    }

    impl ScriptedRecognizer {
        fn new(failing: Option<SegmentationMode>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failing,
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn name(&self) -> &str {
            "scripted"
        }

        fn recognize(&self, _image: &DynamicImage, config: &RecognitionConfig) -> Result<Vec<RecognizedToken>, OcrError> {
            self.calls.borrow_mut().push(config.mode);
            if Some(config.mode) == self.failing {
                return Err(OcrError::ProcessingFailed(format!("psm {} crashed", config.mode)));
            }
            Ok(vec![
                RecognizedToken::new(format!("psm{}", config.mode), 40.0 + config.mode.as_u8() as f64),
                RecognizedToken::new("noise", 15.0),
                RecognizedToken::new("", -1.0),
            ])
        }
    }

    fn page() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, image::Luma([255])))
    }

    #[test]
    fn test_runs_every_mode_in_profile_order() {
        let recognizer = ScriptedRecognizer::new(None);
        let runner = RecognitionHypothesesRunner::new(&recognizer, RecognitionProfile::primary());

        let results = runner.recognize(&page());

        assert_eq!(recognizer.calls.borrow().len(), 4);
        let keys: Vec<u8> = results.keys().map(|m| m.as_u8()).collect();
        assert_eq!(keys, vec![3, 4, 6, 11]);

        let auto = &results[&SegmentationMode::Auto];
        assert_eq!(auto.text, "psm3");
        assert_eq!(auto.confidence, 43.0);
    }

    #[test]
    fn test_failed_mode_is_skipped_without_touching_siblings() {
        let healthy = ScriptedRecognizer::new(None);
        let baseline = RecognitionHypothesesRunner::new(&healthy, RecognitionProfile::primary()).recognize(&page());

        let flaky = ScriptedRecognizer::new(Some(SegmentationMode::SingleBlock));
        let results = RecognitionHypothesesRunner::new(&flaky, RecognitionProfile::primary()).recognize(&page());

        assert_eq!(flaky.calls.borrow().len(), 4);
        assert!(!results.contains_key(&SegmentationMode::SingleBlock));
        assert_eq!(results.len(), 3);
        for (mode, result) in &results {
            assert_eq!(result, &baseline[mode]);
        }
    }

    #[test]
    fn test_profile_floor_applies() {
        let recognizer = ScriptedRecognizer::new(None);
        let mut profile = RecognitionProfile::tuned();
        profile.min_confidence = 50.0;
        let results = RecognitionHypothesesRunner::new(&recognizer, profile).recognize(&page());

        assert_eq!(results.len(), 6);
        // 40 + psm must exceed 50
        assert!(results[&SegmentationMode::Auto].is_empty());
        assert_eq!(results[&SegmentationMode::SparseText].text, "psm11");
        assert_eq!(results[&SegmentationMode::RawLine].confidence, 53.0);
    }

    #[test]
    fn test_confidence_always_within_bounds() {
        let recognizer = ScriptedRecognizer::new(None);
        let results =
            RecognitionHypothesesRunner::new(&recognizer, RecognitionProfile::tuned()).recognize(&page());
        for result in results.values() {
            assert!((0.0..=100.0).contains(&result.confidence));
        }
    }
}
