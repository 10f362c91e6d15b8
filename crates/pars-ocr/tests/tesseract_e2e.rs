//! Recognition against a real Tesseract install.
//!
//! Skipped (with a note on stderr) when no tessdata directory with
//! `eng.traineddata` can be found.

#![cfg(feature = "tesseract")]

mod helpers;

use image::{DynamicImage, GrayImage, Luma};
use pars_ocr::image::Preprocessor;
use pars_ocr::ocr::{
    RecognitionHypothesesRunner, RecognitionProfile, SegmentationMode, TesseractEngine, ensure_languages_installed,
};
use pars_ocr::{PageOrchestrator, PreprocessingConfig};
use tempfile::tempdir;

const GLYPH_ROWS: usize = 7;

/// 5x7 bitmap digits.
const DIGITS: [(char, [&str; GLYPH_ROWS]); 5] = [
    ('1', ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('2', [".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
    ('3', ["#####", "...#.", "..#..", "...#.", "....#", "#...#", ".###."]),
    ('4', ["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."]),
    ('5', ["#####", "#....", "####.", "....#", "....#", "#...#", ".###."]),
];

/// Draw `text` with the bitmap digits on a white `width` x `height` page.
fn render_digits(text: &str, width: u32, height: u32, cell: u32) -> GrayImage {
    let mut page = GrayImage::from_pixel(width, height, Luma([255]));
    let (origin_x, origin_y) = (100, (height - cell * GLYPH_ROWS as u32) / 2);

    for (index, ch) in text.chars().enumerate() {
        let Some((_, rows)) = DIGITS.iter().find(|(digit, _)| *digit == ch) else {
            continue;
        };
        let glyph_x = origin_x + index as u32 * cell * 7;

        for (row, pattern) in rows.iter().enumerate() {
            for (col, mark) in pattern.chars().enumerate() {
                if mark != '#' {
                    continue;
                }
                for dy in 0..cell {
                    for dx in 0..cell {
                        let x = glyph_x + col as u32 * cell + dx;
                        let y = origin_y + row as u32 * cell + dy;
                        page.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }
    }

    page
}

fn engine_with_english() -> Option<TesseractEngine> {
    let engine = match TesseractEngine::new(None) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Skipping Tesseract test: {}", e);
            return None;
        }
    };
    if let Err(e) = ensure_languages_installed(engine.tessdata_dir(), "eng") {
        eprintln!("Skipping Tesseract test: {}", e);
        return None;
    }
    Some(engine)
}

fn english_profile(modes: Vec<SegmentationMode>) -> RecognitionProfile {
    RecognitionProfile {
        modes,
        language: "eng".to_string(),
        ..RecognitionProfile::primary()
    }
}

#[test]
fn test_low_resolution_digits_are_recognized() {
    let Some(engine) = engine_with_english() else {
        return;
    };

    let page = DynamicImage::ImageLuma8(render_digits("12345", 600, 200, 4));
    let cleaned = Preprocessor::new(PreprocessingConfig::default()).normalize(page);
    assert_eq!(cleaned.width(), 1200);

    let runner = RecognitionHypothesesRunner::new(&engine, english_profile(vec![SegmentationMode::Auto]));
    let results = runner.recognize(&cleaned);

    let auto = &results[&SegmentationMode::Auto];
    assert!(auto.text.contains("12345"), "recognized {:?}", auto.text);
    assert!(auto.confidence > 20.0);
    assert!(auto.confidence <= 100.0);
}

#[test]
fn test_blank_page_produces_empty_results() {
    let Some(engine) = engine_with_english() else {
        return;
    };

    let page = DynamicImage::ImageLuma8(GrayImage::from_pixel(600, 400, Luma([255])));
    let cleaned = Preprocessor::new(PreprocessingConfig::default()).normalize(page);

    let profile = english_profile(vec![SegmentationMode::Auto, SegmentationMode::SingleBlock]);
    let results = RecognitionHypothesesRunner::new(&engine, profile).recognize(&cleaned);

    for result in results.values() {
        assert_eq!(result.text, "");
        assert_eq!(result.confidence, 0.0);
    }
}

#[test]
fn test_orchestrator_writes_results_with_real_engine() {
    let Some(engine) = engine_with_english() else {
        return;
    };

    let dir = tempdir().unwrap();
    let image_path = dir.path().join("digits.png");
    render_digits("12345", 600, 200, 4).save(&image_path).unwrap();

    let mut config = helpers::config_in(dir.path());
    config.rotation.enabled = false;
    config.recognition = english_profile(vec![SegmentationMode::Auto, SegmentationMode::SparseText]);

    let report = PageOrchestrator::new(config, &engine, &engine)
        .unwrap()
        .process_image_file(&image_path)
        .unwrap();

    for output in &report.modes {
        let body = std::fs::read_to_string(&output.output_path).unwrap();
        assert!(body.starts_with("OCR Confidence: "));
        assert!(body.contains("%\n\n"));
    }
}
