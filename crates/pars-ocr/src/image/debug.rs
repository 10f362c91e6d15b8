//! Optional per-step debug images.
//!
//! Purely observational: nothing written here is ever read back, and a failed
//! write is logged and otherwise ignored.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

/// Receives the image produced by each named pipeline step.
pub trait StageObserver {
    fn observe(&self, step: &str, image: &DynamicImage);
}

/// Writes `<run_dir>/<base>_<step>.png` for every observed step.
///
/// One run directory, named after the local time the sink was created
/// (`YYYYmmdd_HHMMSS`), is shared by every image of an orchestrator run.
#[derive(Debug, Clone)]
pub struct DebugImageSink {
    run_dir: PathBuf,
}

impl DebugImageSink {
    pub fn new(debug_root: &Path) -> Self {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_run_dir(debug_root.join(stamp))
    }

    pub fn with_run_dir(run_dir: PathBuf) -> Self {
        Self { run_dir }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Observer that prefixes every step with the stem of `source`.
    pub fn for_source<'a>(&'a self, source: &Path) -> SourceDebugImages<'a> {
        let base = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        SourceDebugImages { sink: self, base }
    }

    fn write(&self, base: &str, step: &str, image: &DynamicImage) {
        let path = self.run_dir.join(format!("{}_{}.png", base, step));

        let saved = std::fs::create_dir_all(&self.run_dir)
            .map_err(image::ImageError::IoError)
            .and_then(|()| image.save_with_format(&path, ImageFormat::Png));

        match saved {
            Ok(()) => tracing::debug!(path = %path.display(), step, "Saved debug image"),
            Err(e) => tracing::warn!(path = %path.display(), step, error = %e, "Could not save debug image"),
        }
    }
}

pub struct SourceDebugImages<'a> {
    sink: &'a DebugImageSink,
    base: String,
}

impl StageObserver for SourceDebugImages<'_> {
    fn observe(&self, step: &str, image: &DynamicImage) {
        self.sink.write(&self.base, step, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_run_dir_is_timestamped() {
        let dir = tempdir().unwrap();
        let sink = DebugImageSink::new(dir.path());
        let name = sink.run_dir().file_name().unwrap().to_string_lossy().into_owned();

        assert_eq!(name.len(), 15);
        assert_eq!(&name[8..9], "_");
        assert!(name.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_writes_named_png() {
        let dir = tempdir().unwrap();
        let sink = DebugImageSink::with_run_dir(dir.path().join("run"));
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0])));

        sink.for_source(Path::new("/scans/invoice_1.tiff")).observe("01_grayscale", &image);

        let written = dir.path().join("run").join("invoice_1_01_grayscale.png");
        assert!(written.is_file());
        assert_eq!(image::open(written).unwrap().width(), 4);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = DebugImageSink::with_run_dir(blocker.join("run"));
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([0])));

        sink.for_source(Path::new("a.png")).observe("10_final", &image);
        assert!(!blocker.join("run").exists());
    }
}
