//! pars-ocr command-line interface.
//!
//! `extract` runs the full pipeline over images and PDFs and writes one result
//! file per segmentation mode. `modes` compares the modes on a single image
//! without writing results.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pars_ocr::core::pipeline::is_pdf;
use pars_ocr::ocr::{OrientationDetector, TextRecognizer};
use pars_ocr::pdf::PageRasterizer;
use pars_ocr::{BatchItemResult, PageOrchestrator, PipelineConfig, ProfilePreset, RecognitionProfile};

#[derive(Parser)]
#[command(name = "pars-ocr", version, about = "OCR for scanned Persian documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text from images and PDFs
    Extract {
        /// Images or PDFs to process, in order
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Summary format printed to stdout
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show per-mode confidence and a text preview for one image
    Modes {
        image: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Characters of recognized text to show per mode
        #[arg(long, default_value_t = 200)]
        preview: usize,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Config file (.toml, .yaml, .json). Defaults to a discovered pars-ocr.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recognition profile
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Directory for result files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Save intermediate images under this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Tesseract tessdata directory
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// Skip orientation detection
    #[arg(long)]
    no_rotate: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// PSM 3, 4, 6, 11 with a confidence floor of 20
    Primary,
    /// PSM 3, 4, 6, 11, 12, 13 with a floor of 30 and noise removal
    Tuned,
}

impl From<ProfileArg> for ProfilePreset {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Primary => ProfilePreset::Primary,
            ProfileArg::Tuned => ProfilePreset::Tuned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl PipelineArgs {
    fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PipelineConfig::discover()?.unwrap_or_default(),
        };

        if let Some(profile) = self.profile {
            config.recognition = RecognitionProfile::preset(profile.into());
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if let Some(dir) = &self.debug_dir {
            config.output.debug_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.tessdata {
            config.tessdata_dir = Some(dir.clone());
        }
        if self.no_rotate {
            config.rotation.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Extract {
            paths,
            pipeline,
            format,
        } => run_extract(&paths, &pipeline, format),
        Command::Modes {
            image,
            pipeline,
            preview,
        } => run_modes(&image, &pipeline, preview),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_extract(paths: &[PathBuf], args: &PipelineArgs, format: OutputFormat) -> Result<ExitCode> {
    let config = args.load_config()?;
    let needs_pdf = paths.iter().any(|path| is_pdf(path));

    let results = with_backends(&config, needs_pdf, |recognizer, detector, rasterizer| {
        let mut orchestrator = PageOrchestrator::new(config.clone(), recognizer, detector)?;
        if let Some(rasterizer) = rasterizer {
            orchestrator = orchestrator.with_rasterizer(rasterizer);
        }
        Ok(orchestrator.process_batch(paths))
    })?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => print_summary(&results),
    }

    let failed = results.iter().filter(|item| !item.is_success()).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "Some documents could not be processed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_modes(image: &Path, args: &PipelineArgs, preview: usize) -> Result<ExitCode> {
    let config = args.load_config()?;

    let hypotheses = with_backends(&config, false, |recognizer, detector, _| {
        let orchestrator = PageOrchestrator::new(config.clone(), recognizer, detector)?;
        Ok(orchestrator.recognize_image(image)?)
    })?;

    for mode in &config.recognition.modes {
        println!("\n{}", "=".repeat(50));
        match hypotheses.get(mode) {
            Some(result) => {
                println!("PSM {}: confidence {:.2}%", mode, result.confidence);
                println!("{}", "=".repeat(50));
                let text: String = result.text.chars().take(preview).collect();
                println!("{}", text);
            }
            None => {
                println!("PSM {}: failed", mode);
                println!("{}", "=".repeat(50));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(results: &[BatchItemResult]) {
    for item in results {
        println!("{}", item.source.display());

        if let Some(error) = &item.error {
            println!("  FAILED: {}", error);
            continue;
        }

        let Some(report) = &item.report else {
            continue;
        };
        for page in &report.pages {
            if report.pages.len() > 1 {
                println!("  {}", page.source.display());
            }
            for output in &page.modes {
                println!(
                    "    psm {:>2}  {:>6.2}%  {}",
                    output.mode,
                    output.confidence,
                    output.output_path.display()
                );
            }
        }
        for failure in &report.failed_pages {
            println!("  page {} FAILED: {}", failure.page, failure.error);
        }
    }
}

#[cfg(feature = "tesseract")]
fn with_backends<T>(
    config: &PipelineConfig,
    needs_pdf: bool,
    run: impl FnOnce(&dyn TextRecognizer, &dyn OrientationDetector, Option<&dyn PageRasterizer>) -> Result<T>,
) -> Result<T> {
    let engine = pars_ocr::ocr::TesseractEngine::new(config.tessdata_dir.as_deref())?;
    tracing::debug!(version = %pars_ocr::ocr::TesseractEngine::version(), "Using Tesseract");

    let rasterizer = pdf_rasterizer(config, needs_pdf)?;
    run(&engine, &engine, rasterizer.as_deref())
}

#[cfg(not(feature = "tesseract"))]
fn with_backends<T>(
    _config: &PipelineConfig,
    _needs_pdf: bool,
    _run: impl FnOnce(&dyn TextRecognizer, &dyn OrientationDetector, Option<&dyn PageRasterizer>) -> Result<T>,
) -> Result<T> {
    Err(pars_ocr::ParsOcrError::MissingDependency(
        "pars-ocr was built without the `tesseract` feature; rebuild with `--features full`".to_string(),
    )
    .into())
}

#[cfg(feature = "pdf")]
#[cfg_attr(not(feature = "tesseract"), allow(dead_code))]
fn pdf_rasterizer(config: &PipelineConfig, needed: bool) -> Result<Option<Box<dyn PageRasterizer>>> {
    if !needed {
        return Ok(None);
    }
    let rasterizer = pars_ocr::pdf::PdfiumRasterizer::new(&config.pdf).map_err(pars_ocr::ParsOcrError::from)?;
    Ok(Some(Box::new(rasterizer)))
}

#[cfg(not(feature = "pdf"))]
#[cfg_attr(not(feature = "tesseract"), allow(dead_code))]
fn pdf_rasterizer(_config: &PipelineConfig, needed: bool) -> Result<Option<Box<dyn PageRasterizer>>> {
    if needed {
        tracing::warn!("PDF input requires the `pdf` feature; PDF documents will fail");
    }
    Ok(None)
}
