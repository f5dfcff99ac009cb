//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod clean;
pub mod codes;
pub mod config;
pub mod extract;
mod output;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use rebar_core::models::RebarConfig;
use rebar_core::{
    parse_code_list, DisabledOcr, DocumentExtractor, ExtractionMode, OcrBackend, PdfExtractor,
    PureOcrEngine, SourceError,
};

pub use output::{format_result, OutputFormat};

/// Which records to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Every material code, with or without a circle code
    All,
    /// Only material codes with an associated circle code
    WithCode,
    /// Only material codes whose circle code is listed in --codes
    Filtered,
}

/// Extraction options shared by `extract` and `batch`.
#[derive(Args, Debug)]
pub struct ExtractOptions {
    /// Which records to report
    #[arg(long, value_enum, default_value = "all")]
    pub mode: ModeArg,

    /// Comma separated circle codes for --mode filtered (e.g. "T1,UT7a")
    #[arg(long)]
    pub codes: Option<String>,

    /// Model directory
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Never fall back to OCR
    #[arg(long)]
    pub native_only: bool,
}

impl ExtractOptions {
    /// Resolve the extraction mode from `--mode` and `--codes`.
    pub fn extraction_mode(&self) -> anyhow::Result<ExtractionMode> {
        match self.mode {
            ModeArg::Filtered => {
                let codes = self
                    .codes
                    .as_deref()
                    .map(parse_code_list)
                    .unwrap_or_default();
                if codes.is_empty() {
                    anyhow::bail!("--mode filtered requires at least one code in --codes");
                }
                Ok(ExtractionMode::FilteredByCodes(codes))
            }
            mode => {
                if self.codes.is_some() {
                    warn!("--codes is only used with --mode filtered, ignoring it");
                }
                Ok(match mode {
                    ModeArg::WithCode => ExtractionMode::AllWithCircleCode,
                    _ => ExtractionMode::AllMaterials,
                })
            }
        }
    }

    /// Build a document extractor for these options.
    pub fn build_extractor(
        &self,
        config: &RebarConfig,
    ) -> anyhow::Result<DocumentExtractor<Box<dyn OcrBackend>>> {
        let mut models = config.models.clone();
        if let Some(dir) = &self.model_dir {
            models.model_dir = dir.clone();
        }

        let ocr: Box<dyn OcrBackend> = if self.native_only {
            Box::new(DisabledOcr::new("OCR disabled by --native-only"))
        } else if PureOcrEngine::models_present(&models) {
            debug!("Using OCR models from {}", models.model_dir.display());
            let engine = PureOcrEngine::from_dir(&models, config.ocr.clone())
                .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
            Box::new(engine)
        } else {
            debug!("OCR models not found in {}", models.model_dir.display());
            Box::new(DisabledOcr::new(format!(
                "OCR models not found in {}; pass --model-dir or set models.model_dir",
                models.model_dir.display()
            )))
        };

        Ok(DocumentExtractor::from_config(ocr, config))
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rebar")
        .join("config.json")
}

/// Resolve the configuration file: `--config` if given, else the default
/// location.
pub fn config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, using defaults when no file exists at the default
/// location. An explicit `--config` file must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RebarConfig> {
    if let Some(path) = config_path {
        return RebarConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(RebarConfig::from_file(&path)?)
    } else {
        Ok(RebarConfig::default())
    }
}

/// Open a PDF input file.
pub fn open_pdf(path: &Path) -> anyhow::Result<PdfExtractor> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    let data = fs::read(path)?;
    match PdfExtractor::from_bytes(&data) {
        Ok(pdf) => Ok(pdf),
        Err(SourceError::Parse(e)) => {
            warn!("Could not parse {} ({}), trying rasterizer only", path.display(), e);
            Ok(PdfExtractor::raster_only(&data))
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open {}: {}", path.display(), e)),
    }
}

/// Spinner shown while a document is processed.
pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebar_core::NativeTextSource;

    fn options(mode: ModeArg, codes: Option<&str>) -> ExtractOptions {
        ExtractOptions {
            mode,
            codes: codes.map(str::to_string),
            model_dir: None,
            native_only: true,
        }
    }

    #[test]
    fn test_extraction_mode() {
        assert_eq!(
            options(ModeArg::All, None).extraction_mode().unwrap(),
            ExtractionMode::AllMaterials
        );
        assert_eq!(
            options(ModeArg::WithCode, Some("T1")).extraction_mode().unwrap(),
            ExtractionMode::AllWithCircleCode
        );
        assert_eq!(
            options(ModeArg::Filtered, Some("T1, ut7a")).extraction_mode().unwrap(),
            ExtractionMode::FilteredByCodes(parse_code_list("T1,ut7a"))
        );
        assert!(options(ModeArg::Filtered, None).extraction_mode().is_err());
        assert!(options(ModeArg::Filtered, Some(" , ")).extraction_mode().is_err());
    }

    #[test]
    fn test_native_only_extractor_has_no_ocr() {
        let extractor = options(ModeArg::All, None)
            .build_extractor(&RebarConfig::default())
            .unwrap();
        assert!(!extractor.ocr().is_available());
    }

    #[test]
    fn test_missing_models_disable_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(ModeArg::All, None);
        opts.native_only = false;
        opts.model_dir = Some(dir.path().to_path_buf());

        let extractor = opts.build_extractor(&RebarConfig::default()).unwrap();
        assert!(!extractor.ocr().is_available());
    }

    #[test]
    fn test_open_pdf_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_pdf(&dir.path().join("missing.pdf")).is_err());

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        let err = open_pdf(&text).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_open_unparseable_pdf_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, "not a pdf").unwrap();

        let pdf = open_pdf(&path).unwrap();
        assert_eq!(pdf.page_count(), 0);

        let extractor = options(ModeArg::All, None)
            .build_extractor(&RebarConfig::default())
            .unwrap();
        let err = extractor.extract(&pdf, &ExtractionMode::AllMaterials).unwrap_err();
        assert!(err.to_string().contains("OCR"));
    }
}
