//! Batch extraction over many drawing PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rebar_core::{DocumentExtractor, ExtractionMode, ExtractionResult, OcrBackend};

use super::{format_result, load_config, open_pdf, ExtractOptions, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file CSVs (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    options: ExtractOptions,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let mode = args.options.extraction_mode()?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let extractor = args.options.build_extractor(&config)?;

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        debug!("Processing {}", path.display());

        match process_single_file(&path, &extractor, &mode, &output_dir) {
            Ok(result) => results.push(ProcessResult {
                path,
                result: Some(result),
                error: None,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        result: None,
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    overall_pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful = results.iter().filter(|r| r.result.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file<O: OcrBackend>(
    path: &Path,
    extractor: &DocumentExtractor<O>,
    mode: &ExtractionMode,
    output_dir: &Path,
) -> anyhow::Result<ExtractionResult> {
    let pdf = open_pdf(path)?;
    let result = extractor.extract(&pdf, mode)?;

    let output_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("drawing");
    let output_path = output_dir.join(format!(
        "{}.{}",
        output_name,
        OutputFormat::Csv.extension()
    ));

    fs::write(&output_path, format_result(&result, OutputFormat::Csv, mode)?)?;
    debug!(
        "Wrote {} records to {}",
        result.len(),
        output_path.display()
    );

    Ok(result)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "source", "records", "with_code", "error"])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.result {
            wtr.write_record([
                filename,
                "success",
                &extraction.source().to_string(),
                &extraction.len().to_string(),
                &extraction.with_code_count().to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebar_core::models::{PageId, TextSource};
    use rebar_core::PageExtractor;

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageExtractor::new().extract_page(
            "5Rfi12/8cm,L=3.5m T1\n2Rfi10/20cm",
            None,
            PageId::new(1),
        );
        let results = vec![
            ProcessResult {
                path: PathBuf::from("a/plan.pdf"),
                result: Some(ExtractionResult::from_records(page.records, TextSource::Native)),
                error: None,
            },
            ProcessResult {
                path: PathBuf::from("a/broken.pdf"),
                result: None,
                error: Some("bad xref".to_string()),
            },
        ];

        let path = dir.path().join("summary.csv");
        write_summary(&path, &results).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "filename,status,source,records,with_code,error\n\
             plan.pdf,success,native,2,1,\n\
             broken.pdf,error,,,,bad xref\n"
        );
    }
}
