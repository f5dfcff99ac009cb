//! Extract command: one drawing PDF to CSV, JSON or a text summary.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use super::{format_result, load_config, open_pdf, spinner, ExtractOptions, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[command(flatten)]
    options: ExtractOptions,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mode = args.options.extraction_mode()?;

    let pdf = open_pdf(&args.input)?;
    let extractor = args.options.build_extractor(&config)?;

    let pb = spinner(&format!("Processing {}...", args.input.display()))?;
    let result = extractor.extract(&pdf, &mode);
    pb.finish_and_clear();
    let result = result?;

    info!(
        "{} records ({} with a circle code) from {} text",
        result.len(),
        result.with_code_count(),
        result.source()
    );

    let output = format_result(&result, args.format, &mode)?;

    if let Some(output_path) = args.output {
        fs::write(&output_path, &output)?;
        println!(
            "{} {} records written to {}",
            style("✓").green(),
            result.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if args.format == OutputFormat::Json {
            println!();
        }
    }

    Ok(())
}
