//! List the circle codes present in a drawing's text layer.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use rebar_core::{discover_circle_codes, NativeTextSource, TextNormalizer};

use super::{load_config, open_pdf};

/// Arguments for the codes command.
#[derive(Args)]
pub struct CodesArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: CodesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let pdf = open_pdf(&args.input)?;

    let pdf_type = pdf.analyze();
    debug!("{} analyzed as {:?}", args.input.display(), pdf_type);
    if !pdf_type.has_text_layer() {
        eprintln!(
            "{} No text layer found ({:?} PDF); run extract to OCR it",
            style("ℹ").blue(),
            pdf_type
        );
        return Ok(());
    }

    let text = pdf
        .full_text()
        .map_err(|e| anyhow::anyhow!("No readable text layer: {}", e))?;
    let text = TextNormalizer::new()
        .with_rejoin_wrapped(config.extraction.rejoin_wrapped_codes)
        .normalize(&text);

    let codes = discover_circle_codes(&text);
    if codes.is_empty() {
        eprintln!("{} No circle codes found", style("ℹ").blue());
        return Ok(());
    }

    for code in &codes {
        println!("{}", code);
    }
    eprintln!(
        "{} Found {} circle codes",
        style("✓").green(),
        codes.len()
    );

    Ok(())
}
