//! CLI application for extracting reinforcement schedules from drawing PDFs.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, clean, codes, config, extract};

/// Rebar schedule extraction - pair circle codes with material codes in drawing PDFs
#[derive(Parser)]
#[command(name = "rebar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract circle/material code records from a PDF
    Extract(extract::ExtractArgs),

    /// Extract records from multiple PDFs
    Batch(batch::BatchArgs),

    /// List circle codes found in a PDF
    Codes(codes::CodesArgs),

    /// Clean and validate material codes
    Clean(clean::CleanArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Codes(args) => codes::run(args, cli.config.as_deref()).await,
        Commands::Clean(args) => clean::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
