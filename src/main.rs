//! msgroute - command line entry point
//!
//! Loads a graph document, resolves its routing tables and prints the
//! resulting directives.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use msgroute_rs::{CompilerConfig, GraphDocument};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(version, about = "Compile a dataflow graph into routing directives")]
struct Cli {
    /// Graph document (`.toml` or `.json`)
    #[arg(value_name = "GRAPH")]
    graph: PathBuf,

    /// Compiler settings; defaults to the platform config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit non-zero when any diagnostic was raised
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,msgroute_rs=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CompilerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CompilerConfig::load_or_default(),
    };

    let document = GraphDocument::load(&cli.graph)
        .with_context(|| format!("Failed to load graph {}", cli.graph.display()))?;
    let mut engine = document.build_engine(config)?;
    let directives = engine.directives();

    match cli.format {
        OutputFormat::Text => print!("{}", directives),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&directives)?),
    }

    // Each diagnostic was already logged as a warning when raised.
    let diagnostics = engine.take_diagnostics();
    if cli.check && !diagnostics.is_empty() {
        tracing::error!("Check failed: {} diagnostics raised", diagnostics.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
