//! netvisor CLI entry point.

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use netvisor::cli::{write_stats, Args, OutputFormatter};
use netvisor_core::Analyzer;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    let data = read_input(&args)?;
    info!(bytes = data.len(), "read input");

    let analyzer = Analyzer::new(args.to_config());
    let analysis = analyzer
        .analyze(&data)
        .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    let formatter = OutputFormatter::new(args.format);
    let mut stdout = io::stdout().lock();
    formatter.write(&analysis.result, &mut stdout)?;

    if args.stats {
        write_stats(&analysis.stats, &mut io::stderr())?;
    } else if analysis.stats.truncated {
        if let Some(reason) = analysis.stats.truncation {
            eprintln!("warning: partial result ({reason})");
        }
    }

    Ok(())
}

fn read_input(args: &Args) -> Result<Vec<u8>> {
    if args.reads_stdin() {
        let mut data = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
        return Ok(data);
    }
    std::fs::read(&args.file)
        .with_context(|| format!("Failed to read input file: {}", args.file.display()))
}
