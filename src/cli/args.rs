//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

use netvisor_core::{AnalysisConfig, DirectionPolicy, ExtractorKind};

use super::OutputFormat;

/// Summarize a Zeek log or a PCAP/PCAPNG capture.
#[derive(Parser, Debug)]
#[command(name = "netvisor")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Zeek log, PCAP or PCAPNG file, optionally gzip-compressed (`-` reads stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Print analysis statistics to stderr
    #[arg(long = "stats")]
    pub stats: bool,

    /// Analyze at most this many bytes of (decompressed) input
    #[arg(long = "max-input-bytes", value_name = "BYTES")]
    pub max_input_bytes: Option<u64>,

    /// Stop after this many detailed events
    #[arg(long = "max-events", value_name = "N")]
    pub max_events: Option<usize>,

    /// Stop after this many capture frames
    #[arg(long = "max-frames", value_name = "N")]
    pub max_frames: Option<u64>,

    /// Application-layer extractors to enable (http,dns,tls,ssh)
    #[arg(long = "extractors", value_delimiter = ',', value_name = "LIST")]
    pub extractors: Option<Vec<ExtractorKind>>,

    /// Disable all application-layer extraction
    #[arg(long = "no-app-layer", conflicts_with = "extractors")]
    pub no_app_layer: bool,

    /// How the server side of a capture flow is chosen (initiator, well-known-port)
    #[arg(long = "direction", value_name = "POLICY")]
    pub direction: Option<DirectionPolicy>,

    /// Label traffic on a port, ahead of the built-in rules (e.g. 1883=mqtt)
    #[arg(long = "port", value_name = "PORT=LABEL", value_parser = parse_port_label)]
    pub port_labels: Vec<(u16, String)>,

    /// Dissect frames on the current thread only
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Frames dissected per parallel batch
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Whether the input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.file.as_os_str() == "-"
    }

    /// Analysis settings selected on the command line.
    pub fn to_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::default().with_parallel(!self.sequential);

        if let Some(max) = self.max_input_bytes {
            config = config.with_max_input_bytes(max);
        }
        if let Some(max) = self.max_events {
            config = config.with_max_events(max);
        }
        if let Some(max) = self.max_frames {
            config = config.with_max_frames(max);
        }
        if self.no_app_layer {
            config = config.with_extractors(std::iter::empty::<ExtractorKind>());
        } else if let Some(kinds) = &self.extractors {
            config = config.with_extractors(kinds.iter().copied());
        }
        if let Some(direction) = self.direction {
            config = config.with_direction(direction);
        }
        for (port, label) in &self.port_labels {
            config = config.with_port_label(*port, label.as_str());
        }
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        config
    }
}

/// Parse a `PORT=LABEL` pair.
pub fn parse_port_label(s: &str) -> Result<(u16, String), String> {
    let (port, label) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PORT=LABEL, got '{s}'"))?;
    let port: u16 = port
        .trim()
        .parse()
        .map_err(|_| format!("invalid port '{port}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("empty label for port {port}"));
    }
    Ok((port, label.to_ascii_lowercase()))
}
