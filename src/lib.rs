//! netvisor - Summarize Zeek logs and packet captures.
//!
//! This crate is the command-line front end. All analysis lives in
//! [`netvisor_core`]; this crate parses arguments, reads the input file
//! and renders the result.
//!
//! # Example
//!
//! ```no_run
//! use netvisor::cli::{OutputFormat, OutputFormatter};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("capture.pcap")?;
//!     let analysis = netvisor_core::analyze(&data)?;
//!     OutputFormatter::new(OutputFormat::Table).write(&analysis.result, &mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub mod cli;

pub use netvisor_core::{Analysis, AnalysisConfig, AnalysisResult, Analyzer, Error, Result};
