//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Output rendering (JSON, pretty JSON, tables)

mod args;
mod output;

pub use args::{parse_port_label, Args};
pub use output::{write_stats, OutputFormat, OutputFormatter};
