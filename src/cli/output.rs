//! Output rendering for analysis results.
//!
//! JSON output is the result document exactly as the engine produces it.
//! Table output renders the devices, protocol summary and events as three
//! comfy-table tables.

use std::io::Write;

use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, Table};

use netvisor_core::{AnalysisResult, AnalysisStats, DetailedEvent, Endpoint};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON document (default)
    Json,
    /// Indented JSON document
    Pretty,
    /// Human-readable tables
    Table,
}

/// Writes an [`AnalysisResult`] in one [`OutputFormat`].
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render `result` to `writer`.
    pub fn write<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *writer, result)?;
                writeln!(writer)
            }
            OutputFormat::Pretty => {
                serde_json::to_writer_pretty(&mut *writer, result)?;
                writeln!(writer)
            }
            OutputFormat::Table => self.write_tables(result, writer),
        }
    }

    fn write_tables<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()> {
        let mut devices = Table::new();
        devices.set_header(vec!["Device", "Total bytes"]);
        for device in &result.devices {
            devices.add_row(vec![
                Cell::new(device.ip),
                Cell::new(device.total_bytes).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut protocols = Table::new();
        protocols.set_header(vec!["Protocol", "Connections"]);
        for (label, count) in &result.protocol_summary {
            protocols.add_row(vec![
                Cell::new(label),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut events = Table::new();
        events.set_header(vec![
            "ID", "Date", "Time", "Entry vector", "Server", "Protocol", "Service", "Details",
        ]);
        for event in &result.detailed_events {
            events.add_row(event_row(event));
        }

        writeln!(writer, "Devices ({})", result.devices.len())?;
        writeln!(writer, "{devices}")?;
        writeln!(writer)?;
        writeln!(writer, "Protocols")?;
        writeln!(writer, "{protocols}")?;
        writeln!(writer)?;
        writeln!(writer, "Events ({})", result.detailed_events.len())?;
        writeln!(writer, "{events}")
    }
}

fn event_row(event: &DetailedEvent) -> Vec<Cell> {
    let entry = Endpoint::new(event.entry_vector_ip, event.entry_vector_port);
    let server = Endpoint::new(event.server_ip, event.server_port);
    let details = event
        .app_layer_info
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ");

    vec![
        Cell::new(event.id).set_alignment(CellAlignment::Right),
        Cell::new(&event.date),
        Cell::new(&event.time),
        Cell::new(entry),
        Cell::new(server),
        Cell::new(&event.protocol),
        Cell::new(&event.service),
        Cell::new(details),
    ]
}

/// One-line-per-field summary of how the input was consumed.
pub fn write_stats<W: Write>(stats: &AnalysisStats, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "format:              {}", stats.format)?;
    writeln!(writer, "decompressed:        {}", stats.decompressed)?;
    writeln!(writer, "records read:        {}", stats.records_read)?;
    writeln!(writer, "malformed records:   {}", stats.malformed_records)?;
    writeln!(writer, "skipped fragments:   {}", stats.skipped_fragments)?;
    writeln!(writer, "skipped unsupported: {}", stats.skipped_unsupported)?;
    writeln!(writer, "events:              {}", stats.events)?;
    match stats.truncation {
        Some(reason) => writeln!(writer, "truncated:           yes ({reason})"),
        None => writeln!(writer, "truncated:           no"),
    }
}
