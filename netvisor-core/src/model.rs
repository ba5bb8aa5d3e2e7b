//! Result types exposed across the engine boundary.
//!
//! [`AnalysisResult`] is the only document handed to callers; it serializes
//! to exactly three top-level fields. [`AnalysisStats`] travels next to it
//! and carries skip counters and the truncation signal.

use std::collections::BTreeMap;
use std::net::IpAddr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::detect::InputFormat;

/// Best-effort application-layer metadata (e.g. `host`, `query`, `sni`).
pub type AppLayerInfo = BTreeMap<String, String>;

/// Protocol label to connection count.
pub type ProtocolSummary = BTreeMap<CompactString, u64>;

/// Cumulative bytes seen for one address, as either endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTotal {
    pub ip: IpAddr,
    pub total_bytes: u64,
}

/// One reconstructed connection or one Zeek log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedEvent {
    /// Sequential id; equals the event's position in the output list
    pub id: u64,
    /// UTC date, `YYYY-MM-DD`
    pub date: String,
    /// UTC time of day, `HH:MM:SS`
    pub time: String,
    pub server_ip: IpAddr,
    pub server_port: u16,
    pub entry_vector_ip: IpAddr,
    pub entry_vector_port: u16,
    pub protocol: CompactString,
    pub service: CompactString,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub app_layer_info: AppLayerInfo,
}

/// The analysis document returned to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sorted by `total_bytes` descending, then `ip` ascending
    pub devices: Vec<DeviceTotal>,
    pub protocol_summary: ProtocolSummary,
    /// Input order (Zeek line order, or flow discovery order)
    pub detailed_events: Vec<DetailedEvent>,
}

impl AnalysisResult {
    /// Compact JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON rendering.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Why an analysis stopped before consuming all of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// Final capture record declared more bytes than remained
    TruncatedCapture,
    /// Capture framing broke mid-file
    CorruptCapture,
    /// Input exceeded `max_input_bytes`; only the prefix was analyzed
    InputTooLarge,
    /// `max_events` reached
    EventLimit,
    /// `max_frames` reached
    FrameLimit,
}

impl Truncation {
    /// Whether the stop was caused by a configured resource limit rather
    /// than by the input itself.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            Truncation::InputTooLarge | Truncation::EventLimit | Truncation::FrameLimit
        )
    }
}

impl std::fmt::Display for Truncation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Truncation::TruncatedCapture => "capture truncated",
            Truncation::CorruptCapture => "capture corrupt",
            Truncation::InputTooLarge => "input size limit exceeded",
            Truncation::EventLimit => "event limit exceeded",
            Truncation::FrameLimit => "frame limit exceeded",
        };
        f.write_str(s)
    }
}

/// Counters describing how the input was consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub format: InputFormat,
    /// Input was gzip-compressed
    pub decompressed: bool,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    /// Frames (captures) or data lines (Zeek logs) read
    pub records_read: u64,
    pub malformed_records: u64,
    pub skipped_fragments: u64,
    /// Unsupported link type, network or transport
    pub skipped_unsupported: u64,
    pub events: u64,
}

impl AnalysisStats {
    /// Record the first truncation cause; later causes are ignored.
    pub fn mark_truncated(&mut self, reason: Truncation) {
        if self.truncation.is_none() {
            self.truncation = Some(reason);
        }
        self.truncated = true;
    }
}

/// Result plus statistics, as returned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub stats: AnalysisStats,
}
