//! Single-writer reduction into an [`AnalysisResult`].
//!
//! The [`Aggregator`] owns the running per-device byte totals, the protocol
//! histogram and the append-only event list. Every event passes through
//! [`Aggregator::record`] in input order, so ids, ordering and totals are
//! deterministic regardless of how the events were produced.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use compact_str::CompactString;

use crate::model::{AnalysisResult, AppLayerInfo, DetailedEvent, DeviceTotal, ProtocolSummary};

/// One side of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ip {
            IpAddr::V4(ip) => write!(f, "{ip}:{}", self.port),
            IpAddr::V6(ip) => write!(f, "[{ip}]:{}", self.port),
        }
    }
}

/// An event before it is numbered and timestamped.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub timestamp_us: i64,
    pub server: Endpoint,
    pub entry: Endpoint,
    pub protocol: CompactString,
    pub service: CompactString,
    /// Byte contribution added to both endpoints
    pub bytes: u64,
    pub app_layer_info: AppLayerInfo,
}

/// Running totals for one analysis.
#[derive(Debug)]
pub struct Aggregator {
    devices: HashMap<IpAddr, u64>,
    summary: ProtocolSummary,
    events: Vec<DetailedEvent>,
    max_events: usize,
}

impl Aggregator {
    pub fn new(max_events: usize) -> Self {
        Self {
            devices: HashMap::new(),
            summary: ProtocolSummary::new(),
            events: Vec::new(),
            max_events,
        }
    }

    /// No further event will be accepted.
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.max_events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append one event. Returns `false`, leaving the totals untouched,
    /// once the event limit has been reached.
    pub fn record(&mut self, record: EventRecord) -> bool {
        if self.is_full() {
            return false;
        }

        // A self-connection is one device, counted once.
        self.add_bytes(record.server.ip, record.bytes);
        if record.entry.ip != record.server.ip {
            self.add_bytes(record.entry.ip, record.bytes);
        }

        *self.summary.entry(record.protocol.clone()).or_insert(0) += 1;

        let (date, time) = format_timestamp(record.timestamp_us);
        self.events.push(DetailedEvent {
            id: self.events.len() as u64,
            date,
            time,
            server_ip: record.server.ip,
            server_port: record.server.port,
            entry_vector_ip: record.entry.ip,
            entry_vector_port: record.entry.port,
            protocol: record.protocol,
            service: record.service,
            app_layer_info: record.app_layer_info,
        });
        true
    }

    fn add_bytes(&mut self, ip: IpAddr, bytes: u64) {
        let total = self.devices.entry(ip).or_insert(0);
        *total = total.saturating_add(bytes);
    }

    /// Sort the device ranking and hand over the result.
    pub fn finish(self) -> AnalysisResult {
        let mut devices: Vec<DeviceTotal> = self
            .devices
            .into_iter()
            .map(|(ip, total_bytes)| DeviceTotal { ip, total_bytes })
            .collect();
        devices.sort_by(|a, b| b.total_bytes.cmp(&a.total_bytes).then(a.ip.cmp(&b.ip)));

        AnalysisResult {
            devices,
            protocol_summary: self.summary,
            detailed_events: self.events,
        }
    }
}

/// UTC `(YYYY-MM-DD, HH:MM:SS)` for a microsecond Unix timestamp.
///
/// Out-of-range timestamps render as the epoch.
pub fn format_timestamp(timestamp_us: i64) -> (String, String) {
    let secs = timestamp_us.div_euclid(1_000_000);
    let nanos = (timestamp_us.rem_euclid(1_000_000) * 1_000) as u32;
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, nanos).unwrap_or_default();
    (
        dt.format("%Y-%m-%d").to_string(),
        dt.format("%H:%M:%S").to_string(),
    )
}

/// Microseconds for fractional Unix seconds, saturating at the `i64` range.
pub fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}
