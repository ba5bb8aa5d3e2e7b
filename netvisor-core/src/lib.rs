//! # netvisor-core
//!
//! Ingestion and aggregation engine for network captures and Zeek logs.
//!
//! This crate turns an uploaded file into an [`AnalysisResult`]: a
//! per-device byte ranking, a protocol histogram and a list of detailed
//! connection events with optional application-layer metadata. It has no
//! CLI or HTTP dependencies; the `netvisor` binary and any service layer
//! sit on top of it.
//!
//! ## Features
//!
//! - **Format Detection**: PCAP, PCAPNG and Zeek ASCII logs are recognized
//!   by content, with transparent gzip unwrapping
//! - **Zeek Logs**: typed, header-driven parsing of tab-separated records
//! - **Packet Dissection**: Ethernet, VLAN, Linux cooked, loopback and raw
//!   IP link layers; IPv4, IPv6, TCP, UDP, ICMP
//! - **Flow Reconstruction**: bidirectional flows with configurable
//!   server/client direction
//! - **Classification**: ordered port and payload-signature rules
//! - **App-Layer Metadata**: HTTP host/method, DNS query, TLS SNI/ALPN,
//!   SSH banner
//! - **Resource Limits**: input size, frame and event caps yield partial
//!   results instead of failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netvisor_core::prelude::*;
//!
//! let data = std::fs::read("capture.pcap").unwrap();
//! let analyzer = Analyzer::new(AnalysisConfig::default().with_max_events(100_000));
//! let analysis = analyzer.analyze(&data).unwrap();
//!
//! for device in &analysis.result.devices {
//!     println!("{}: {} bytes", device.ip, device.total_bytes);
//! }
//! if analysis.stats.truncated {
//!     eprintln!("partial result: {:?}", analysis.stats.truncation);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        netvisor-core                                |
//! +---------------------------------------------------------------------+
//! |  detect/     - Format sniffing (PCAP, PCAPNG, Zeek)                 |
//! |  io/         - CaptureReader, RawFrame, gzip inflation              |
//! |  zeek/       - Zeek header, reader, typed values, event mapping     |
//! |  protocol/   - Link, network and transport dissection               |
//! |  classify/   - Ordered port and payload rules                       |
//! |  extract/    - HTTP, DNS, TLS, SSH metadata extractors              |
//! |  flow/       - Flow table, direction policy                         |
//! |  aggregate/  - Device totals, protocol histogram, event list        |
//! |  analyze/    - Analyzer: orchestration and limits                   |
//! |  model/      - AnalysisResult, AnalysisStats                        |
//! |  error/      - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```

pub mod aggregate;
pub mod analyze;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod flow;
pub mod io;
pub mod model;
pub mod prelude;
pub mod protocol;
pub mod zeek;

// Re-export commonly used types at crate root for convenience
pub use aggregate::{Aggregator, Endpoint, EventRecord};
pub use analyze::{analyze, Analyzer};
pub use classify::{Classifier, UNKNOWN};
pub use config::{AnalysisConfig, DirectionPolicy};
pub use detect::{detect, InputFormat};
pub use error::{Error, PcapError, ProtocolError, Result, SkipReason, ZeekError};
pub use extract::{AppLayerExtractor, ExtractorKind, ExtractorRegistry};
pub use flow::{Flow, FlowKey, FlowTable};
pub use io::{CaptureReader, PcapFormat, RawFrame};
pub use model::{
    Analysis, AnalysisResult, AnalysisStats, AppLayerInfo, DetailedEvent, DeviceTotal,
    ProtocolSummary, Truncation,
};
pub use protocol::{dissect, ConnectionTuple, DissectedPacket, Transport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
