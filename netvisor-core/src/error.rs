//! Error types for netvisor-core.
//!
//! Only [`Error`] is fatal. Everything that affects a single record
//! ([`ProtocolError`], [`ZeekError::MalformedRecord`], [`SkipReason`]) is
//! absorbed by the orchestrator and tallied in the analysis statistics.

use thiserror::Error;

/// Fatal error: the whole input is unusable.
#[derive(Error, Debug)]
pub enum Error {
    /// No detector recognized the input
    #[error("Unrecognized input format: {reason}")]
    UnrecognizedFormat { reason: String },

    /// Capture container could not be opened
    #[error("PCAP error: {0}")]
    Pcap(#[from] PcapError),

    /// Zeek log header is unusable
    #[error("Zeek log error: {0}")]
    Zeek(#[from] ZeekError),

    /// Compressed upload could not be inflated
    #[error("Decompression failed: {reason}")]
    Decompress { reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to capture container framing.
#[derive(Error, Debug)]
pub enum PcapError {
    /// Invalid global header or section header
    #[error("Invalid PCAP format: {reason}")]
    InvalidFormat { reason: String },
}

/// Errors related to header dissection of a single frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame too short for protocol header
    #[error("{protocol}: packet too short (need {needed} bytes, have {have})")]
    PacketTooShort {
        protocol: &'static str,
        needed: usize,
        have: usize,
    },

    /// Invalid header field value
    #[error("{protocol}: invalid {field}: {reason}")]
    InvalidField {
        protocol: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Errors raised while reading a Zeek log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZeekError {
    /// A data line appeared before any `#fields` directive
    #[error("line {line}: record before #fields header")]
    MissingHeader { line: u64 },

    /// The `#fields` header lacks a column needed to build events
    #[error("required column '{field}' missing from #fields header")]
    MissingField { field: &'static str },

    /// One line could not be decoded; recoverable
    #[error("line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}

impl ZeekError {
    /// Whether parsing may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ZeekError::MalformedRecord { .. })
    }
}

/// Why a captured frame produced no connection tuple.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// IP fragment; payloads are not reassembled
    #[error("fragmented IP packet")]
    Fragmented,

    /// Link-layer type the dissector does not decode
    #[error("unsupported link type {0}")]
    UnsupportedLinkType(u32),

    /// Non-IP ethertype or address family
    #[error("unsupported network protocol 0x{0:04x}")]
    UnsupportedNetwork(u16),

    /// IP protocol other than TCP, UDP, ICMP or ICMPv6
    #[error("unsupported transport protocol {0}")]
    UnsupportedTransport(u8),

    /// Corrupt or truncated header
    #[error("malformed frame: {0}")]
    Malformed(#[from] ProtocolError),
}

/// Result type for netvisor-core operations.
pub type Result<T> = std::result::Result<T, Error>;
