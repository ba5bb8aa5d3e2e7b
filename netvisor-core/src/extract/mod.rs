//! Best-effort application-layer metadata.
//!
//! Each extractor is a shallow decoder for one protocol label. It reads
//! only what it needs from the first bytes of a payload and returns an
//! [`AppLayerInfo`] map, empty on any decode failure.

mod dns;
mod http;
mod ssh;
mod tls;

pub use dns::{parse_question, record_type_name, DnsExtractor, Question};
pub use http::{looks_like_http, HttpExtractor};
pub use ssh::{looks_like_ssh, SshExtractor};
pub use tls::{looks_like_tls, TlsExtractor};

use crate::model::AppLayerInfo;

/// A shallow decoder for one application protocol.
pub trait AppLayerExtractor: Send + Sync {
    /// Protocol label this extractor handles (e.g. "http").
    fn name(&self) -> &'static str;

    /// Extract metadata from a payload. Never fails; garbage yields an
    /// empty map.
    fn extract(&self, payload: &[u8]) -> AppLayerInfo;
}

/// Built-in extractors, selectable through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Http,
    Dns,
    Tls,
    Ssh,
}

impl ExtractorKind {
    pub const ALL: [ExtractorKind; 4] = [
        ExtractorKind::Http,
        ExtractorKind::Dns,
        ExtractorKind::Tls,
        ExtractorKind::Ssh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractorKind::Http => "http",
            ExtractorKind::Dns => "dns",
            ExtractorKind::Tls => "tls",
            ExtractorKind::Ssh => "ssh",
        }
    }

    fn build(self) -> Box<dyn AppLayerExtractor> {
        match self {
            ExtractorKind::Http => Box::new(HttpExtractor),
            ExtractorKind::Dns => Box::new(DnsExtractor),
            ExtractorKind::Tls => Box::new(TlsExtractor),
            ExtractorKind::Ssh => Box::new(SshExtractor),
        }
    }
}

impl std::str::FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ExtractorKind::Http),
            "dns" => Ok(ExtractorKind::Dns),
            "tls" | "ssl" => Ok(ExtractorKind::Tls),
            "ssh" => Ok(ExtractorKind::Ssh),
            other => Err(format!(
                "unknown extractor '{other}' (expected http, dns, tls or ssh)"
            )),
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Enabled extractors, looked up by protocol label.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn AppLayerExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given built-in extractors.
    pub fn with_builtins(kinds: &[ExtractorKind]) -> Self {
        let mut registry = Self::new();
        for kind in kinds {
            registry.register(kind.build());
        }
        registry
    }

    /// Add an extractor. An earlier extractor for the same label wins.
    pub fn register(&mut self, extractor: Box<dyn AppLayerExtractor>) {
        self.extractors.push(extractor);
    }

    /// Extractor for a protocol label.
    pub fn get(&self, label: &str) -> Option<&dyn AppLayerExtractor> {
        self.extractors
            .iter()
            .find(|e| e.name() == label)
            .map(|e| e.as_ref())
    }

    /// Whether metadata for `label` may be reported.
    pub fn handles(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Run the extractor for `label`; empty when none is enabled.
    pub fn extract(&self, label: &str, payload: &[u8]) -> AppLayerInfo {
        match self.get(label) {
            Some(extractor) if !payload.is_empty() => extractor.extract(payload),
            _ => AppLayerInfo::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Labels with an extractor, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extractors", &self.names())
            .finish()
    }
}
