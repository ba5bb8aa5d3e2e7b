//! Analysis configuration.

use compact_str::CompactString;

use crate::extract::ExtractorKind;

/// How the server side of a reconstructed flow is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectionPolicy {
    /// The endpoint that sent the opening SYN is the entry vector; without a
    /// handshake, fall back to well-known ports, then to the first sender.
    #[default]
    Initiator,
    /// The endpoint on a well-known port is the server; otherwise the lower
    /// `(ip, port)` endpoint.
    WellKnownPort,
}

impl std::str::FromStr for DirectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "initiator" => Ok(DirectionPolicy::Initiator),
            "well-known-port" | "well_known_port" | "port" => Ok(DirectionPolicy::WellKnownPort),
            other => Err(format!("unknown direction policy '{other}'")),
        }
    }
}

/// Limits and switches for one [`Analyzer`](crate::Analyzer).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Maximum input size in bytes; larger inputs are cut to a prefix.
    pub max_input_bytes: u64,
    /// Maximum number of detailed events.
    pub max_events: usize,
    /// Maximum number of capture frames read.
    pub max_frames: u64,
    /// Enabled application-layer extractors.
    pub extractors: Vec<ExtractorKind>,
    /// Server/entry-vector selection for captures.
    pub direction: DirectionPolicy,
    /// Extra port labels, evaluated before the built-in port rules.
    pub port_labels: Vec<(u16, CompactString)>,
    /// Frames dissected per parallel batch.
    pub batch_size: usize,
    /// Dissect and classify batches on the rayon pool.
    pub parallel: bool,
    /// Inflate gzip-wrapped uploads.
    pub decompress: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 2 * 1024 * 1024 * 1024, // 2 GiB
            max_events: 10_000_000,
            max_frames: 100_000_000,
            extractors: ExtractorKind::ALL.to_vec(),
            direction: DirectionPolicy::Initiator,
            port_labels: Vec::new(),
            batch_size: 4096,
            parallel: true,
            decompress: true,
        }
    }
}

impl AnalysisConfig {
    pub fn with_max_input_bytes(mut self, max: u64) -> Self {
        self.max_input_bytes = max;
        self
    }

    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    pub fn with_max_frames(mut self, max: u64) -> Self {
        self.max_frames = max;
        self
    }

    /// Replace the enabled extractor set. An empty list disables
    /// application-layer metadata entirely.
    pub fn with_extractors(mut self, extractors: impl IntoIterator<Item = ExtractorKind>) -> Self {
        self.extractors.clear();
        for kind in extractors {
            if !self.extractors.contains(&kind) {
                self.extractors.push(kind);
            }
        }
        self
    }

    pub fn with_direction(mut self, direction: DirectionPolicy) -> Self {
        self.direction = direction;
        self
    }

    /// Label traffic on `port` as `label`, ahead of the built-in rules.
    pub fn with_port_label(mut self, port: u16, label: impl Into<CompactString>) -> Self {
        self.port_labels.push((port, label.into()));
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_decompress(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }
}
