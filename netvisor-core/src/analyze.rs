//! Top-level analysis entry point.
//!
//! The [`Analyzer`] wires format detection, parsing, dissection,
//! classification, extraction and aggregation together and enforces the
//! configured resource limits. Limits never fail an analysis: the caller
//! gets the partial result with [`AnalysisStats::truncated`] set.

use compact_str::CompactString;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::aggregate::Aggregator;
use crate::classify::Classifier;
use crate::config::AnalysisConfig;
use crate::detect::{detect, InputFormat};
use crate::error::{Error, Result, SkipReason};
use crate::extract::{AppLayerExtractor, ExtractorRegistry};
use crate::flow::{FlowTable, Observed};
use crate::io::{inflate_bounded, CaptureReader, Compression, RawFrame};
use crate::model::{Analysis, AnalysisResult, AnalysisStats, Truncation};
use crate::protocol::{dissect, DissectedPacket};
use crate::zeek::{self, ZeekReader};

/// A dissected frame with the label of its own tuple and payload.
type Classified = std::result::Result<(DissectedPacket, CompactString), SkipReason>;

/// Reusable analysis pipeline. Holds no per-input state; one analyzer may
/// serve concurrent calls.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    classifier: Classifier,
    extractors: ExtractorRegistry,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    /// Build the rule list and extractor set for `config`.
    pub fn new(config: AnalysisConfig) -> Self {
        let classifier = Classifier::new(&config.port_labels);
        let extractors = ExtractorRegistry::with_builtins(&config.extractors);
        Self {
            config,
            classifier,
            extractors,
        }
    }

    /// Register an additional extractor, consulted after the built-ins.
    pub fn with_extractor(mut self, extractor: Box<dyn AppLayerExtractor>) -> Self {
        self.extractors.register(extractor);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Analyze one complete upload.
    ///
    /// Fails only when the input is unrecognized, or when its container or
    /// log header is unusable. Everything else is absorbed into the
    /// statistics.
    pub fn analyze(&self, input: &[u8]) -> Result<Analysis> {
        let mut stats = AnalysisStats::default();
        let mut data = input;

        let inflated;
        if self.config.decompress && Compression::detect(data).is_compressed() {
            inflated = inflate_bounded(data, self.config.max_input_bytes)?;
            debug!(
                compressed = input.len(),
                inflated = inflated.data.len(),
                "decompressed gzip input"
            );
            stats.decompressed = true;
            if inflated.limit_reached {
                stats.mark_truncated(Truncation::InputTooLarge);
            }
            data = &inflated.data;
        }

        let limit = usize::try_from(self.config.max_input_bytes).unwrap_or(usize::MAX);
        if data.len() > limit {
            data = &data[..limit];
            stats.mark_truncated(Truncation::InputTooLarge);
        }
        if stats.truncation == Some(Truncation::InputTooLarge) {
            warn!(limit, "input exceeds size limit; analyzing prefix only");
        }

        let format = detect(data);
        stats.format = format;
        debug!(%format, bytes = data.len(), "detected input format");

        let result = match format {
            InputFormat::ZeekLog => {
                if stats.truncated {
                    data = complete_lines(data);
                }
                self.analyze_zeek(data, &mut stats)?
            }
            InputFormat::Pcap | InputFormat::PcapNg => self.analyze_capture(data, &mut stats)?,
            InputFormat::Unrecognized => {
                return Err(Error::UnrecognizedFormat {
                    reason: unrecognized_reason(data),
                })
            }
        };

        stats.events = result.detailed_events.len() as u64;
        debug!(
            events = stats.events,
            devices = result.devices.len(),
            records = stats.records_read,
            malformed = stats.malformed_records,
            truncated = stats.truncated,
            "analysis complete"
        );

        Ok(Analysis { result, stats })
    }

    fn analyze_zeek(&self, data: &[u8], stats: &mut AnalysisStats) -> Result<AnalysisResult> {
        let mut aggregator = Aggregator::new(self.config.max_events);

        // A line counts as read once it is accepted or skipped.
        for item in ZeekReader::new(data).require(zeek::REQUIRED_COLUMNS) {
            let event = item.and_then(|record| {
                zeek::to_event(&record, &self.classifier, &self.extractors)
            });
            match event {
                Ok(event) => {
                    if !aggregator.record(event) {
                        warn!(max_events = self.config.max_events, "event limit reached");
                        stats.mark_truncated(Truncation::EventLimit);
                        break;
                    }
                    stats.records_read += 1;
                }
                Err(e) if e.is_recoverable() => {
                    trace!(error = %e, "skipping log line");
                    stats.records_read += 1;
                    stats.malformed_records += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if stats.malformed_records > 0 {
            debug!(skipped = stats.malformed_records, "skipped malformed log lines");
        }
        Ok(aggregator.finish())
    }

    fn analyze_capture(&self, data: &[u8], stats: &mut AnalysisStats) -> Result<AnalysisResult> {
        let mut reader = CaptureReader::from_bytes(data)?;
        let mut table = FlowTable::new(self.config.max_events);
        let batch_size = self.config.batch_size.max(1);
        let mut batch: Vec<RawFrame> = Vec::with_capacity(batch_size);

        let mut frames_done = false;

        'frames: while !frames_done {
            batch.clear();
            while batch.len() < batch_size {
                if stats.records_read >= self.config.max_frames {
                    if reader.next().is_some() {
                        stats.mark_truncated(Truncation::FrameLimit);
                    }
                    frames_done = true;
                    break;
                }
                match reader.next() {
                    Some(frame) => {
                        stats.records_read += 1;
                        batch.push(frame);
                    }
                    None => {
                        frames_done = true;
                        break;
                    }
                }
            }
            if batch.is_empty() {
                break;
            }

            let classified: Vec<Classified> = if self.config.parallel {
                batch.par_iter().map(|frame| self.classify_frame(frame)).collect()
            } else {
                batch.iter().map(|frame| self.classify_frame(frame)).collect()
            };

            for item in classified {
                match item {
                    Ok((packet, label)) => {
                        if table.observe(&packet, &label, &self.extractors) == Observed::Rejected {
                            stats.mark_truncated(Truncation::EventLimit);
                            break 'frames;
                        }
                    }
                    Err(reason) => count_skip(stats, &reason),
                }
            }
        }

        if let Some(reason) = reader.truncation() {
            stats.mark_truncated(reason);
        }
        if let Some(reason) = stats.truncation {
            if reason != Truncation::InputTooLarge {
                warn!(%reason, frames = stats.records_read, "capture analysis stopped early");
            }
        }
        debug!(
            frames = stats.records_read,
            flows = table.len(),
            fragments = stats.skipped_fragments,
            unsupported = stats.skipped_unsupported,
            "flow reconstruction complete"
        );

        let mut aggregator = Aggregator::new(self.config.max_events);
        for flow in table.flows() {
            aggregator.record(flow.to_event(self.config.direction, &self.classifier));
        }
        Ok(aggregator.finish())
    }

    fn classify_frame(&self, frame: &RawFrame) -> Classified {
        let packet = dissect(frame)?;
        let label = self.classifier.classify(&packet.tuple, &packet.payload);
        Ok((packet, label))
    }
}

/// Analyze `input` with the default configuration.
pub fn analyze(input: &[u8]) -> Result<Analysis> {
    Analyzer::default().analyze(input)
}

fn count_skip(stats: &mut AnalysisStats, reason: &SkipReason) {
    trace!(%reason, "skipping frame");
    match reason {
        SkipReason::Fragmented => stats.skipped_fragments += 1,
        SkipReason::UnsupportedLinkType(_)
        | SkipReason::UnsupportedNetwork(_)
        | SkipReason::UnsupportedTransport(_) => stats.skipped_unsupported += 1,
        SkipReason::Malformed(_) => stats.malformed_records += 1,
    }
}

/// Drop a trailing partial line.
fn complete_lines(data: &[u8]) -> &[u8] {
    match data.iter().rposition(|&b| b == b'\n') {
        Some(end) => &data[..=end],
        None => &[],
    }
}

fn unrecognized_reason(data: &[u8]) -> String {
    if data.is_empty() {
        return "input is empty".to_string();
    }
    let head: Vec<String> = data.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!(
        "no PCAP, PCAPNG or Zeek log signature (leading bytes: {})",
        head.join(" ")
    )
}
