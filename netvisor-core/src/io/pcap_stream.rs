//! PCAP/PCAPNG frame reader over any `Read` source.
//!
//! Framing is decoded by the `pcap_parser` streaming readers. This module
//! adds what the analysis needs on top: per-interface link types and
//! timestamp resolution for PCAPNG, nanosecond legacy files, and a
//! non-fatal end state for captures that stop mid-record.
//!
//! ```ignore
//! let mut reader = CaptureReader::from_bytes(&upload)?;
//! for frame in &mut reader {
//!     // dissect frame
//! }
//! if let Some(reason) = reader.truncation() {
//!     // partial capture
//! }
//! ```

use std::io::{Cursor, Read};

use bytes::Bytes;
use pcap_parser::pcapng::Block;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError as ParserError, PcapNGReader};
use tracing::{debug, warn};

use crate::error::{Error, PcapError};
use crate::io::RawFrame;
use crate::model::Truncation;

/// Buffer size for pcap_parser readers (1 MiB). Records larger than this
/// cannot be framed and end the capture.
const BUFFER_SIZE: usize = 1 << 20;

/// Consecutive refills without a complete block before the reader gives up.
const MAX_STALLS: u32 = 16;

/// Link type reported for packets whose interface was never declared.
pub const UNKNOWN_LINK_TYPE: u32 = u32::MAX;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Container format and, for legacy files, byte order and resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcapFormat {
    /// Classic PCAP (little-endian, microseconds)
    LegacyLeMicro,
    /// Classic PCAP (big-endian, microseconds)
    LegacyBeMicro,
    /// Classic PCAP (little-endian, nanoseconds)
    LegacyLeNano,
    /// Classic PCAP (big-endian, nanoseconds)
    LegacyBeNano,
    /// PCAPNG format
    PcapNg,
}

impl PcapFormat {
    /// Detect the container format from the first four bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            [0xd4, 0xc3, 0xb2, 0xa1] => Some(PcapFormat::LegacyLeMicro),
            [0xa1, 0xb2, 0xc3, 0xd4] => Some(PcapFormat::LegacyBeMicro),
            [0x4d, 0x3c, 0xb2, 0xa1] => Some(PcapFormat::LegacyLeNano),
            [0xa1, 0xb2, 0x3c, 0x4d] => Some(PcapFormat::LegacyBeNano),
            [0x0a, 0x0d, 0x0d, 0x0a] => Some(PcapFormat::PcapNg),
            _ => None,
        }
    }

    /// Whether this is a PCAPNG format.
    pub fn is_pcapng(&self) -> bool {
        matches!(self, PcapFormat::PcapNg)
    }

    /// Whether legacy record timestamps carry nanoseconds.
    pub fn is_nanosecond(&self) -> bool {
        matches!(self, PcapFormat::LegacyLeNano | PcapFormat::LegacyBeNano)
    }
}

/// Interface Description Block state needed to interpret packets.
#[derive(Clone, Copy, Debug)]
struct Interface {
    link_type: u32,
    ticks_per_sec: u64,
    offset_secs: i64,
}

enum ReaderInner<R: Read> {
    Legacy {
        reader: LegacyPcapReader<R>,
        link_type: u32,
        nanosecond: bool,
    },
    Ng {
        reader: PcapNGReader<R>,
        /// Interfaces of the current section, indexed by interface id
        interfaces: Vec<Interface>,
    },
}

/// Outcome of one read attempt.
enum Step {
    Frame(RawFrame),
    End,
    Stop(Truncation),
}

/// Lazy, single-pass reader of capture frames.
///
/// Iteration ends at end of input, or early when the capture is truncated
/// or corrupt; [`truncation`](Self::truncation) tells the two apart.
/// Frames yielded before an early stop remain valid.
pub struct CaptureReader<R: Read> {
    inner: ReaderInner<R>,
    format: PcapFormat,
    frame_number: u64,
    truncation: Option<Truncation>,
    finished: bool,
}

impl<'a> CaptureReader<Cursor<&'a [u8]>> {
    /// Detect the format of an in-memory capture and open it.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, Error> {
        let format = PcapFormat::detect(data).ok_or_else(|| {
            Error::Pcap(PcapError::InvalidFormat {
                reason: "unknown capture magic".into(),
            })
        })?;
        Self::with_format(Cursor::new(data), format)
    }
}

impl<R: Read> CaptureReader<R> {
    /// Open a capture of known format. Fails if the global or section
    /// header cannot be parsed.
    pub fn with_format(source: R, format: PcapFormat) -> Result<Self, Error> {
        let inner = if format.is_pcapng() {
            let reader = PcapNGReader::new(BUFFER_SIZE, source).map_err(|e| {
                Error::Pcap(PcapError::InvalidFormat {
                    reason: format!("Failed to parse PCAPNG section header: {}", e),
                })
            })?;
            ReaderInner::Ng {
                reader,
                interfaces: Vec::new(),
            }
        } else {
            let reader = LegacyPcapReader::new(BUFFER_SIZE, source).map_err(|e| {
                Error::Pcap(PcapError::InvalidFormat {
                    reason: format!("Failed to parse PCAP header: {}", e),
                })
            })?;
            ReaderInner::Legacy {
                reader,
                link_type: 1,
                nanosecond: format.is_nanosecond(),
            }
        };

        debug!(?format, "opened capture");

        Ok(CaptureReader {
            inner,
            format,
            frame_number: 0,
            truncation: None,
            finished: false,
        })
    }

    pub fn format(&self) -> PcapFormat {
        self.format
    }

    /// Number of frames yielded so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }

    /// Why iteration stopped early, if it did.
    pub fn truncation(&self) -> Option<Truncation> {
        self.truncation
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        if self.finished {
            return None;
        }

        let step = match &mut self.inner {
            ReaderInner::Legacy {
                reader,
                link_type,
                nanosecond,
            } => read_legacy_frame(reader, link_type, *nanosecond, &mut self.frame_number),
            ReaderInner::Ng { reader, interfaces } => {
                read_pcapng_frame(reader, interfaces, &mut self.frame_number)
            }
        };

        match step {
            Step::Frame(frame) => Some(frame),
            Step::End => {
                self.finished = true;
                None
            }
            Step::Stop(reason) => {
                warn!(frames = self.frame_number, %reason, "capture ended early");
                self.finished = true;
                self.truncation = Some(reason);
                None
            }
        }
    }
}

/// Map a pcap_parser failure after the header to an early stop.
fn stop_reason<I>(err: &ParserError<I>) -> Truncation {
    match err {
        ParserError::UnexpectedEof | ParserError::BufferTooSmall => Truncation::TruncatedCapture,
        _ => Truncation::CorruptCapture,
    }
}

fn read_legacy_frame<S: Read>(
    reader: &mut LegacyPcapReader<S>,
    link_type: &mut u32,
    nanosecond: bool,
    frame_number: &mut u64,
) -> Step {
    let mut stalls = 0;

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                stalls = 0;
                let frame = match block {
                    PcapBlockOwned::Legacy(packet) => {
                        *frame_number += 1;

                        let sub_second = if nanosecond {
                            i64::from(packet.ts_usec) / 1_000
                        } else {
                            i64::from(packet.ts_usec)
                        };
                        let timestamp_us = i64::from(packet.ts_sec) * 1_000_000 + sub_second;
                        let len = (packet.caplen as usize).min(packet.data.len());

                        Some(RawFrame {
                            frame_number: *frame_number,
                            timestamp_us,
                            captured_length: packet.caplen,
                            original_length: packet.origlen,
                            link_type: *link_type,
                            data: Bytes::copy_from_slice(&packet.data[..len]),
                        })
                    }
                    PcapBlockOwned::LegacyHeader(header) => {
                        *link_type = header.network.0 as u32;
                        None
                    }
                    _ => None,
                };

                reader.consume(offset);
                if let Some(frame) = frame {
                    return Step::Frame(frame);
                }
            }
            Err(ParserError::Eof) => return Step::End,
            Err(ParserError::Incomplete(_)) => {
                stalls += 1;
                if stalls > MAX_STALLS {
                    return Step::Stop(Truncation::TruncatedCapture);
                }
                if reader.refill().is_err() {
                    return Step::Stop(Truncation::CorruptCapture);
                }
            }
            Err(e) => {
                debug!(error = %e, "legacy PCAP parse error");
                return Step::Stop(stop_reason(&e));
            }
        }
    }
}

fn read_pcapng_frame<S: Read>(
    reader: &mut PcapNGReader<S>,
    interfaces: &mut Vec<Interface>,
    frame_number: &mut u64,
) -> Step {
    let mut stalls = 0;

    loop {
        match reader.next() {
            Ok((offset, block)) => {
                stalls = 0;
                let frame = match block {
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                        interfaces.clear();
                        None
                    }
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        interfaces.push(Interface {
                            link_type: idb.linktype.0 as u32,
                            ticks_per_sec: ticks_per_second(idb.if_tsresol),
                            offset_secs: idb.if_tsoffset as i64,
                        });
                        None
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                        *frame_number += 1;

                        let iface = interfaces.get(epb.if_id as usize).copied();
                        let ticks = (u64::from(epb.ts_high) << 32) | u64::from(epb.ts_low);
                        let timestamp_us = match iface {
                            Some(i) => ticks_to_micros(ticks, i.ticks_per_sec, i.offset_secs),
                            None => ticks_to_micros(ticks, MICROS_PER_SEC, 0),
                        };
                        let len = (epb.caplen as usize).min(epb.data.len());

                        Some(RawFrame {
                            frame_number: *frame_number,
                            timestamp_us,
                            captured_length: epb.caplen,
                            original_length: epb.origlen,
                            link_type: iface.map_or(UNKNOWN_LINK_TYPE, |i| i.link_type),
                            data: Bytes::copy_from_slice(&epb.data[..len]),
                        })
                    }
                    PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                        *frame_number += 1;

                        // Simple packets belong to the first interface and carry no timestamp.
                        let len = (spb.origlen as usize).min(spb.data.len());

                        Some(RawFrame {
                            frame_number: *frame_number,
                            timestamp_us: 0,
                            captured_length: len as u32,
                            original_length: spb.origlen,
                            link_type: interfaces.first().map_or(UNKNOWN_LINK_TYPE, |i| i.link_type),
                            data: Bytes::copy_from_slice(&spb.data[..len]),
                        })
                    }
                    _ => None,
                };

                reader.consume(offset);
                if let Some(frame) = frame {
                    return Step::Frame(frame);
                }
            }
            Err(ParserError::Eof) => return Step::End,
            Err(ParserError::Incomplete(_)) => {
                stalls += 1;
                if stalls > MAX_STALLS {
                    return Step::Stop(Truncation::TruncatedCapture);
                }
                if reader.refill().is_err() {
                    return Step::Stop(Truncation::CorruptCapture);
                }
            }
            Err(e) => {
                debug!(error = %e, "PCAPNG parse error");
                return Step::Stop(stop_reason(&e));
            }
        }
    }
}

/// Decode `if_tsresol`: high bit clear is a power of ten, set is a power
/// of two. Unrepresentable resolutions fall back to microseconds.
fn ticks_per_second(tsresol: u8) -> u64 {
    let exp = u32::from(tsresol & 0x7f);
    let ticks = if tsresol & 0x80 == 0 {
        10u64.checked_pow(exp)
    } else {
        2u64.checked_pow(exp)
    };
    ticks.unwrap_or(MICROS_PER_SEC)
}

fn ticks_to_micros(ticks: u64, ticks_per_sec: u64, offset_secs: i64) -> i64 {
    let ticks_per_sec = ticks_per_sec.max(1);
    let secs = i64::try_from(ticks / ticks_per_sec).unwrap_or(i64::MAX);
    let frac = (u128::from(ticks % ticks_per_sec) * u128::from(MICROS_PER_SEC)
        / u128::from(ticks_per_sec)) as i64;

    secs.saturating_add(offset_secs)
        .saturating_mul(MICROS_PER_SEC as i64)
        .saturating_add(frac)
}
