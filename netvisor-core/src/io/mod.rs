//! Capture container reading.
//!
//! [`CaptureReader`] walks PCAP or PCAPNG framing and yields one
//! [`RawFrame`] per packet record. Frames are handed to the dissector and
//! dropped once dissected.

mod decompress;
mod pcap_stream;

pub use decompress::{inflate_bounded, Compression, Inflated};
pub use pcap_stream::{CaptureReader, PcapFormat, UNKNOWN_LINK_TYPE};

use bytes::Bytes;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// 1-based position in the capture
    pub frame_number: u64,
    /// Capture time, microseconds since the Unix epoch
    pub timestamp_us: i64,
    pub captured_length: u32,
    /// Length on the wire; may exceed `captured_length`
    pub original_length: u32,
    /// Link-layer type of the declaring header or interface
    pub link_type: u32,
    pub data: Bytes,
}
