//! Fuzz target for PCAP/PCAPNG container framing.
//!
//! Tests handling of malformed captures including:
//! - Magic byte detection
//! - Global and section headers
//! - Record lengths that overrun the input
//! - Interface ids without a description block

#![no_main]

use libfuzzer_sys::fuzz_target;
use netvisor_core::io::{CaptureReader, PcapFormat};

fuzz_target!(|data: &[u8]| {
    if PcapFormat::detect(data).is_none() {
        return;
    }
    if let Ok(reader) = CaptureReader::from_bytes(data) {
        for frame in reader {
            assert!(frame.data.len() <= data.len());
            assert!(frame.data.len() <= frame.captured_length as usize);
        }
    }
});
