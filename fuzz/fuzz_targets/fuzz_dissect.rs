//! Fuzz target for frame dissection down to the transport header.
//!
//! The first byte picks the link type; the rest is the frame.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use netvisor_core::io::RawFrame;
use netvisor_core::protocol::{
    dissect, LINKTYPE_ETHERNET, LINKTYPE_IPV4, LINKTYPE_IPV6, LINKTYPE_LINUX_SLL,
    LINKTYPE_LINUX_SLL2, LINKTYPE_LOOP, LINKTYPE_NULL, LINKTYPE_RAW, LINKTYPE_RAW_DLT,
};

const LINK_TYPES: &[u32] = &[
    LINKTYPE_ETHERNET,
    LINKTYPE_LINUX_SLL,
    LINKTYPE_LINUX_SLL2,
    LINKTYPE_NULL,
    LINKTYPE_LOOP,
    LINKTYPE_RAW,
    LINKTYPE_RAW_DLT,
    LINKTYPE_IPV4,
    LINKTYPE_IPV6,
    147, // unsupported
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, frame)) = data.split_first() else {
        return;
    };
    let frame = RawFrame {
        frame_number: 1,
        timestamp_us: 0,
        captured_length: frame.len() as u32,
        original_length: frame.len() as u32,
        link_type: LINK_TYPES[usize::from(selector) % LINK_TYPES.len()],
        data: Bytes::copy_from_slice(frame),
    };

    if let Ok(packet) = dissect(&frame) {
        assert!(packet.payload.len() <= frame.data.len());
    }
});
