//! Linux cooked capture headers (SLL and SLL2).
//!
//! Used when capturing on the "any" interface. Both carry the EtherType of
//! the encapsulated packet; only its position differs.

use crate::error::ProtocolError;

/// PCAP link type for Linux SLL captures.
pub const LINKTYPE_LINUX_SLL: u32 = 113;

/// PCAP link type for Linux SLL2 captures.
pub const LINKTYPE_LINUX_SLL2: u32 = 276;

/// Linux SLL header length in bytes.
pub const LINUX_SLL_HEADER_LEN: usize = 16;

/// Linux SLL2 header length in bytes.
pub const LINUX_SLL2_HEADER_LEN: usize = 20;

/// SLL: packet type, ARPHRD, address length, 8-byte address, protocol.
pub fn parse(data: &[u8]) -> Result<(u16, &[u8]), ProtocolError> {
    let header = data.get(..LINUX_SLL_HEADER_LEN).ok_or(ProtocolError::PacketTooShort {
        protocol: "linux_sll",
        needed: LINUX_SLL_HEADER_LEN,
        have: data.len(),
    })?;
    let protocol = u16::from_be_bytes([header[14], header[15]]);
    Ok((protocol, &data[LINUX_SLL_HEADER_LEN..]))
}

/// SLL2: protocol, reserved, interface index, ARPHRD, packet type,
/// address length, 8-byte address.
pub fn parse_v2(data: &[u8]) -> Result<(u16, &[u8]), ProtocolError> {
    let header = data.get(..LINUX_SLL2_HEADER_LEN).ok_or(ProtocolError::PacketTooShort {
        protocol: "linux_sll2",
        needed: LINUX_SLL2_HEADER_LEN,
        have: data.len(),
    })?;
    let protocol = u16::from_be_bytes([header[0], header[1]]);
    Ok((protocol, &data[LINUX_SLL2_HEADER_LEN..]))
}
