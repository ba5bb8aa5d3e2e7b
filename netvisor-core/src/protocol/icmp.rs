//! ICMP and ICMPv6 framing.
//!
//! Messages have no ports; they are aggregated as transport `icmp` with
//! both ports zero.

use crate::error::ProtocolError;

/// IP protocol number for ICMP.
pub const IP_PROTO_ICMP: u8 = 1;

/// IP protocol number for ICMPv6.
pub const IP_PROTO_ICMPV6: u8 = 58;

/// Type, code and checksum.
pub const ICMP_MIN_LEN: usize = 4;

/// Check the fixed part of the message and return its type and code.
pub fn parse(data: &[u8]) -> Result<(u8, u8), ProtocolError> {
    match data {
        [icmp_type, code, _, _, ..] => Ok((*icmp_type, *code)),
        _ => Err(ProtocolError::PacketTooShort {
            protocol: "icmp",
            needed: ICMP_MIN_LEN,
            have: data.len(),
        }),
    }
}
