//! IPv6 header and extension header chain.

use std::net::IpAddr;

use etherparse::Ipv6HeaderSlice;

use super::IpLayer;
use crate::error::{ProtocolError, SkipReason};

pub const IPV6_HEADER_LEN: usize = 40;

/// Extension header values of the Next Header field.
pub mod next_header {
    pub const HOP_BY_HOP: u8 = 0;
    pub const ROUTING: u8 = 43;
    pub const FRAGMENT: u8 = 44;
    pub const AH: u8 = 51;
    pub const DESTINATION: u8 = 60;
    pub const MOBILITY: u8 = 135;
}

/// Longest extension chain walked before the packet is rejected.
const MAX_EXTENSION_HEADERS: usize = 16;

/// Decode the IPv6 header and walk its extension headers to the upper
/// layer protocol.
pub fn parse(data: &[u8]) -> Result<IpLayer<'_>, SkipReason> {
    if data.len() < IPV6_HEADER_LEN {
        return Err(ProtocolError::PacketTooShort {
            protocol: "ipv6",
            needed: IPV6_HEADER_LEN,
            have: data.len(),
        }
        .into());
    }

    let ipv6 = Ipv6HeaderSlice::from_slice(data).map_err(|e| ProtocolError::InvalidField {
        protocol: "ipv6",
        field: "header",
        reason: e.to_string(),
    })?;

    let payload_len = usize::from(ipv6.payload_length());
    let rest = &data[IPV6_HEADER_LEN..];
    // Zero payload length means a jumbogram; take the captured bytes.
    let body = if payload_len == 0 {
        rest
    } else {
        &rest[..payload_len.min(rest.len())]
    };

    let (protocol, offset) = walk_extension_headers(ipv6.next_header().0, body)?;

    Ok(IpLayer {
        src: IpAddr::V6(ipv6.source_addr()),
        dst: IpAddr::V6(ipv6.destination_addr()),
        protocol,
        payload: &body[offset..],
    })
}

fn is_extension_header(nh: u8) -> bool {
    matches!(
        nh,
        next_header::HOP_BY_HOP
            | next_header::ROUTING
            | next_header::FRAGMENT
            | next_header::DESTINATION
            | next_header::AH
            | next_header::MOBILITY
    )
}

/// Returns the upper layer protocol and the offset of its header.
fn walk_extension_headers(first_nh: u8, data: &[u8]) -> Result<(u8, usize), SkipReason> {
    let mut nh = first_nh;
    let mut offset = 0;
    let mut count = 0;

    while is_extension_header(nh) {
        count += 1;
        if count > MAX_EXTENSION_HEADERS {
            return Err(ProtocolError::InvalidField {
                protocol: "ipv6",
                field: "next_header",
                reason: "extension header chain too long".into(),
            }
            .into());
        }

        let ext = &data[offset..];
        let fixed = ext.get(..2).ok_or(ProtocolError::PacketTooShort {
            protocol: "ipv6",
            needed: offset + 2,
            have: data.len(),
        })?;
        let next = fixed[0];

        let len = match nh {
            next_header::FRAGMENT => {
                let frag = ext.get(..8).ok_or(ProtocolError::PacketTooShort {
                    protocol: "ipv6",
                    needed: offset + 8,
                    have: data.len(),
                })?;
                let offset_and_flags = u16::from_be_bytes([frag[2], frag[3]]);
                // Upper 13 bits offset, lowest bit M; offset 0 without M is atomic
                if offset_and_flags >> 3 != 0 || offset_and_flags & 0x0001 != 0 {
                    return Err(SkipReason::Fragmented);
                }
                8
            }
            // AH length = (payload_len + 2) * 4 bytes
            next_header::AH => (usize::from(fixed[1]) + 2) * 4,
            // Length is in units of 8 octets, not including the first 8 octets
            _ => (usize::from(fixed[1]) + 1) * 8,
        };

        if ext.len() < len {
            return Err(ProtocolError::PacketTooShort {
                protocol: "ipv6",
                needed: offset + len,
                have: data.len(),
            }
            .into());
        }

        offset += len;
        nh = next;
    }

    Ok((nh, offset))
}
