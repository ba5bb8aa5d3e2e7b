//! IPv4 header.

use std::net::IpAddr;

use etherparse::Ipv4HeaderSlice;

use super::IpLayer;
use crate::error::{ProtocolError, SkipReason};

pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Decode the IPv4 header. The payload is bounded by `total_len`, which
/// trims Ethernet padding; a capture cut short by the snap length keeps
/// whatever bytes are present.
pub fn parse(data: &[u8]) -> Result<IpLayer<'_>, SkipReason> {
    if data.len() < IPV4_MIN_HEADER_LEN {
        return Err(ProtocolError::PacketTooShort {
            protocol: "ipv4",
            needed: IPV4_MIN_HEADER_LEN,
            have: data.len(),
        }
        .into());
    }

    let ipv4 = Ipv4HeaderSlice::from_slice(data).map_err(|e| ProtocolError::InvalidField {
        protocol: "ipv4",
        field: "header",
        reason: e.to_string(),
    })?;

    if ipv4.more_fragments() || ipv4.fragments_offset().value() != 0 {
        return Err(SkipReason::Fragmented);
    }

    let header_len = ipv4.slice().len();
    let total_len = usize::from(ipv4.total_len());
    if total_len < header_len {
        return Err(ProtocolError::InvalidField {
            protocol: "ipv4",
            field: "total_length",
            reason: format!("{total_len} is shorter than the {header_len}-byte header"),
        }
        .into());
    }
    let end = total_len.min(data.len());

    Ok(IpLayer {
        src: IpAddr::V4(ipv4.source_addr()),
        dst: IpAddr::V4(ipv4.destination_addr()),
        protocol: ipv4.protocol().0,
        payload: &data[header_len..end],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::Ipv4Builder;

    #[test]
    fn test_parse_ipv4() {
        let header = [
            0x45, // Version 4, IHL 5
            0x00, // DSCP/ECN
            0x00, 0x18, // Total length: 24
            0x12, 0x34, // Identification
            0x40, 0x00, // Don't fragment
            0x40, // TTL
            0x11, // Protocol: UDP
            0x00, 0x00, // Checksum
            0x0a, 0x00, 0x00, 0x01, // Src: 10.0.0.1
            0x08, 0x08, 0x08, 0x08, // Dst: 8.8.8.8
            0xde, 0xad, 0xbe, 0xef, // Payload
            0x00, 0x00, // Ethernet padding
        ];

        let ip = parse(&header).unwrap();
        assert_eq!(ip.src, "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(ip.dst, "8.8.8.8".parse::<IpAddr>().unwrap());
        assert_eq!(ip.protocol, 17);
        assert_eq!(ip.payload, &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_fragments_skipped() {
        let more = Ipv4Builder::new().more_fragments().payload(vec![0; 8]).build();
        assert_eq!(parse(&more).unwrap_err(), SkipReason::Fragmented);

        let tail = Ipv4Builder::new().fragment_offset(185).payload(vec![0; 8]).build();
        assert_eq!(parse(&tail).unwrap_err(), SkipReason::Fragmented);
    }

    #[test]
    fn test_snaplen_cut_keeps_present_bytes() {
        let mut packet = Ipv4Builder::new().payload(vec![1; 40]).build();
        packet.truncate(30);
        let ip = parse(&packet).unwrap();
        assert_eq!(ip.payload.len(), 10);
    }

    #[test]
    fn test_malformed_headers() {
        assert!(matches!(
            parse(&[0x45, 0x00, 0x00]).unwrap_err(),
            SkipReason::Malformed(ProtocolError::PacketTooShort { .. })
        ));

        // IHL of 3 words
        let mut bad_ihl = Ipv4Builder::new().build();
        bad_ihl[0] = 0x43;
        assert!(matches!(parse(&bad_ihl).unwrap_err(), SkipReason::Malformed(_)));

        // Total length smaller than the header
        let mut bad_len = Ipv4Builder::new().build();
        bad_len[2..4].copy_from_slice(&10u16.to_be_bytes());
        assert!(matches!(parse(&bad_len).unwrap_err(), SkipReason::Malformed(_)));
    }
}
