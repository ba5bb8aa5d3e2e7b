//! BSD loopback (NULL/LOOP) and raw-IP link layers.

use super::ethernet::ethertype;
use crate::error::{ProtocolError, SkipReason};

/// BSD loopback, address family in host byte order.
pub const LINKTYPE_NULL: u32 = 0;
/// OpenBSD loopback, address family in network byte order.
pub const LINKTYPE_LOOP: u32 = 108;
/// Raw IPv4 or IPv6, version from the first nibble.
pub const LINKTYPE_RAW: u32 = 101;
/// DLT_RAW values used in place of LINKTYPE_RAW by some writers.
pub const LINKTYPE_RAW_DLT: u32 = 12;
pub const LINKTYPE_RAW_DLT_OPENBSD: u32 = 14;
pub const LINKTYPE_IPV4: u32 = 228;
pub const LINKTYPE_IPV6: u32 = 229;

/// AF_INET6 differs across platforms.
const AF_INET: u32 = 2;
const AF_INET6: [u32; 4] = [10, 24, 28, 30];

/// Strip the 4-byte loopback header.
pub fn parse(data: &[u8], link_type: u32) -> Result<(u16, &[u8]), SkipReason> {
    let header = data.get(..4).ok_or(ProtocolError::PacketTooShort {
        protocol: "loopback",
        needed: 4,
        have: data.len(),
    })?;
    let bytes = [header[0], header[1], header[2], header[3]];

    let family = if link_type == LINKTYPE_LOOP {
        u32::from_be_bytes(bytes)
    } else {
        // Host byte order of the capturing machine; a little-endian
        // reading of a big-endian family lands in the upper half.
        let le = u32::from_le_bytes(bytes);
        if le > 0xffff {
            u32::from_be_bytes(bytes)
        } else {
            le
        }
    };

    let ethertype = match family {
        AF_INET => ethertype::IPV4,
        f if AF_INET6.contains(&f) => ethertype::IPV6,
        f => return Err(SkipReason::UnsupportedNetwork(f as u16)),
    };
    Ok((ethertype, &data[4..]))
}

/// EtherType implied by the IP version nibble of a raw packet.
pub fn raw_ethertype(data: &[u8]) -> Result<u16, SkipReason> {
    match data.first().map(|b| b >> 4) {
        Some(4) => Ok(ethertype::IPV4),
        Some(6) => Ok(ethertype::IPV6),
        Some(v) => Err(SkipReason::UnsupportedNetwork(u16::from(v))),
        None => Err(ProtocolError::PacketTooShort {
            protocol: "raw",
            needed: 1,
            have: 0,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_host_order() {
        let le = [0x02, 0x00, 0x00, 0x00, 0x45];
        assert_eq!(parse(&le, LINKTYPE_NULL).unwrap(), (ethertype::IPV4, &le[4..]));

        let be = [0x00, 0x00, 0x00, 0x1e, 0x60];
        assert_eq!(parse(&be, LINKTYPE_NULL).unwrap().0, ethertype::IPV6);
    }

    #[test]
    fn test_loop_network_order() {
        let data = [0x00, 0x00, 0x00, 0x18];
        assert_eq!(parse(&data, LINKTYPE_LOOP).unwrap().0, ethertype::IPV6);
    }

    #[test]
    fn test_unknown_family() {
        let data = [0x07, 0x00, 0x00, 0x00];
        assert_eq!(
            parse(&data, LINKTYPE_NULL).unwrap_err(),
            SkipReason::UnsupportedNetwork(7)
        );
        assert!(matches!(
            parse(&data[..2], LINKTYPE_NULL).unwrap_err(),
            SkipReason::Malformed(_)
        ));
    }

    #[test]
    fn test_raw_version() {
        assert_eq!(raw_ethertype(&[0x45]).unwrap(), ethertype::IPV4);
        assert_eq!(raw_ethertype(&[0x60]).unwrap(), ethertype::IPV6);
        assert_eq!(raw_ethertype(&[0x50]).unwrap_err(), SkipReason::UnsupportedNetwork(5));
        assert!(raw_ethertype(&[]).is_err());
    }
}
