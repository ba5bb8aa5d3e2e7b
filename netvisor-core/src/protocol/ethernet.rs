//! Ethernet II header.

use etherparse::Ethernet2HeaderSlice;

use crate::error::ProtocolError;

/// Link type constant for Ethernet.
pub const LINKTYPE_ETHERNET: u32 = 1;

pub const ETHERNET_HEADER_LEN: usize = 14;

/// EtherType values the dissector follows.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const VLAN: u16 = 0x8100;
    pub const IPV6: u16 = 0x86DD;
    pub const QINQ: u16 = 0x88A8;
    /// Pre-standard QinQ outer tag
    pub const QINQ_LEGACY: u16 = 0x9100;
}

/// Strip the Ethernet header, returning the EtherType and the rest.
pub fn parse(data: &[u8]) -> Result<(u16, &[u8]), ProtocolError> {
    let eth = Ethernet2HeaderSlice::from_slice(data).map_err(|_| ProtocolError::PacketTooShort {
        protocol: "ethernet",
        needed: ETHERNET_HEADER_LEN,
        have: data.len(),
    })?;
    let header_len = eth.slice().len();
    Ok((eth.ether_type().0, &data[header_len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ethernet() {
        let frame = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // Dst MAC
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // Src MAC
            0x86, 0xdd, // EtherType: IPv6
            0x60, 0x00, // Payload
        ];

        let (ethertype, rest) = parse(&frame).unwrap();
        assert_eq!(ethertype, ethertype::IPV6);
        assert_eq!(rest, &[0x60, 0x00]);
    }

    #[test]
    fn test_parse_too_short() {
        let err = parse(&[0xff; 10]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PacketTooShort {
                protocol: "ethernet",
                needed: 14,
                have: 10
            }
        );
    }
}
