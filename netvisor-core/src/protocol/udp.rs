//! UDP header.

use etherparse::UdpHeaderSlice;

use crate::error::ProtocolError;

/// IP protocol number for UDP.
pub const IP_PROTO_UDP: u8 = 17;

pub const UDP_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct UdpDatagram<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Decode the UDP header. A length field that disagrees with the captured
/// bytes is ignored in favour of the bytes present.
pub fn parse(data: &[u8]) -> Result<UdpDatagram<'_>, ProtocolError> {
    let udp = UdpHeaderSlice::from_slice(data).map_err(|_| ProtocolError::PacketTooShort {
        protocol: "udp",
        needed: UDP_HEADER_LEN,
        have: data.len(),
    })?;

    let declared = usize::from(udp.length());
    let end = if (UDP_HEADER_LEN..=data.len()).contains(&declared) {
        declared
    } else {
        data.len()
    };

    Ok(UdpDatagram {
        src_port: udp.source_port(),
        dst_port: udp.destination_port(),
        payload: &data[UDP_HEADER_LEN..end],
    })
}
