//! TCP header.

use etherparse::TcpHeaderSlice;

use crate::error::ProtocolError;

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

pub const TCP_MIN_HEADER_LEN: usize = 20;

/// Control flags that drive flow direction and lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
}

impl TcpFlags {
    /// Opening segment of a handshake (SYN without ACK).
    pub fn is_syn(&self) -> bool {
        self.syn && !self.ack
    }

    /// Connection teardown (FIN or RST).
    pub fn is_close(&self) -> bool {
        self.fin || self.rst
    }
}

/// Decoded TCP header fields and segment payload.
#[derive(Debug, Clone, Copy)]
pub struct TcpSegment<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    pub flags: TcpFlags,
    pub payload: &'a [u8],
}

pub fn parse(data: &[u8]) -> Result<TcpSegment<'_>, ProtocolError> {
    if data.len() < TCP_MIN_HEADER_LEN {
        return Err(ProtocolError::PacketTooShort {
            protocol: "tcp",
            needed: TCP_MIN_HEADER_LEN,
            have: data.len(),
        });
    }

    let tcp = TcpHeaderSlice::from_slice(data).map_err(|e| ProtocolError::InvalidField {
        protocol: "tcp",
        field: "data_offset",
        reason: e.to_string(),
    })?;

    let header_len = tcp.slice().len();
    Ok(TcpSegment {
        src_port: tcp.source_port(),
        dst_port: tcp.destination_port(),
        flags: TcpFlags {
            syn: tcp.syn(),
            ack: tcp.ack(),
            fin: tcp.fin(),
            rst: tcp.rst(),
        },
        payload: &data[header_len..],
    })
}
