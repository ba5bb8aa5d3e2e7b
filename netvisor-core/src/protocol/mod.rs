//! Packet dissection from link layer to transport header.
//!
//! [`dissect`] strips the link layer (Ethernet, VLAN tags, Linux cooked,
//! loopback or raw IP), the IP header and the TCP/UDP/ICMP header of one
//! [`RawFrame`], yielding a [`ConnectionTuple`] and the payload.
//!
//! Every failure is a [`SkipReason`]: the frame is counted and dropped,
//! and the capture continues.

mod ethernet;
mod icmp;
mod ipv4;
mod ipv6;
mod linux_sll;
mod null;
mod tcp;
mod udp;
mod vlan;

// Test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;

use std::net::IpAddr;

use bytes::Bytes;

use crate::error::SkipReason;
use crate::io::RawFrame;

pub use ethernet::{ethertype, LINKTYPE_ETHERNET};
pub use icmp::{IP_PROTO_ICMP, IP_PROTO_ICMPV6};
pub use linux_sll::{LINKTYPE_LINUX_SLL, LINKTYPE_LINUX_SLL2};
pub use null::{
    LINKTYPE_IPV4, LINKTYPE_IPV6, LINKTYPE_LOOP, LINKTYPE_NULL, LINKTYPE_RAW, LINKTYPE_RAW_DLT,
    LINKTYPE_RAW_DLT_OPENBSD,
};
pub use tcp::{TcpFlags, IP_PROTO_TCP};
pub use udp::IP_PROTO_UDP;

/// Transport protocol of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transport {
    Tcp,
    Udp,
    /// ICMP or ICMPv6; ports are always zero
    Icmp,
}

impl Transport {
    /// Map a Zeek `proto` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tcp" => Some(Transport::Tcp),
            "udp" => Some(Transport::Udp),
            "icmp" | "icmp6" | "icmpv6" => Some(Transport::Icmp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Udp => "udp",
            Transport::Icmp => "icmp",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source and destination of one packet or log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionTuple {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub transport: Transport,
}

/// Network layer output shared by the IPv4 and IPv6 decoders.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IpLayer<'a> {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub protocol: u8,
    pub payload: &'a [u8],
}

/// A frame reduced to what flow reconstruction needs.
#[derive(Debug, Clone)]
pub struct DissectedPacket {
    pub frame_number: u64,
    pub timestamp_us: i64,
    /// Bytes on the wire, from the capture record
    pub wire_len: u32,
    pub tuple: ConnectionTuple,
    pub flags: TcpFlags,
    /// Transport payload; a view into the frame buffer
    pub payload: Bytes,
}

/// Strip the link layer, returning the EtherType it announces.
fn link_layer(link_type: u32, data: &[u8]) -> Result<(u16, &[u8]), SkipReason> {
    match link_type {
        LINKTYPE_ETHERNET => Ok(ethernet::parse(data)?),
        LINKTYPE_LINUX_SLL => Ok(linux_sll::parse(data)?),
        LINKTYPE_LINUX_SLL2 => Ok(linux_sll::parse_v2(data)?),
        LINKTYPE_NULL | LINKTYPE_LOOP => null::parse(data, link_type),
        LINKTYPE_RAW | LINKTYPE_RAW_DLT | LINKTYPE_RAW_DLT_OPENBSD => {
            Ok((null::raw_ethertype(data)?, data))
        }
        LINKTYPE_IPV4 => Ok((ethertype::IPV4, data)),
        LINKTYPE_IPV6 => Ok((ethertype::IPV6, data)),
        other => Err(SkipReason::UnsupportedLinkType(other)),
    }
}

/// Decode one frame down to its transport header.
pub fn dissect(frame: &RawFrame) -> Result<DissectedPacket, SkipReason> {
    let (ethertype, rest) = link_layer(frame.link_type, &frame.data)?;
    let (ethertype, rest) = vlan::strip(ethertype, rest)?;

    let ip = match ethertype {
        ethertype::IPV4 => ipv4::parse(rest)?,
        ethertype::IPV6 => ipv6::parse(rest)?,
        other => return Err(SkipReason::UnsupportedNetwork(other)),
    };

    let (transport, src_port, dst_port, flags, payload) = match ip.protocol {
        IP_PROTO_TCP => {
            let seg = tcp::parse(ip.payload)?;
            (Transport::Tcp, seg.src_port, seg.dst_port, seg.flags, seg.payload)
        }
        IP_PROTO_UDP => {
            let dgram = udp::parse(ip.payload)?;
            (Transport::Udp, dgram.src_port, dgram.dst_port, TcpFlags::default(), dgram.payload)
        }
        IP_PROTO_ICMP | IP_PROTO_ICMPV6 => {
            icmp::parse(ip.payload)?;
            (Transport::Icmp, 0, 0, TcpFlags::default(), &[][..])
        }
        other => return Err(SkipReason::UnsupportedTransport(other)),
    };

    Ok(DissectedPacket {
        frame_number: frame.frame_number,
        timestamp_us: frame.timestamp_us,
        wire_len: frame.original_length,
        tuple: ConnectionTuple {
            src_ip: ip.src,
            src_port,
            dst_ip: ip.dst,
            dst_port,
            transport,
        },
        flags,
        payload: if payload.is_empty() {
            Bytes::new()
        } else {
            frame.data.slice_ref(payload)
        },
    })
}
