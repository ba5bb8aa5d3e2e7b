//! Test utilities for packet dissection.
//!
//! Provides builders for constructing test frames and whole capture files.

use bytes::Bytes;

use crate::io::RawFrame;

/// Builder for constructing Ethernet frames.
#[derive(Debug, Clone)]
pub struct EthernetBuilder {
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    ethertype: u16,
    payload: Vec<u8>,
}

impl Default for EthernetBuilder {
    fn default() -> Self {
        Self {
            src_mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            dst_mac: [0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            ethertype: 0x0800, // IPv4
            payload: Vec::new(),
        }
    }
}

impl EthernetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn ipv6(self) -> Self {
        self.ethertype(0x86DD)
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(14 + self.payload.len());
        frame.extend_from_slice(&self.dst_mac);
        frame.extend_from_slice(&self.src_mac);
        frame.extend_from_slice(&self.ethertype.to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Builder for constructing IPv4 packets.
#[derive(Debug, Clone)]
pub struct Ipv4Builder {
    flags_fragment: u16,
    ttl: u8,
    protocol: u8,
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    payload: Vec<u8>,
}

impl Default for Ipv4Builder {
    fn default() -> Self {
        Self {
            flags_fragment: 0x4000, // Don't fragment
            ttl: 64,
            protocol: 6, // TCP
            src_ip: [192, 168, 1, 1],
            dst_ip: [192, 168, 1, 2],
            payload: Vec::new(),
        }
    }
}

impl Ipv4Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn udp(self) -> Self {
        self.protocol(17)
    }

    pub fn icmp(self) -> Self {
        self.protocol(1)
    }

    pub fn src_ip(mut self, ip: [u8; 4]) -> Self {
        self.src_ip = ip;
        self
    }

    pub fn dst_ip(mut self, ip: [u8; 4]) -> Self {
        self.dst_ip = ip;
        self
    }

    pub fn more_fragments(mut self) -> Self {
        self.flags_fragment = 0x2000 | (self.flags_fragment & 0x1fff);
        self
    }

    /// Fragment offset in 8-byte units.
    pub fn fragment_offset(mut self, offset: u16) -> Self {
        self.flags_fragment = (self.flags_fragment & 0xe000) | (offset & 0x1fff);
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let total_length = 20 + self.payload.len() as u16;
        let mut header = Vec::with_capacity(20 + self.payload.len());

        header.push(0x45); // Version 4, IHL 5 (20 bytes)
        header.push(0x00); // DSCP/ECN
        header.extend_from_slice(&total_length.to_be_bytes());
        header.extend_from_slice(&[0x00, 0x01]); // Identification
        header.extend_from_slice(&self.flags_fragment.to_be_bytes());
        header.push(self.ttl);
        header.push(self.protocol);
        header.extend_from_slice(&[0x00, 0x00]); // Checksum (not calculated)
        header.extend_from_slice(&self.src_ip);
        header.extend_from_slice(&self.dst_ip);
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Builder for constructing IPv6 packets.
#[derive(Debug, Clone)]
pub struct Ipv6Builder {
    next_header: u8,
    src_ip: [u8; 16],
    dst_ip: [u8; 16],
    payload: Vec<u8>,
}

impl Default for Ipv6Builder {
    fn default() -> Self {
        let mut src_ip = [0u8; 16];
        src_ip[..4].copy_from_slice(&[0x20, 0x01, 0x0d, 0xb8]);
        let mut dst_ip = src_ip;
        src_ip[15] = 1; // 2001:db8::1
        dst_ip[15] = 2; // 2001:db8::2
        Self {
            next_header: 6,
            src_ip,
            dst_ip,
            payload: Vec::new(),
        }
    }
}

impl Ipv6Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_header(mut self, next_header: u8) -> Self {
        self.next_header = next_header;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(40 + self.payload.len());

        packet.extend_from_slice(&[0x60, 0x00, 0x00, 0x00]); // Version 6, class, flow label
        packet.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        packet.push(self.next_header);
        packet.push(64); // Hop limit
        packet.extend_from_slice(&self.src_ip);
        packet.extend_from_slice(&self.dst_ip);
        packet.extend_from_slice(&self.payload);

        packet
    }
}

/// Builder for constructing TCP segments.
#[derive(Debug, Clone)]
pub struct TcpBuilder {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    flags: u8,
    payload: Vec<u8>,
}

impl Default for TcpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 80,
            seq: 1,
            flags: 0x02, // SYN
            payload: Vec::new(),
        }
    }
}

impl TcpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn syn(self) -> Self {
        self.flags(0x02)
    }

    pub fn syn_ack(self) -> Self {
        self.flags(0x12)
    }

    pub fn rst(self) -> Self {
        self.flags(0x04)
    }

    pub fn psh_ack(self) -> Self {
        self.flags(0x18)
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut header = Vec::with_capacity(20 + self.payload.len());

        header.extend_from_slice(&self.src_port.to_be_bytes());
        header.extend_from_slice(&self.dst_port.to_be_bytes());
        header.extend_from_slice(&self.seq.to_be_bytes());
        header.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Ack number
        header.push(0x50); // Data offset 5 + reserved
        header.push(self.flags);
        header.extend_from_slice(&[0xff, 0xff]); // Window
        header.extend_from_slice(&[0x00, 0x00]); // Checksum
        header.extend_from_slice(&[0x00, 0x00]); // Urgent pointer
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Builder for constructing UDP datagrams.
#[derive(Debug, Clone)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl Default for UdpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 53,
            payload: Vec::new(),
        }
    }
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let length = 8 + self.payload.len() as u16;
        let mut header = Vec::with_capacity(8 + self.payload.len());

        header.extend_from_slice(&self.src_port.to_be_bytes());
        header.extend_from_slice(&self.dst_port.to_be_bytes());
        header.extend_from_slice(&length.to_be_bytes());
        header.extend_from_slice(&[0x00, 0x00]); // Checksum
        header.extend_from_slice(&self.payload);

        header
    }
}

/// Build a complete Ethernet/IPv4/TCP packet.
pub fn build_tcp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    flags: u8,
    payload: &[u8],
) -> Vec<u8> {
    let tcp = TcpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .flags(flags)
        .payload(payload.to_vec())
        .build();

    let ipv4 = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .payload(tcp)
        .build();

    EthernetBuilder::new().payload(ipv4).build()
}

/// Build a complete Ethernet/IPv4/UDP packet.
pub fn build_udp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let udp = UdpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .payload(payload.to_vec())
        .build();

    let ipv4 = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .udp()
        .payload(udp)
        .build();

    EthernetBuilder::new().payload(ipv4).build()
}

/// Wrap link-layer bytes in a frame with a fixed timestamp.
pub fn frame(link_type: u32, data: Vec<u8>) -> RawFrame {
    RawFrame {
        frame_number: 1,
        timestamp_us: 1_700_000_000_000_000,
        captured_length: data.len() as u32,
        original_length: data.len() as u32,
        link_type,
        data: Bytes::from(data),
    }
}

/// Little-endian microsecond PCAP file writer.
#[derive(Debug, Clone)]
pub struct PcapWriter {
    data: Vec<u8>,
}

impl PcapWriter {
    pub fn new(link_type: u32) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xd4, 0xc3, 0xb2, 0xa1]); // Magic (little endian)
        data.extend_from_slice(&[0x02, 0x00, 0x04, 0x00]); // Version 2.4
        data.extend_from_slice(&[0x00; 8]); // Thiszone, sigfigs
        data.extend_from_slice(&65535u32.to_le_bytes()); // Snaplen
        data.extend_from_slice(&link_type.to_le_bytes()); // Network
        Self { data }
    }

    pub fn ethernet() -> Self {
        Self::new(1)
    }

    pub fn packet(mut self, timestamp_us: i64, frame: &[u8]) -> Self {
        let ts_sec = (timestamp_us / 1_000_000) as u32;
        let ts_usec = (timestamp_us % 1_000_000) as u32;
        self.data.extend_from_slice(&ts_sec.to_le_bytes());
        self.data.extend_from_slice(&ts_usec.to_le_bytes());
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        self.data.extend_from_slice(frame);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}
