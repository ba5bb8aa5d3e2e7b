//! Synthetic capture builders shared by the integration tests.

#![allow(dead_code)]

/// Build an Ethernet/IPv4 frame around a transport segment.
pub fn ethernet_ipv4(src: [u8; 4], dst: [u8; 4], protocol: u8, transport: &[u8]) -> Vec<u8> {
    let mut packet = Vec::new();

    // Ethernet header (14 bytes)
    packet.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]); // dst MAC
    packet.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]); // src MAC
    packet.extend_from_slice(&[0x08, 0x00]); // ethertype: IPv4

    packet.extend(ipv4(src, dst, protocol, transport));
    packet
}

/// Build a bare IPv4 packet (no link layer).
pub fn ipv4(src: [u8; 4], dst: [u8; 4], protocol: u8, transport: &[u8]) -> Vec<u8> {
    let total_len = (20 + transport.len()) as u16;
    let mut packet = Vec::new();

    packet.push(0x45); // Version 4, IHL 5
    packet.push(0x00); // DSCP + ECN
    packet.extend_from_slice(&total_len.to_be_bytes()); // Total length
    packet.extend_from_slice(&[0x00, 0x01]); // Identification
    packet.extend_from_slice(&[0x40, 0x00]); // Don't fragment
    packet.push(0x40); // TTL: 64
    packet.push(protocol);
    packet.extend_from_slice(&[0x00, 0x00]); // Checksum
    packet.extend_from_slice(&src);
    packet.extend_from_slice(&dst);
    packet.extend_from_slice(transport);
    packet
}

/// TCP flag bytes.
pub const SYN: u8 = 0x02;
pub const SYN_ACK: u8 = 0x12;
pub const ACK: u8 = 0x10;
pub const PSH_ACK: u8 = 0x18;
pub const FIN_ACK: u8 = 0x11;

pub fn tcp_segment(src_port: u16, dst_port: u16, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::new();
    segment.extend_from_slice(&src_port.to_be_bytes());
    segment.extend_from_slice(&dst_port.to_be_bytes());
    segment.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // Seq: 1
    segment.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Ack: 0
    segment.push(0x50); // Data offset: 5 (20 bytes)
    segment.push(flags);
    segment.extend_from_slice(&[0xff, 0xff]); // Window: 65535
    segment.extend_from_slice(&[0x00, 0x00]); // Checksum
    segment.extend_from_slice(&[0x00, 0x00]); // Urgent pointer
    segment.extend_from_slice(payload);
    segment
}

pub fn udp_datagram(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut datagram = Vec::new();
    datagram.extend_from_slice(&src_port.to_be_bytes());
    datagram.extend_from_slice(&dst_port.to_be_bytes());
    datagram.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes()); // Length
    datagram.extend_from_slice(&[0x00, 0x00]); // Checksum
    datagram.extend_from_slice(payload);
    datagram
}

pub fn tcp_frame(
    src: ([u8; 4], u16),
    dst: ([u8; 4], u16),
    flags: u8,
    payload: &[u8],
) -> Vec<u8> {
    ethernet_ipv4(src.0, dst.0, 6, &tcp_segment(src.1, dst.1, flags, payload))
}

pub fn udp_frame(src: ([u8; 4], u16), dst: ([u8; 4], u16), payload: &[u8]) -> Vec<u8> {
    ethernet_ipv4(src.0, dst.0, 17, &udp_datagram(src.1, dst.1, payload))
}

pub fn icmp_echo_frame(src: [u8; 4], dst: [u8; 4]) -> Vec<u8> {
    let icmp = [
        0x08, 0x00, // Type: Echo Request, Code 0
        0x00, 0x00, // Checksum
        0x00, 0x01, // Identifier
        0x00, 0x01, // Sequence
    ];
    ethernet_ipv4(src, dst, 1, &icmp)
}

/// Standard DNS query, class IN.
pub fn dns_query(name: &str, qtype: u16) -> Vec<u8> {
    let mut packet = vec![
        0x12, 0x34, // Transaction ID
        0x01, 0x00, // Flags: standard query, RD
        0x00, 0x01, // Questions: 1
        0x00, 0x00, // Answer RRs
        0x00, 0x00, // Authority RRs
        0x00, 0x00, // Additional RRs
    ];
    for label in name.split('.') {
        packet.push(label.len() as u8);
        packet.extend_from_slice(label.as_bytes());
    }
    packet.push(0x00);
    packet.extend_from_slice(&qtype.to_be_bytes());
    packet.extend_from_slice(&[0x00, 0x01]); // Class: IN
    packet
}

/// TLS 1.2 ClientHello record carrying a single SNI extension.
pub fn tls_client_hello(host: &str) -> Vec<u8> {
    let mut sni = Vec::new();
    sni.extend_from_slice(&0u16.to_be_bytes()); // Extension type: server_name
    sni.extend_from_slice(&((5 + host.len()) as u16).to_be_bytes()); // Extension length
    sni.extend_from_slice(&((3 + host.len()) as u16).to_be_bytes()); // List length
    sni.push(0x00); // Name type: host_name
    sni.extend_from_slice(&(host.len() as u16).to_be_bytes());
    sni.extend_from_slice(host.as_bytes());

    let mut body = vec![0x03, 0x03]; // Client version
    body.extend_from_slice(&[0u8; 32]); // Random
    body.push(0x00); // Session ID length
    body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]); // One cipher suite
    body.extend_from_slice(&[0x01, 0x00]); // Compression: null
    body.extend_from_slice(&(sni.len() as u16).to_be_bytes());
    body.extend_from_slice(&sni);

    let mut handshake = vec![0x01]; // ClientHello
    handshake.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    handshake.extend_from_slice(&body);

    let mut record = vec![0x16, 0x03, 0x01]; // Handshake, TLS 1.0 record version
    record.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
    record.extend_from_slice(&handshake);
    record
}

/// Little-endian microsecond PCAP writer.
pub struct PcapBuilder {
    data: Vec<u8>,
}

impl PcapBuilder {
    pub fn new(link_type: u32) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xd4, 0xc3, 0xb2, 0xa1]); // Magic (little endian)
        data.extend_from_slice(&[0x02, 0x00]); // Version major (2)
        data.extend_from_slice(&[0x04, 0x00]); // Version minor (4)
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Thiszone
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Sigfigs
        data.extend_from_slice(&[0xff, 0xff, 0x00, 0x00]); // Snaplen (65535)
        data.extend_from_slice(&link_type.to_le_bytes()); // Network
        Self { data }
    }

    pub fn ethernet() -> Self {
        Self::new(1)
    }

    pub fn packet(mut self, timestamp_us: i64, frame: &[u8]) -> Self {
        self.data.extend_from_slice(&((timestamp_us / 1_000_000) as u32).to_le_bytes());
        self.data.extend_from_slice(&((timestamp_us % 1_000_000) as u32).to_le_bytes());
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes()); // caplen
        self.data.extend_from_slice(&(frame.len() as u32).to_le_bytes()); // origlen
        self.data.extend_from_slice(frame);
        self
    }

    /// Append raw bytes, e.g. a record cut short.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// PCAPNG Section Header Block.
pub fn pcapng_shb() -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(&0x0A0D0D0Au32.to_le_bytes()); // Block type
    block.extend_from_slice(&28u32.to_le_bytes()); // Block total length
    block.extend_from_slice(&0x1A2B3C4Du32.to_le_bytes()); // Byte-order magic
    block.extend_from_slice(&1u16.to_le_bytes()); // Major
    block.extend_from_slice(&0u16.to_le_bytes()); // Minor
    block.extend_from_slice(&(-1i64).to_le_bytes()); // Section length
    block.extend_from_slice(&28u32.to_le_bytes());
    block
}

/// PCAPNG Interface Description Block, microsecond resolution.
pub fn pcapng_idb(link_type: u16) -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(&1u32.to_le_bytes()); // Block type
    block.extend_from_slice(&20u32.to_le_bytes()); // Block total length
    block.extend_from_slice(&link_type.to_le_bytes());
    block.extend_from_slice(&0u16.to_le_bytes()); // Reserved
    block.extend_from_slice(&0u32.to_le_bytes()); // Snaplen
    block.extend_from_slice(&20u32.to_le_bytes());
    block
}

/// PCAPNG Enhanced Packet Block.
pub fn pcapng_epb(if_id: u32, timestamp_us: u64, frame: &[u8]) -> Vec<u8> {
    let padded = (frame.len() + 3) & !3;
    let total = 32 + padded as u32;

    let mut block = Vec::new();
    block.extend_from_slice(&6u32.to_le_bytes()); // Block type
    block.extend_from_slice(&total.to_le_bytes());
    block.extend_from_slice(&if_id.to_le_bytes());
    block.extend_from_slice(&((timestamp_us >> 32) as u32).to_le_bytes());
    block.extend_from_slice(&(timestamp_us as u32).to_le_bytes());
    block.extend_from_slice(&(frame.len() as u32).to_le_bytes()); // Captured
    block.extend_from_slice(&(frame.len() as u32).to_le_bytes()); // Original
    block.extend_from_slice(frame);
    block.resize(block.len() + padded - frame.len(), 0);
    block.extend_from_slice(&total.to_le_bytes());
    block
}

/// Gzip-wrap a buffer.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
