//! TLS ClientHello extractor.
//!
//! Walks a single handshake record looking for the `server_name` and
//! `application_layer_protocol_negotiation` extensions. The ClientHello has
//! to be contained in the first record of the payload; nothing is
//! reassembled across segments.

use super::AppLayerExtractor;
use crate::model::AppLayerInfo;

/// TLS content types.
pub mod content_type {
    pub const HANDSHAKE: u8 = 22;
}

/// TLS handshake types.
pub mod handshake_type {
    pub const CLIENT_HELLO: u8 = 1;
}

/// TLS extension types.
pub mod extension_type {
    pub const SERVER_NAME: u16 = 0;
    pub const ALPN: u16 = 16;
}

/// Record header: type (1) + version (2) + length (2).
const RECORD_HEADER_LEN: usize = 5;

/// Reads SNI and ALPN from a ClientHello.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsExtractor;

impl AppLayerExtractor for TlsExtractor {
    fn name(&self) -> &'static str {
        "tls"
    }

    fn extract(&self, payload: &[u8]) -> AppLayerInfo {
        let mut info = AppLayerInfo::new();
        if let Some(hello) = parse_client_hello(payload) {
            if let Some(sni) = hello.sni {
                info.insert("sni".to_string(), sni);
            }
            if !hello.alpn.is_empty() {
                info.insert("alpn".to_string(), hello.alpn.join(","));
            }
        }
        info
    }
}

/// Whether the payload opens with a TLS handshake record header.
pub fn looks_like_tls(payload: &[u8]) -> bool {
    matches!(payload, [content_type::HANDSHAKE, 0x03, minor, ..] if *minor <= 4)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ClientHello {
    sni: Option<String>,
    alpn: Vec<String>,
}

fn be16(data: &[u8], offset: usize) -> Option<usize> {
    let b = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]) as usize)
}

fn parse_client_hello(payload: &[u8]) -> Option<ClientHello> {
    if !looks_like_tls(payload) {
        return None;
    }
    let record_len = be16(payload, 3)?;
    let record = payload.get(RECORD_HEADER_LEN..RECORD_HEADER_LEN + record_len)?;

    // Handshake header: type (1) + length (3)
    let (&msg_type, rest) = record.split_first()?;
    if msg_type != handshake_type::CLIENT_HELLO {
        return None;
    }
    let len_bytes = rest.get(..3)?;
    let hello_len =
        ((len_bytes[0] as usize) << 16) | ((len_bytes[1] as usize) << 8) | (len_bytes[2] as usize);
    let body = rest.get(3..3 + hello_len)?;

    // Skip version (2 bytes) and random (32 bytes)
    let mut offset = 34;

    let session_id_len = *body.get(offset)? as usize;
    offset += 1 + session_id_len;

    let cipher_suites_len = be16(body, offset)?;
    offset += 2 + cipher_suites_len;

    let compression_len = *body.get(offset)? as usize;
    offset += 1 + compression_len;

    let mut hello = ClientHello::default();

    // Extensions are optional in a ClientHello.
    let Some(extensions_len) = be16(body, offset) else {
        return Some(hello);
    };
    offset += 2;
    let extensions = body.get(offset..offset + extensions_len)?;

    let mut pos = 0;
    while pos + 4 <= extensions.len() {
        let ext_type = be16(extensions, pos)? as u16;
        let ext_len = be16(extensions, pos + 2)?;
        pos += 4;

        let Some(ext_data) = extensions.get(pos..pos + ext_len) else {
            break;
        };

        match ext_type {
            extension_type::SERVER_NAME if hello.sni.is_none() => {
                hello.sni = parse_sni_extension(ext_data);
            }
            extension_type::ALPN if hello.alpn.is_empty() => {
                hello.alpn = parse_alpn_extension(ext_data);
            }
            _ => {}
        }

        pos += ext_len;
    }

    Some(hello)
}

/// First `host_name` entry of a server name list.
fn parse_sni_extension(data: &[u8]) -> Option<String> {
    let list_len = be16(data, 0)?;
    let list = data.get(2..2 + list_len)?;

    let mut offset = 0;
    while offset + 3 <= list.len() {
        let name_type = list[offset];
        let name_len = be16(list, offset + 1)?;
        offset += 3;

        let name = list.get(offset..offset + name_len)?;
        if name_type == 0 {
            return std::str::from_utf8(name)
                .ok()
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }

        offset += name_len;
    }

    None
}

/// Protocol names offered in the ALPN extension.
fn parse_alpn_extension(data: &[u8]) -> Vec<String> {
    let mut protocols = Vec::new();
    let Some(list_len) = be16(data, 0) else {
        return protocols;
    };
    let Some(list) = data.get(2..2 + list_len) else {
        return protocols;
    };

    let mut offset = 0;
    while let Some(&len) = list.get(offset) {
        let Some(name) = list.get(offset + 1..offset + 1 + len as usize) else {
            break;
        };
        if let Ok(name) = std::str::from_utf8(name) {
            protocols.push(name.to_string());
        }
        offset += 1 + len as usize;
    }
    protocols
}
