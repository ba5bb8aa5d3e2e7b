//! SSH identification banner extractor.

use super::AppLayerExtractor;
use crate::model::AppLayerInfo;

/// Banners longer than this (RFC 4253 allows 255) are not SSH.
const MAX_BANNER_LEN: usize = 255;

/// Reads `SSH-protoversion-softwareversion [comments]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshExtractor;

impl AppLayerExtractor for SshExtractor {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn extract(&self, payload: &[u8]) -> AppLayerInfo {
        let mut info = AppLayerInfo::new();
        if let Some((proto_version, software)) = parse_identification(payload) {
            info.insert("proto_version".to_string(), proto_version.to_string());
            info.insert("software".to_string(), software.to_string());
        }
        info
    }
}

/// Whether the payload opens with an SSH banner.
pub fn looks_like_ssh(payload: &[u8]) -> bool {
    payload.starts_with(b"SSH-")
}

fn parse_identification(data: &[u8]) -> Option<(&str, &str)> {
    let line_end = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let line = &data[..line_end.min(MAX_BANNER_LEN)];
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let content = std::str::from_utf8(line).ok()?.strip_prefix("SSH-")?;
    let (proto_version, rest) = content.split_once('-')?;

    // Software version ends at the first space; comments follow.
    let software = rest.split(' ').next().unwrap_or(rest);
    if proto_version.is_empty() || software.is_empty() {
        return None;
    }
    Some((proto_version, software))
}
