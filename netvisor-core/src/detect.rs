//! Input format sniffing.
//!
//! Formats are recognized from content only; file names and declared
//! content types are never consulted.

use serde::{Deserialize, Serialize};

use crate::io::PcapFormat;

/// Directives that may open a Zeek ASCII log.
const ZEEK_DIRECTIVES: &[&str] = &[
    "#separator",
    "#set_separator",
    "#empty_field",
    "#unset_field",
    "#path",
    "#open",
    "#fields",
    "#types",
];

/// Detected input format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    ZeekLog,
    Pcap,
    PcapNg,
    #[default]
    Unrecognized,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::ZeekLog => write!(f, "zeek"),
            InputFormat::Pcap => write!(f, "pcap"),
            InputFormat::PcapNg => write!(f, "pcapng"),
            InputFormat::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Classify an upload from its leading bytes.
pub fn detect(data: &[u8]) -> InputFormat {
    match PcapFormat::detect(data) {
        Some(PcapFormat::PcapNg) => InputFormat::PcapNg,
        Some(_) => InputFormat::Pcap,
        None if looks_like_zeek(data) => InputFormat::ZeekLog,
        None => InputFormat::Unrecognized,
    }
}

/// The first line must be a Zeek header directive followed by a space, a
/// tab or the end of the line.
fn looks_like_zeek(data: &[u8]) -> bool {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let line_end = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let line = &data[..line_end];
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    ZEEK_DIRECTIVES.iter().any(|directive| {
        line.strip_prefix(directive.as_bytes())
            .is_some_and(|rest| matches!(rest.first(), None | Some(b' ') | Some(b'\t')))
    })
}
