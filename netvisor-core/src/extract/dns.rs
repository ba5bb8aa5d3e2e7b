//! DNS question extractor.

use super::AppLayerExtractor;
use crate::model::AppLayerInfo;

/// DNS header is 12 bytes.
const HEADER_LEN: usize = 12;

/// Questions beyond this count are treated as garbage, not DNS.
const MAX_QUESTIONS: u16 = 16;

/// Labels per name before the name is rejected.
const MAX_LABELS: usize = 128;

/// Reads the first question: `query` (name) and `qtype` (mnemonic).
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsExtractor;

impl AppLayerExtractor for DnsExtractor {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn extract(&self, payload: &[u8]) -> AppLayerInfo {
        let mut info = AppLayerInfo::new();

        // DNS over TCP carries a two-byte length prefix.
        let question = parse_question(payload).or_else(|| {
            let prefixed = payload.get(..2)?;
            let declared = u16::from_be_bytes([prefixed[0], prefixed[1]]) as usize;
            if declared + 2 == payload.len() {
                parse_question(&payload[2..])
            } else {
                None
            }
        });

        if let Some(question) = question {
            info.insert("query".to_string(), question.name);
            info.insert("qtype".to_string(), record_type_name(question.qtype));
        }
        info
    }
}

/// First entry of the question section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// Decode the DNS header and first question.
///
/// Returns `None` unless the header is plausible: at least one and at most
/// [`MAX_QUESTIONS`] questions, a standard opcode, and a complete first
/// question whose class is IN, CH, HS or ANY (the mDNS unicast bit is
/// ignored).
pub fn parse_question(data: &[u8]) -> Option<Question> {
    let header = data.get(..HEADER_LEN)?;

    let flags = u16::from_be_bytes([header[2], header[3]]);
    let opcode = (flags >> 11) & 0x0f;
    if opcode > 5 {
        return None;
    }

    let qdcount = u16::from_be_bytes([header[4], header[5]]);
    if qdcount == 0 || qdcount > MAX_QUESTIONS {
        return None;
    }

    let (name, consumed) = parse_domain_name(&data[HEADER_LEN..]).ok()?;
    let pos = HEADER_LEN + consumed;
    let fixed = data.get(pos..pos + 4)?;
    let qtype = u16::from_be_bytes([fixed[0], fixed[1]]);
    let qclass = u16::from_be_bytes([fixed[2], fixed[3]]);

    if !matches!(qclass & 0x7fff, 1 | 3 | 4 | 255) {
        return None;
    }

    Some(Question {
        name,
        qtype,
        qclass,
    })
}

/// Parse an uncompressed domain name. Returns the name and bytes consumed.
fn parse_domain_name(data: &[u8]) -> Result<(String, usize), String> {
    let mut name_parts: Vec<String> = Vec::with_capacity(4);
    let mut pos = 0;

    loop {
        let len = *data
            .get(pos)
            .ok_or_else(|| "unexpected end of data in domain name".to_string())?
            as usize;

        if len == 0 {
            pos += 1;
            break;
        }

        // A question name never needs a compression pointer.
        if (len & 0xC0) != 0 {
            return Err(format!("unsupported label prefix 0x{len:02x}"));
        }

        let label = data
            .get(pos + 1..pos + 1 + len)
            .ok_or_else(|| "label extends beyond data".to_string())?;
        match std::str::from_utf8(label) {
            Ok(s) => name_parts.push(s.to_string()),
            Err(_) => name_parts.push(label.iter().map(|b| format!("\\x{b:02x}")).collect()),
        }

        pos += 1 + len;

        if name_parts.len() > MAX_LABELS {
            return Err("too many labels in domain name".to_string());
        }
    }

    let name = if name_parts.is_empty() {
        ".".to_string()
    } else {
        name_parts.join(".")
    };

    Ok((name, pos))
}

/// Mnemonic for a record type, `TYPE<n>` when unnamed.
pub fn record_type_name(qtype: u16) -> String {
    let name = match qtype {
        1 => "A",
        2 => "NS",
        5 => "CNAME",
        6 => "SOA",
        12 => "PTR",
        13 => "HINFO",
        15 => "MX",
        16 => "TXT",
        28 => "AAAA",
        33 => "SRV",
        35 => "NAPTR",
        39 => "DNAME",
        41 => "OPT",
        43 => "DS",
        46 => "RRSIG",
        47 => "NSEC",
        48 => "DNSKEY",
        50 => "NSEC3",
        52 => "TLSA",
        64 => "SVCB",
        65 => "HTTPS",
        99 => "SPF",
        252 => "AXFR",
        251 => "IXFR",
        255 => "ANY",
        257 => "CAA",
        other => return format!("TYPE{other}"),
    };
    name.to_string()
}
