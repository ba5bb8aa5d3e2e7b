//! HTTP/1.x request extractor.

use super::AppLayerExtractor;
use crate::model::AppLayerInfo;

const MAX_HEADERS: usize = 32;

/// Reads the request method, its target and the first `Host` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpExtractor;

impl AppLayerExtractor for HttpExtractor {
    fn name(&self) -> &'static str {
        "http"
    }

    fn extract(&self, payload: &[u8]) -> AppLayerInfo {
        let mut info = AppLayerInfo::new();

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        let (method, uri, host) = match req.parse(payload) {
            Ok(httparse::Status::Complete(_)) => {
                let host = req
                    .headers
                    .iter()
                    .find(|h| h.name.eq_ignore_ascii_case("host"))
                    .and_then(|h| std::str::from_utf8(h.value).ok())
                    .map(|v| v.trim().to_string());
                (
                    req.method.map(str::to_string),
                    req.path.map(str::to_string),
                    host,
                )
            }
            // Request split across segments, or more headers than we keep.
            Ok(httparse::Status::Partial) | Err(httparse::Error::TooManyHeaders) => {
                match request_line(payload) {
                    Some((method, uri)) => (Some(method), uri, scan_host(payload)),
                    None => (None, None, None),
                }
            }
            Err(_) => (None, None, None),
        };

        if let Some(method) = method {
            info.insert("method".to_string(), method);
        }
        if let Some(uri) = uri.filter(|u| !u.is_empty()) {
            info.insert("uri".to_string(), uri);
        }
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            info.insert("host".to_string(), host);
        }
        info
    }
}

/// Methods recognized when sniffing a payload.
pub const METHODS: &[&[u8]] = &[
    b"GET", b"POST", b"HEAD", b"PUT", b"DELETE", b"OPTIONS", b"PATCH", b"CONNECT", b"TRACE",
];

/// Whether the payload opens with an HTTP/1.x request line or status line.
pub fn looks_like_http(payload: &[u8]) -> bool {
    if payload.starts_with(b"HTTP/1.") {
        return true;
    }
    METHODS.iter().any(|m| {
        payload.len() > m.len() && payload.starts_with(m) && payload[m.len()] == b' '
    })
}

/// Method and target of a request line cut off before its end. The target
/// is only reported once the space that ends it has been seen.
fn request_line(payload: &[u8]) -> Option<(String, Option<String>)> {
    let end = payload.iter().position(|&b| b == b' ')?;
    let token = &payload[..end];
    if token.is_empty() || !token.iter().all(u8::is_ascii_uppercase) {
        return None;
    }
    let method = std::str::from_utf8(token).ok()?.to_string();

    let rest = &payload[end + 1..];
    let uri = rest
        .iter()
        .position(|&b| b == b' ' || b == b'\r' || b == b'\n')
        .filter(|&len| rest[len] == b' ')
        .and_then(|len| std::str::from_utf8(&rest[..len]).ok())
        .map(str::to_string);
    Some((method, uri))
}

/// First complete `Host:` line of a partial header block.
fn scan_host(payload: &[u8]) -> Option<String> {
    let mut lines = payload.split(|&b| b == b'\n');
    lines.next()?; // request line

    // Only lines terminated by LF are complete.
    let complete = payload.iter().filter(|&&b| b == b'\n').count();
    for line in lines.take(complete.saturating_sub(1)) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            break;
        }
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        if line[..colon].eq_ignore_ascii_case(b"host") {
            return std::str::from_utf8(&line[colon + 1..])
                .ok()
                .map(|v| v.trim().to_string());
        }
    }
    None
}
