//! Mapping of Zeek log records onto analysis events.

use compact_str::CompactString;

use super::reader::ZeekRecord;
use super::value::ZeekValue;
use crate::aggregate::{seconds_to_micros, Endpoint, EventRecord};
use crate::classify::{Classifier, UNKNOWN};
use crate::error::ZeekError;
use crate::extract::{record_type_name, ExtractorRegistry};
use crate::model::AppLayerInfo;
use crate::protocol::{ConnectionTuple, Transport};

/// Columns a log needs before any of its lines can become events.
pub const REQUIRED_COLUMNS: &[&str] = &["ts", "id.orig_h", "id.resp_h"];

/// `(column, metadata key)` pairs copied when the protocol's extractor is
/// enabled.
const APP_COLUMNS: &[(&str, &[(&str, &str)])] = &[
    ("http", &[("method", "method"), ("host", "host"), ("uri", "uri")]),
    ("dns", &[("query", "query"), ("qtype_name", "qtype")]),
    ("tls", &[("server_name", "sni")]),
    ("ssh", &[("client", "software")]),
];

/// Lowercased label with Zeek's `ssl` spelled `tls`.
fn canonical_label(name: &str) -> Option<CompactString> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "" => None,
        "ssl" => Some("tls".into()),
        _ => Some(name.into()),
    }
}

/// Protocol label implied by a `#path` value; `conn` implies none.
pub fn path_label(path: &str) -> Option<CompactString> {
    let path = path.trim();
    let path = path.strip_suffix(".log").unwrap_or(path);
    match path {
        "conn" => None,
        other => canonical_label(other),
    }
}

/// Protocol label from a `service` value: its first element.
pub fn service_label(service: &ZeekValue) -> Option<CompactString> {
    let first = service.as_text()?;
    canonical_label(first.split(',').next().unwrap_or(""))
}

/// `service` as written, container elements joined by `,`.
fn raw_service(service: &ZeekValue) -> Option<String> {
    let joined = service
        .items()
        .into_iter()
        .filter_map(ZeekValue::as_text)
        .collect::<Vec<_>>()
        .join(",");
    (!joined.is_empty()).then_some(joined)
}

/// Sum of a column pair; `None` when both are absent.
fn byte_pair(record: &ZeekRecord, orig: &str, resp: &str) -> Option<u64> {
    let orig = record.get(orig).and_then(ZeekValue::as_u64);
    let resp = record.get(resp).and_then(ZeekValue::as_u64);
    if orig.is_none() && resp.is_none() {
        return None;
    }
    Some(orig.unwrap_or(0).saturating_add(resp.unwrap_or(0)))
}

fn app_layer_info(record: &ZeekRecord, extractors: &ExtractorRegistry) -> AppLayerInfo {
    let mut info = AppLayerInfo::new();
    for (label, columns) in APP_COLUMNS {
        if !extractors.handles(label) {
            continue;
        }
        for (column, key) in *columns {
            if let Some(text) = record.get(column).and_then(ZeekValue::as_text) {
                if !text.is_empty() {
                    info.insert((*key).to_string(), text);
                }
            }
        }
    }

    // Older dns.log files carry only the numeric type.
    if extractors.handles("dns") && !info.contains_key("qtype") && info.contains_key("query") {
        if let Some(qtype) = record.get("qtype").and_then(ZeekValue::as_port) {
            info.insert("qtype".to_string(), record_type_name(qtype));
        }
    }
    info
}

/// Build the event for one log line.
///
/// The server is the responder and the entry vector the originator. A
/// line whose timestamp or addresses are unusable is a malformed record.
pub fn to_event(
    record: &ZeekRecord,
    classifier: &Classifier,
    extractors: &ExtractorRegistry,
) -> Result<EventRecord, ZeekError> {
    let malformed = |reason: &str| ZeekError::MalformedRecord {
        line: record.line(),
        reason: reason.to_string(),
    };

    let ts = record
        .get("ts")
        .and_then(ZeekValue::as_f64)
        .ok_or_else(|| malformed("ts is unset or not a number"))?;
    let orig_h = record
        .get("id.orig_h")
        .and_then(ZeekValue::as_addr)
        .ok_or_else(|| malformed("id.orig_h is unset or not an address"))?;
    let resp_h = record
        .get("id.resp_h")
        .and_then(ZeekValue::as_addr)
        .ok_or_else(|| malformed("id.resp_h is unset or not an address"))?;
    let orig_p = record.get("id.orig_p").and_then(ZeekValue::as_port).unwrap_or(0);
    let resp_p = record.get("id.resp_p").and_then(ZeekValue::as_port).unwrap_or(0);

    let service = record.get("service");
    let protocol = service
        .and_then(service_label)
        .or_else(|| record.header().path.as_deref().and_then(path_label))
        .unwrap_or_else(|| {
            let proto = record
                .get("proto")
                .and_then(ZeekValue::as_text)
                .and_then(|p| Transport::from_name(&p));
            let tuple = ConnectionTuple {
                src_ip: orig_h,
                src_port: orig_p,
                dst_ip: resp_h,
                dst_port: resp_p,
                transport: proto.unwrap_or(Transport::Tcp),
            };
            let label = classifier.classify(&tuple, &[]);
            match proto {
                // Unlabelled connections keep their transport name.
                Some(transport) if label == UNKNOWN => transport.as_str().into(),
                _ => label,
            }
        });
    let service = service
        .and_then(raw_service)
        .map(CompactString::from)
        .unwrap_or_else(|| protocol.clone());

    let bytes = byte_pair(record, "orig_ip_bytes", "resp_ip_bytes")
        .or_else(|| byte_pair(record, "orig_bytes", "resp_bytes"))
        .unwrap_or(0);

    Ok(EventRecord {
        timestamp_us: seconds_to_micros(ts),
        server: Endpoint::new(resp_h, resp_p),
        entry: Endpoint::new(orig_h, orig_p),
        protocol,
        service,
        bytes,
        app_layer_info: app_layer_info(record, extractors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractorKind;
    use crate::zeek::ZeekReader;

    const CONN_HEADER: &str = "#separator \\x09
#set_separator\t,
#empty_field\t(empty)
#unset_field\t-
#path\tconn
#fields\tts\tuid\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tproto\tservice\tduration\torig_bytes\tresp_bytes\torig_ip_bytes\tresp_ip_bytes
#types\ttime\tstring\taddr\tport\taddr\tport\tenum\tstring\tinterval\tcount\tcount\tcount\tcount
";

    fn events(log: &str, kinds: &[ExtractorKind]) -> Vec<Result<EventRecord, ZeekError>> {
        let classifier = Classifier::default();
        let extractors = ExtractorRegistry::with_builtins(kinds);
        ZeekReader::new(log.as_bytes())
            .require(REQUIRED_COLUMNS)
            .map(|r| to_event(&r.unwrap(), &classifier, &extractors))
            .collect()
    }

    #[test]
    fn test_conn_line() {
        let log = format!(
            "{CONN_HEADER}1704164645.250000\tC1\t10.0.0.1\t51000\t93.184.216.34\t443\ttcp\tssl\t-\t100\t200\t152\t312\n"
        );
        let event = events(&log, &ExtractorKind::ALL).remove(0).unwrap();
        assert_eq!(event.entry, Endpoint::new("10.0.0.1".parse().unwrap(), 51000));
        assert_eq!(event.server, Endpoint::new("93.184.216.34".parse().unwrap(), 443));
        assert_eq!(event.protocol, "tls");
        assert_eq!(event.service, "ssl");
        assert_eq!(event.bytes, 464);
        assert_eq!(event.timestamp_us, 1_704_164_645_250_000);
        assert!(event.app_layer_info.is_empty());
    }

    #[test]
    fn test_byte_fallbacks() {
        let log = format!(
            "{CONN_HEADER}1.0\tC1\t10.0.0.1\t1\t10.0.0.2\t2\tudp\t-\t-\t7\t-\t-\t-\n\
             2.0\tC2\t10.0.0.1\t1\t10.0.0.2\t2\tudp\t-\t-\t-\t-\t-\t-\n"
        );
        let events = events(&log, &[]);
        assert_eq!(events[0].as_ref().unwrap().bytes, 7);
        assert_eq!(events[1].as_ref().unwrap().bytes, 0);
    }

    #[test]
    fn test_protocol_falls_back_to_classifier() {
        let log = format!(
            "{CONN_HEADER}1.0\tC1\t10.0.0.1\t40000\t10.0.0.2\t53\tudp\t-\t-\t-\t-\t-\t-\n\
             2.0\tC2\t10.0.0.1\t0\t10.0.0.2\t0\ticmp\t-\t-\t-\t-\t-\t-\n"
        );
        let labels: Vec<String> = events(&log, &[])
            .into_iter()
            .map(|e| e.unwrap().protocol.to_string())
            .collect();
        assert_eq!(labels, vec!["dns", "icmp"]);
    }

    #[test]
    fn test_unlabelled_connection_uses_transport() {
        let log = format!(
            "{CONN_HEADER}1.0\tC1\t10.0.0.1\t5000\t10.0.0.2\t6000\tudp\t-\t-\t-\t-\t-\t-\n\
             2.0\tC2\t10.0.0.1\t5001\t10.0.0.2\t7000\ttcp\t-\t-\t-\t-\t-\t-\n\
             3.0\tC3\t10.0.0.1\t5002\t10.0.0.2\t7001\t-\t-\t-\t-\t-\t-\t-\n"
        );
        let events: Vec<EventRecord> = events(&log, &[])
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(events[0].protocol, "udp");
        assert_eq!(events[0].service, "udp");
        assert_eq!(events[1].protocol, "tcp");
        assert_eq!(events[1].service, "tcp");
        assert_eq!(events[2].protocol, "unknown");
    }

    #[test]
    fn test_http_log_metadata() {
        let log = "#separator \\x09
#path\thttp
#fields\tts\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tmethod\thost\turi
#types\ttime\taddr\tport\taddr\tport\tstring\tstring\tstring
1.0\t10.0.0.1\t51000\t93.184.216.34\t80\tGET\texample.com\t/
";
        let event = events(log, &ExtractorKind::ALL).remove(0).unwrap();
        assert_eq!(event.protocol, "http");
        assert_eq!(event.service, "http");
        assert_eq!(event.app_layer_info.get("method").map(String::as_str), Some("GET"));
        assert_eq!(event.app_layer_info.get("host").map(String::as_str), Some("example.com"));
        assert_eq!(event.app_layer_info.get("uri").map(String::as_str), Some("/"));

        let event = events(log, &[ExtractorKind::Dns]).remove(0).unwrap();
        assert!(event.app_layer_info.is_empty());
    }

    #[test]
    fn test_dns_and_ssl_paths() {
        let log = "#separator \\x09
#path\tdns
#fields\tts\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tproto\tquery\tqtype\tqtype_name
#types\ttime\taddr\tport\taddr\tport\tenum\tstring\tcount\tstring
1.0\t10.0.0.1\t5353\t8.8.8.8\t53\tudp\texample.com\t28\tAAAA
2.0\t10.0.0.1\t5353\t8.8.8.8\t53\tudp\texample.org\t1\t-
#path\tssl
#fields\tts\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tserver_name
#types\ttime\taddr\tport\taddr\tport\tstring
3.0\t10.0.0.1\t51000\t1.1.1.1\t8443\tone.one
";
        let events: Vec<EventRecord> = events(log, &ExtractorKind::ALL)
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(events[0].protocol, "dns");
        assert_eq!(events[0].app_layer_info.get("qtype").map(String::as_str), Some("AAAA"));
        assert_eq!(events[1].app_layer_info.get("qtype").map(String::as_str), Some("A"));
        assert_eq!(events[2].protocol, "tls");
        assert_eq!(events[2].app_layer_info.get("sni").map(String::as_str), Some("one.one"));
    }

    #[test]
    fn test_unset_timestamp_is_malformed() {
        let log = format!(
            "{CONN_HEADER}-\tC1\t10.0.0.1\t1\t10.0.0.2\t2\ttcp\t-\t-\t-\t-\t-\t-\n"
        );
        let err = events(&log, &[]).remove(0).unwrap_err();
        assert!(matches!(err, ZeekError::MalformedRecord { line: 8, .. }));
    }

    #[test]
    fn test_labels() {
        assert_eq!(path_label("conn"), None);
        assert_eq!(path_label("ssl.log").as_deref(), Some("tls"));
        assert_eq!(path_label("HTTP").as_deref(), Some("http"));
        assert_eq!(
            service_label(&ZeekValue::List(vec![
                ZeekValue::Str("SSL".into()),
                ZeekValue::Str("http".into())
            ]))
            .as_deref(),
            Some("tls")
        );
        assert_eq!(service_label(&ZeekValue::Str("dns,http".into())).as_deref(), Some("dns"));
    }
}
