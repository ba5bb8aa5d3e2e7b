//! Ordered protocol classification rules.
//!
//! A [`Classifier`] is an immutable list of `(matcher, label)` rules built
//! once per analyzer. Rules are tried in order and the first match wins:
//! port rules (configured labels first), then payload signatures, then the
//! ICMP transport rule. Anything left over is [`UNKNOWN`].

use compact_str::CompactString;
use smallvec::{smallvec, SmallVec};

use crate::extract::{looks_like_http, looks_like_ssh, looks_like_tls, parse_question};
use crate::protocol::{ConnectionTuple, Transport};

/// Label for traffic no rule matched.
pub const UNKNOWN: &str = "unknown";

/// Ports below this are treated as service ports even without a rule.
const SYSTEM_PORT_LIMIT: u16 = 1024;

type PortSet = SmallVec<[u16; 8]>;

/// Signature test on the first bytes of a transport payload.
pub type PayloadMatcher = fn(&[u8], Transport) -> bool;

#[derive(Debug, Clone)]
enum Matcher {
    /// Either port of the tuple is in the set
    Ports(PortSet),
    /// Non-empty payload satisfies the signature
    Payload(PayloadMatcher),
    Transport(Transport),
}

#[derive(Debug, Clone)]
struct Rule {
    label: CompactString,
    matcher: Matcher,
}

impl Rule {
    fn matches(&self, tuple: &ConnectionTuple, payload: &[u8]) -> bool {
        match &self.matcher {
            Matcher::Ports(ports) => {
                ports.contains(&tuple.src_port) || ports.contains(&tuple.dst_port)
            }
            Matcher::Payload(sig) => !payload.is_empty() && sig(payload, tuple.transport),
            Matcher::Transport(transport) => tuple.transport == *transport,
        }
    }
}

fn tls_signature(payload: &[u8], _transport: Transport) -> bool {
    looks_like_tls(payload)
}

fn http_signature(payload: &[u8], transport: Transport) -> bool {
    transport == Transport::Tcp && looks_like_http(payload)
}

fn ssh_signature(payload: &[u8], transport: Transport) -> bool {
    transport == Transport::Tcp && looks_like_ssh(payload)
}

fn dns_signature(payload: &[u8], transport: Transport) -> bool {
    transport == Transport::Udp && parse_question(payload).is_some()
}

/// Deterministic first-match protocol classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Classifier {
    /// Build the rule list. `port_labels` are evaluated ahead of the
    /// built-in port rules, in the order given.
    pub fn new(port_labels: &[(u16, CompactString)]) -> Self {
        let mut rules: Vec<Rule> = port_labels
            .iter()
            .map(|(port, label)| Rule {
                label: label.to_ascii_lowercase().into(),
                matcher: Matcher::Ports(smallvec![*port]),
            })
            .collect();

        let port_rule = |label: &str, ports: &[u16]| Rule {
            label: label.into(),
            matcher: Matcher::Ports(ports.iter().copied().collect()),
        };
        let payload_rule = |label: &str, sig: PayloadMatcher| Rule {
            label: label.into(),
            matcher: Matcher::Payload(sig),
        };

        rules.extend([
            port_rule("http", &[80, 8080, 8000, 8008, 8888]),
            port_rule("tls", &[443, 8443, 853]),
            port_rule("dns", &[53]),
            port_rule("ssh", &[22]),
            payload_rule("tls", tls_signature),
            payload_rule("http", http_signature),
            payload_rule("ssh", ssh_signature),
            payload_rule("dns", dns_signature),
            Rule {
                label: "icmp".into(),
                matcher: Matcher::Transport(Transport::Icmp),
            },
        ]);

        Self { rules }
    }

    /// Label for a tuple and (possibly empty) payload.
    pub fn classify(&self, tuple: &ConnectionTuple, payload: &[u8]) -> CompactString {
        self.rules
            .iter()
            .find(|rule| rule.matches(tuple, payload))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| CompactString::from(UNKNOWN))
    }

    /// Label of the first port rule naming `port`.
    pub fn port_label(&self, port: u16) -> Option<&str> {
        self.rules.iter().find_map(|rule| match &rule.matcher {
            Matcher::Ports(ports) if ports.contains(&port) => Some(rule.label.as_str()),
            _ => None,
        })
    }

    /// Whether `port` identifies a server: named by a port rule, or a
    /// system port. Port 0 never qualifies.
    pub fn is_well_known(&self, port: u16) -> bool {
        port != 0 && (port < SYSTEM_PORT_LIMIT || self.port_label(port).is_some())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
