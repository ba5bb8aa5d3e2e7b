//! Flow reconstruction for packet captures.
//!
//! Packets are folded, in capture order, into a [`FlowTable`]: a hash index
//! of normalized [`FlowKey`]s into an append-only `Vec<Flow>`, so flows
//! come out in discovery order. Which endpoint is the server is decided
//! only when the flow becomes an event, by a [`DirectionPolicy`].

use std::collections::HashMap;

use compact_str::CompactString;
use tracing::trace;

use crate::aggregate::{Endpoint, EventRecord};
use crate::classify::{Classifier, UNKNOWN};
use crate::config::DirectionPolicy;
use crate::extract::ExtractorRegistry;
use crate::model::AppLayerInfo;
use crate::protocol::{DissectedPacket, Transport};

/// Normalized flow key (lower endpoint first for consistent lookup).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct FlowKey {
    a: Endpoint,
    b: Endpoint,
    transport: Transport,
}

impl FlowKey {
    /// Ensures `a <= b`, ordering by IP then port.
    pub fn new(src: Endpoint, dst: Endpoint, transport: Transport) -> Self {
        if src <= dst {
            Self { a: src, b: dst, transport }
        } else {
            Self { a: dst, b: src, transport }
        }
    }

    pub fn from_packet(packet: &DissectedPacket) -> Self {
        let t = &packet.tuple;
        Self::new(
            Endpoint::new(t.src_ip, t.src_port),
            Endpoint::new(t.dst_ip, t.dst_port),
            t.transport,
        )
    }

    /// The lower endpoint.
    pub fn lower(&self) -> Endpoint {
        self.a
    }

    /// The higher endpoint.
    pub fn upper(&self) -> Endpoint {
        self.b
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// The endpoint that is not `endpoint`.
    fn peer(&self, endpoint: Endpoint) -> Endpoint {
        if endpoint == self.a {
            self.b
        } else {
            self.a
        }
    }
}

/// A reconstructed connection.
#[derive(Debug, Clone)]
pub struct Flow {
    pub key: FlowKey,
    pub first_timestamp_us: i64,
    pub first_sender: Endpoint,
    /// Sender of a SYN without ACK
    pub initiator: Option<Endpoint>,
    /// FIN or RST seen in either direction
    pub closed: bool,
    /// Sum of wire lengths in both directions
    pub bytes: u64,
    pub packets: u64,
    /// First non-`unknown` label seen on any packet
    pub label: CompactString,
    pub app_layer_info: AppLayerInfo,
}

impl Flow {
    fn new(key: FlowKey, packet: &DissectedPacket) -> Self {
        Self {
            key,
            first_timestamp_us: packet.timestamp_us,
            first_sender: Endpoint::new(packet.tuple.src_ip, packet.tuple.src_port),
            initiator: None,
            closed: false,
            bytes: 0,
            packets: 0,
            label: CompactString::from(UNKNOWN),
            app_layer_info: AppLayerInfo::new(),
        }
    }

    fn update(&mut self, packet: &DissectedPacket, label: &str, extractors: &ExtractorRegistry) {
        let sender = Endpoint::new(packet.tuple.src_ip, packet.tuple.src_port);

        self.packets += 1;
        self.bytes = self.bytes.saturating_add(u64::from(packet.wire_len));

        if packet.flags.is_syn() && self.initiator.is_none() {
            self.initiator = Some(sender);
        }
        if packet.flags.is_close() {
            self.closed = true;
        }

        if self.label == UNKNOWN && label != UNKNOWN {
            self.label = label.into();
        }

        if self.app_layer_info.is_empty() && !packet.payload.is_empty() {
            self.app_layer_info = extractors.extract(&self.label, &packet.payload);
        }
    }

    /// Server and entry-vector endpoints under `policy`.
    pub fn endpoints(&self, policy: DirectionPolicy, classifier: &Classifier) -> (Endpoint, Endpoint) {
        let server = match policy {
            DirectionPolicy::Initiator => self
                .initiator
                .map(|initiator| self.key.peer(initiator))
                .or_else(|| self.well_known_server(classifier))
                .unwrap_or_else(|| self.key.peer(self.first_sender)),
            DirectionPolicy::WellKnownPort => self
                .well_known_server(classifier)
                .unwrap_or(self.key.lower()),
        };
        (server, self.key.peer(server))
    }

    /// The endpoint on a well-known port; the lower port when both are.
    fn well_known_server(&self, classifier: &Classifier) -> Option<Endpoint> {
        let (a, b) = (self.key.lower(), self.key.upper());
        match (classifier.is_well_known(a.port), classifier.is_well_known(b.port)) {
            (true, false) => Some(a),
            (false, true) => Some(b),
            (true, true) if a.port < b.port => Some(a),
            (true, true) if b.port < a.port => Some(b),
            _ => None,
        }
    }

    /// The event for this flow; protocol and service are both the label.
    pub fn to_event(&self, policy: DirectionPolicy, classifier: &Classifier) -> EventRecord {
        let (server, entry) = self.endpoints(policy, classifier);
        EventRecord {
            timestamp_us: self.first_timestamp_us,
            server,
            entry,
            protocol: self.label.clone(),
            service: self.label.clone(),
            bytes: self.bytes,
            app_layer_info: self.app_layer_info.clone(),
        }
    }
}

/// What [`FlowTable::observe`] did with a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// Added to an existing flow
    Updated,
    /// Opened a new flow
    Created,
    /// Would have opened a flow past the limit; ignored
    Rejected,
}

/// Flows in discovery order.
#[derive(Debug)]
pub struct FlowTable {
    index: HashMap<FlowKey, usize>,
    flows: Vec<Flow>,
    max_flows: usize,
}

impl FlowTable {
    pub fn new(max_flows: usize) -> Self {
        Self {
            index: HashMap::new(),
            flows: Vec::new(),
            max_flows,
        }
    }

    /// Fold one classified packet into its flow.
    ///
    /// A pure SYN on a flow that already saw FIN or RST opens a new flow
    /// for the same key.
    pub fn observe(
        &mut self,
        packet: &DissectedPacket,
        label: &str,
        extractors: &ExtractorRegistry,
    ) -> Observed {
        let key = FlowKey::from_packet(packet);

        let existing = self
            .index
            .get(&key)
            .copied()
            .filter(|&idx| !(packet.flags.is_syn() && self.flows[idx].closed));

        if let Some(idx) = existing {
            self.flows[idx].update(packet, label, extractors);
            return Observed::Updated;
        }

        if self.flows.len() >= self.max_flows {
            return Observed::Rejected;
        }

        trace!(frame = packet.frame_number, flow = self.flows.len(), "new flow");
        let mut flow = Flow::new(key, packet);
        flow.update(packet, label, extractors);
        self.index.insert(key, self.flows.len());
        self.flows.push(flow);
        Observed::Created
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }
}
