//! Resolved routing tables.
//!
//! Every source node owns a [`NodeTables`]: one outbound entry per output
//! variant listing the concrete receivers, and one inbound marker per input
//! pin. Every bus carrying a filter owns a [`BusTable`]. Entries are kept in
//! pin order and receivers, each listed once, in discovery order, which is
//! what the serializer emits.

use crate::routing::graph::Graph;
use crate::routing::id::{BusId, NodeId, PinId, TackId};
use std::collections::HashMap;

/// A concrete delivery target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Receiver {
    /// An input pin of a source node.
    Pin(PinId),
    /// An incoming tack of a filtered bus; fan-out is left to the filter.
    Tack(TackId),
}

/// Receivers of one output variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEntry {
    pub pin: PinId,
    /// Concrete message name (the pin name for plain pins).
    pub variant: String,
    pub channel: bool,
    pub receivers: Vec<Receiver>,
}

/// Existence marker for an input pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEntry {
    pub pin: PinId,
    pub name: String,
    pub channel: bool,
}

/// Tables owned by one source node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTables {
    pub outbound: Vec<OutboundEntry>,
    pub inbound: Vec<InboundEntry>,
}

impl NodeTables {
    /// The outbound entry of one variant of a pin.
    pub fn outbound(&self, pin: PinId, variant: &str) -> Option<&OutboundEntry> {
        self.outbound
            .iter()
            .find(|e| e.pin == pin && e.variant == variant)
    }

    /// All outbound entries of a pin, in variant order.
    pub fn entries_for(&self, pin: PinId) -> impl Iterator<Item = &OutboundEntry> {
        self.outbound.iter().filter(move |e| e.pin == pin)
    }

    pub fn has_inbound(&self, pin: PinId) -> bool {
        self.inbound.iter().any(|e| e.pin == pin)
    }
}

/// Receivers reachable from one outgoing tack of a filtered bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TackEntry {
    pub tack: TackId,
    /// Name of the tack's peer.
    pub label: String,
    pub receivers: Vec<Receiver>,
}

/// Per-tack table of a bus carrying a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusTable {
    /// Tacks through which messages enter the filter.
    pub incoming: Vec<TackId>,
    /// Tacks the filter may deliver to, with their resolved receivers.
    pub outgoing: Vec<TackEntry>,
}

impl BusTable {
    pub fn outgoing(&self, tack: TackId) -> Option<&TackEntry> {
        self.outgoing.iter().find(|e| e.tack == tack)
    }

    pub fn is_incoming(&self, tack: TackId) -> bool {
        self.incoming.contains(&tack)
    }
}

/// Address of one receiver list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Node {
        node: NodeId,
        pin: PinId,
        variant: String,
    },
    Bus {
        bus: BusId,
        tack: TackId,
    },
}

/// All resolved tables of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTables {
    nodes: HashMap<NodeId, NodeTables>,
    buses: HashMap<BusId, BusTable>,
}

impl RoutingTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeTables> {
        self.nodes.get(&id)
    }

    pub fn bus(&self, id: BusId) -> Option<&BusTable> {
        self.buses.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeTables> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn bus_mut(&mut self, id: BusId) -> Option<&mut BusTable> {
        self.buses.get_mut(&id)
    }

    pub(crate) fn insert_node(&mut self, id: NodeId, tables: NodeTables) {
        self.nodes.insert(id, tables);
    }

    pub(crate) fn insert_bus(&mut self, id: BusId, table: BusTable) {
        self.buses.insert(id, table);
    }

    pub(crate) fn remove_bus(&mut self, id: BusId) -> Option<BusTable> {
        self.buses.remove(&id)
    }

    /// Move every table of `other` into `self`.
    pub(crate) fn merge(&mut self, other: RoutingTables) {
        self.nodes.extend(other.nodes);
        self.buses.extend(other.buses);
    }

    /// The receiver list addressed by `key`.
    pub fn receivers(&self, key: &EntryKey) -> Option<&[Receiver]> {
        match key {
            EntryKey::Node { node, pin, variant } => self
                .nodes
                .get(node)?
                .outbound(*pin, variant)
                .map(|e| e.receivers.as_slice()),
            EntryKey::Bus { bus, tack } => self
                .buses
                .get(bus)?
                .outgoing(*tack)
                .map(|e| e.receivers.as_slice()),
        }
    }

    /// Swap in a new receiver list. Returns `false` if the entry is missing.
    pub(crate) fn replace_receivers(&mut self, key: &EntryKey, receivers: Vec<Receiver>) -> bool {
        let slot = match key {
            EntryKey::Node { node, pin, variant } => self
                .nodes
                .get_mut(node)
                .and_then(|t| {
                    t.outbound
                        .iter_mut()
                        .find(|e| e.pin == *pin && e.variant == *variant)
                })
                .map(|e| &mut e.receivers),
            EntryKey::Bus { bus, tack } => self
                .buses
                .get_mut(bus)
                .and_then(|t| t.outgoing.iter_mut().find(|e| e.tack == *tack))
                .map(|e| &mut e.receivers),
        };
        match slot {
            Some(slot) => {
                *slot = receivers;
                true
            }
            None => false,
        }
    }

    /// True iff the receiver has its inbound marker (input pin) or
    /// membership entry (filtered-bus tack).
    pub fn is_registered(&self, graph: &Graph, receiver: Receiver) -> bool {
        match receiver {
            Receiver::Pin(pin) => graph
                .pin(pin)
                .ok()
                .and_then(|p| self.nodes.get(&p.node))
                .map(|t| t.has_inbound(pin))
                .unwrap_or(false),
            Receiver::Tack(tack) => graph
                .tack(tack)
                .ok()
                .and_then(|t| self.buses.get(&t.bus))
                .map(|b| b.is_incoming(tack))
                .unwrap_or(false),
        }
    }

    /// Same entries with the same receivers, ignoring receiver order.
    pub fn equivalent(&self, other: &RoutingTables) -> bool {
        fn sorted(receivers: &[Receiver]) -> Vec<Receiver> {
            let mut r = receivers.to_vec();
            r.sort();
            r
        }

        if self.nodes.len() != other.nodes.len() || self.buses.len() != other.buses.len() {
            return false;
        }
        let nodes_match = self.nodes.iter().all(|(id, mine)| {
            let Some(theirs) = other.nodes.get(id) else {
                return false;
            };
            mine.inbound == theirs.inbound
                && mine.outbound.len() == theirs.outbound.len()
                && mine.outbound.iter().zip(&theirs.outbound).all(|(a, b)| {
                    a.pin == b.pin
                        && a.variant == b.variant
                        && a.channel == b.channel
                        && sorted(&a.receivers) == sorted(&b.receivers)
                })
        });
        let buses_match = self.buses.iter().all(|(id, mine)| {
            let Some(theirs) = other.buses.get(id) else {
                return false;
            };
            let mut a_in = mine.incoming.clone();
            let mut b_in = theirs.incoming.clone();
            a_in.sort();
            b_in.sort();
            a_in == b_in
                && mine.outgoing.len() == theirs.outgoing.len()
                && mine.outgoing.iter().zip(&theirs.outgoing).all(|(a, b)| {
                    a.tack == b.tack
                        && a.label == b.label
                        && sorted(&a.receivers) == sorted(&b.receivers)
                })
        });
        nodes_match && buses_match
    }
}
