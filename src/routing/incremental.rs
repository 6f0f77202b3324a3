//! Incremental table maintenance.
//!
//! Connecting or disconnecting one route changes only the entries of
//! emitters whose walk reaches that route. Instead of rebuilding, the
//! maintainer finds every emitter upstream of the route and re-walks just
//! those entries:
//!
//! ```text
//! connect R:     entry = receivers(emitter)               (R attached)
//! disconnect R:  entry = receivers(emitter, without R)    (while R still exists)
//! ```
//!
//! Receiver lists are sets, so a receiver that stays reachable along another
//! path survives the disconnect. Each refreshed entry is exactly what a
//! rebuild would produce, and a connect followed by a disconnect of the same
//! route restores the tables exactly.
//!
//! The direct case (plain output wired to a plain input) appends the one
//! receiver without walking.
//!
//! Every patch is planned into replacement vectors first and swapped in at
//! the end. A missing entry or unregistered receiver raises a diagnostic and
//! skips only that participant.

use crate::routing::diagnostics::{Diagnostic, Diagnostics};
use crate::routing::endpoint::{Direction, Endpoint};
use crate::routing::graph::{Graph, Pin};
use crate::routing::id::{NodeId, PinId, RouteId, TackId};
use crate::routing::resolver::{collect, Emission, Emitter, ResolveContext};
use crate::routing::table::{
    EntryKey, InboundEntry, OutboundEntry, Receiver, RoutingTables, TackEntry,
};
use std::collections::HashSet;

/// The new receiver list of one entry.
#[derive(Debug)]
struct Refresh {
    key: EntryKey,
    receivers: Vec<Receiver>,
}

/// Patches [`RoutingTables`] in place after single edits.
pub struct TableMaintainer<'a> {
    ctx: ResolveContext<'a>,
    tables: &'a mut RoutingTables,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TableMaintainer<'a> {
    pub fn new(
        ctx: ResolveContext<'a>,
        tables: &'a mut RoutingTables,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            ctx,
            tables,
            diagnostics,
        }
    }

    /// Account for a route that was just attached to the graph.
    pub fn on_connect(&mut self, route: RouteId) {
        let graph = self.ctx.graph;
        let Ok(r) = graph.route(route) else {
            return;
        };
        for end in [r.a, r.b] {
            if let Endpoint::Tack(tack) = end {
                self.bind_tack(tack);
            }
        }
        let Some((emitting, absorbing)) = graph.orient(route) else {
            return;
        };
        if let Some((key, receiver)) = self.single(emitting, absorbing) {
            tracing::debug!("Connect {:?}: direct receiver", route);
            self.append(key, receiver);
            return;
        }
        let refreshed = self.refresh(emitting, None);
        tracing::debug!("Connect {:?}: refreshing {} entries", route, refreshed.len());
        self.apply(refreshed);
    }

    /// Account for a route that is about to be detached from the graph.
    ///
    /// Must run while the route still exists: the affected emitters are found
    /// by searching upstream of it.
    pub fn on_disconnect(&mut self, route: RouteId) {
        let graph = self.ctx.graph;
        let Ok(r) = graph.route(route) else {
            return;
        };
        if let Some((emitting, _)) = graph.orient(route) {
            let refreshed = self.refresh(emitting, Some(route));
            tracing::debug!(
                "Disconnect {:?}: refreshing {} entries",
                route,
                refreshed.len()
            );
            self.apply(refreshed);
        }
        for end in [r.a, r.b] {
            if let Endpoint::Tack(tack) = end {
                self.unbind_tack(tack);
            }
        }
    }

    /// Add the entries of a pin just added to a source node.
    ///
    /// A fresh pin has no routes, so its outbound entries start empty.
    pub fn on_pin_added(&mut self, pin: PinId) {
        let graph = self.ctx.graph;
        let Ok(p) = graph.pin(pin) else {
            return;
        };
        let Some(tables) = self.tables.node_mut(p.node) else {
            self.diagnostics.push(Diagnostic::DanglingEntry {
                owner: graph.uid_of(p.node).to_string(),
                entry: p.name.clone(),
            });
            return;
        };
        match p.direction {
            Direction::Output => {
                for emission in Emission::of_pin(p) {
                    tables.outbound.push(OutboundEntry {
                        pin,
                        variant: emission.name,
                        channel: p.channel,
                        receivers: Vec::new(),
                    });
                }
            }
            Direction::Input => tables.inbound.push(InboundEntry {
                pin,
                name: p.name.clone(),
                channel: p.channel,
            }),
        }
    }

    /// Drop the entries of a pin removed from a source node.
    ///
    /// The pin's routes must have been disconnected through
    /// [`on_disconnect`](Self::on_disconnect) beforehand.
    pub fn on_pin_removed(&mut self, node: NodeId, pin: PinId) {
        if let Some(tables) = self.tables.node_mut(node) {
            tables.outbound.retain(|e| e.pin != pin);
            tables.inbound.retain(|e| e.pin != pin);
        }
    }

    fn bind_tack(&mut self, tack: TackId) {
        let graph = self.ctx.graph;
        let Some(bus) = graph.tack(tack).ok().and_then(|t| graph.bus(t.bus).ok()) else {
            return;
        };
        if !bus.has_filter() {
            return;
        }
        let shape = graph.shape(Endpoint::Tack(tack));
        let Some(table) = self.tables.bus_mut(bus.id) else {
            self.diagnostics.push(Diagnostic::DanglingEntry {
                owner: bus.uid.clone(),
                entry: format!("tack {}", tack.0),
            });
            return;
        };
        let position = |t: TackId| bus.tacks.iter().position(|&x| x == t);
        match shape {
            Some(Direction::Input) => {
                table.incoming.push(tack);
                table.incoming.sort_by_key(|&t| position(t));
            }
            Some(Direction::Output) => {
                // Receivers are filled in by the refresh that follows.
                table.outgoing.push(TackEntry {
                    tack,
                    label: graph.endpoint_name(Endpoint::Tack(tack)).to_string(),
                    receivers: Vec::new(),
                });
                table.outgoing.sort_by_key(|e| position(e.tack));
            }
            None => {}
        }
    }

    fn unbind_tack(&mut self, tack: TackId) {
        let graph = self.ctx.graph;
        let Some(bus) = graph.tack(tack).ok().map(|t| t.bus) else {
            return;
        };
        if let Some(table) = self.tables.bus_mut(bus) {
            table.incoming.retain(|&t| t != tack);
            table.outgoing.retain(|e| e.tack != tack);
        }
    }

    /// Fresh receiver lists for every entry whose walk reaches `emitting`.
    fn refresh(&mut self, emitting: Endpoint, excluded: Option<RouteId>) -> Vec<Refresh> {
        let mut refreshed = Vec::new();
        for emitter in self.upstream(emitting) {
            for emission in emissions_of(self.ctx, emitter) {
                let receivers = collect(
                    &self.ctx,
                    self.diagnostics,
                    emitter,
                    &emission,
                    excluded,
                );
                if let Some(key) = key_for(self.ctx, emitter, emission.name) {
                    refreshed.push(Refresh { key, receivers });
                }
            }
        }
        refreshed
    }

    /// The direct case: a plain output pin wired straight to a plain input
    /// pin contributes exactly one receiver.
    fn single(&self, emitting: Endpoint, absorbing: Endpoint) -> Option<(EntryKey, Receiver)> {
        if self.ctx.settings.max_path_len == 0 {
            return None;
        }
        let graph = self.ctx.graph;
        let source = plain_pin(graph, emitting)?;
        let sink = plain_pin(graph, absorbing)?;
        let key = EntryKey::Node {
            node: source.node,
            pin: source.id,
            variant: source.name.clone(),
        };
        Some((key, Receiver::Pin(sink.id)))
    }

    /// Every emitter whose walk can reach `emitting`.
    fn upstream(&self, emitting: Endpoint) -> Vec<Emitter> {
        let graph = self.ctx.graph;
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![emitting];
        let push_peers = |stack: &mut Vec<Endpoint>, end: Endpoint| {
            for &r in graph.routes_of(end) {
                if let Some(other) = graph.route(r).ok().and_then(|r| r.other(end)) {
                    stack.push(other);
                }
            }
        };

        while let Some(end) = stack.pop() {
            if !seen.insert(end) {
                continue;
            }
            match end {
                Endpoint::Pin(id) => {
                    let Ok(pin) = graph.pin(id) else {
                        continue;
                    };
                    match pin.pad {
                        Some(pad) => push_peers(&mut stack, Endpoint::Pad(pad)),
                        None if pin.direction == Direction::Output => {
                            found.push(Emitter::Pin(id));
                        }
                        None => {}
                    }
                }
                Endpoint::Pad(id) => {
                    if let Ok(pad) = graph.pad(id) {
                        push_peers(&mut stack, Endpoint::Pin(pad.proxy));
                    }
                }
                Endpoint::Tack(id) => {
                    let Some(bus) = graph.tack(id).ok().and_then(|t| graph.bus(t.bus).ok()) else {
                        continue;
                    };
                    if bus.has_filter() {
                        found.push(Emitter::BusTack(id));
                        continue;
                    }
                    for &other in &bus.tacks {
                        if other != id
                            && graph.shape(Endpoint::Tack(other)) == Some(Direction::Input)
                        {
                            stack.extend(graph.tack_peer(other));
                        }
                    }
                }
            }
        }
        found
    }

    fn append(&mut self, key: EntryKey, receiver: Receiver) {
        let Some(current) = self.tables.receivers(&key) else {
            self.diagnostics.push(Diagnostic::DanglingEntry {
                owner: owner_of(self.ctx, &key),
                entry: entry_name(self.ctx, &key),
            });
            return;
        };
        if current.contains(&receiver) {
            return;
        }
        let mut next = current.to_vec();
        if self.registered(receiver) {
            next.push(receiver);
        }
        self.tables.replace_receivers(&key, next);
    }

    fn apply(&mut self, refreshed: Vec<Refresh>) {
        let mut planned = Vec::with_capacity(refreshed.len());
        for refresh in refreshed {
            if self.tables.receivers(&refresh.key).is_none() {
                self.diagnostics.push(Diagnostic::DanglingEntry {
                    owner: owner_of(self.ctx, &refresh.key),
                    entry: entry_name(self.ctx, &refresh.key),
                });
                continue;
            }
            let next: Vec<Receiver> = refresh
                .receivers
                .into_iter()
                .filter(|&r| self.registered(r))
                .collect();
            planned.push((refresh.key, next));
        }
        for (key, receivers) in planned {
            self.tables.replace_receivers(&key, receivers);
        }
    }

    /// Whether `receiver` has its inbound marker; raises a diagnostic if not.
    fn registered(&mut self, receiver: Receiver) -> bool {
        if self.tables.is_registered(self.ctx.graph, receiver) {
            return true;
        }
        self.diagnostics.push(Diagnostic::DanglingEntry {
            owner: receiver_owner(self.ctx, receiver),
            entry: receiver_name(self.ctx, receiver),
        });
        false
    }
}

/// A pin that is neither a proxy nor multi.
fn plain_pin(graph: &Graph, end: Endpoint) -> Option<&Pin> {
    match end {
        Endpoint::Pin(id) => graph.pin(id).ok().filter(|p| !p.is_proxy() && !p.multi),
        _ => None,
    }
}

fn emissions_of(ctx: ResolveContext<'_>, emitter: Emitter) -> Vec<Emission> {
    let graph = ctx.graph;
    match emitter {
        Emitter::Pin(pin) => graph.pin(pin).map(Emission::of_pin).unwrap_or_default(),
        Emitter::BusTack(tack) => vec![Emission::opaque(
            graph.endpoint_name(Endpoint::Tack(tack)),
        )],
    }
}

fn key_for(ctx: ResolveContext<'_>, emitter: Emitter, variant: String) -> Option<EntryKey> {
    let graph = ctx.graph;
    match emitter {
        Emitter::Pin(pin) => {
            let node = graph.pin(pin).ok()?.node;
            Some(EntryKey::Node { node, pin, variant })
        }
        Emitter::BusTack(tack) => {
            let bus = graph.tack(tack).ok()?.bus;
            Some(EntryKey::Bus { bus, tack })
        }
    }
}

fn receiver_endpoint(receiver: Receiver) -> Endpoint {
    match receiver {
        Receiver::Pin(id) => Endpoint::Pin(id),
        Receiver::Tack(id) => Endpoint::Tack(id),
    }
}

fn owner_of(ctx: ResolveContext<'_>, key: &EntryKey) -> String {
    match key {
        EntryKey::Node { node, .. } => ctx.graph.uid_of(*node).to_string(),
        EntryKey::Bus { bus, .. } => ctx
            .graph
            .bus(*bus)
            .map(|b| b.uid.clone())
            .unwrap_or_else(|_| bus.to_string()),
    }
}

fn entry_name(ctx: ResolveContext<'_>, key: &EntryKey) -> String {
    match key {
        EntryKey::Node { variant, .. } => variant.clone(),
        EntryKey::Bus { tack, .. } => ctx.graph.endpoint_name(Endpoint::Tack(*tack)).to_string(),
    }
}

fn receiver_owner(ctx: ResolveContext<'_>, receiver: Receiver) -> String {
    let graph = ctx.graph;
    match receiver {
        Receiver::Pin(id) => graph
            .pin(id)
            .map(|p| graph.uid_of(p.node).to_string())
            .unwrap_or_else(|_| id.to_string()),
        Receiver::Tack(id) => graph
            .tack(id)
            .and_then(|t| graph.bus(t.bus))
            .map(|b| b.uid.clone())
            .unwrap_or_else(|_| id.to_string()),
    }
}

fn receiver_name(ctx: ResolveContext<'_>, receiver: Receiver) -> String {
    ctx.graph
        .endpoint_name(receiver_endpoint(receiver))
        .to_string()
}
