//! Topology resolver: turns wiring into concrete receiver lists.
//!
//! For every output variant of every source node the resolver walks the
//! routes leaving the pin and keeps going until it reaches something that
//! actually consumes messages:
//!
//! ```text
//! [N1.out] ──► proxy ══pad══► [bus] ──► tack ──► [N2.in]     receiver: N2.in
//! [N1.out] ──► tack of a filtered bus                         receiver: the tack
//! ```
//!
//! Proxies, pads and unfiltered buses are transparent. A bus with a filter
//! is an opaque hop: the walk stops at its tack and the bus gets its own
//! table (see [`super::bus_table`]).
//!
//! Receiver lists are sets: the walk marks every route it crosses and never
//! crosses one twice, so diamonds of parallel paths cost one visit each and a
//! receiver reached along several paths is listed once. Re-entering a route
//! that is still on the current path means the external wiring is cyclic;
//! the branch is dropped with a [`Diagnostic::CycleDetected`].

use crate::config::ResolverSettings;
use crate::routing::bus_table;
use crate::routing::diagnostics::{Diagnostic, Diagnostics};
use crate::routing::endpoint::{Direction, Endpoint};
use crate::routing::graph::{Graph, Pin};
use crate::routing::id::{NodeId, PinId, RouteId, TackId};
use crate::routing::table::{InboundEntry, NodeTables, OutboundEntry, Receiver, RoutingTables};
use crate::routing::variant;
use std::collections::HashSet;

/// Read-only state shared by every resolver call.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub graph: &'a Graph,
    pub settings: &'a ResolverSettings,
}

impl<'a> ResolveContext<'a> {
    pub fn new(graph: &'a Graph, settings: &'a ResolverSettings) -> Self {
        Self { graph, settings }
    }
}

/// How the walk arrived at an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hop {
    /// Along an explicit route.
    Wired,
    /// Fanned out by an unfiltered bus; delivery is by name.
    Bus,
}

/// Anything that owns an outbound receiver list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emitter {
    /// An output pin of a source node.
    Pin(PinId),
    /// An outgoing tack of a filtered bus.
    BusTack(TackId),
}

impl Emitter {
    pub fn endpoint(self) -> Endpoint {
        match self {
            Emitter::Pin(id) => Endpoint::Pin(id),
            Emitter::BusTack(id) => Endpoint::Tack(id),
        }
    }
}

/// One message an emitter sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Emission {
    /// Concrete variant name; the table entry is recorded under it.
    pub name: String,
    /// Full name of the emitting pin.
    pub origin: String,
    /// Bracket token for variants of a multi pin.
    pub token: Option<String>,
    /// First variant of its pin; per-pin diagnostics are raised once.
    pub first: bool,
}

impl Emission {
    /// One emission per variant of the pin.
    pub fn of_pin(pin: &Pin) -> Vec<Emission> {
        variant::variants(&pin.name)
            .into_iter()
            .enumerate()
            .map(|(i, v)| Emission {
                name: v.name,
                origin: pin.name.clone(),
                token: v.token,
                first: i == 0,
            })
            .collect()
    }

    /// Everything leaving a filtered-bus tack; the filter picks at run time.
    pub fn opaque(label: &str) -> Emission {
        Emission {
            name: label.to_string(),
            origin: label.to_string(),
            token: None,
            first: true,
        }
    }

    fn accepts(&self, candidate: &str, hop: Hop) -> bool {
        match hop {
            Hop::Bus => variant::overlap(&self.name, candidate),
            Hop::Wired => match &self.token {
                None => true,
                Some(token) if variant::is_multi(candidate) => variant::variant_tokens(candidate)
                    .iter()
                    .any(|t| t.to_lowercase() == token.to_lowercase()),
                Some(_) => {
                    variant::get_match(&self.origin, candidate).as_deref() == Some(self.name.as_str())
                }
            },
        }
    }
}

/// Depth-first walk for one emission.
struct Walk<'w> {
    graph: &'w Graph,
    limit: usize,
    report_unmatched: bool,
    emission: &'w Emission,
    /// A route about to be removed; the walk behaves as if it were gone.
    excluded: Option<RouteId>,
    origin: String,
    path: Vec<RouteId>,
    visited: HashSet<RouteId>,
    found: Vec<Receiver>,
    diagnostics: &'w mut Diagnostics,
}

impl Walk<'_> {
    fn emit_from(&mut self, from: Endpoint, hop: Hop) {
        let graph = self.graph;
        for &route_id in graph.routes_of(from) {
            if self.excluded == Some(route_id) {
                continue;
            }
            if self.path.contains(&route_id) {
                self.diagnostics.push(Diagnostic::CycleDetected {
                    origin: self.origin.clone(),
                    route: route_id,
                });
                continue;
            }
            if self.visited.contains(&route_id) {
                continue;
            }
            if self.path.len() >= self.limit {
                self.diagnostics.push(Diagnostic::PathTooLong {
                    origin: self.origin.clone(),
                    limit: self.limit,
                });
                return;
            }
            let Some(target) = graph.route(route_id).ok().and_then(|r| r.other(from)) else {
                continue;
            };
            self.visited.insert(route_id);
            self.path.push(route_id);
            self.deliver(target, hop);
            self.path.pop();
        }
    }

    fn deliver(&mut self, target: Endpoint, hop: Hop) {
        let graph = self.graph;
        match target {
            Endpoint::Pin(id) => {
                let Ok(pin) = graph.pin(id) else {
                    return;
                };
                match pin.pad {
                    Some(pad) => {
                        if hop == Hop::Bus && !self.emission.accepts(&pin.name, hop) {
                            return;
                        }
                        self.emit_from(Endpoint::Pad(pad), Hop::Wired);
                    }
                    None if self.emission.accepts(&pin.name, hop) => {
                        self.record(Receiver::Pin(id));
                    }
                    None => self.unmatched(&pin.name, hop),
                }
            }
            Endpoint::Pad(id) => {
                let Ok(pad) = graph.pad(id) else {
                    return;
                };
                if hop == Hop::Bus && !self.emission.accepts(graph.endpoint_name(target), hop) {
                    return;
                }
                self.emit_from(Endpoint::Pin(pad.proxy), Hop::Wired);
            }
            Endpoint::Tack(id) => {
                let Some(bus) = graph.tack(id).ok().and_then(|t| graph.bus(t.bus).ok()) else {
                    return;
                };
                if bus.has_filter() {
                    self.record(Receiver::Tack(id));
                    return;
                }
                for &other in &bus.tacks {
                    if other != id && graph.shape(Endpoint::Tack(other)) == Some(Direction::Output)
                    {
                        self.emit_from(Endpoint::Tack(other), Hop::Bus);
                    }
                }
            }
        }
    }

    fn record(&mut self, receiver: Receiver) {
        if !self.found.contains(&receiver) {
            self.found.push(receiver);
        }
    }

    /// A wired multi pin whose name matches no variant of the candidate.
    fn unmatched(&mut self, candidate: &str, hop: Hop) {
        let e = self.emission;
        if !self.report_unmatched
            || hop != Hop::Wired
            || !e.first
            || e.token.is_none()
            || variant::is_multi(candidate)
        {
            return;
        }
        if variant::get_match(&e.origin, candidate).is_none() {
            tracing::debug!("No variant of '{}' matches '{}'", e.origin, candidate);
            self.diagnostics.push(Diagnostic::UnmatchedVariant {
                pin: self.origin.clone(),
                candidate: candidate.to_string(),
            });
        }
    }
}

/// Distinct receivers of one emission, in discovery order.
///
/// With `excluded` set, the walk skips that route as if it were already
/// disconnected.
pub(crate) fn collect(
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
    emitter: Emitter,
    emission: &Emission,
    excluded: Option<RouteId>,
) -> Vec<Receiver> {
    let mut walk = Walk {
        graph: ctx.graph,
        limit: ctx.settings.max_path_len,
        report_unmatched: ctx.settings.report_unmatched_variants,
        emission,
        excluded,
        origin: ctx.graph.describe(emitter.endpoint()),
        path: Vec::new(),
        visited: HashSet::new(),
        found: Vec::new(),
        diagnostics,
    };
    walk.emit_from(emitter.endpoint(), Hop::Wired);
    walk.found
}

/// Computes routing tables for a subtree of the containment graph.
pub struct TopologyResolver<'a> {
    ctx: ResolveContext<'a>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TopologyResolver<'a> {
    pub fn new(ctx: ResolveContext<'a>, diagnostics: &'a mut Diagnostics) -> Self {
        Self { ctx, diagnostics }
    }

    /// Resolve every source node and every filtered bus under `node`.
    ///
    /// A group resolves its filtered buses before its children.
    pub fn resolve_outbound(&mut self, node: NodeId) -> RoutingTables {
        let graph = self.ctx.graph;
        let mut tables = RoutingTables::new();
        for id in graph.preorder(node) {
            let Ok(n) = graph.node(id) else {
                continue;
            };
            if n.is_group() {
                for &bus in n.buses() {
                    if let Some(table) = bus_table::resolve_bus(&self.ctx, self.diagnostics, bus) {
                        tables.insert_bus(bus, table);
                    }
                }
            } else {
                let node_tables = self.node_tables(id);
                tables.insert_node(id, node_tables);
            }
        }
        tracing::debug!(
            "Resolved {} node tables and {} bus tables under {:?}",
            tables.node_count(),
            tables.bus_count(),
            node
        );
        tables
    }

    /// Outbound entries for every output variant and inbound markers for
    /// every input pin of one source node.
    pub fn node_tables(&mut self, node: NodeId) -> NodeTables {
        let graph = self.ctx.graph;
        let mut tables = NodeTables::default();
        let Ok(n) = graph.node(node) else {
            return tables;
        };
        for &pin_id in &n.pins {
            let Ok(pin) = graph.pin(pin_id) else {
                continue;
            };
            match pin.direction {
                Direction::Output => {
                    for emission in Emission::of_pin(pin) {
                        let receivers = collect(
                            &self.ctx,
                            self.diagnostics,
                            Emitter::Pin(pin_id),
                            &emission,
                            None,
                        );
                        tables.outbound.push(OutboundEntry {
                            pin: pin_id,
                            variant: emission.name,
                            channel: pin.channel,
                            receivers,
                        });
                    }
                }
                Direction::Input => tables.inbound.push(InboundEntry {
                    pin: pin_id,
                    name: pin.name.clone(),
                    channel: pin.channel,
                }),
            }
        }
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::endpoint::PinSpec;

    fn resolve(graph: &Graph) -> (RoutingTables, Diagnostics) {
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let tables =
            TopologyResolver::new(ResolveContext::new(graph, &settings), &mut diags)
                .resolve_outbound(graph.root());
        (tables, diags)
    }

    fn receivers_of(tables: &RoutingTables, graph: &Graph, pin: PinId, variant: &str) -> Vec<Receiver> {
        let node = graph.pin(pin).unwrap().node;
        tables
            .node(node)
            .unwrap()
            .outbound(pin, variant)
            .unwrap()
            .receivers
            .clone()
    }

    fn wire(g: &mut Graph, a: impl Into<Endpoint>, b: impl Into<Endpoint>) -> RouteId {
        g.connect(a.into(), b.into()).unwrap()
    }

    #[test]
    fn test_multi_pin_splits_by_variant() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "A", "N2").unwrap();
        let n3 = g.add_source(root, "B", "N3").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("out[a,b]")).unwrap();
        let in_a = g.add_pin(n2, &PinSpec::input("in.a")).unwrap();
        let in_b = g.add_pin(n3, &PinSpec::input("in.b")).unwrap();
        wire(&mut g, out, in_a);
        wire(&mut g, out, in_b);

        let (tables, diags) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "out.a"), vec![Receiver::Pin(in_a)]);
        assert_eq!(receivers_of(&tables, &g, out, "out.b"), vec![Receiver::Pin(in_b)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unmatched_multi_route_is_reported_once() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "C", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("out[a,b]")).unwrap();
        let in_c = g.add_pin(n2, &PinSpec::input("in.c")).unwrap();
        wire(&mut g, out, in_c);

        let (tables, diags) = resolve(&g);
        assert!(receivers_of(&tables, &g, out, "out.a").is_empty());
        assert!(receivers_of(&tables, &g, out, "out.b").is_empty());
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags.as_slice()[0],
            Diagnostic::UnmatchedVariant { .. }
        ));
    }

    #[test]
    fn test_proxy_and_pad_are_transparent() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let group = g.add_group(root, "G", "G1").unwrap();
        let inner = g.add_source(group, "Inner", "N3").unwrap();
        let p = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let x = g.add_pin(group, &PinSpec::input("tick")).unwrap();
        let q = g.add_pin(inner, &PinSpec::input("tick")).unwrap();
        let pad = g.pin(x).unwrap().pad.unwrap();
        wire(&mut g, p, x);
        wire(&mut g, pad, q);

        let (tables, _) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, p, "tick"), vec![Receiver::Pin(q)]);
        // The group itself owns no table.
        assert!(tables.node(group).is_none());
    }

    #[test]
    fn test_output_proxy_leaves_group() {
        let mut g = Graph::new();
        let root = g.root();
        let group = g.add_group(root, "G", "G1").unwrap();
        let inner = g.add_source(group, "Inner", "N3").unwrap();
        let sink = g.add_source(root, "Sink", "N2").unwrap();
        let out = g.add_pin(inner, &PinSpec::output("done")).unwrap();
        let y = g.add_pin(group, &PinSpec::output("done")).unwrap();
        let done = g.add_pin(sink, &PinSpec::input("done")).unwrap();
        let pad = g.pin(y).unwrap().pad.unwrap();
        wire(&mut g, out, pad);
        wire(&mut g, y, done);

        let (tables, _) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "done"), vec![Receiver::Pin(done)]);
    }

    #[test]
    fn test_unfiltered_bus_delivers_by_name() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "T", "N2").unwrap();
        let n3 = g.add_source(root, "P", "N3").unwrap();
        let temp_out = g.add_pin(n1, &PinSpec::output("temp")).unwrap();
        let temp_in = g.add_pin(n2, &PinSpec::input("TEMP")).unwrap();
        let press_in = g.add_pin(n3, &PinSpec::input("pressure")).unwrap();
        let bus = g.add_bus(root, "data", "B1", None).unwrap();
        let (t1, t2, t3) = (
            g.add_tack(bus).unwrap(),
            g.add_tack(bus).unwrap(),
            g.add_tack(bus).unwrap(),
        );
        wire(&mut g, temp_out, t1);
        wire(&mut g, t2, temp_in);
        wire(&mut g, t3, press_in);

        let (tables, _) = resolve(&g);
        assert_eq!(
            receivers_of(&tables, &g, temp_out, "temp"),
            vec![Receiver::Pin(temp_in)]
        );
        assert_eq!(tables.bus_count(), 0);
    }

    #[test]
    fn test_filtered_bus_is_opaque() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "T", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("temp")).unwrap();
        let inp = g.add_pin(n2, &PinSpec::input("temp")).unwrap();
        let bus = g
            .add_bus(root, "data", "B1", Some("by_zone".to_string()))
            .unwrap();
        let (t1, t2) = (g.add_tack(bus).unwrap(), g.add_tack(bus).unwrap());
        wire(&mut g, out, t1);
        wire(&mut g, t2, inp);

        let (tables, _) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "temp"), vec![Receiver::Tack(t1)]);
        let bus_table = tables.bus(bus).unwrap();
        assert_eq!(bus_table.incoming, vec![t1]);
        assert_eq!(bus_table.outgoing(t2).unwrap().receivers, vec![Receiver::Pin(inp)]);
    }

    #[test]
    fn test_cyclic_external_wiring_is_guarded() {
        // Src ─► G.in ═pad═► G.out(pad) ─► G.out ─► G.in  (loop around the group)
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let group = g.add_group(root, "G", "G1").unwrap();
        let sink = g.add_source(group, "Sink", "N3").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("x")).unwrap();
        let x_in = g.add_pin(group, &PinSpec::input("x")).unwrap();
        let x_out = g.add_pin(group, &PinSpec::output("x")).unwrap();
        let inner = g.add_pin(sink, &PinSpec::input("x")).unwrap();
        let pad_in = g.pin(x_in).unwrap().pad.unwrap();
        let pad_out = g.pin(x_out).unwrap().pad.unwrap();
        wire(&mut g, out, x_in);
        wire(&mut g, pad_in, pad_out);
        wire(&mut g, pad_in, inner);
        wire(&mut g, x_out, x_in);

        let (tables, diags) = resolve(&g);
        // Reached directly and again after one lap, listed once.
        assert_eq!(receivers_of(&tables, &g, out, "x"), vec![Receiver::Pin(inner)]);
        assert!(diags
            .as_slice()
            .iter()
            .any(|d| matches!(d, Diagnostic::CycleDetected { .. })));
    }

    #[test]
    fn test_receiver_reached_twice_is_listed_once() {
        // N1.tick ─► G.x ═► N3.tick
        //        └─► G.y ═┘
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let group = g.add_group(root, "G", "G1").unwrap();
        let inner = g.add_source(group, "Inner", "N3").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let x = g.add_pin(group, &PinSpec::input("x")).unwrap();
        let y = g.add_pin(group, &PinSpec::input("y")).unwrap();
        let sink = g.add_pin(inner, &PinSpec::input("tick")).unwrap();
        let (pad_x, pad_y) = (g.pin(x).unwrap().pad.unwrap(), g.pin(y).unwrap().pad.unwrap());
        wire(&mut g, out, x);
        wire(&mut g, out, y);
        wire(&mut g, pad_x, sink);
        wire(&mut g, pad_y, sink);

        let (tables, diags) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "tick"), vec![Receiver::Pin(sink)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_two_entries_into_one_bus_deliver_once() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "Dst", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let inp = g.add_pin(n2, &PinSpec::input("tick")).unwrap();
        let bus = g.add_bus(root, "data", "B1", None).unwrap();
        let tacks: Vec<TackId> = (0..3).map(|_| g.add_tack(bus).unwrap()).collect();
        wire(&mut g, out, tacks[0]);
        wire(&mut g, out, tacks[1]);
        wire(&mut g, tacks[2], inp);

        let (tables, _) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "tick"), vec![Receiver::Pin(inp)]);
    }

    #[test]
    fn test_chained_diamonds_stay_linear() {
        // Each stage: bus ─► {G.a, G.b} ═► next bus, sixteen stages deep.
        const STAGES: usize = 16;
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let nz = g.add_source(root, "Dst", "NZ").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let sink = g.add_pin(nz, &PinSpec::input("tick")).unwrap();

        let first = g.add_bus(root, "stage0", "B0", None).unwrap();
        let entry = g.add_tack(first).unwrap();
        wire(&mut g, out, entry);
        let mut bus = first;
        for stage in 1..=STAGES {
            let next = g
                .add_bus(root, &format!("stage{}", stage), &format!("B{}", stage), None)
                .unwrap();
            for side in ["a", "b"] {
                let uid = format!("G{}{}", stage, side);
                let group = g.add_group(root, &uid, &uid).unwrap();
                let proxy_in = g.add_pin(group, &PinSpec::input("tick")).unwrap();
                let proxy_out = g.add_pin(group, &PinSpec::output("tick")).unwrap();
                let pad_in = g.pin(proxy_in).unwrap().pad.unwrap();
                let pad_out = g.pin(proxy_out).unwrap().pad.unwrap();
                wire(&mut g, pad_in, pad_out);
                let from_bus = g.add_tack(bus).unwrap();
                wire(&mut g, from_bus, proxy_in);
                let to_next = g.add_tack(next).unwrap();
                wire(&mut g, proxy_out, to_next);
            }
            bus = next;
        }
        let exit = g.add_tack(bus).unwrap();
        wire(&mut g, exit, sink);

        let (tables, diags) = resolve(&g);
        assert_eq!(receivers_of(&tables, &g, out, "tick"), vec![Receiver::Pin(sink)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_excluded_route_is_skipped() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "Dst", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let inp = g.add_pin(n2, &PinSpec::input("tick")).unwrap();
        let route = wire(&mut g, out, inp);

        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let ctx = ResolveContext::new(&g, &settings);
        let emission = &Emission::of_pin(g.pin(out).unwrap())[0];
        let all = collect(&ctx, &mut diags, Emitter::Pin(out), emission, None);
        let without = collect(&ctx, &mut diags, Emitter::Pin(out), emission, Some(route));
        assert_eq!(all, vec![Receiver::Pin(inp)]);
        assert!(without.is_empty());
    }

    #[test]
    fn test_path_limit_stops_the_walk() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let group = g.add_group(root, "G", "G1").unwrap();
        let inner = g.add_source(group, "Inner", "N3").unwrap();
        let p = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let x = g.add_pin(group, &PinSpec::input("tick")).unwrap();
        let q = g.add_pin(inner, &PinSpec::input("tick")).unwrap();
        let pad = g.pin(x).unwrap().pad.unwrap();
        wire(&mut g, p, x);
        wire(&mut g, pad, q);

        let settings = ResolverSettings {
            max_path_len: 1,
            ..ResolverSettings::default()
        };
        let mut diags = Diagnostics::new();
        let tables = TopologyResolver::new(ResolveContext::new(&g, &settings), &mut diags)
            .resolve_outbound(root);
        assert!(receivers_of(&tables, &g, p, "tick").is_empty());
        assert!(matches!(
            diags.as_slice()[0],
            Diagnostic::PathTooLong { limit: 1, .. }
        ));
    }

    #[test]
    fn test_inbound_markers() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Svc", "N1").unwrap();
        let req = g.add_pin(n1, &PinSpec::input("request").channel()).unwrap();

        let (tables, _) = resolve(&g);
        let node = tables.node(n1).unwrap();
        assert!(node.has_inbound(req));
        assert!(node.inbound[0].channel);
        assert!(node.outbound.is_empty());
    }
}
