//! The containment graph: nodes, pins, pads, buses, tacks and routes.
//!
//! Everything lives in flat arenas indexed by the ids in [`super::id`].
//! Removed entities leave `None` behind so ids stay stable.
//!
//! ```text
//! root (group)
//! ├── Sensor (source)   pins: out[a,b]
//! ├── Filter (group)    pins: in (proxy) ──pad──► children inside
//! │   ├── bus "data"    tacks ──► pins / pads inside the group
//! │   └── Worker (source)
//! └── Logger (source)   pins: in.a
//! ```
//!
//! Scopes: a pin's routes live in the scope of the node's parent, a pad's
//! routes live inside its group, and a tack's route lives in the scope of the
//! group owning the bus. Routes may only join endpoints of the same scope.

use crate::routing::endpoint::{Direction, Endpoint, PinSpec};
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::id::{BusId, NodeId, PadId, PinId, RouteId, TackId};
use crate::routing::variant;

/// Kind-specific part of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A leaf node that runs code and owns routing tables.
    Source,
    /// A container; its pins are proxies.
    Group {
        children: Vec<NodeId>,
        buses: Vec<BusId>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Display name; may collide between nodes.
    pub name: String,
    /// Stable identifier used in serialized directives.
    pub uid: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub pins: Vec<PinId>,
}

impl Node {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group { children, .. } => children,
            NodeKind::Source => &[],
        }
    }

    pub fn buses(&self) -> &[BusId] {
        match &self.kind {
            NodeKind::Group { buses, .. } => buses,
            NodeKind::Source => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pin {
    pub id: PinId,
    pub node: NodeId,
    pub name: String,
    pub direction: Direction,
    pub channel: bool,
    /// True when the name encodes a bracketed variant list.
    pub multi: bool,
    /// Set for proxy pins (pins on group nodes).
    pub pad: Option<PadId>,
    /// Routes in creation order.
    pub routes: Vec<RouteId>,
}

impl Pin {
    #[inline]
    pub fn is_proxy(&self) -> bool {
        self.pad.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Pad {
    pub id: PadId,
    pub proxy: PinId,
    /// The group the pad lives in (the owner of the proxy).
    pub group: NodeId,
    pub routes: Vec<RouteId>,
}

#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub uid: String,
    pub owner: NodeId,
    /// Name of the user routing function, when present.
    pub filter: Option<String>,
    pub tacks: Vec<TackId>,
}

impl Bus {
    #[inline]
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Tack {
    pub id: TackId,
    pub bus: BusId,
    pub route: Option<RouteId>,
}

/// An unordered connection between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Route {
    /// The endpoint opposite `end`, or `None` if `end` is not on this route.
    pub fn other(&self, end: Endpoint) -> Option<Endpoint> {
        if self.a == end {
            Some(self.b)
        } else if self.b == end {
            Some(self.a)
        } else {
            None
        }
    }
}

fn slot<T>(arena: &[Option<T>], index: usize) -> Option<&T> {
    arena.get(index).and_then(Option::as_ref)
}

fn slot_mut<T>(arena: &mut [Option<T>], index: usize) -> Option<&mut T> {
    arena.get_mut(index).and_then(Option::as_mut)
}

/// Flat-storage containment graph.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    pins: Vec<Option<Pin>>,
    pads: Vec<Option<Pad>>,
    buses: Vec<Option<Bus>>,
    tacks: Vec<Option<Tack>>,
    routes: Vec<Option<Route>>,
    root: NodeId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a graph holding only the root group.
    pub fn new() -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Some(Node {
                id: root,
                name: "root".to_string(),
                uid: "root".to_string(),
                parent: None,
                kind: NodeKind::Group {
                    children: Vec::new(),
                    buses: Vec::new(),
                },
                pins: Vec::new(),
            })],
            pins: Vec::new(),
            pads: Vec::new(),
            buses: Vec::new(),
            tacks: Vec::new(),
            routes: Vec::new(),
            root,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ── Lookup ──

    pub fn node(&self, id: NodeId) -> RoutingResult<&Node> {
        slot(&self.nodes, id.index()).ok_or(RoutingError::UnknownNode(id))
    }

    pub fn pin(&self, id: PinId) -> RoutingResult<&Pin> {
        slot(&self.pins, id.index()).ok_or(RoutingError::UnknownPin(id))
    }

    pub fn pad(&self, id: PadId) -> RoutingResult<&Pad> {
        slot(&self.pads, id.index()).ok_or(RoutingError::UnknownPad(id))
    }

    pub fn bus(&self, id: BusId) -> RoutingResult<&Bus> {
        slot(&self.buses, id.index()).ok_or(RoutingError::UnknownBus(id))
    }

    pub fn tack(&self, id: TackId) -> RoutingResult<&Tack> {
        slot(&self.tacks, id.index()).ok_or(RoutingError::UnknownTack(id))
    }

    pub fn route(&self, id: RouteId) -> RoutingResult<&Route> {
        slot(&self.routes, id.index()).ok_or(RoutingError::UnknownRoute(id))
    }

    /// Find a node by its stable identifier.
    pub fn node_by_uid(&self, uid: &str) -> Option<NodeId> {
        self.nodes.iter().flatten().find(|n| n.uid == uid).map(|n| n.id)
    }

    /// Find a bus by its stable identifier.
    pub fn bus_by_uid(&self, uid: &str) -> Option<BusId> {
        self.buses.iter().flatten().find(|b| b.uid == uid).map(|b| b.id)
    }

    /// Find the first pin of `node` with the given name.
    pub fn pin_named(&self, node: NodeId, name: &str) -> Option<PinId> {
        let node = self.node(node).ok()?;
        node.pins
            .iter()
            .copied()
            .find(|&p| self.pin(p).map(|pin| pin.name == name).unwrap_or(false))
    }

    /// Find the pin of `node` with the given name, preferring `direction`
    /// when an input and an output share the name.
    pub fn pin_named_as(&self, node: NodeId, name: &str, direction: Direction) -> Option<PinId> {
        let owner = self.node(node).ok()?;
        owner
            .pins
            .iter()
            .copied()
            .find(|&p| {
                self.pin(p)
                    .map(|pin| pin.name == name && pin.direction == direction)
                    .unwrap_or(false)
            })
            .or_else(|| self.pin_named(node, name))
    }

    /// Iterate all live routes in creation order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().flatten()
    }

    /// Nodes of the subtree rooted at `from`, parents before children.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = slot(&self.nodes, id.index()) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children().iter().rev());
        }
        order
    }

    /// All source nodes, in containment pre-order.
    pub fn source_nodes(&self) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .filter(|&id| self.node(id).map(|n| !n.is_group()).unwrap_or(false))
            .collect()
    }

    // ── Endpoint rules ──

    pub fn contains(&self, end: Endpoint) -> bool {
        match end {
            Endpoint::Pin(id) => self.pin(id).is_ok(),
            Endpoint::Pad(id) => self.pad(id).is_ok(),
            Endpoint::Tack(id) => self.tack(id).is_ok(),
        }
    }

    /// Routes attached to an endpoint, in creation order.
    pub fn routes_of(&self, end: Endpoint) -> &[RouteId] {
        match end {
            Endpoint::Pin(id) => self.pin(id).map(|p| p.routes.as_slice()).unwrap_or(&[]),
            Endpoint::Pad(id) => self.pad(id).map(|p| p.routes.as_slice()).unwrap_or(&[]),
            Endpoint::Tack(id) => self.tack(id).map(|t| t.route.as_slice()).unwrap_or(&[]),
        }
    }

    /// The endpoint at the far side of a tack's route.
    pub fn tack_peer(&self, id: TackId) -> Option<Endpoint> {
        let route = self.tack(id).ok()?.route?;
        self.route(route).ok()?.other(Endpoint::Tack(id))
    }

    /// Flow shape of an endpoint: `Output` emits into its routes, `Input`
    /// absorbs from them.
    ///
    /// | endpoint   | shape                          |
    /// |------------|--------------------------------|
    /// | plain pin  | its direction                  |
    /// | proxy pin  | its direction (outer side)     |
    /// | pad        | inverse of its proxy           |
    /// | tack       | inverse of its peer            |
    ///
    /// An unbound tack has no shape.
    pub fn shape(&self, end: Endpoint) -> Option<Direction> {
        match end {
            Endpoint::Pin(id) => self.pin(id).ok().map(|p| p.direction),
            Endpoint::Pad(id) => {
                let pad = self.pad(id).ok()?;
                self.pin(pad.proxy).ok().map(|p| p.direction.inverse())
            }
            Endpoint::Tack(id) => match self.tack_peer(id)? {
                Endpoint::Tack(_) => None,
                peer => self.shape(peer).map(Direction::inverse),
            },
        }
    }

    /// The group whose interior the endpoint's routes live in.
    pub fn scope(&self, end: Endpoint) -> Option<NodeId> {
        match end {
            Endpoint::Pin(id) => {
                let pin = self.pin(id).ok()?;
                self.node(pin.node).ok()?.parent
            }
            Endpoint::Pad(id) => self.pad(id).ok().map(|p| p.group),
            Endpoint::Tack(id) => {
                let tack = self.tack(id).ok()?;
                self.bus(tack.bus).ok().map(|b| b.owner)
            }
        }
    }

    /// The message name an endpoint stands for.
    ///
    /// A pad carries its proxy's name; a tack carries its peer's name.
    pub fn endpoint_name(&self, end: Endpoint) -> &str {
        match end {
            Endpoint::Pin(id) => self.pin(id).map(|p| p.name.as_str()).unwrap_or(""),
            Endpoint::Pad(id) => self
                .pad(id)
                .and_then(|pad| self.pin(pad.proxy))
                .map(|p| p.name.as_str())
                .unwrap_or(""),
            Endpoint::Tack(id) => match self.tack_peer(id) {
                Some(peer @ (Endpoint::Pin(_) | Endpoint::Pad(_))) => self.endpoint_name(peer),
                _ => "",
            },
        }
    }

    /// Human-readable description used in errors and diagnostics.
    pub fn describe(&self, end: Endpoint) -> String {
        match end {
            Endpoint::Pin(id) => match self.pin(id) {
                Ok(pin) => format!("pin '{}' of {}", pin.name, self.uid_of(pin.node)),
                Err(_) => format!("{}", id),
            },
            Endpoint::Pad(id) => match self.pad(id) {
                Ok(pad) => format!(
                    "pad '{}' of {}",
                    self.endpoint_name(end),
                    self.uid_of(pad.group)
                ),
                Err(_) => format!("{}", id),
            },
            Endpoint::Tack(id) => match self.tack(id).and_then(|t| self.bus(t.bus)) {
                Ok(bus) => format!("tack {} on bus {}", id.0, bus.uid),
                Err(_) => format!("{}", id),
            },
        }
    }

    pub fn uid_of(&self, node: NodeId) -> &str {
        self.node(node).map(|n| n.uid.as_str()).unwrap_or("?")
    }

    /// Split a route into (emitting, absorbing) endpoints.
    pub fn orient(&self, id: RouteId) -> Option<(Endpoint, Endpoint)> {
        let route = self.route(id).ok()?;
        match self.shape(route.a)? {
            Direction::Output => Some((route.a, route.b)),
            Direction::Input => Some((route.b, route.a)),
        }
    }

    // ── Building ──

    fn uid_taken(&self, uid: &str) -> bool {
        self.node_by_uid(uid).is_some() || self.bus_by_uid(uid).is_some()
    }

    fn group_mut(&mut self, id: NodeId) -> RoutingResult<(&mut Vec<NodeId>, &mut Vec<BusId>)> {
        match slot_mut(&mut self.nodes, id.index()) {
            Some(Node {
                kind: NodeKind::Group { children, buses },
                ..
            }) => Ok((children, buses)),
            Some(_) => Err(RoutingError::NotAGroup(id)),
            None => Err(RoutingError::UnknownNode(id)),
        }
    }

    fn add_node(
        &mut self,
        parent: NodeId,
        name: &str,
        uid: &str,
        kind: NodeKind,
    ) -> RoutingResult<NodeId> {
        if !self.node(parent)?.is_group() {
            return Err(RoutingError::NotAGroup(parent));
        }
        if self.uid_taken(uid) {
            return Err(RoutingError::DuplicateUid(uid.to_string()));
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(Node {
            id,
            name: name.to_string(),
            uid: uid.to_string(),
            parent: Some(parent),
            kind,
            pins: Vec::new(),
        }));
        self.group_mut(parent)?.0.push(id);
        Ok(id)
    }

    /// Add a source node under the group `parent`.
    pub fn add_source(&mut self, parent: NodeId, name: &str, uid: &str) -> RoutingResult<NodeId> {
        self.add_node(parent, name, uid, NodeKind::Source)
    }

    /// Add an empty group node under the group `parent`.
    pub fn add_group(&mut self, parent: NodeId, name: &str, uid: &str) -> RoutingResult<NodeId> {
        self.add_node(
            parent,
            name,
            uid,
            NodeKind::Group {
                children: Vec::new(),
                buses: Vec::new(),
            },
        )
    }

    fn check_pin_spec(&self, node: NodeId, spec: &PinSpec) -> RoutingResult<()> {
        let owner = self.node(node)?;
        if owner.parent.is_none() {
            return Err(RoutingError::PinOnRoot);
        }
        let duplicate = owner.pins.iter().any(|&p| {
            self.pin(p)
                .map(|pin| pin.name == spec.name && pin.direction == spec.direction)
                .unwrap_or(false)
        });
        if duplicate {
            return Err(RoutingError::DuplicatePin {
                node,
                name: spec.name.clone(),
                direction: spec.direction.as_str(),
            });
        }
        Ok(())
    }

    fn push_pin(&mut self, node: NodeId, spec: &PinSpec, proxy: bool) -> PinId {
        let id = PinId::from_index(self.pins.len());
        let pad = proxy.then(|| {
            let pad = PadId::from_index(self.pads.len());
            self.pads.push(Some(Pad {
                id: pad,
                proxy: id,
                group: node,
                routes: Vec::new(),
            }));
            pad
        });
        self.pins.push(Some(Pin {
            id,
            node,
            name: spec.name.clone(),
            direction: spec.direction,
            channel: spec.channel,
            multi: variant::is_multi(&spec.name),
            pad,
            routes: Vec::new(),
        }));
        id
    }

    /// Add a pin. On a group node the pin is a proxy and gets its pad.
    pub fn add_pin(&mut self, node: NodeId, spec: &PinSpec) -> RoutingResult<PinId> {
        self.check_pin_spec(node, spec)?;
        let proxy = self.node(node)?.is_group();
        let id = self.push_pin(node, spec, proxy);
        if let Some(owner) = slot_mut(&mut self.nodes, node.index()) {
            owner.pins.push(id);
        }
        Ok(id)
    }

    /// Remove a pin (and its pad). Returns the routes that were attached.
    pub fn remove_pin(&mut self, id: PinId) -> RoutingResult<Vec<Route>> {
        let pin = self.pin(id)?.clone();
        let mut attached = pin.routes.clone();
        if let Some(pad) = pin.pad {
            attached.extend(self.pad(pad)?.routes.iter().copied());
        }
        let detached = self.detach_all(attached);

        if let Some(pad) = pin.pad {
            self.pads[pad.index()] = None;
        }
        self.pins[id.index()] = None;
        if let Some(owner) = slot_mut(&mut self.nodes, pin.node.index()) {
            owner.pins.retain(|&p| p != id);
        }
        Ok(detached)
    }

    /// Add a bus to the group `owner`.
    pub fn add_bus(
        &mut self,
        owner: NodeId,
        name: &str,
        uid: &str,
        filter: Option<String>,
    ) -> RoutingResult<BusId> {
        self.group_mut(owner)?;
        if self.uid_taken(uid) {
            return Err(RoutingError::DuplicateUid(uid.to_string()));
        }
        let id = BusId::from_index(self.buses.len());
        self.buses.push(Some(Bus {
            id,
            name: name.to_string(),
            uid: uid.to_string(),
            owner,
            filter,
            tacks: Vec::new(),
        }));
        self.group_mut(owner)?.1.push(id);
        Ok(id)
    }

    /// Set or clear a bus filter. Returns whether the filter presence changed.
    pub fn set_filter(&mut self, id: BusId, filter: Option<String>) -> RoutingResult<bool> {
        let bus = slot_mut(&mut self.buses, id.index()).ok_or(RoutingError::UnknownBus(id))?;
        let changed = bus.filter.is_some() != filter.is_some();
        bus.filter = filter;
        Ok(changed)
    }

    /// Add an unbound tack to a bus.
    pub fn add_tack(&mut self, bus: BusId) -> RoutingResult<TackId> {
        self.bus(bus)?;
        let id = TackId::from_index(self.tacks.len());
        self.tacks.push(Some(Tack {
            id,
            bus,
            route: None,
        }));
        if let Some(b) = slot_mut(&mut self.buses, bus.index()) {
            b.tacks.push(id);
        }
        Ok(id)
    }

    /// Remove a tack. Returns its route if it was bound.
    pub fn remove_tack(&mut self, id: TackId) -> RoutingResult<Option<Route>> {
        let tack = self.tack(id)?.clone();
        let detached = self.detach_all(tack.route.into_iter().collect()).pop();
        self.tacks[id.index()] = None;
        if let Some(bus) = slot_mut(&mut self.buses, tack.bus.index()) {
            bus.tacks.retain(|&t| t != id);
        }
        Ok(detached)
    }

    // ── Wiring ──

    /// Validate a prospective route without touching the graph.
    pub fn check_connect(&self, a: Endpoint, b: Endpoint) -> RoutingResult<()> {
        for end in [a, b] {
            match end {
                Endpoint::Pin(id) => {
                    self.pin(id)?;
                }
                Endpoint::Pad(id) => {
                    self.pad(id)?;
                }
                Endpoint::Tack(id) => {
                    if self.tack(id)?.route.is_some() {
                        return Err(RoutingError::TackAlreadyBound(id));
                    }
                }
            }
        }
        if a == b {
            return Err(RoutingError::IncompatibleEndpoints(format!(
                "{} cannot be wired to itself",
                self.describe(a)
            )));
        }
        if matches!((a, b), (Endpoint::Tack(_), Endpoint::Tack(_))) {
            return Err(RoutingError::IncompatibleEndpoints(
                "a tack cannot be wired to another tack".to_string(),
            ));
        }

        let (sa, sb) = (self.scope(a), self.scope(b));
        if sa.is_none() || sa != sb {
            return Err(RoutingError::ScopeMismatch(format!(
                "{} and {}",
                self.describe(a),
                self.describe(b)
            )));
        }

        let tack_involved = matches!(a, Endpoint::Tack(_)) || matches!(b, Endpoint::Tack(_));
        if !tack_involved && self.shape(a) == self.shape(b) {
            let shape = self.shape(a).map(Direction::as_str).unwrap_or("unshaped");
            return Err(RoutingError::IncompatibleEndpoints(format!(
                "{} and {} are both {}",
                self.describe(a),
                self.describe(b),
                shape
            )));
        }

        for &existing in self.routes_of(a) {
            if self.route(existing)?.other(a) == Some(b) {
                return Err(RoutingError::DuplicateRoute(existing));
            }
        }
        Ok(())
    }

    /// Create a route between two endpoints.
    pub fn connect(&mut self, a: Endpoint, b: Endpoint) -> RoutingResult<RouteId> {
        self.check_connect(a, b)?;
        let id = RouteId::from_index(self.routes.len());
        self.routes.push(Some(Route { id, a, b }));
        for end in [a, b] {
            self.attach(end, id);
        }
        Ok(id)
    }

    /// Remove a route, returning it.
    pub fn disconnect(&mut self, id: RouteId) -> RoutingResult<Route> {
        let route = self.route(id)?.clone();
        for end in [route.a, route.b] {
            self.detach(end, id);
        }
        self.routes[id.index()] = None;
        Ok(route)
    }

    fn attach(&mut self, end: Endpoint, route: RouteId) {
        match end {
            Endpoint::Pin(id) => {
                if let Some(pin) = slot_mut(&mut self.pins, id.index()) {
                    pin.routes.push(route);
                }
            }
            Endpoint::Pad(id) => {
                if let Some(pad) = slot_mut(&mut self.pads, id.index()) {
                    pad.routes.push(route);
                }
            }
            Endpoint::Tack(id) => {
                if let Some(tack) = slot_mut(&mut self.tacks, id.index()) {
                    tack.route = Some(route);
                }
            }
        }
    }

    fn detach(&mut self, end: Endpoint, route: RouteId) {
        match end {
            Endpoint::Pin(id) => {
                if let Some(pin) = slot_mut(&mut self.pins, id.index()) {
                    pin.routes.retain(|&r| r != route);
                }
            }
            Endpoint::Pad(id) => {
                if let Some(pad) = slot_mut(&mut self.pads, id.index()) {
                    pad.routes.retain(|&r| r != route);
                }
            }
            Endpoint::Tack(id) => {
                if let Some(tack) = slot_mut(&mut self.tacks, id.index()) {
                    if tack.route == Some(route) {
                        tack.route = None;
                    }
                }
            }
        }
    }

    fn detach_all(&mut self, routes: Vec<RouteId>) -> Vec<Route> {
        routes
            .into_iter()
            .filter_map(|r| self.disconnect(r).ok())
            .collect()
    }

    // ── Structural edits ──

    /// Remove a node and everything it contains. Returns the detached routes.
    pub fn remove_node(&mut self, id: NodeId) -> RoutingResult<Vec<Route>> {
        if id == self.root {
            return Err(RoutingError::RootRemoval);
        }
        let parent = self.node(id)?.parent;
        let subtree = self.preorder(id);

        let mut detached = Vec::new();
        for &node_id in &subtree {
            let node = self.node(node_id)?.clone();
            for &pin in &node.pins {
                detached.extend(self.remove_pin(pin)?);
            }
            for &bus in node.buses() {
                let tacks = self.bus(bus)?.tacks.clone();
                for tack in tacks {
                    detached.extend(self.remove_tack(tack)?);
                }
                self.buses[bus.index()] = None;
            }
        }
        for node_id in subtree {
            self.nodes[node_id.index()] = None;
        }
        if let Some(parent) = parent {
            if let Ok((children, _)) = self.group_mut(parent) {
                children.retain(|&c| c != id);
            }
        }
        Ok(detached)
    }

    /// Replace the pin interface of a source node.
    ///
    /// Pins whose name and direction reappear in `specs` are kept together
    /// with their routes; the others are removed. The node's pin order
    /// follows `specs`. Returns the routes that were dropped.
    pub fn swap_pins(&mut self, id: NodeId, specs: &[PinSpec]) -> RoutingResult<Vec<Route>> {
        let node = self.node(id)?;
        if node.is_group() {
            return Err(RoutingError::NotASource(id));
        }
        for (i, spec) in specs.iter().enumerate() {
            let repeated = specs[..i]
                .iter()
                .any(|s| s.name == spec.name && s.direction == spec.direction);
            if repeated {
                return Err(RoutingError::DuplicatePin {
                    node: id,
                    name: spec.name.clone(),
                    direction: spec.direction.as_str(),
                });
            }
        }

        let old = node.pins.clone();
        let mut kept: Vec<Option<PinId>> = vec![None; specs.len()];
        let mut detached = Vec::new();
        for pin_id in old {
            let pin = self.pin(pin_id)?;
            let matching = specs
                .iter()
                .position(|s| s.name == pin.name && s.direction == pin.direction);
            match matching {
                Some(index) => kept[index] = Some(pin_id),
                None => detached.extend(self.remove_pin(pin_id)?),
            }
        }

        let mut pins = Vec::with_capacity(specs.len());
        for (spec, existing) in specs.iter().zip(kept) {
            let pin_id = match existing {
                Some(pin_id) => {
                    if let Some(pin) = slot_mut(&mut self.pins, pin_id.index()) {
                        pin.channel = spec.channel;
                    }
                    pin_id
                }
                None => self.push_pin(id, spec, false),
            };
            pins.push(pin_id);
        }
        if let Some(node) = slot_mut(&mut self.nodes, id.index()) {
            node.pins = pins;
        }
        Ok(detached)
    }
}
