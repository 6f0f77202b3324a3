//! The routing engine: owner of the graph and its resolved tables.
//!
//! Every edit goes through [`RoutingEngine`]. The graph validates the request
//! first, so a rejected edit changes nothing. Accepted edits keep the tables
//! in step, either by patching them or by rebuilding from scratch:
//!
//! | edit                                 | tables                    |
//! |--------------------------------------|---------------------------|
//! | connect / disconnect                 | patched                   |
//! | add / remove pin on a source node    | patched                   |
//! | add / remove tack                    | patched                   |
//! | add / remove pin on a group (proxy)  | rebuilt                   |
//! | set or clear a bus filter            | rebuilt                   |
//! | swap node, remove node               | rebuilt                   |

use crate::config::CompilerConfig;
use crate::routing::diagnostics::{Diagnostic, Diagnostics};
use crate::routing::endpoint::{Endpoint, PinSpec};
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::graph::Graph;
use crate::routing::id::{BusId, NodeId, PinId, RouteId, TackId};
use crate::routing::incremental::TableMaintainer;
use crate::routing::resolver::{ResolveContext, TopologyResolver};
use crate::routing::serializer::{DirectiveWriter, Directives};
use crate::routing::table::{BusTable, NodeTables, RoutingTables};

/// A single edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Connect { a: Endpoint, b: Endpoint },
    Disconnect { route: RouteId },
    AddPin { node: NodeId, spec: PinSpec },
    RemovePin { pin: PinId },
    AddTack { bus: BusId },
    RemoveTack { tack: TackId },
    SetFilter { bus: BusId, filter: Option<String> },
    SwapNode { node: NodeId, pins: Vec<PinSpec> },
    RemoveNode { node: NodeId },
}

/// What an accepted [`EditCommand`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Connected(RouteId),
    Disconnected,
    PinAdded(PinId),
    PinRemoved,
    TackAdded(TackId),
    TackRemoved,
    /// `rebuilt` is false when only the filter name changed.
    FilterSet { rebuilt: bool },
    NodeSwapped,
    NodeRemoved,
}

/// Owns the containment graph, its routing tables and the diagnostics
/// raised while maintaining them.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    graph: Graph,
    tables: RoutingTables,
    config: CompilerConfig,
    diagnostics: Diagnostics,
    /// Bumped on every accepted edit.
    generation: u64,
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl RoutingEngine {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            graph: Graph::new(),
            tables: RoutingTables::new(),
            config,
            diagnostics: Diagnostics::new(),
            generation: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn tables(&self) -> &RoutingTables {
        &self.tables
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    /// Drain collected diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    fn maintainer(&mut self) -> TableMaintainer<'_> {
        TableMaintainer::new(
            ResolveContext::new(&self.graph, &self.config.resolver),
            &mut self.tables,
            &mut self.diagnostics,
        )
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    // ── Model building ──

    /// Add a source node under the group `parent`.
    pub fn add_source_node(
        &mut self,
        parent: NodeId,
        name: &str,
        uid: &str,
    ) -> RoutingResult<NodeId> {
        let id = self.graph.add_source(parent, name, uid)?;
        self.tables.insert_node(id, NodeTables::default());
        self.bump();
        tracing::info!("Added source node '{}' ({}) as {:?}", name, uid, id);
        Ok(id)
    }

    /// Add an empty group node under the group `parent`.
    pub fn add_group_node(
        &mut self,
        parent: NodeId,
        name: &str,
        uid: &str,
    ) -> RoutingResult<NodeId> {
        let id = self.graph.add_group(parent, name, uid)?;
        self.bump();
        tracing::info!("Added group node '{}' ({}) as {:?}", name, uid, id);
        Ok(id)
    }

    /// Add a bus to the group `owner`.
    pub fn add_bus(
        &mut self,
        owner: NodeId,
        name: &str,
        uid: &str,
        filter: Option<String>,
    ) -> RoutingResult<BusId> {
        let filtered = filter.is_some();
        let id = self.graph.add_bus(owner, name, uid, filter)?;
        if filtered {
            self.tables.insert_bus(id, BusTable::default());
        }
        self.bump();
        tracing::info!("Added bus '{}' ({}) as {:?}", name, uid, id);
        Ok(id)
    }

    // ── Edits ──

    /// Create a route and patch the tables it affects.
    pub fn connect(&mut self, a: Endpoint, b: Endpoint) -> RoutingResult<RouteId> {
        let route = self.graph.connect(a, b)?;
        self.maintainer().on_connect(route);
        self.bump();
        tracing::info!("Connected {} and {} as {:?}", a, b, route);
        Ok(route)
    }

    /// Remove a route and patch the tables it affected.
    pub fn disconnect(&mut self, route: RouteId) -> RoutingResult<()> {
        self.graph.route(route)?;
        self.detach(route)?;
        self.bump();
        tracing::info!("Disconnected {:?}", route);
        Ok(())
    }

    fn detach(&mut self, route: RouteId) -> RoutingResult<()> {
        self.maintainer().on_disconnect(route);
        self.graph.disconnect(route)?;
        Ok(())
    }

    /// Add a pin. A pin on a group is a proxy and changes how every walk
    /// through the group resolves, so the tables are rebuilt.
    pub fn add_pin(&mut self, node: NodeId, spec: &PinSpec) -> RoutingResult<PinId> {
        let pin = self.graph.add_pin(node, spec)?;
        if self.graph.node(node)?.is_group() {
            self.rebuild();
        } else {
            self.maintainer().on_pin_added(pin);
        }
        self.bump();
        tracing::info!("Added {} pin '{}' to {:?}", spec.direction, spec.name, node);
        Ok(pin)
    }

    /// Remove a pin together with its routes.
    pub fn remove_pin(&mut self, id: PinId) -> RoutingResult<()> {
        let pin = self.graph.pin(id)?;
        let node = pin.node;
        if pin.is_proxy() {
            self.graph.remove_pin(id)?;
            self.rebuild();
        } else {
            for route in pin.routes.clone() {
                self.detach(route)?;
            }
            self.graph.remove_pin(id)?;
            self.maintainer().on_pin_removed(node, id);
        }
        self.bump();
        tracing::info!("Removed pin {:?} from {:?}", id, node);
        Ok(())
    }

    /// Add an unbound tack to a bus.
    pub fn add_tack(&mut self, bus: BusId) -> RoutingResult<TackId> {
        let tack = self.graph.add_tack(bus)?;
        self.bump();
        Ok(tack)
    }

    /// Remove a tack, disconnecting its route first.
    pub fn remove_tack(&mut self, id: TackId) -> RoutingResult<()> {
        if let Some(route) = self.graph.tack(id)?.route {
            self.detach(route)?;
        }
        self.graph.remove_tack(id)?;
        self.bump();
        Ok(())
    }

    /// Set or clear a bus filter. Returns whether the tables were rebuilt.
    ///
    /// Renaming an existing filter keeps every table as is.
    pub fn set_bus_filter(&mut self, bus: BusId, filter: Option<String>) -> RoutingResult<bool> {
        let changed = self.graph.set_filter(bus, filter)?;
        if changed {
            self.rebuild();
        }
        self.bump();
        tracing::info!("Set filter of {:?} (rebuilt: {})", bus, changed);
        Ok(changed)
    }

    /// Replace the pins of a source node, keeping routes of pins that survive.
    pub fn swap_node(&mut self, node: NodeId, pins: &[PinSpec]) -> RoutingResult<()> {
        let dropped = self.graph.swap_pins(node, pins)?;
        self.rebuild();
        self.bump();
        tracing::info!("Swapped {:?}: {} routes dropped", node, dropped.len());
        Ok(())
    }

    /// Remove a node and everything inside it.
    pub fn remove_node(&mut self, node: NodeId) -> RoutingResult<()> {
        let dropped = self.graph.remove_node(node)?;
        self.rebuild();
        self.bump();
        tracing::info!("Removed {:?}: {} routes dropped", node, dropped.len());
        Ok(())
    }

    /// Apply one edit request.
    pub fn apply(&mut self, command: EditCommand) -> RoutingResult<EditOutcome> {
        tracing::debug!("Applying {:?}", command);
        match command {
            EditCommand::Connect { a, b } => self.connect(a, b).map(EditOutcome::Connected),
            EditCommand::Disconnect { route } => {
                self.disconnect(route).map(|_| EditOutcome::Disconnected)
            }
            EditCommand::AddPin { node, spec } => {
                self.add_pin(node, &spec).map(EditOutcome::PinAdded)
            }
            EditCommand::RemovePin { pin } => self.remove_pin(pin).map(|_| EditOutcome::PinRemoved),
            EditCommand::AddTack { bus } => self.add_tack(bus).map(EditOutcome::TackAdded),
            EditCommand::RemoveTack { tack } => {
                self.remove_tack(tack).map(|_| EditOutcome::TackRemoved)
            }
            EditCommand::SetFilter { bus, filter } => self
                .set_bus_filter(bus, filter)
                .map(|rebuilt| EditOutcome::FilterSet { rebuilt }),
            EditCommand::SwapNode { node, pins } => {
                self.swap_node(node, &pins).map(|_| EditOutcome::NodeSwapped)
            }
            EditCommand::RemoveNode { node } => {
                self.remove_node(node).map(|_| EditOutcome::NodeRemoved)
            }
        }
    }

    // ── Tables ──

    fn resolve_all(&self, diagnostics: &mut Diagnostics) -> RoutingTables {
        let ctx = ResolveContext::new(&self.graph, &self.config.resolver);
        TopologyResolver::new(ctx, diagnostics).resolve_outbound(self.graph.root())
    }

    /// Recompute every table from the graph.
    ///
    /// Diagnostics held so far are replaced by those of the new resolution.
    pub fn rebuild(&mut self) {
        let mut diagnostics = Diagnostics::new();
        self.tables = self.resolve_all(&mut diagnostics);
        self.diagnostics = diagnostics;
        tracing::info!(
            "Routing tables rebuilt: {} nodes, {} filtered buses (gen {})",
            self.tables.node_count(),
            self.tables.bus_count(),
            self.generation
        );
    }

    /// True iff the maintained tables match a fresh rebuild, up to
    /// receiver order.
    pub fn is_consistent(&self) -> bool {
        let mut scratch = Diagnostics::new();
        let fresh = self.resolve_all(&mut scratch);
        self.tables.equivalent(&fresh)
    }

    /// Render the current tables.
    pub fn directives(&mut self) -> Directives {
        DirectiveWriter::new(&self.graph, &self.tables, &self.config.style)
            .report_zero_receivers(self.config.resolver.report_zero_receivers)
            .write(&mut self.diagnostics)
    }

    /// Look up a node by uid.
    pub fn node_by_uid(&self, uid: &str) -> RoutingResult<NodeId> {
        self.graph
            .node_by_uid(uid)
            .ok_or_else(|| RoutingError::UnknownUid(uid.to_string()))
    }

    /// Look up a bus by uid.
    pub fn bus_by_uid(&self, uid: &str) -> RoutingResult<BusId> {
        self.graph
            .bus_by_uid(uid)
            .ok_or_else(|| RoutingError::UnknownUid(uid.to_string()))
    }
}
