//! Test graph builders over the routing engine

use msgroute_rs::routing::{Endpoint, NodeId, PadId, PinId, PinSpec, RouteId, TackId};
use msgroute_rs::{CompilerConfig, RoutingEngine};

/// Builder for assembling a graph through the engine, addressing nodes by uid
pub struct GraphBuilder {
    engine: RoutingEngine,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            engine: RoutingEngine::new(config),
        }
    }

    fn parent(&self, parent: Option<&str>) -> NodeId {
        match parent {
            Some(uid) => self.engine.node_by_uid(uid).unwrap(),
            None => self.engine.root(),
        }
    }

    /// Add a source node under `parent` (the root when `None`)
    pub fn source(mut self, parent: Option<&str>, uid: &str, pins: &[PinSpec]) -> Self {
        let parent = self.parent(parent);
        let node = self.engine.add_source_node(parent, uid, uid).unwrap();
        for spec in pins {
            self.engine.add_pin(node, spec).unwrap();
        }
        self
    }

    /// Add a group node with proxy pins under `parent`
    pub fn group(mut self, parent: Option<&str>, uid: &str, proxies: &[PinSpec]) -> Self {
        let parent = self.parent(parent);
        let node = self.engine.add_group_node(parent, uid, uid).unwrap();
        for spec in proxies {
            self.engine.add_pin(node, spec).unwrap();
        }
        self
    }

    /// Add a bus to the group `owner` (the root when `None`)
    pub fn bus(mut self, owner: Option<&str>, uid: &str, filter: Option<&str>) -> Self {
        let owner = self.parent(owner);
        self.engine
            .add_bus(owner, uid, uid, filter.map(str::to_string))
            .unwrap();
        self
    }

    /// Wire two endpoints given as `uid:pin`, `pad:group:proxy` or `bus:uid`
    pub fn wire(mut self, a: &str, b: &str) -> Self {
        let a = endpoint(&mut self.engine, a);
        let b = endpoint(&mut self.engine, b);
        self.engine.connect(a, b).unwrap();
        self
    }

    pub fn build(self) -> RoutingEngine {
        self.engine
    }
}

/// Resolve an endpoint reference, creating a fresh tack for `bus:uid`
pub fn endpoint(engine: &mut RoutingEngine, reference: &str) -> Endpoint {
    let parts: Vec<&str> = reference.split(':').collect();
    match parts.as_slice() {
        ["bus", uid] => Endpoint::Tack(fresh_tack(engine, uid)),
        ["pad", group, proxy] => Endpoint::Pad(pad(engine, group, proxy)),
        [uid, name] => Endpoint::Pin(pin(engine, uid, name)),
        _ => panic!("Malformed endpoint reference '{}'", reference),
    }
}

pub fn pin(engine: &RoutingEngine, uid: &str, name: &str) -> PinId {
    let node = engine.node_by_uid(uid).unwrap();
    engine
        .graph()
        .pin_named(node, name)
        .unwrap_or_else(|| panic!("No pin '{}' on '{}'", name, uid))
}

pub fn pad(engine: &RoutingEngine, group: &str, proxy: &str) -> PadId {
    let proxy = pin(engine, group, proxy);
    engine.graph().pin(proxy).unwrap().pad.unwrap()
}

pub fn fresh_tack(engine: &mut RoutingEngine, bus: &str) -> TackId {
    let bus = engine.bus_by_uid(bus).unwrap();
    engine.add_tack(bus).unwrap()
}

/// Live routes in creation order
pub fn route_ids(engine: &RoutingEngine) -> Vec<RouteId> {
    engine.graph().routes().map(|r| r.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder() {
        let engine = GraphBuilder::new()
            .source(None, "N1", &[PinSpec::output("tick")])
            .source(None, "N2", &[PinSpec::input("tick")])
            .wire("N1:tick", "N2:tick")
            .build();

        assert_eq!(route_ids(&engine).len(), 1);
        assert_eq!(engine.graph().source_nodes().len(), 2);
    }
}
