//! Graph documents.
//!
//! A document describes the root group of a graph in TOML or JSON. Groups
//! nest through a `group` table on a node; a node without one is a source
//! node.
//!
//! ```toml
//! [[nodes]]
//! name = "Sensor"
//! uid = "N1"
//! pins = [{ name = "out[a,b]", direction = "output" }]
//!
//! [[nodes]]
//! name = "Logger"
//! uid = "N2"
//! pins = [{ name = "in.a", direction = "input" }]
//!
//! [[routes]]
//! from = "N1:out[a,b]"
//! to = "N2:in.a"
//! ```
//!
//! Route endpoints are written as:
//! - `<uid>:<pin>`: a pin of a node in the same group
//! - `pad:<proxy>`: the pad of one of the enclosing group's proxy pins
//! - `bus:<uid>`: a fresh tack on a bus of the same group
//!
//! `from` names the emitting side and `to` the absorbing side. When a node
//! has an input and an output of the same name, `from` picks the output and
//! `to` the input.

use crate::config::CompilerConfig;
use crate::error::{MsgRouteError, Result, ResultExt};
use crate::routing::{Direction, Endpoint, NodeId, PinSpec, RoutingEngine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A reference to a route endpoint inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndpointRef {
    /// `<uid>:<pin>`
    Pin { uid: String, pin: String },
    /// `pad:<proxy>`
    Pad { proxy: String },
    /// `bus:<uid>`
    Bus { uid: String },
}

impl FromStr for EndpointRef {
    type Err = MsgRouteError;

    fn from_str(s: &str) -> Result<Self> {
        let (head, tail) = s
            .split_once(':')
            .ok_or_else(|| MsgRouteError::Document(format!("Endpoint '{}' has no ':'", s)))?;
        let (head, tail) = (head.trim(), tail.trim());
        if head.is_empty() || tail.is_empty() {
            return Err(MsgRouteError::Document(format!(
                "Endpoint '{}' is incomplete",
                s
            )));
        }
        Ok(match head {
            "pad" => EndpointRef::Pad {
                proxy: tail.to_string(),
            },
            "bus" => EndpointRef::Bus {
                uid: tail.to_string(),
            },
            uid => EndpointRef::Pin {
                uid: uid.to_string(),
                pin: tail.to_string(),
            },
        })
    }
}

impl TryFrom<String> for EndpointRef {
    type Error = MsgRouteError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<EndpointRef> for String {
    fn from(r: EndpointRef) -> Self {
        r.to_string()
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRef::Pin { uid, pin } => write!(f, "{}:{}", uid, pin),
            EndpointRef::Pad { proxy } => write!(f, "pad:{}", proxy),
            EndpointRef::Bus { uid } => write!(f, "bus:{}", uid),
        }
    }
}

/// A node declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub name: String,
    pub uid: String,

    /// Pins; on a group these are proxies
    #[serde(default)]
    pub pins: Vec<PinSpec>,

    /// Present for group nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupDoc>,
}

/// A bus declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusDoc {
    pub name: String,
    pub uid: String,

    /// Name of the routing function, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// A route declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub from: EndpointRef,
    pub to: EndpointRef,
}

/// Contents of one group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDoc {
    pub nodes: Vec<NodeDoc>,
    pub buses: Vec<BusDoc>,
    pub routes: Vec<RouteDoc>,
}

/// A complete graph: the contents of the root group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(flatten)]
    pub root: GroupDoc,
}

impl GraphDocument {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MsgRouteError::Document(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| MsgRouteError::Document(format!("Failed to parse JSON: {}", e)))
    }

    /// Load a document; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(MsgRouteError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Build the graph into `engine`, under its root group
    pub fn build(&self, engine: &mut RoutingEngine) -> Result<()> {
        let root = engine.root();
        build_group(engine, root, &self.root)?;
        tracing::info!(
            "Built graph document: {} source nodes",
            engine.graph().source_nodes().len()
        );
        Ok(())
    }

    /// Create an engine holding the graph
    pub fn build_engine(&self, config: CompilerConfig) -> Result<RoutingEngine> {
        let mut engine = RoutingEngine::new(config);
        self.build(&mut engine)?;
        Ok(engine)
    }
}

fn build_group(engine: &mut RoutingEngine, group: NodeId, doc: &GroupDoc) -> Result<()> {
    for node in &doc.nodes {
        let id = match &node.group {
            Some(_) => engine.add_group_node(group, &node.name, &node.uid),
            None => engine.add_source_node(group, &node.name, &node.uid),
        }
        .with_context(|| format!("Adding node '{}'", node.uid))?;
        for pin in &node.pins {
            engine
                .add_pin(id, pin)
                .with_context(|| format!("Adding pin '{}' to '{}'", pin.name, node.uid))?;
        }
        if let Some(inner) = &node.group {
            build_group(engine, id, inner)?;
        }
    }

    for bus in &doc.buses {
        engine
            .add_bus(group, &bus.name, &bus.uid, bus.filter.clone())
            .with_context(|| format!("Adding bus '{}'", bus.uid))?;
    }

    for route in &doc.routes {
        let a = resolve_ref(engine, group, &route.from, Direction::Output)?;
        let b = resolve_ref(engine, group, &route.to, Direction::Input)?;
        engine
            .connect(a, b)
            .with_context(|| format!("Connecting {} to {}", route.from, route.to))?;
    }
    Ok(())
}

/// Resolve a reference; `shape` is the shape the endpoint should have.
fn resolve_ref(
    engine: &mut RoutingEngine,
    group: NodeId,
    r: &EndpointRef,
    shape: Direction,
) -> Result<Endpoint> {
    match r {
        EndpointRef::Pin { uid, pin } => {
            let node = engine.node_by_uid(uid)?;
            engine
                .graph()
                .pin_named_as(node, pin, shape)
                .map(Endpoint::Pin)
                .ok_or_else(|| MsgRouteError::Document(format!("No pin '{}' on '{}'", pin, uid)))
        }
        EndpointRef::Pad { proxy } => {
            let graph = engine.graph();
            // A pad has the inverse shape of its proxy.
            graph
                .pin_named_as(group, proxy, shape.inverse())
                .and_then(|p| graph.pin(p).ok()?.pad)
                .map(Endpoint::Pad)
                .ok_or_else(|| {
                    MsgRouteError::Document(format!(
                        "No proxy '{}' on group '{}'",
                        proxy,
                        graph.uid_of(group)
                    ))
                })
        }
        EndpointRef::Bus { uid } => {
            let bus = engine.bus_by_uid(uid)?;
            Ok(Endpoint::Tack(engine.add_tack(bus)?))
        }
    }
}
