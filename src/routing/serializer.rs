//! Routing directives: the textual form of resolved tables.
//!
//! ```text
//! node Sensor @ N1
//!   out.a -> in.a @ N2
//!   out.b -> [in.b @ N3, zone @ B1]
//!   req => -
//! bus zones @ B1 filter by_zone
//!   reading >> by_zone
//!   zone.a -> zone.a @ N4
//! ```
//!
//! Blocks follow containment pre-order; a group's filtered buses come before
//! its children. Lines follow variant order, targets follow receiver order.
//! The same tables always produce the same text.

use crate::config::DirectiveStyle;
use crate::routing::diagnostics::{Diagnostic, Diagnostics};
use crate::routing::endpoint::Endpoint;
use crate::routing::graph::Graph;
use crate::routing::id::{BusId, NodeId};
use crate::routing::table::{Receiver, RoutingTables};
use serde::Serialize;
use std::fmt;

/// What a directive block describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockHeader {
    Node {
        name: String,
        uid: String,
    },
    Bus {
        name: String,
        uid: String,
        filter: String,
    },
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockHeader::Node { name, uid } => write!(f, "node {} @ {}", name, uid),
            BlockHeader::Bus { name, uid, filter } => {
                write!(f, "bus {} @ {} filter {}", name, uid, filter)
            }
        }
    }
}

/// One directive line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveLine {
    /// `<source> <symbol> <targets>`
    Route {
        source: String,
        symbol: String,
        targets: Vec<String>,
    },
    /// `<source> <symbol> <filter>` for a filtered-bus input
    Filter {
        source: String,
        symbol: String,
        filter: String,
    },
}

impl DirectiveLine {
    fn render(&self, empty_marker: &str) -> String {
        match self {
            DirectiveLine::Route {
                source,
                symbol,
                targets,
            } => {
                let targets = match targets.as_slice() {
                    [] => empty_marker.to_string(),
                    [single] => single.clone(),
                    many => format!("[{}]", many.join(", ")),
                };
                format!("{} {} {}", source, symbol, targets)
            }
            DirectiveLine::Filter {
                source,
                symbol,
                filter,
            } => format!("{} {} {}", source, symbol, filter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveBlock {
    pub header: BlockHeader,
    pub lines: Vec<DirectiveLine>,
}

/// All directives of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directives {
    pub blocks: Vec<DirectiveBlock>,
    #[serde(skip)]
    empty_marker: String,
    #[serde(skip)]
    indent: usize,
}

impl Directives {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The block with the given owner uid.
    pub fn block(&self, uid: &str) -> Option<&DirectiveBlock> {
        self.blocks.iter().find(|b| match &b.header {
            BlockHeader::Node { uid: u, .. } | BlockHeader::Bus { uid: u, .. } => u == uid,
        })
    }

    /// Rendered lines of one block, without indentation.
    pub fn lines_of(&self, uid: &str) -> Vec<String> {
        self.block(uid)
            .map(|b| b.lines.iter().map(|l| l.render(&self.empty_marker)).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pad = " ".repeat(self.indent);
        for block in &self.blocks {
            writeln!(f, "{}", block.header)?;
            for line in &block.lines {
                writeln!(f, "{}{}", pad, line.render(&self.empty_marker))?;
            }
        }
        Ok(())
    }
}

/// Renders [`RoutingTables`] into [`Directives`].
pub struct DirectiveWriter<'a> {
    graph: &'a Graph,
    tables: &'a RoutingTables,
    style: &'a DirectiveStyle,
    report_zero_receivers: bool,
}

impl<'a> DirectiveWriter<'a> {
    pub fn new(graph: &'a Graph, tables: &'a RoutingTables, style: &'a DirectiveStyle) -> Self {
        Self {
            graph,
            tables,
            style,
            report_zero_receivers: true,
        }
    }

    /// Whether outputs without receivers raise [`Diagnostic::ZeroReceivers`].
    pub fn report_zero_receivers(mut self, report: bool) -> Self {
        self.report_zero_receivers = report;
        self
    }

    pub fn write(&self, diagnostics: &mut Diagnostics) -> Directives {
        let mut blocks = Vec::new();
        for id in self.graph.preorder(self.graph.root()) {
            let Ok(node) = self.graph.node(id) else {
                continue;
            };
            if node.is_group() {
                for &bus in node.buses() {
                    blocks.extend(self.bus_block(bus, diagnostics));
                }
            } else {
                blocks.extend(self.node_block(id, diagnostics));
            }
        }
        Directives {
            blocks,
            empty_marker: self.style.empty_marker.clone(),
            indent: self.style.indent,
        }
    }

    fn node_block(&self, id: NodeId, diagnostics: &mut Diagnostics) -> Option<DirectiveBlock> {
        let node = self.graph.node(id).ok()?;
        let tables = self.tables.node(id)?;
        let lines = tables
            .outbound
            .iter()
            .map(|entry| {
                let symbol = if entry.channel {
                    &self.style.channel_symbol
                } else {
                    &self.style.plain_symbol
                };
                self.route_line(&node.uid, &entry.variant, symbol, &entry.receivers, diagnostics)
            })
            .collect();
        Some(DirectiveBlock {
            header: BlockHeader::Node {
                name: node.name.clone(),
                uid: node.uid.clone(),
            },
            lines,
        })
    }

    fn bus_block(&self, id: BusId, diagnostics: &mut Diagnostics) -> Option<DirectiveBlock> {
        let bus = self.graph.bus(id).ok()?;
        let table = self.tables.bus(id)?;
        let filter = bus.filter.clone().unwrap_or_default();

        let mut lines: Vec<DirectiveLine> = table
            .incoming
            .iter()
            .map(|&tack| DirectiveLine::Filter {
                source: self.graph.endpoint_name(Endpoint::Tack(tack)).to_string(),
                symbol: self.style.filter_symbol.clone(),
                filter: filter.clone(),
            })
            .collect();
        for entry in &table.outgoing {
            lines.push(self.route_line(
                &bus.uid,
                &entry.label,
                &self.style.plain_symbol,
                &entry.receivers,
                diagnostics,
            ));
        }
        Some(DirectiveBlock {
            header: BlockHeader::Bus {
                name: bus.name.clone(),
                uid: bus.uid.clone(),
                filter,
            },
            lines,
        })
    }

    fn route_line(
        &self,
        owner: &str,
        source: &str,
        symbol: &str,
        receivers: &[Receiver],
        diagnostics: &mut Diagnostics,
    ) -> DirectiveLine {
        if receivers.is_empty() && self.report_zero_receivers {
            diagnostics.push(Diagnostic::ZeroReceivers {
                owner: owner.to_string(),
                entry: source.to_string(),
            });
        }
        DirectiveLine::Route {
            source: source.to_string(),
            symbol: symbol.to_string(),
            targets: receivers.iter().map(|&r| self.descriptor(r)).collect(),
        }
    }

    /// `<name> @ <owner uid>` for one receiver.
    fn descriptor(&self, receiver: Receiver) -> String {
        match receiver {
            Receiver::Pin(id) => match self.graph.pin(id) {
                Ok(pin) => format!("{} @ {}", pin.name, self.graph.uid_of(pin.node)),
                Err(_) => id.to_string(),
            },
            Receiver::Tack(id) => match self.graph.tack(id).and_then(|t| self.graph.bus(t.bus)) {
                Ok(bus) => format!(
                    "{} @ {}",
                    self.graph.endpoint_name(Endpoint::Tack(id)),
                    bus.uid
                ),
                Err(_) => id.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverSettings;
    use crate::routing::endpoint::PinSpec;
    use crate::routing::resolver::{ResolveContext, TopologyResolver};

    fn compile(graph: &Graph, style: &DirectiveStyle) -> (Directives, Diagnostics) {
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let tables = TopologyResolver::new(ResolveContext::new(graph, &settings), &mut diags)
            .resolve_outbound(graph.root());
        let directives = DirectiveWriter::new(graph, &tables, style).write(&mut diags);
        (directives, diags)
    }

    fn scenario() -> Graph {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Sensor", "N1").unwrap();
        let n2 = g.add_source(root, "A", "N2").unwrap();
        let n3 = g.add_source(root, "B", "N3").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("out[a,b]")).unwrap();
        let req = g.add_pin(n1, &PinSpec::output("req").channel()).unwrap();
        let in_a = g.add_pin(n2, &PinSpec::input("in.a")).unwrap();
        let in_b = g.add_pin(n3, &PinSpec::input("in.b")).unwrap();
        let svc = g.add_pin(n3, &PinSpec::input("req").channel()).unwrap();
        g.connect(out.into(), in_a.into()).unwrap();
        g.connect(out.into(), in_b.into()).unwrap();
        g.connect(req.into(), svc.into()).unwrap();
        g
    }

    #[test]
    fn test_scenario_lines() {
        let g = scenario();
        let (directives, diags) = compile(&g, &DirectiveStyle::default());
        assert_eq!(
            directives.lines_of("N1"),
            vec!["out.a -> in.a @ N2", "out.b -> in.b @ N3", "req => req @ N3"]
        );
        // N2 and N3 have blocks but no outputs.
        assert!(directives.lines_of("N2").is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_variant_column_uses_expanded_names() {
        // Two multi pins sharing tokens stay distinguishable.
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "Dst", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("out[a,b]")).unwrap();
        let mode = g.add_pin(n1, &PinSpec::output("mode[a,b]")).unwrap();
        let in_a = g.add_pin(n2, &PinSpec::input("in.a")).unwrap();
        let mode_b = g.add_pin(n2, &PinSpec::input("mode.b")).unwrap();
        g.connect(out.into(), in_a.into()).unwrap();
        g.connect(mode.into(), mode_b.into()).unwrap();

        let style = DirectiveStyle::default();
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let tables = TopologyResolver::new(ResolveContext::new(&g, &settings), &mut diags)
            .resolve_outbound(g.root());
        let directives = DirectiveWriter::new(&g, &tables, &style)
            .report_zero_receivers(false)
            .write(&mut diags);
        assert_eq!(
            directives.lines_of("N1"),
            vec![
                "out.a -> in.a @ N2",
                "out.b -> -",
                "mode.a -> -",
                "mode.b -> mode.b @ N2",
            ]
        );
    }

    #[test]
    fn test_empty_target_marker_and_diagnostic() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Lonely", "N1").unwrap();
        g.add_pin(n1, &PinSpec::output("tick")).unwrap();

        let (directives, diags) = compile(&g, &DirectiveStyle::default());
        assert_eq!(directives.lines_of("N1"), vec!["tick -> -"]);
        assert!(matches!(
            diags.as_slice()[0],
            Diagnostic::ZeroReceivers { .. }
        ));
    }

    #[test]
    fn test_multiple_targets_are_bracketed() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "A", "N2").unwrap();
        let n3 = g.add_source(root, "B", "N3").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("tick")).unwrap();
        let a = g.add_pin(n2, &PinSpec::input("tick")).unwrap();
        let b = g.add_pin(n3, &PinSpec::input("tick")).unwrap();
        g.connect(out.into(), a.into()).unwrap();
        g.connect(out.into(), b.into()).unwrap();

        let (directives, _) = compile(&g, &DirectiveStyle::default());
        assert_eq!(
            directives.lines_of("N1"),
            vec!["tick -> [tick @ N2, tick @ N3]"]
        );
    }

    #[test]
    fn test_filtered_bus_block_precedes_children() {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_source(root, "Src", "N1").unwrap();
        let n2 = g.add_source(root, "Dst", "N2").unwrap();
        let out = g.add_pin(n1, &PinSpec::output("reading")).unwrap();
        let inp = g.add_pin(n2, &PinSpec::input("zone.a")).unwrap();
        let bus = g
            .add_bus(root, "zones", "B1", Some("by_zone".to_string()))
            .unwrap();
        let (t_in, t_out) = (g.add_tack(bus).unwrap(), g.add_tack(bus).unwrap());
        g.connect(out.into(), t_in.into()).unwrap();
        g.connect(t_out.into(), inp.into()).unwrap();

        let (directives, _) = compile(&g, &DirectiveStyle::default());
        let text = directives.to_string();
        assert!(text.starts_with("bus zones @ B1 filter by_zone\n"));
        assert_eq!(
            directives.lines_of("B1"),
            vec!["reading >> by_zone", "zone.a -> zone.a @ N2"]
        );
        assert_eq!(directives.lines_of("N1"), vec!["reading -> reading @ B1"]);
    }

    #[test]
    fn test_custom_style() {
        let g = scenario();
        let style = DirectiveStyle {
            plain_symbol: "~>".to_string(),
            indent: 4,
            ..DirectiveStyle::default()
        };
        let (directives, _) = compile(&g, &style);
        let text = directives.to_string();
        assert!(text.contains("\n    out.a ~> in.a @ N2\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let g = scenario();
        let (first, _) = compile(&g, &DirectiveStyle::default());
        let (second, _) = compile(&g, &DirectiveStyle::default());
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_json_shape() {
        let g = scenario();
        let (directives, _) = compile(&g, &DirectiveStyle::default());
        let json = serde_json::to_value(&directives).unwrap();
        assert_eq!(json["blocks"][0]["header"]["kind"], "node");
        assert_eq!(json["blocks"][0]["header"]["uid"], "N1");
        assert_eq!(json["blocks"][0]["lines"][0]["targets"][0], "in.a @ N2");
    }
}
