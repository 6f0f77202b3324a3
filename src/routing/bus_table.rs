//! Tables for buses carrying a filter.
//!
//! A filter is a user routing function; which outgoing tack a message ends
//! up on is decided at run time. The resolver therefore stops at the bus and
//! the bus owns a table of its own:
//!
//! ```text
//!            incoming             outgoing
//! [N1.out] ──► tack 0 ─┐        ┌─ tack 1 ──► [N2.in]    entry: tack 1 -> N2.in
//!                      └ filter ┤
//!                               └─ tack 2 ──► [G.out]    entry: tack 2 -> (through G)
//! ```

use crate::routing::diagnostics::Diagnostics;
use crate::routing::endpoint::{Direction, Endpoint};
use crate::routing::id::{BusId, TackId};
use crate::routing::resolver::{collect, Emission, Emitter, ResolveContext};
use crate::routing::table::{BusTable, TackEntry};

/// The table of a filtered bus, or `None` if the bus has no filter.
///
/// Unbound tacks have no shape and appear on neither side.
pub fn resolve_bus(
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
    bus: BusId,
) -> Option<BusTable> {
    let bus = ctx.graph.bus(bus).ok()?;
    if !bus.has_filter() {
        return None;
    }

    let mut table = BusTable::default();
    for &tack in &bus.tacks {
        match ctx.graph.shape(Endpoint::Tack(tack)) {
            Some(Direction::Input) => table.incoming.push(tack),
            Some(Direction::Output) => table.outgoing.push(tack_entry(ctx, diagnostics, tack)),
            None => {}
        }
    }
    tracing::debug!(
        "Bus {} filter {:?}: {} incoming, {} outgoing",
        bus.uid,
        bus.filter,
        table.incoming.len(),
        table.outgoing.len()
    );
    Some(table)
}

/// Entry for one outgoing tack: everything reachable through its peer.
fn tack_entry(
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
    tack: TackId,
) -> TackEntry {
    let label = ctx.graph.endpoint_name(Endpoint::Tack(tack)).to_string();
    let receivers = collect(
        ctx,
        diagnostics,
        Emitter::BusTack(tack),
        &Emission::opaque(&label),
        None,
    );
    TackEntry {
        tack,
        label,
        receivers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverSettings;
    use crate::routing::endpoint::PinSpec;
    use crate::routing::graph::Graph;
    use crate::routing::table::Receiver;

    struct Fixture {
        graph: Graph,
        bus: BusId,
        incoming: TackId,
        outgoing: TackId,
        sink: crate::routing::id::PinId,
    }

    fn filtered(filter: Option<&str>) -> Fixture {
        let mut graph = Graph::new();
        let root = graph.root();
        let src = graph.add_source(root, "Src", "N1").unwrap();
        let dst = graph.add_source(root, "Dst", "N2").unwrap();
        let out = graph.add_pin(src, &PinSpec::output("reading")).unwrap();
        let sink = graph.add_pin(dst, &PinSpec::input("zone.a")).unwrap();
        let bus = graph
            .add_bus(root, "zones", "B1", filter.map(str::to_string))
            .unwrap();
        let incoming = graph.add_tack(bus).unwrap();
        let outgoing = graph.add_tack(bus).unwrap();
        graph.connect(out.into(), incoming.into()).unwrap();
        graph.connect(outgoing.into(), sink.into()).unwrap();
        Fixture {
            graph,
            bus,
            incoming,
            outgoing,
            sink,
        }
    }

    #[test]
    fn test_unfiltered_bus_has_no_table() {
        let f = filtered(None);
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let ctx = ResolveContext::new(&f.graph, &settings);
        assert!(resolve_bus(&ctx, &mut diags, f.bus).is_none());
    }

    #[test]
    fn test_filtered_bus_splits_tacks_by_shape() {
        let f = filtered(Some("route_by_zone"));
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let ctx = ResolveContext::new(&f.graph, &settings);
        let table = resolve_bus(&ctx, &mut diags, f.bus).unwrap();

        assert_eq!(table.incoming, vec![f.incoming]);
        let entry = table.outgoing(f.outgoing).unwrap();
        assert_eq!(entry.label, "zone.a");
        // The filter decides at run time, so names are never checked here.
        assert_eq!(entry.receivers, vec![Receiver::Pin(f.sink)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unbound_tack_is_ignored() {
        let mut f = filtered(Some("route_by_zone"));
        f.graph.add_tack(f.bus).unwrap();
        let settings = ResolverSettings::default();
        let mut diags = Diagnostics::new();
        let ctx = ResolveContext::new(&f.graph, &settings);
        let table = resolve_bus(&ctx, &mut diags, f.bus).unwrap();
        assert_eq!(table.incoming.len() + table.outgoing.len(), 2);
    }
}
