//! Connection resolution and routing-table compilation.
//!
//! A dataflow graph of source nodes, group nodes, shared buses and
//! multi-valued message names is compiled into per-pin dispatch tables and
//! then into textual routing directives.
//!
//! # Architecture
//!
//! ```text
//!   edits ──► [RoutingEngine] ──► [Graph]            containment + routes
//!                   │
//!                   ├──► [TopologyResolver] ──► [RoutingTables]   full rebuild
//!                   ├──► [TableMaintainer]  ──► [RoutingTables]   incremental
//!                   └──► [DirectiveWriter]  ──► [Directives]      text / JSON
//! ```
//!
//! # Design
//!
//! - **Flat arenas**: every entity is addressed by a `u32` id; removal leaves a hole.
//! - **Closed endpoint enum**: `Pin`, `Pad`, `Tack`, matched exhaustively.
//! - **Derived flow direction**: which side of a route emits comes from the
//!   endpoints' shape, never from the route itself.
//! - **Transparent hops**: proxies, pads and unfiltered buses are walked through;
//!   a bus with a filter is opaque and owns its own table.
//! - **Diagnostics, not failures**: anomalies are logged, collected and skipped.

pub mod bus_table;
pub mod diagnostics;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod graph;
pub mod id;
pub mod incremental;
pub mod resolver;
pub mod serializer;
pub mod table;
pub mod variant;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use endpoint::{Direction, Endpoint, PinSpec};
pub use engine::{EditCommand, EditOutcome, RoutingEngine};
pub use error::{RoutingError, RoutingResult};
pub use graph::{Bus, Graph, Node, NodeKind, Pad, Pin, Route, Tack};
pub use id::{BusId, NodeId, PadId, PinId, RouteId, TackId};
pub use incremental::TableMaintainer;
pub use resolver::{Emitter, ResolveContext, TopologyResolver};
pub use serializer::{BlockHeader, DirectiveBlock, DirectiveLine, DirectiveWriter, Directives};
pub use table::{
    BusTable, EntryKey, InboundEntry, NodeTables, OutboundEntry, Receiver, RoutingTables,
    TackEntry,
};
pub use variant::{expand_variants, get_match, is_multi, overlap, Variant};
