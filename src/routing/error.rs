//! Routing-specific error types.
//!
//! These are raised for edit requests that are rejected before the graph or
//! the tables are touched. Anomalies found while resolving are not errors;
//! they are reported as [`Diagnostic`](super::diagnostics::Diagnostic)s.

use crate::routing::id::{BusId, NodeId, PadId, PinId, RouteId, TackId};
use thiserror::Error;

/// Errors that can occur when editing the routing graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Unknown pin: {0:?}")]
    UnknownPin(PinId),

    #[error("Unknown pad: {0:?}")]
    UnknownPad(PadId),

    #[error("Unknown bus: {0:?}")]
    UnknownBus(BusId),

    #[error("Unknown tack: {0:?}")]
    UnknownTack(TackId),

    #[error("Unknown route: {0:?}")]
    UnknownRoute(RouteId),

    #[error("No node or bus with uid '{0}'")]
    UnknownUid(String),

    #[error("Node {0:?} is not a group")]
    NotAGroup(NodeId),

    #[error("Node {0:?} is not a source node")]
    NotASource(NodeId),

    #[error("The root group has no outside and cannot carry pins")]
    PinOnRoot,

    #[error("The root group cannot be removed")]
    RootRemoval,

    #[error("Duplicate uid '{0}'")]
    DuplicateUid(String),

    #[error("Node {node:?} already has an {direction} pin named '{name}'")]
    DuplicatePin {
        node: NodeId,
        name: String,
        direction: &'static str,
    },

    #[error("Endpoints live in different scopes: {0}")]
    ScopeMismatch(String),

    #[error("Incompatible endpoints: {0}")]
    IncompatibleEndpoints(String),

    #[error("Tack {0:?} is already bound to a route")]
    TackAlreadyBound(TackId),

    #[error("Endpoints are already connected by {0:?}")]
    DuplicateRoute(RouteId),
}

pub type RoutingResult<T> = std::result::Result<T, RoutingError>;
