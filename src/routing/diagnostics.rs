//! Non-fatal routing diagnostics.
//!
//! Nothing found while resolving or patching tables stops the engine. Each
//! anomaly skips the one receiver or entry concerned, is logged at warn
//! level and is kept here until the caller drains it. An anomaly that is
//! raised again while still held is neither logged nor stored twice.

use crate::routing::id::RouteId;
use serde::Serialize;
use std::fmt;

/// A recoverable anomaly found while resolving or maintaining tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An outbound or inbound entry expected to exist was not found.
    DanglingEntry { owner: String, entry: String },

    /// An output resolved to no receiver at all.
    ZeroReceivers { owner: String, entry: String },

    /// A wired route from a multi pin matched none of its variants.
    UnmatchedVariant { pin: String, candidate: String },

    /// The walk re-entered a route already on its path.
    CycleDetected { origin: String, route: RouteId },

    /// The walk exceeded the configured maximum path length.
    PathTooLong { origin: String, limit: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DanglingEntry { owner, entry } => {
                write!(f, "no table entry '{}' on {}", entry, owner)
            }
            Diagnostic::ZeroReceivers { owner, entry } => {
                write!(f, "output '{}' of {} reaches no receiver", entry, owner)
            }
            Diagnostic::UnmatchedVariant { pin, candidate } => {
                write!(f, "no variant of {} matches {}", pin, candidate)
            }
            Diagnostic::CycleDetected { origin, route } => {
                write!(f, "cyclic wiring from {} re-enters {:?}", origin, route)
            }
            Diagnostic::PathTooLong { origin, limit } => {
                write!(f, "walk from {} exceeds {} hops", origin, limit)
            }
        }
    }
}

/// Collected distinct diagnostics, in the order they were first raised.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it. Returns `false` if it was already held.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.contains(&diagnostic) {
            return false;
        }
        tracing::warn!("{}", diagnostic);
        self.items.push(diagnostic);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Remove and return everything collected so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }
}
