//! Endpoint kinds and pin descriptors.
//!
//! A route terminates on one of three endpoint kinds. Which side of a route
//! emits and which absorbs is never stored: it is derived from the
//! endpoints' *shape* (see [`Graph::shape`](super::graph::Graph::shape)).

use crate::routing::id::{PadId, PinId, TackId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a pin is an input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// The opposite direction.
    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything a route can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A pin on a node. Pins on group nodes are proxies.
    Pin(PinId),
    /// The inner counterpart of a proxy pin.
    Pad(PadId),
    /// A contact point on a bus.
    Tack(TackId),
}

impl From<PinId> for Endpoint {
    fn from(id: PinId) -> Self {
        Endpoint::Pin(id)
    }
}

impl From<PadId> for Endpoint {
    fn from(id: PadId) -> Self {
        Endpoint::Pad(id)
    }
}

impl From<TackId> for Endpoint {
    fn from(id: TackId) -> Self {
        Endpoint::Tack(id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Pin(id) => write!(f, "{}", id),
            Endpoint::Pad(id) => write!(f, "{}", id),
            Endpoint::Tack(id) => write!(f, "{}", id),
        }
    }
}

/// Declaration of a pin, used when adding or swapping pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSpec {
    pub name: String,
    pub direction: Direction,
    /// Duplex pin: requests may be answered over the same connection.
    #[serde(default)]
    pub channel: bool,
}

impl PinSpec {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Input,
            channel: false,
        }
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Output,
            channel: false,
        }
    }

    /// Mark the pin as a duplex channel.
    pub fn channel(mut self) -> Self {
        self.channel = true;
        self
    }
}
