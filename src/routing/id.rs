//! Identity types for the routing graph.
//!
//! All IDs are newtypes over `u32` that serve as direct array indices
//! into their respective arena vectors in [`Graph`](super::graph::Graph),
//! providing O(1) lookup. Removed entities leave an empty slot behind, so an
//! ID is never reused within one graph.

use serde::Serialize;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

arena_id!(
    /// Index into `Graph::nodes`.
    NodeId
);

arena_id!(
    /// Index into `Graph::pins`.
    PinId
);

arena_id!(
    /// Index into `Graph::pads`. Every pad is paired with exactly one proxy pin.
    PadId
);

arena_id!(
    /// Index into `Graph::buses`.
    BusId
);

arena_id!(
    /// Index into `Graph::tacks`.
    TackId
);

arena_id!(
    /// Index into `Graph::routes`.
    RouteId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from_index(42), id);
    }

    #[test]
    fn test_debug_names_the_kind() {
        assert_eq!(format!("{:?}", PinId(3)), "PinId(3)");
        assert_eq!(format!("{}", RouteId(7)), "RouteId(7)");
        assert_eq!(format!("{:?}", TackId(0)), "TackId(0)");
    }

    #[test]
    fn test_ids_order_by_index() {
        let mut ids = vec![RouteId(5), RouteId(1), RouteId(3)];
        ids.sort();
        assert_eq!(ids, vec![RouteId(1), RouteId(3), RouteId(5)]);
    }
}
