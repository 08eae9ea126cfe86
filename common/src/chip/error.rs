use crate::chip::{GateId, NetId};
use crate::geom::coord::{Coord, Edge};
use thiserror::Error;

/// Routing failures, from recoverable search misses to internal
/// consistency faults.
///
/// `NoPathFound` and `UnroutableNet` are ordinary outcomes a caller is
/// expected to handle (retry with a different length, order, or
/// tolerance). `Collision` and `BlockedByGate` escaping a constrained
/// search mean the occupancy and the wires have drifted apart and the
/// run cannot be trusted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("edge {edge:?} is already claimed by net {owner:?}")]
    Collision { edge: Edge, owner: NetId },

    #[error("{coord:?} is blocked by foreign gate {gate:?}")]
    BlockedByGate { coord: Coord, gate: GateId },

    #[error("no path from {start:?} to {end:?} under the current constraints")]
    NoPathFound { start: Coord, end: Coord },

    #[error("net {net:?} exhausted its retry budget")]
    UnroutableNet { net: NetId },
}
