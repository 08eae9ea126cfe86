pub mod astar;
pub mod bfs;

pub use astar::AStarRouter;
pub use bfs::BfsRouter;

use chiproute_common::chip::{Chip, NetId, RouteError};
use chiproute_common::geom::coord::{Coord, Edge};

/// Constraints a single path search runs under.
#[derive(Clone, Copy, Debug)]
pub struct SearchPolicy {
    /// Permit stepping onto nodes already carrying foreign wires. The
    /// cost model prices each such node as a short circuit.
    pub allow_short_circuit: bool,
    /// Skip edge-ownership checks during the search (exploration only;
    /// registration still rejects claimed edges).
    pub ignore_edges: bool,
    /// Upper bound on path length in edges.
    pub max_length: Option<u32>,
}

impl SearchPolicy {
    /// No short circuits, no claimed edges.
    pub fn strict() -> Self {
        Self {
            allow_short_circuit: false,
            ignore_edges: false,
            max_length: None,
        }
    }

    /// Short circuits permitted, claimed edges still avoided.
    pub fn tolerant() -> Self {
        Self {
            allow_short_circuit: true,
            ignore_edges: false,
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, limit: u32) -> Self {
        self.max_length = Some(limit);
        self
    }
}

/// One path search against the current occupancy. Both implementations
/// return the full cell sequence, gates included, or NoPathFound when
/// the frontier empties under the policy's constraints.
pub trait Router {
    fn find_path(
        &mut self,
        chip: &Chip,
        net: NetId,
        policy: SearchPolicy,
    ) -> Result<Vec<Coord>, RouteError>;
}

/// Whether a search routing `net` may step from `from` onto `to`.
/// Foreign gates always block unless they are the search target.
pub(crate) fn step_allowed(
    chip: &Chip,
    net: NetId,
    from: Coord,
    to: Coord,
    target: Coord,
    policy: SearchPolicy,
) -> bool {
    let occ = chip.occupancy();

    if !policy.ignore_edges {
        if let Some(owner) = occ.edge_owner(Edge::new(from, to)) {
            if owner != net {
                return false;
            }
        }
    }

    if occ.gate_at(to).is_some() {
        return to == target;
    }

    if !policy.allow_short_circuit && occ.has_foreign_wire(to, net) {
        return false;
    }

    true
}
