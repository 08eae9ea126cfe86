use crate::chip::error::RouteError;
use crate::chip::{GateId, NetId};
use crate::geom::coord::{Coord, Edge};
use std::collections::HashMap;

/// Authoritative record of what sits where on the grid.
///
/// Two invariants are deliberately kept apart:
/// - an *edge* may be claimed by at most one net, ever (a duplicate
///   claim is a collision and is rejected);
/// - a *node* may carry several nets' segments. That is a short
///   circuit: legal, but penalized by the cost model. Nodes hosting a
///   gate are exempt, since nets sharing a gate must meet there.
///
/// Every mutation takes effect immediately; searches running against
/// the same occupancy observe it on their next probe.
#[derive(Clone, Debug, Default)]
pub struct Occupancy {
    gates: HashMap<Coord, GateId>,
    nodes: HashMap<Coord, Vec<NetId>>,
    edges: HashMap<Edge, NetId>,
    // Per-net ledger of claimed edges, so retraction is exact.
    registered: HashMap<NetId, Vec<Edge>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_gate(&mut self, gate: GateId, coord: Coord) {
        self.gates.insert(coord, gate);
    }

    pub fn gate_at(&self, coord: Coord) -> Option<GateId> {
        self.gates.get(&coord).copied()
    }

    pub fn edge_owner(&self, edge: Edge) -> Option<NetId> {
        self.edges.get(&edge).copied()
    }

    pub fn wires_at(&self, coord: Coord) -> &[NetId] {
        self.nodes.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_foreign_wire(&self, coord: Coord, net: NetId) -> bool {
        self.wires_at(coord).iter().any(|&n| n != net)
    }

    /// True if `coord` hosts no gate, or only a gate belonging to the
    /// owning wire.
    pub fn is_free_for_wire(&self, coord: Coord, own_gates: [Coord; 2]) -> bool {
        match self.gates.get(&coord) {
            None => true,
            Some(_) => own_gates.contains(&coord),
        }
    }

    /// Claims one edge for `net`. Fails if the edge already belongs to
    /// a different net, or if either endpoint hosts a gate that is not
    /// one of the wire's own.
    pub fn add_segment(
        &mut self,
        net: NetId,
        edge: Edge,
        own_gates: [Coord; 2],
    ) -> Result<(), RouteError> {
        if let Some(owner) = self.edge_owner(edge) {
            if owner != net {
                return Err(RouteError::Collision { edge, owner });
            }
            return Ok(());
        }

        let (u, v) = edge.endpoints();
        for coord in [u, v] {
            if let Some(gate) = self.gates.get(&coord) {
                if !own_gates.contains(&coord) {
                    return Err(RouteError::BlockedByGate { coord, gate: *gate });
                }
            }
        }

        self.edges.insert(edge, net);
        for coord in [u, v] {
            let occupants = self.nodes.entry(coord).or_default();
            if !occupants.contains(&net) {
                occupants.push(net);
            }
        }
        self.registered.entry(net).or_default().push(edge);
        Ok(())
    }

    /// Retracts everything `net` ever claimed. Idempotent: a second
    /// call (or a call for an unregistered net) is a no-op.
    pub fn remove_wire(&mut self, net: NetId) {
        let Some(claimed) = self.registered.remove(&net) else {
            return;
        };
        for edge in claimed {
            self.edges.remove(&edge);
            let (u, v) = edge.endpoints();
            for coord in [u, v] {
                if let Some(occupants) = self.nodes.get_mut(&coord) {
                    occupants.retain(|&n| n != net);
                    if occupants.is_empty() {
                        self.nodes.remove(&coord);
                    }
                }
            }
        }
    }

    /// Number of extra nets sharing this node beyond the first. Gate
    /// nodes never count.
    pub fn short_circuit_count_at(&self, coord: Coord) -> u64 {
        if self.gates.contains_key(&coord) {
            return 0;
        }
        (self.wires_at(coord).len().saturating_sub(1)) as u64
    }

    pub fn short_circuit_total(&self) -> u64 {
        self.nodes
            .keys()
            .map(|&c| self.short_circuit_count_at(c))
            .sum()
    }

    pub fn short_circuit_nodes(&self) -> Vec<Coord> {
        let mut out: Vec<Coord> = self
            .nodes
            .keys()
            .copied()
            .filter(|&c| self.short_circuit_count_at(c) > 0)
            .collect();
        out.sort_unstable();
        out
    }

    /// Drops all wire registrations, keeping the gates in place.
    pub fn clear_wires(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.registered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u32, y: u32) -> Coord {
        Coord::new(x, y, 0)
    }

    fn edge(a: Coord, b: Coord) -> Edge {
        Edge::new(a, b)
    }

    #[test]
    fn duplicate_edge_claim_is_a_collision() {
        let mut occ = Occupancy::new();
        let gates = [c(0, 0), c(5, 0)];
        let e = edge(c(1, 0), c(2, 0));
        occ.add_segment(NetId(0), e, gates).unwrap();
        let err = occ.add_segment(NetId(1), e, gates).unwrap_err();
        assert!(matches!(err, RouteError::Collision { .. }));
    }

    #[test]
    fn same_net_may_reclaim_its_own_edge() {
        let mut occ = Occupancy::new();
        let e = edge(c(1, 0), c(2, 0));
        occ.add_segment(NetId(0), e, [c(0, 0), c(5, 0)]).unwrap();
        assert!(occ.add_segment(NetId(0), e, [c(0, 0), c(5, 0)]).is_ok());
    }

    #[test]
    fn foreign_gate_blocks_segment() {
        let mut occ = Occupancy::new();
        occ.place_gate(GateId(7), c(2, 0));
        let err = occ
            .add_segment(NetId(0), edge(c(1, 0), c(2, 0)), [c(0, 0), c(5, 0)])
            .unwrap_err();
        assert!(matches!(err, RouteError::BlockedByGate { .. }));
    }

    #[test]
    fn own_gate_does_not_block() {
        let mut occ = Occupancy::new();
        occ.place_gate(GateId(1), c(0, 0));
        assert!(
            occ.add_segment(NetId(0), edge(c(0, 0), c(1, 0)), [c(0, 0), c(5, 0)])
                .is_ok()
        );
        assert!(occ.is_free_for_wire(c(0, 0), [c(0, 0), c(5, 0)]));
        assert!(!occ.is_free_for_wire(c(0, 0), [c(3, 0), c(5, 0)]));
    }

    #[test]
    fn node_sharing_is_counted_not_rejected() {
        let mut occ = Occupancy::new();
        let gates = [c(0, 0), c(9, 9)];
        // Two nets crossing at (1,1) through different edges.
        occ.add_segment(NetId(0), edge(c(0, 1), c(1, 1)), gates).unwrap();
        occ.add_segment(NetId(1), edge(c(1, 0), c(1, 1)), gates).unwrap();
        assert_eq!(occ.short_circuit_count_at(c(1, 1)), 1);
        assert_eq!(occ.short_circuit_total(), 1);
        assert_eq!(occ.short_circuit_nodes(), vec![c(1, 1)]);
    }

    #[test]
    fn gate_nodes_are_exempt_from_short_circuits() {
        let mut occ = Occupancy::new();
        occ.place_gate(GateId(1), c(1, 1));
        occ.add_segment(NetId(0), edge(c(0, 1), c(1, 1)), [c(1, 1), c(5, 5)])
            .unwrap();
        occ.add_segment(NetId(1), edge(c(1, 0), c(1, 1)), [c(1, 1), c(7, 7)])
            .unwrap();
        assert_eq!(occ.short_circuit_total(), 0);
    }

    #[test]
    fn retract_then_readd_restores_state() {
        let mut occ = Occupancy::new();
        let gates = [c(0, 0), c(2, 0)];
        let e1 = edge(c(0, 0), c(1, 0));
        let e2 = edge(c(1, 0), c(2, 0));
        occ.add_segment(NetId(0), e1, gates).unwrap();
        occ.add_segment(NetId(0), e2, gates).unwrap();

        occ.remove_wire(NetId(0));
        assert_eq!(occ.edge_owner(e1), None);
        assert!(occ.wires_at(c(1, 0)).is_empty());
        // A second retraction is a no-op.
        occ.remove_wire(NetId(0));

        occ.add_segment(NetId(0), e1, gates).unwrap();
        occ.add_segment(NetId(0), e2, gates).unwrap();
        assert_eq!(occ.edge_owner(e1), Some(NetId(0)));
        assert_eq!(occ.edge_owner(e2), Some(NetId(0)));
        assert_eq!(occ.wires_at(c(1, 0)), &[NetId(0)]);
    }
}
