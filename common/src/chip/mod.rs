pub mod error;
pub mod occupancy;
pub mod wire;

pub use error::RouteError;
pub use occupancy::Occupancy;
pub use wire::Wire;

use crate::geom::coord::{Coord, Edge, GridBounds};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt;

/// Penalty added to the chip cost for every short-circuit incidence.
pub const SHORT_CIRCUIT_COST: u64 = 300;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateId(pub u32);

impl fmt::Debug for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GateId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub u32);

impl NetId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetId({})", self.0)
    }
}

/// One required connection between two gates. Entries are independent:
/// a duplicated pair in the netlist means two separate wires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Net {
    pub a: GateId,
    pub b: GateId,
}

/// The full routing state: fixed gates, the netlist, one wire per net,
/// and the occupancy that arbitrates the grid. Wires and occupancy are
/// mutated in place by the construction and optimization passes; each
/// `Chip` owns its occupancy outright, so independent chips never share
/// state.
#[derive(Clone, Debug)]
pub struct Chip {
    bounds: GridBounds,
    gates: HashMap<GateId, Coord>,
    netlist: Vec<Net>,
    wires: Vec<Wire>,
    occupancy: Occupancy,
}

impl Chip {
    pub fn new(bounds: GridBounds, gates: Vec<(GateId, Coord)>, netlist: Vec<Net>) -> Result<Self> {
        let mut gate_map = HashMap::with_capacity(gates.len());
        let mut occupancy = Occupancy::new();
        let mut seen = HashMap::new();

        for (id, coord) in gates {
            if !bounds.contains(coord) {
                bail!("gate {:?} at {:?} lies outside the grid", id, coord);
            }
            if let Some(other) = seen.insert(coord, id) {
                bail!("gates {:?} and {:?} share coordinate {:?}", id, other, coord);
            }
            gate_map.insert(id, coord);
            occupancy.place_gate(id, coord);
        }

        let mut wires = Vec::with_capacity(netlist.len());
        for net in &netlist {
            let (Some(&a), Some(&b)) = (gate_map.get(&net.a), gate_map.get(&net.b)) else {
                bail!("netlist references unknown gate in {:?}", net);
            };
            wires.push(Wire::new(a, b));
        }

        Ok(Self {
            bounds,
            gates: gate_map,
            netlist,
            wires,
            occupancy,
        })
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn netlist(&self) -> &[Net] {
        &self.netlist
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn wire(&self, net: NetId) -> &Wire {
        &self.wires[net.index()]
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn gate_coord(&self, gate: GateId) -> Option<Coord> {
        self.gates.get(&gate).copied()
    }

    /// The two gate coordinates a net must connect.
    pub fn net_endpoints(&self, net: NetId) -> [Coord; 2] {
        self.wires[net.index()].gates
    }

    /// Installs a routed path for `net`, replacing any previous one.
    /// The previous registration is retracted first, then every edge of
    /// the new path is claimed; on failure the partial claim is rolled
    /// back and the wire is left unrouted.
    pub fn set_wire_path(&mut self, net: NetId, path: Vec<Coord>) -> Result<(), RouteError> {
        debug_assert!(path.len() >= 2, "a routed path covers both gates");
        debug_assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));

        self.occupancy.remove_wire(net);
        self.wires[net.index()].clear();

        let own_gates = self.wires[net.index()].gates;
        for w in path.windows(2) {
            let edge = Edge::new(w[0], w[1]);
            if let Err(e) = self.occupancy.add_segment(net, edge, own_gates) {
                self.occupancy.remove_wire(net);
                return Err(e);
            }
        }
        self.wires[net.index()].path = path;
        Ok(())
    }

    pub fn clear_wire(&mut self, net: NetId) {
        self.occupancy.remove_wire(net);
        self.wires[net.index()].clear();
    }

    /// Back to the gates-only state. Gates and netlist are untouched.
    pub fn reset(&mut self) {
        self.occupancy.clear_wires();
        for wire in &mut self.wires {
            wire.clear();
        }
    }

    pub fn total_wire_length(&self) -> u64 {
        self.wires.iter().map(Wire::length).sum()
    }

    pub fn short_circuit_count(&self) -> u64 {
        self.occupancy.short_circuit_total()
    }

    pub fn short_circuit_nodes(&self) -> Vec<Coord> {
        self.occupancy.short_circuit_nodes()
    }

    /// Total wire length plus 300 per short-circuit incidence.
    /// Computable at any time; only meaningful once fully connected.
    pub fn cost(&self) -> u64 {
        self.total_wire_length() + SHORT_CIRCUIT_COST * self.short_circuit_count()
    }

    pub fn is_fully_connected(&self) -> bool {
        self.wires.iter().all(Wire::is_connected)
    }

    /// Lower bound on total wire length: the sum of Manhattan distances
    /// over all nets.
    pub fn manhattan_sum(&self) -> u64 {
        self.wires
            .iter()
            .map(|w| w.gates[0].manhattan(w.gates[1]) as u64)
            .sum()
    }

    pub fn snapshot(&self) -> Vec<Vec<Coord>> {
        self.wires.iter().map(|w| w.path.clone()).collect()
    }

    /// Reinstates a previously taken snapshot. Paths in a snapshot were
    /// valid when taken, so re-registration cannot collide unless the
    /// snapshot belongs to a different chip.
    pub fn restore(&mut self, paths: &[Vec<Coord>]) -> Result<(), RouteError> {
        self.reset();
        for (i, path) in paths.iter().enumerate() {
            if !path.is_empty() {
                self.set_wire_path(NetId::new(i), path.clone())?;
            }
        }
        Ok(())
    }
}
