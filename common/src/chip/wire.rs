use crate::geom::coord::{Coord, Edge};

/// The realized path of one net: an ordered run of grid cells whose
/// first and last entries are the net's two gate positions. Empty
/// until a construction strategy routes it.
#[derive(Clone, Debug)]
pub struct Wire {
    pub gates: [Coord; 2],
    pub path: Vec<Coord>,
}

impl Wire {
    pub fn new(gate1: Coord, gate2: Coord) -> Self {
        Self {
            gates: [gate1, gate2],
            path: Vec::new(),
        }
    }

    pub fn is_routed(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of edges, i.e. one less than the number of cells.
    pub fn length(&self) -> u64 {
        self.path.len().saturating_sub(1) as u64
    }

    /// True iff the endpoints are exactly the wire's gates (in either
    /// orientation) and every consecutive pair of cells is grid-adjacent.
    pub fn is_connected(&self) -> bool {
        let (Some(&first), Some(&last)) = (self.path.first(), self.path.last()) else {
            return false;
        };
        let endpoints_match = (first == self.gates[0] && last == self.gates[1])
            || (first == self.gates[1] && last == self.gates[0]);
        endpoints_match && self.path.windows(2).all(|w| w[0].is_adjacent(w[1]))
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.path.windows(2).map(|w| Edge::new(w[0], w[1]))
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }
}
