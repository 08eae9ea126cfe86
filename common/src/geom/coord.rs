use serde::{Deserialize, Serialize};

/// A single cell of the routing lattice. Layer 0 is the base plane
/// that holds the gates; 2D problems simply use a single layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl Coord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + (self.z.abs_diff(other.z)) as u32
    }

    /// Grid adjacency: exactly one axis differs by exactly one step.
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridBounds {
    pub width: u32,
    pub height: u32,
    pub layers: u8,
}

impl GridBounds {
    pub fn new(width: u32, height: u32, layers: u8) -> Self {
        Self {
            width,
            height,
            layers,
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height && c.z < self.layers
    }

    /// In-bounds neighbors of `c`, up to six of them.
    pub fn neighbors(&self, c: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(6);
        if c.x > 0 {
            out.push(Coord::new(c.x - 1, c.y, c.z));
        }
        if c.x + 1 < self.width {
            out.push(Coord::new(c.x + 1, c.y, c.z));
        }
        if c.y > 0 {
            out.push(Coord::new(c.x, c.y - 1, c.z));
        }
        if c.y + 1 < self.height {
            out.push(Coord::new(c.x, c.y + 1, c.z));
        }
        if c.z > 0 {
            out.push(Coord::new(c.x, c.y, c.z - 1));
        }
        if (c.z + 1) < self.layers {
            out.push(Coord::new(c.x, c.y, c.z + 1));
        }
        out
    }
}

/// An undirected grid edge between two adjacent cells. Endpoints are
/// stored in sorted order so that (a, b) and (b, a) hash identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    a: Coord,
    b: Coord,
}

impl Edge {
    pub fn new(u: Coord, v: Coord) -> Self {
        if u <= v { Self { a: u, b: v } } else { Self { a: v, b: u } }
    }

    pub fn endpoints(&self) -> (Coord, Coord) {
        (self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_over_layers() {
        let a = Coord::new(1, 5, 0);
        let b = Coord::new(5, 5, 2);
        assert_eq!(a.manhattan(b), 6);
        assert_eq!(b.manhattan(a), 6);
    }

    #[test]
    fn adjacency_is_single_axis_step() {
        let c = Coord::new(2, 2, 0);
        assert!(c.is_adjacent(Coord::new(3, 2, 0)));
        assert!(c.is_adjacent(Coord::new(2, 2, 1)));
        assert!(!c.is_adjacent(Coord::new(3, 3, 0)));
        assert!(!c.is_adjacent(c));
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        let bounds = GridBounds::new(4, 4, 2);
        let n = bounds.neighbors(Coord::new(0, 0, 0));
        assert_eq!(n.len(), 3);
        assert!(n.iter().all(|&c| bounds.contains(c)));
    }

    #[test]
    fn interior_cell_has_six_neighbors() {
        let bounds = GridBounds::new(4, 4, 3);
        assert_eq!(bounds.neighbors(Coord::new(1, 1, 1)).len(), 6);
    }

    #[test]
    fn edge_is_direction_free() {
        let u = Coord::new(1, 1, 0);
        let v = Coord::new(1, 2, 0);
        assert_eq!(Edge::new(u, v), Edge::new(v, u));
    }
}
