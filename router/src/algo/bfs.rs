use crate::algo::{step_allowed, Router, SearchPolicy};
use chiproute_common::chip::{Chip, NetId, RouteError};
use chiproute_common::geom::coord::Coord;
use rand::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

/// Breadth-first router. With `shuffle` off the expansion order is
/// fixed and the first path found is the lexically-first shortest one;
/// with `shuffle` on neighbors are visited in random order, so equal
/// length paths are sampled uniformly enough to diversify construction.
pub struct BfsRouter {
    shuffle: bool,
    rng: StdRng,
}

impl BfsRouter {
    pub fn ordered() -> Self {
        Self {
            shuffle: false,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn shuffled(rng: StdRng) -> Self {
        Self { shuffle: true, rng }
    }

    /// Length-targeted variant: finds a path of exactly `exact_length`
    /// edges. The queue carries whole paths because a cell may need to
    /// be reached at several different depths; visited states are
    /// keyed by (cell, depth) and a path never revisits its own cells.
    pub fn find_exact(
        &mut self,
        chip: &Chip,
        net: NetId,
        exact_length: u32,
        policy: SearchPolicy,
    ) -> Result<Vec<Coord>, RouteError> {
        let [start, target] = chip.net_endpoints(net);
        let bounds = chip.bounds();

        let mut queue: VecDeque<Vec<Coord>> = VecDeque::new();
        queue.push_back(vec![start]);
        let mut visited: HashSet<(Coord, u32)> = HashSet::new();

        while let Some(path) = queue.pop_front() {
            let current = path[path.len() - 1];
            let len = (path.len() - 1) as u32;

            if current == target && len == exact_length {
                return Ok(path);
            }
            if len >= exact_length {
                continue;
            }

            let mut neighbors = bounds.neighbors(current);
            if self.shuffle {
                neighbors.shuffle(&mut self.rng);
            }
            for to in neighbors {
                if path.contains(&to) {
                    continue;
                }
                // The target only counts when we arrive at exactly the
                // requested length.
                if to == target && len + 1 != exact_length {
                    continue;
                }
                if !step_allowed(chip, net, current, to, target, policy) {
                    continue;
                }
                if visited.insert((to, len + 1)) {
                    let mut next = path.clone();
                    next.push(to);
                    queue.push_back(next);
                }
            }
        }

        Err(RouteError::NoPathFound {
            start,
            end: target,
        })
    }
}

impl Router for BfsRouter {
    fn find_path(
        &mut self,
        chip: &Chip,
        net: NetId,
        policy: SearchPolicy,
    ) -> Result<Vec<Coord>, RouteError> {
        let [start, target] = chip.net_endpoints(net);
        let bounds = chip.bounds();

        let mut parents: HashMap<Coord, Coord> = HashMap::new();
        let mut depth: HashMap<Coord, u32> = HashMap::new();
        let mut queue: VecDeque<Coord> = VecDeque::new();
        depth.insert(start, 0);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return Ok(reconstruct(&parents, start, target));
            }

            let d = depth[&current];
            if let Some(limit) = policy.max_length {
                if d >= limit {
                    continue;
                }
            }

            let mut neighbors = bounds.neighbors(current);
            if self.shuffle {
                neighbors.shuffle(&mut self.rng);
            }
            for to in neighbors {
                if depth.contains_key(&to) {
                    continue;
                }
                if !step_allowed(chip, net, current, to, target, policy) {
                    continue;
                }
                depth.insert(to, d + 1);
                parents.insert(to, current);
                queue.push_back(to);
            }
        }

        Err(RouteError::NoPathFound {
            start,
            end: target,
        })
    }
}

fn reconstruct(parents: &HashMap<Coord, Coord>, start: Coord, target: Coord) -> Vec<Coord> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        current = parents[&current];
        path.push(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use chiproute_common::chip::{GateId, Net};
    use chiproute_common::geom::coord::GridBounds;

    fn c(x: u32, y: u32) -> Coord {
        Coord::new(x, y, 0)
    }

    fn chip_with(gates: Vec<(GateId, Coord)>, netlist: Vec<Net>) -> Chip {
        Chip::new(GridBounds::new(6, 6, 2), gates, netlist).unwrap()
    }

    #[test]
    fn finds_shortest_path_on_empty_grid() {
        let chip = chip_with(
            vec![(GateId(1), c(0, 0)), (GateId(2), c(3, 2))],
            vec![Net { a: GateId(1), b: GateId(2) }],
        );
        let path = BfsRouter::ordered()
            .find_path(&chip, NetId(0), SearchPolicy::strict())
            .unwrap();
        assert_eq!(path.len() as u32 - 1, c(0, 0).manhattan(c(3, 2)));
        assert_eq!(path[0], c(0, 0));
        assert_eq!(path[path.len() - 1], c(3, 2));
        assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));
    }

    #[test]
    fn detours_around_a_gate_on_the_straight_path() {
        let chip = chip_with(
            vec![
                (GateId(1), c(0, 0)),
                (GateId(2), c(4, 0)),
                (GateId(3), c(2, 0)),
            ],
            vec![Net { a: GateId(1), b: GateId(2) }],
        );
        let path = BfsRouter::ordered()
            .find_path(&chip, NetId(0), SearchPolicy::strict())
            .unwrap();
        // Straight distance is 4; the blocking gate forces 6.
        assert_eq!(path.len(), 7);
        assert!(!path.contains(&c(2, 0)));
        assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));
    }

    #[test]
    fn strict_policy_avoids_foreign_wire_nodes() {
        let mut chip = chip_with(
            vec![
                (GateId(1), c(0, 1)),
                (GateId(2), c(4, 1)),
                (GateId(3), c(2, 0)),
                (GateId(4), c(2, 3)),
            ],
            vec![
                Net { a: GateId(3), b: GateId(4) },
                Net { a: GateId(1), b: GateId(2) },
            ],
        );
        chip.set_wire_path(NetId(0), vec![c(2, 0), c(2, 1), c(2, 2), c(2, 3)])
            .unwrap();

        let strict = BfsRouter::ordered()
            .find_path(&chip, NetId(1), SearchPolicy::strict())
            .unwrap();
        assert!(strict.iter().all(|&p| !(p.x == 2 && p.z == 0 && p.y <= 3)));

        // Tolerated crossing goes straight through.
        let tolerant = BfsRouter::ordered()
            .find_path(&chip, NetId(1), SearchPolicy::tolerant())
            .unwrap();
        assert_eq!(tolerant.len(), 5);
    }

    #[test]
    fn max_length_prunes_long_detours() {
        let chip = chip_with(
            vec![
                (GateId(1), c(0, 0)),
                (GateId(2), c(4, 0)),
                (GateId(3), c(2, 0)),
            ],
            vec![Net { a: GateId(1), b: GateId(2) }],
        );
        // The detour needs 6 edges; a limit of 4 must fail.
        let err = BfsRouter::ordered()
            .find_path(&chip, NetId(0), SearchPolicy::strict().with_max_length(4))
            .unwrap_err();
        assert!(matches!(err, RouteError::NoPathFound { .. }));

        assert!(
            BfsRouter::ordered()
                .find_path(&chip, NetId(0), SearchPolicy::strict().with_max_length(6))
                .is_ok()
        );
    }

    #[test]
    fn exact_length_paths_have_exactly_that_length() {
        let chip = chip_with(
            vec![(GateId(1), c(0, 0)), (GateId(2), c(2, 0))],
            vec![Net { a: GateId(1), b: GateId(2) }],
        );
        let mut router = BfsRouter::shuffled(StdRng::seed_from_u64(7));
        for target_len in [2u32, 4, 6] {
            let path = router
                .find_exact(&chip, NetId(0), target_len, SearchPolicy::tolerant())
                .unwrap();
            assert_eq!(path.len() as u32 - 1, target_len);
            assert_eq!(path[0], c(0, 0));
            assert_eq!(path[path.len() - 1], c(2, 0));
        }
    }

    #[test]
    fn exact_length_with_wrong_parity_fails() {
        let chip = chip_with(
            vec![(GateId(1), c(0, 0)), (GateId(2), c(2, 0))],
            vec![Net { a: GateId(1), b: GateId(2) }],
        );
        // Manhattan distance 2: odd lengths are unreachable.
        let err = BfsRouter::ordered()
            .find_exact(&chip, NetId(0), 3, SearchPolicy::tolerant())
            .unwrap_err();
        assert!(matches!(err, RouteError::NoPathFound { .. }));
    }
}
