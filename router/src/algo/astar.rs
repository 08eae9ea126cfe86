use crate::algo::{step_allowed, Router, SearchPolicy};
use chiproute_common::chip::{Chip, NetId, RouteError, SHORT_CIRCUIT_COST};
use chiproute_common::geom::coord::Coord;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

// Expansion cap, after which the search gives up rather than flood the
// whole grid on a hopeless target.
const MAX_EXPANSIONS: usize = 100_000;

/// A* router over the routing lattice. The cost-to-come counts one per
/// edge plus the short-circuit penalty for every foreign-wire node the
/// path enters, so under a tolerant policy the search weighs a long
/// clean detour against a short crossing exactly like the chip cost
/// model does. The Manhattan heuristic never overestimates, keeping
/// the result optimal under that cost.
pub struct AStarRouter;

impl AStarRouter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AStarRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for AStarRouter {
    fn find_path(
        &mut self,
        chip: &Chip,
        net: NetId,
        policy: SearchPolicy,
    ) -> Result<Vec<Coord>, RouteError> {
        let [start, target] = chip.net_endpoints(net);
        let bounds = chip.bounds();

        // Priority is Reverse((f, g)): lowest f first, then lowest g.
        let mut open: PriorityQueue<Coord, Reverse<(u64, u64)>> = PriorityQueue::new();
        let mut g_score: HashMap<Coord, u64> = HashMap::new();
        let mut parents: HashMap<Coord, Coord> = HashMap::new();
        let mut closed: HashSet<Coord> = HashSet::new();

        g_score.insert(start, 0);
        open.push(start, Reverse((start.manhattan(target) as u64, 0)));

        let mut expansions = 0;
        while let Some((current, _)) = open.pop() {
            if current == target {
                return Ok(reconstruct(&parents, start, target));
            }
            if !closed.insert(current) {
                continue;
            }
            expansions += 1;
            if expansions > MAX_EXPANSIONS {
                break;
            }

            let current_g = g_score[&current];
            if let Some(limit) = policy.max_length {
                // g_score includes penalties, so bound by real depth.
                if depth(&parents, current, start) >= limit {
                    continue;
                }
            }

            for to in bounds.neighbors(current) {
                if closed.contains(&to) {
                    continue;
                }
                if !step_allowed(chip, net, current, to, target, policy) {
                    continue;
                }

                let tentative = current_g + 1 + node_penalty(chip, net, to);
                if g_score.get(&to).is_none_or(|&old| tentative < old) {
                    g_score.insert(to, tentative);
                    parents.insert(to, current);
                    let f = tentative + to.manhattan(target) as u64;
                    open.push_increase(to, Reverse((f, tentative)));
                }
            }
        }

        Err(RouteError::NoPathFound {
            start,
            end: target,
        })
    }
}

fn node_penalty(chip: &Chip, net: NetId, to: Coord) -> u64 {
    let occ = chip.occupancy();
    if occ.gate_at(to).is_some() {
        return 0;
    }
    if occ.has_foreign_wire(to, net) {
        SHORT_CIRCUIT_COST
    } else {
        0
    }
}

fn depth(parents: &HashMap<Coord, Coord>, mut current: Coord, start: Coord) -> u32 {
    let mut d = 0;
    while current != start {
        current = parents[&current];
        d += 1;
    }
    d
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
