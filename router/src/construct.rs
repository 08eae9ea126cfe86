use crate::algo::{BfsRouter, Router, SearchPolicy};
use chiproute_common::chip::{Chip, NetId, RouteError};
use chiproute_common::util::config::ConstructionConfig;
use rand::prelude::*;

// Slack granted to the forced fallback pass once short circuits are
// allowed; effectively unbounded for any realistic grid.
const FORCED_SLACK: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Greedy,
    GreedyRandom,
    PseudoRandom,
    TrueRandom,
}

impl Strategy {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "greedy" => Some(Self::Greedy),
            "greedy_random" => Some(Self::GreedyRandom),
            "pseudo_random" => Some(Self::PseudoRandom),
            "true_random" => Some(Self::TrueRandom),
            _ => None,
        }
    }
}

/// Routes every net of the chip with the chosen strategy. Nets that are
/// already routed are skipped, so a partially routed chip is resumed
/// rather than redone. Fails with UnroutableNet naming the first net
/// left unrouted after all retries.
pub fn run(
    chip: &mut Chip,
    strategy: Strategy,
    cfg: &ConstructionConfig,
    rng: &mut StdRng,
) -> Result<(), RouteError> {
    match strategy {
        Strategy::Greedy => greedy(chip, cfg, false, rng),
        Strategy::GreedyRandom => greedy(chip, cfg, true, rng),
        Strategy::PseudoRandom => length_targeted(chip, cfg, SearchPolicy::tolerant(), rng),
        Strategy::TrueRandom => {
            let policy = SearchPolicy {
                allow_short_circuit: true,
                ignore_edges: true,
                max_length: None,
            };
            length_targeted(chip, cfg, policy, rng)
        }
    }
}

/// Offset-stepped BFS: every net first gets a chance at its Manhattan
/// distance, then the allowance grows by two edges per pass (odd
/// offsets cannot close a path on this grid). Randomized runs reshuffle
/// the net order each pass and expand frontiers in random order.
fn greedy(
    chip: &mut Chip,
    cfg: &ConstructionConfig,
    randomize: bool,
    rng: &mut StdRng,
) -> Result<(), RouteError> {
    let mut router = if randomize {
        BfsRouter::shuffled(StdRng::seed_from_u64(rng.r#gen()))
    } else {
        BfsRouter::ordered()
    };
    let mut order: Vec<NetId> = (0..chip.wires().len()).map(NetId::new).collect();

    for offset in (0..=cfg.max_offset).step_by(2) {
        if randomize {
            order.shuffle(rng);
        }
        for &net in &order {
            if chip.wire(net).is_routed() {
                continue;
            }
            let [a, b] = chip.net_endpoints(net);
            let policy = SearchPolicy::strict().with_max_length(a.manhattan(b) + offset);
            match router.find_path(chip, net, policy) {
                Ok(path) => {
                    log::debug!("routed {:?} at offset {}", net, offset);
                    chip.set_wire_path(net, path)?;
                }
                Err(RouteError::NoPathFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    if cfg.allow_short_circuit {
        for i in 0..chip.wires().len() {
            let net = NetId::new(i);
            if chip.wire(net).is_routed() {
                continue;
            }
            let [a, b] = chip.net_endpoints(net);
            let policy = SearchPolicy::tolerant().with_max_length(a.manhattan(b) + FORCED_SLACK);
            match router.find_path(chip, net, policy) {
                Ok(path) => {
                    log::debug!("forced {:?} with short circuits allowed", net);
                    chip.set_wire_path(net, path)?;
                }
                Err(RouteError::NoPathFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    first_unrouted(chip).map_or(Ok(()), |net| Err(RouteError::UnroutableNet { net }))
}

/// Draws shuffled target lengths between the Manhattan distance and
/// distance + max_offset and asks the exact-length BFS for each until
/// one fits. Under the unconstrained policy the search ignores edge
/// ownership, so registration may still refuse a candidate; that
/// refusal just moves on to the next length.
fn length_targeted(
    chip: &mut Chip,
    cfg: &ConstructionConfig,
    policy: SearchPolicy,
    rng: &mut StdRng,
) -> Result<(), RouteError> {
    let mut router = BfsRouter::shuffled(StdRng::seed_from_u64(rng.r#gen()));
    let mut order: Vec<NetId> = (0..chip.wires().len()).map(NetId::new).collect();
    order.shuffle(rng);

    for &net in &order {
        if chip.wire(net).is_routed() {
            continue;
        }
        let [a, b] = chip.net_endpoints(net);
        let dist = a.manhattan(b);

        let mut offsets: Vec<u32> = (0..=cfg.max_offset).step_by(2).collect();
        offsets.shuffle(rng);

        let mut routed = false;
        for &offset in &offsets {
            let path = match router.find_exact(chip, net, dist + offset, policy) {
                Ok(path) => path,
                Err(RouteError::NoPathFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            match chip.set_wire_path(net, path) {
                Ok(()) => {
                    routed = true;
                    break;
                }
                // Only reachable when the search ignored edges.
                Err(RouteError::Collision { .. }) if policy.ignore_edges => continue,
                Err(e) => return Err(e),
            }
        }
        if !routed {
            return Err(RouteError::UnroutableNet { net });
        }
    }
    Ok(())
}

fn first_unrouted(chip: &Chip) -> Option<NetId> {
    (0..chip.wires().len())
        .map(NetId::new)
        .find(|&net| !chip.wire(net).is_routed())
}
