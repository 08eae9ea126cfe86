use crate::algo::{AStarRouter, Router, SearchPolicy};
use chiproute_common::chip::{Chip, NetId, RouteError};
use chiproute_common::geom::coord::Coord;
use chiproute_common::util::config::ReoptimizeConfig;
use itertools::Itertools;
use rand::prelude::*;

/// Joint rerouting of small wire groups. Each round retracts a random
/// group and replays it in candidate insertion orders, each order
/// evaluated from the same clean baseline; an order is committed only
/// if it beats the incumbent cost without raising the short circuit
/// count. Orders are enumerated exhaustively while group_size! stays
/// within permutation_limit, otherwise sampled.
pub fn run(
    chip: &mut Chip,
    cfg: &ReoptimizeConfig,
    rng: &mut StdRng,
) -> Result<(), RouteError> {
    let net_count = chip.wires().len();
    if net_count == 0 || cfg.group_size == 0 {
        return Ok(());
    }
    let group_size = cfg.group_size.min(net_count);
    let mut astar = AStarRouter::new();
    let mut stale = 0usize;

    for round in 0..cfg.max_rounds {
        if stale >= cfg.stale_rounds {
            break;
        }

        let mut nets: Vec<NetId> = (0..net_count).map(NetId::new).collect();
        nets.shuffle(rng);
        let group: Vec<NetId> = nets[..group_size].to_vec();

        let baseline = chip.snapshot();
        let baseline_cost = chip.cost();
        let baseline_shorts = chip.short_circuit_count();

        let orderings = candidate_orderings(&group, cfg, rng);

        let mut best: Option<(u64, Vec<Vec<Coord>>)> = None;
        for order in orderings {
            if let Some(cost) = try_ordering(chip, &order, baseline_shorts, &mut astar)? {
                let incumbent = best.as_ref().map_or(baseline_cost, |&(c, _)| c);
                // Ties keep the incumbent.
                if cost < incumbent {
                    best = Some((cost, chip.snapshot()));
                }
            }
            chip.restore(&baseline)?;
        }

        match best {
            Some((cost, layout)) => {
                chip.restore(&layout)?;
                stale = 0;
                log::debug!(
                    "round {}: group of {} improved cost {} -> {}",
                    round,
                    group_size,
                    baseline_cost,
                    cost
                );
            }
            None => stale += 1,
        }
    }
    Ok(())
}

/// Every permutation of the group when that is affordable, otherwise
/// `random_iteration_count` shuffles.
fn candidate_orderings(
    group: &[NetId],
    cfg: &ReoptimizeConfig,
    rng: &mut StdRng,
) -> Vec<Vec<NetId>> {
    if factorial(group.len()) <= cfg.permutation_limit {
        group
            .iter()
            .copied()
            .permutations(group.len())
            .collect()
    } else {
        (0..cfg.random_iteration_count)
            .map(|_| {
                let mut order = group.to_vec();
                order.shuffle(rng);
                order
            })
            .collect()
    }
}

/// Retracts the whole group, then reroutes each wire in `order` via
/// tolerant A*. Returns the resulting cost, or None when the ordering
/// is not viable (a wire found no path, or shorts went up). The caller
/// restores the baseline either way.
fn try_ordering(
    chip: &mut Chip,
    order: &[NetId],
    baseline_shorts: u64,
    astar: &mut AStarRouter,
) -> Result<Option<u64>, RouteError> {
    for &net in order {
        chip.clear_wire(net);
    }
    for &net in order {
        match astar.find_path(chip, net, SearchPolicy::tolerant()) {
            Ok(path) => chip.set_wire_path(net, path)?,
            Err(RouteError::NoPathFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        }
    }
    if chip.short_circuit_count() > baseline_shorts {
        return Ok(None);
    }
    Ok(Some(chip.cost()))
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).fold(1u64, |acc, k| acc.saturating_mul(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::BfsRouter;
    use chiproute_common::chip::{GateId, Net};
    use chiproute_common::geom::coord::{Coord, GridBounds};

    fn c(x: u32, y: u32) -> Coord {
        Coord::new(x, y, 0)
    }

    fn routed_pair() -> Chip {
        let gates = vec![
            (GateId(1), c(0, 0)),
            (GateId(2), c(3, 0)),
            (GateId(3), c(0, 2)),
            (GateId(4), c(3, 2)),
        ];
        let netlist = vec![
            Net { a: GateId(1), b: GateId(2) },
            Net { a: GateId(3), b: GateId(4) },
        ];
        let mut chip = Chip::new(GridBounds::new(5, 5, 2), gates, netlist).unwrap();
        // Deliberately wasteful routes.
        chip.set_wire_path(
            NetId(0),
            vec![c(0, 0), c(0, 1), c(1, 1), c(2, 1), c(3, 1), c(3, 0)],
        )
        .unwrap();
        chip.set_wire_path(
            NetId(1),
            vec![c(0, 2), c(0, 3), c(1, 3), c(2, 3), c(3, 3), c(3, 2)],
        )
        .unwrap();
        chip
    }

    #[test]
    fn reoptimizer_shrinks_wasteful_routes() {
        let mut chip = routed_pair();
        let start_cost = chip.cost();
        let cfg = ReoptimizeConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        run(&mut chip, &cfg, &mut rng).unwrap();
        assert!(chip.cost() < start_cost);
        assert!(chip.is_fully_connected());
        assert_eq!(chip.short_circuit_count(), 0);
    }

    #[test]
    fn reoptimizer_never_raises_short_circuits() {
        let mut chip = routed_pair();
        let cfg = ReoptimizeConfig::default();
        let mut rng = StdRng::seed_from_u64(8);
        run(&mut chip, &cfg, &mut rng).unwrap();
        assert_eq!(chip.short_circuit_count(), 0);
    }

    #[test]
    fn already_optimal_layout_is_left_alone() {
        let gates = vec![(GateId(1), c(0, 0)), (GateId(2), c(2, 0))];
        let netlist = vec![Net { a: GateId(1), b: GateId(2) }];
        let mut chip = Chip::new(GridBounds::new(4, 4, 2), gates, netlist).unwrap();
        let path = BfsRouter::ordered()
            .find_path(&chip, NetId(0), SearchPolicy::strict())
            .unwrap();
        chip.set_wire_path(NetId(0), path).unwrap();
        let before = chip.snapshot();

        let cfg = ReoptimizeConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        run(&mut chip, &cfg, &mut rng).unwrap();
        assert_eq!(chip.cost(), 2);
        assert_eq!(chip.snapshot(), before);
    }

    #[test]
    fn factorial_saturates_instead_of_overflowing() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(3), 6);
        assert_eq!(factorial(25), u64::MAX);
    }
}
