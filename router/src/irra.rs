use crate::algo::{AStarRouter, BfsRouter, Router, SearchPolicy};
use chiproute_common::chip::{Chip, NetId, RouteError};
use chiproute_common::util::config::IrraConfig;
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrraMode {
    Bfs,
    Annealing,
    Astar,
}

impl IrraMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bfs" => Some(Self::Bfs),
            "annealing" => Some(Self::Annealing),
            "astar" => Some(Self::Astar),
            _ => None,
        }
    }
}

/// What a rerouting run achieved. Residual short circuits are a
/// reported outcome, not an error.
#[derive(Clone, Copy, Debug)]
pub struct IrraReport {
    pub best_cost: u64,
    pub short_circuits: u64,
    pub iterations: usize,
}

/// Iterative random rerouting: while short circuits remain, pick a
/// random offending node, retract one of the wires crossing there and
/// reroute it under the configured mode. The best layout seen is kept
/// aside and reinstated at the end, so a run can only match or improve
/// its input.
///
/// Annealing accepts a cost-increasing reroute with probability
/// 2^((old - new) / T) at temperature T = T0 * alpha^i; the exponent
/// base follows the calibrated acceptance curve, not the Boltzmann
/// form.
pub fn run(
    chip: &mut Chip,
    mode: IrraMode,
    cfg: &IrraConfig,
    rng: &mut StdRng,
) -> Result<IrraReport, RouteError> {
    let mut bfs = BfsRouter::shuffled(StdRng::seed_from_u64(rng.r#gen()));
    let mut astar = AStarRouter::new();

    let mut best = chip.snapshot();
    let mut best_cost = chip.cost();
    let mut stale = 0usize;
    let mut iterations = 0usize;

    for i in 0..cfg.iteration_budget {
        let nodes = chip.short_circuit_nodes();
        if nodes.is_empty() {
            break;
        }
        iterations = i + 1;

        let node = nodes[rng.gen_range(0..nodes.len())];
        let offenders = chip.occupancy().wires_at(node).to_vec();
        let net = offenders[rng.gen_range(0..offenders.len())];

        match mode {
            IrraMode::Bfs => reroute_bfs(chip, net, cfg, &mut bfs)?,
            IrraMode::Annealing => {
                let temperature = cfg.start_temperature * cfg.alpha.powi(i as i32);
                reroute_annealing(chip, net, cfg, temperature, &mut bfs, rng)?
            }
            IrraMode::Astar => reroute_astar(chip, net, &mut astar)?,
        }

        let cost = chip.cost();
        if cost < best_cost {
            best_cost = cost;
            best = chip.snapshot();
            stale = 0;
        } else {
            stale += 1;
        }

        if stale > cfg.patience && chip.short_circuit_count() <= cfg.intersection_limit {
            log::debug!("no progress for {} iterations, stopping", stale);
            break;
        }
    }

    if chip.cost() > best_cost {
        chip.restore(&best)?;
    }
    let report = IrraReport {
        best_cost: chip.cost(),
        short_circuits: chip.short_circuit_count(),
        iterations,
    };
    log::debug!(
        "rerouting finished after {} iterations: cost {}, shorts {}",
        report.iterations,
        report.best_cost,
        report.short_circuits
    );
    Ok(report)
}

fn reroute_slack(chip: &Chip, net: NetId, cfg: &IrraConfig) -> u32 {
    let [a, b] = chip.net_endpoints(net);
    a.manhattan(b) + cfg.reroute_offset
}

/// Hill climbing: a clean path is taken unconditionally; when none
/// exists a short-circuiting one is tolerated; when even that fails
/// the old path goes back.
fn reroute_bfs(
    chip: &mut Chip,
    net: NetId,
    cfg: &IrraConfig,
    bfs: &mut BfsRouter,
) -> Result<(), RouteError> {
    let limit = reroute_slack(chip, net, cfg);
    let old_path = chip.wire(net).path.clone();
    chip.clear_wire(net);

    for policy in [
        SearchPolicy::strict().with_max_length(limit),
        SearchPolicy::tolerant().with_max_length(limit),
    ] {
        match bfs.find_path(chip, net, policy) {
            Ok(path) => return chip.set_wire_path(net, path),
            Err(RouteError::NoPathFound { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    chip.set_wire_path(net, old_path)
}

fn reroute_annealing(
    chip: &mut Chip,
    net: NetId,
    cfg: &IrraConfig,
    temperature: f64,
    bfs: &mut BfsRouter,
    rng: &mut StdRng,
) -> Result<(), RouteError> {
    let limit = reroute_slack(chip, net, cfg);
    let old_cost = chip.cost();
    let old_path = chip.wire(net).path.clone();
    chip.clear_wire(net);

    // First offer: any tolerant path, judged by the acceptance rule.
    if temperature > 0.0 {
        if let Ok(path) = bfs.find_path(chip, net, SearchPolicy::tolerant().with_max_length(limit))
        {
            chip.set_wire_path(net, path)?;
            let new_cost = chip.cost();
            if rng.r#gen::<f64>() < acceptance_probability(new_cost, old_cost, temperature) {
                return Ok(());
            }
            chip.clear_wire(net);
        }
    }

    // Refused or unavailable: fall back to a clean path, else restore.
    match bfs.find_path(chip, net, SearchPolicy::strict().with_max_length(limit)) {
        Ok(path) => chip.set_wire_path(net, path),
        Err(RouteError::NoPathFound { .. }) => chip.set_wire_path(net, old_path),
        Err(e) => Err(e),
    }
}

/// A* reroute keeps the new path only if it strictly reduces the short
/// circuit count, or holds it while reducing cost.
fn reroute_astar(chip: &mut Chip, net: NetId, astar: &mut AStarRouter) -> Result<(), RouteError> {
    let old_shorts = chip.short_circuit_count();
    let old_cost = chip.cost();
    let old_path = chip.wire(net).path.clone();
    chip.clear_wire(net);

    if let Ok(path) = astar.find_path(chip, net, SearchPolicy::tolerant()) {
        chip.set_wire_path(net, path)?;
        let new_shorts = chip.short_circuit_count();
        if new_shorts < old_shorts || (new_shorts == old_shorts && chip.cost() < old_cost) {
            return Ok(());
        }
        chip.clear_wire(net);
    }
    chip.set_wire_path(net, old_path)
}

fn acceptance_probability(new_cost: u64, old_cost: u64, temperature: f64) -> f64 {
    if new_cost < old_cost {
        return 1.0;
    }
    if temperature <= 0.0 {
        return 0.0;
    }
    2f64.powf((old_cost as f64 - new_cost as f64) / temperature)
}
