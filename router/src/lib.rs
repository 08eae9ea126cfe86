pub mod algo;
pub mod construct;
pub mod irra;
pub mod reoptimize;

use chiproute_common::chip::{Chip, RouteError};
use chiproute_common::util::config::Config;
use rand::prelude::*;

// Fresh randomized constructions to try before giving up on a netlist.
const CONSTRUCTION_ATTEMPTS: usize = 50;

/// Full pipeline: construct an initial wiring, drive its short
/// circuits down with iterative rerouting, then shrink total length
/// with the group reoptimizer.
pub fn route(chip: &mut Chip, config: &Config) -> Result<(), String> {
    let strategy = construct::Strategy::parse(&config.construction.strategy).ok_or_else(|| {
        format!(
            "unknown construction strategy '{}'",
            config.construction.strategy
        )
    })?;
    let mode = irra::IrraMode::parse(&config.irra.mode)
        .ok_or_else(|| format!("unknown rerouting mode '{}'", config.irra.mode))?;

    let mut rng = match config.construction.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Deterministic greedy repeats itself exactly, so a failed run is
    // final; only the randomized strategies earn retries.
    let attempts = if strategy == construct::Strategy::Greedy {
        1
    } else {
        CONSTRUCTION_ATTEMPTS
    };

    let mut attempt = 0;
    loop {
        match construct::run(chip, strategy, &config.construction, &mut rng) {
            Ok(()) => break,
            Err(RouteError::UnroutableNet { net }) if attempt + 1 < attempts => {
                attempt += 1;
                log::debug!(
                    "construction attempt {} left {:?} unrouted, retrying",
                    attempt,
                    net
                );
                chip.reset();
            }
            Err(e) => return Err(e.to_string()),
        }
    }
    log::info!(
        "Construction done: cost {}, shorts {}",
        chip.cost(),
        chip.short_circuit_count()
    );

    let report = irra::run(chip, mode, &config.irra, &mut rng).map_err(|e| e.to_string())?;
    log::info!(
        "Rerouting done after {} iterations: cost {}, residual shorts {}",
        report.iterations,
        report.best_cost,
        report.short_circuits
    );

    reoptimize::run(chip, &config.reoptimize, &mut rng).map_err(|e| e.to_string())?;
    log::info!("Reoptimization done: final cost {}", chip.cost());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chiproute_common::chip::{GateId, Net};
    use chiproute_common::geom::coord::{Coord, GridBounds};

    #[test]
    fn pipeline_routes_the_five_gate_scenario_cleanly() {
        let c = |x, y| Coord::new(x, y, 0);
        let gates = vec![
            (GateId(1), c(1, 5)),
            (GateId(2), c(5, 5)),
            (GateId(3), c(3, 5)),
            (GateId(4), c(5, 2)),
            (GateId(5), c(2, 1)),
        ];
        let netlist = vec![
            Net { a: GateId(1), b: GateId(2) },
            Net { a: GateId(1), b: GateId(3) },
            Net { a: GateId(3), b: GateId(5) },
            Net { a: GateId(4), b: GateId(2) },
            Net { a: GateId(4), b: GateId(5) },
        ];
        let mut chip = Chip::new(GridBounds::new(7, 7, 8), gates, netlist).unwrap();

        let mut config = Config::default();
        config.construction.seed = Some(17);

        route(&mut chip, &config).unwrap();
        assert!(chip.is_fully_connected());
        assert_eq!(chip.short_circuit_count(), 0);
        assert!(chip.total_wire_length() >= 18);
    }

    #[test]
    fn greedy_failure_is_final() {
        // Gate 1 is walled in by foreign gates, so no first step exists
        // and greedy has nothing a retry could change.
        let c = |x, y| Coord::new(x, y, 0);
        let gates = vec![
            (GateId(1), c(1, 1)),
            (GateId(2), c(0, 1)),
            (GateId(3), c(2, 1)),
            (GateId(4), c(1, 0)),
            (GateId(5), c(1, 2)),
            (GateId(6), c(0, 0)),
        ];
        let netlist = vec![Net { a: GateId(1), b: GateId(6) }];
        let mut chip = Chip::new(GridBounds::new(3, 3, 1), gates, netlist).unwrap();

        let mut config = Config::default();
        config.construction.strategy = "greedy".to_string();
        let err = route(&mut chip, &config).unwrap_err();
        assert!(err.contains("retry budget"));
    }

    #[test]
    fn unknown_names_are_rejected_up_front() {
        let c = |x, y| Coord::new(x, y, 0);
        let gates = vec![(GateId(1), c(0, 0)), (GateId(2), c(2, 0))];
        let netlist = vec![Net { a: GateId(1), b: GateId(2) }];
        let mut chip = Chip::new(GridBounds::new(4, 4, 2), gates, netlist).unwrap();

        let mut config = Config::default();
        config.construction.strategy = "simulated_evolution".to_string();
        assert!(route(&mut chip, &config).is_err());
    }
}
