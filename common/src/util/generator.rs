use anyhow::{bail, Result};
use rand::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;

/// Writes a random benchmark as a gates file plus a netlist file in
/// the standard CSV layout. Gates land on distinct cells of the base
/// layer; each net connects two distinct gates and no pair repeats.
pub fn generate_random_problem(
    gates_file: &str,
    netlist_file: &str,
    num_gates: usize,
    num_nets: usize,
    width: u32,
    height: u32,
    seed: Option<u64>,
) -> Result<()> {
    let cells = (width as usize) * (height as usize);
    if num_gates > cells {
        bail!(
            "cannot place {} gates on a {}x{} base layer ({} cells)",
            num_gates,
            width,
            height,
            cells
        );
    }
    let max_nets = num_gates * num_gates.saturating_sub(1) / 2;
    let num_nets = num_nets.min(max_nets);

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    log::info!(
        "Generating benchmark: {} gates, {} nets on a {}x{} base layer",
        num_gates,
        num_nets,
        width,
        height
    );

    let mut taken = HashSet::new();
    let mut gates = Vec::with_capacity(num_gates);
    while gates.len() < num_gates {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        if taken.insert((x, y)) {
            gates.push((x, y));
        }
    }

    let mut file = File::create(gates_file)?;
    writeln!(file, "chip,x,y")?;
    for (i, (x, y)) in gates.iter().enumerate() {
        writeln!(file, "{},{},{}", i + 1, x, y)?;
    }

    let mut pairs = HashSet::new();
    while pairs.len() < num_nets {
        let a = rng.gen_range(1..=num_gates);
        let b = rng.gen_range(1..=num_gates);
        if a == b {
            continue;
        }
        pairs.insert((a.min(b), a.max(b)));
    }

    let mut file = File::create(netlist_file)?;
    writeln!(file, "chip_a,chip_b")?;
    for (a, b) in pairs {
        writeln!(file, "{},{}", a, b)?;
    }

    Ok(())
}
