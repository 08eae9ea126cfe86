use crate::chip::{Chip, GateId, Net};
use crate::geom::coord::{Coord, GridBounds};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Loads a routing problem from a gates CSV (`chip,x,y` rows) and a
/// netlist CSV (`chip_a,chip_b` rows). All gates sit on layer 0. The
/// grid is sized from the outermost gate plus `padding` empty border
/// cells on each axis, with `layers` layers stacked above the base.
///
/// The netlist is sorted by ascending Manhattan distance before the
/// chip is built, so short nets route first.
pub fn load(
    gates_file: &str,
    netlist_file: &str,
    padding: u32,
    layers: u8,
) -> Result<Chip> {
    let gates = parse_gates(gates_file)
        .with_context(|| format!("failed to load gates from '{}'", gates_file))?;
    if gates.is_empty() {
        bail!("gates file '{}' defines no gates", gates_file);
    }

    let mut netlist = parse_netlist(netlist_file)
        .with_context(|| format!("failed to load netlist from '{}'", netlist_file))?;

    let max_x = gates.iter().map(|&(_, c)| c.x).max().unwrap_or(0);
    let max_y = gates.iter().map(|&(_, c)| c.y).max().unwrap_or(0);
    let bounds = GridBounds::new(max_x + padding + 1, max_y + padding + 1, layers);

    let coord_of = |id: GateId| gates.iter().find(|&&(g, _)| g == id).map(|&(_, c)| c);
    netlist.sort_by_key(|net| match (coord_of(net.a), coord_of(net.b)) {
        (Some(a), Some(b)) => a.manhattan(b),
        // Unknown ids sort last; Chip::new rejects them with a real error.
        _ => u32::MAX,
    });

    log::info!(
        "Loaded {} gates, {} nets on a {}x{}x{} grid",
        gates.len(),
        netlist.len(),
        bounds.width,
        bounds.height,
        bounds.layers
    );

    Chip::new(bounds, gates, netlist)
}

fn parse_gates(filename: &str) -> Result<Vec<(GateId, Coord)>> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut gates = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 3 {
            bail!("line {}: expected 'chip,x,y', got '{}'", lineno + 1, line);
        }
        let id: u32 = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad gate id '{}'", lineno + 1, fields[0]))?;
        let x: u32 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad x '{}'", lineno + 1, fields[1]))?;
        let y: u32 = fields[2]
            .parse()
            .with_context(|| format!("line {}: bad y '{}'", lineno + 1, fields[2]))?;
        gates.push((GateId(id), Coord::new(x, y, 0)));
    }
    Ok(gates)
}

fn parse_netlist(filename: &str) -> Result<Vec<Net>> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut netlist = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 2 {
            bail!("line {}: expected 'chip_a,chip_b', got '{}'", lineno + 1, line);
        }
        let a: u32 = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad gate id '{}'", lineno + 1, fields[0]))?;
        let b: u32 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad gate id '{}'", lineno + 1, fields[1]))?;
        netlist.push(Net {
            a: GateId(a),
            b: GateId(b),
        });
    }
    Ok(netlist)
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .is_some_and(|f| f.trim().parse::<u32>().is_err())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_sorts_by_manhattan_distance() {
        let gates = write_temp(
            "chiproute_gates_sort.csv",
            "chip,x,y\n1,1,5\n2,5,5\n3,3,5\n4,5,2\n5,2,1\n",
        );
        let nets = write_temp(
            "chiproute_netlist_sort.csv",
            "chip_a,chip_b\n1,2\n1,3\n3,5\n4,2\n4,5\n",
        );

        let chip = load(gates.to_str().unwrap(), nets.to_str().unwrap(), 1, 8).unwrap();
        assert_eq!(chip.wires().len(), 5);
        assert_eq!(chip.bounds().width, 7);
        assert_eq!(chip.bounds().height, 7);
        assert_eq!(chip.manhattan_sum(), 18);

        // Distances 4,2,5,3,4 sorted ascending: 2,3,4,4,5.
        let dists: Vec<u32> = chip
            .wires()
            .iter()
            .map(|w| w.gates[0].manhattan(w.gates[1]))
            .collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(dists[0], 2);
        assert_eq!(dists[4], 5);
    }

    #[test]
    fn missing_header_is_tolerated() {
        let gates = write_temp("chiproute_gates_nohdr.csv", "1,0,0\n2,2,0\n");
        let nets = write_temp("chiproute_netlist_nohdr.csv", "1,2\n");
        let chip = load(gates.to_str().unwrap(), nets.to_str().unwrap(), 1, 8).unwrap();
        assert_eq!(chip.wires().len(), 1);
    }

    #[test]
    fn unknown_gate_in_netlist_is_an_error() {
        let gates = write_temp("chiproute_gates_unknown.csv", "chip,x,y\n1,0,0\n");
        let nets = write_temp("chiproute_netlist_unknown.csv", "chip_a,chip_b\n1,9\n");
        assert!(load(gates.to_str().unwrap(), nets.to_str().unwrap(), 1, 8).is_err());
    }
}
