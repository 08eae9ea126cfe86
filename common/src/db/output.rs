use crate::chip::Chip;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;

/// Writes the routed result as a `net,wires` CSV: one row per net with
/// its gate pair and the full cell sequence of its wire, then a footer
/// row naming the input and carrying the total cost. Cells are printed
/// without whitespace so the rows survive naive comma splitting.
pub fn save(chip: &Chip, filename: &str, label: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "net,wires")?;

    for (net, wire) in chip.netlist().iter().zip(chip.wires()) {
        let mut cells = String::from("[");
        for (i, c) in wire.path.iter().enumerate() {
            if i > 0 {
                cells.push(',');
            }
            let _ = write!(cells, "({},{},{})", c.x, c.y, c.z);
        }
        cells.push(']');
        writeln!(file, "\"({},{})\",\"{}\"", net.a.0, net.b.0, cells)?;
    }

    writeln!(file, "{},{}", label, chip.cost())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{GateId, Net, NetId};
    use crate::geom::coord::{Coord, GridBounds};

    #[test]
    fn output_has_one_row_per_net_plus_footer() {
        let c = |x, y| Coord::new(x, y, 0);
        let gates = vec![(GateId(1), c(0, 0)), (GateId(2), c(2, 0))];
        let netlist = vec![Net { a: GateId(1), b: GateId(2) }];
        let mut chip = Chip::new(GridBounds::new(3, 3, 1), gates, netlist).unwrap();
        chip.set_wire_path(NetId(0), vec![c(0, 0), c(1, 0), c(2, 0)]).unwrap();

        let path = std::env::temp_dir().join("chiproute_output_test.csv");
        save(&chip, path.to_str().unwrap(), "chip_0_net_1").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "net,wires");
        assert_eq!(lines[1], "\"(1,2)\",\"[(0,0,0),(1,0,0),(2,0,0)]\"");
        assert_eq!(lines[2], "chip_0_net_1,2");
    }
}
