use crate::chip::{Chip, NetId};
use crate::geom::coord::Edge;
use std::collections::HashMap;

/// Full verification of a routed chip: connectivity, bounds, and edge
/// exclusivity are recomputed from the wire paths alone, so a drifted
/// occupancy cannot mask a broken result. Short circuits are reported
/// but never fail the check, since the cost model already prices them.
pub fn run(chip: &Chip) -> Result<(), String> {
    log::info!("Starting chip verification...");

    let mut valid = true;
    let mut msgs = Vec::new();

    match check_connectivity(chip) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Open Net Detected");
            log::error!("{}", e);
            msgs.push(e);
            valid = false;
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: All nets are fully connected."),
    }

    match check_bounds(chip) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Wire Leaves the Grid");
            log::error!("{}", e);
            msgs.push(e);
            valid = false;
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: All wires stay inside the grid."),
    }

    match check_collisions(chip) {
        Err(e) => {
            log::error!("\x1b[31mFAIL\x1b[0m: Wire Collision Detected");
            log::error!("{}", e);
            msgs.push(e);
            valid = false;
        }
        Ok(_) => log::info!("\x1b[32mPASS\x1b[0m: No two wires share a grid edge."),
    }

    let shorts = chip.short_circuit_count();
    if shorts > 0 {
        log::warn!(
            "Chip carries {} short circuit(s) at {:?} (penalized, not fatal).",
            shorts,
            chip.short_circuit_nodes()
        );
    }

    if valid {
        log::info!(
            "\x1b[32mSUCCESS\x1b[0m: VALID CHIP (cost {}, length {}, shorts {})",
            chip.cost(),
            chip.total_wire_length(),
            shorts
        );
        Ok(())
    } else {
        log::error!("\x1b[31mFAILURE\x1b[0m: INVALID CHIP ({} Errors)", msgs.len());
        Err(msgs.join("; "))
    }
}

fn check_connectivity(chip: &Chip) -> Result<(), String> {
    for (i, wire) in chip.wires().iter().enumerate() {
        if !wire.is_routed() {
            return Err(format!("net {}: unrouted (no path)", i));
        }
        if !wire.is_connected() {
            return Err(format!(
                "net {}: path does not join its gates at {:?} and {:?}",
                i, wire.gates[0], wire.gates[1]
            ));
        }
    }
    Ok(())
}

fn check_bounds(chip: &Chip) -> Result<(), String> {
    let bounds = chip.bounds();
    for (i, wire) in chip.wires().iter().enumerate() {
        if let Some(&cell) = wire.path.iter().find(|&&c| !bounds.contains(c)) {
            return Err(format!("net {}: cell {:?} lies outside the grid", i, cell));
        }
    }
    Ok(())
}

fn check_collisions(chip: &Chip) -> Result<(), String> {
    let mut claimed: HashMap<Edge, NetId> = HashMap::new();
    for (i, wire) in chip.wires().iter().enumerate() {
        let net = NetId::new(i);
        for edge in wire.edges() {
            if let Some(other) = claimed.insert(edge, net) {
                if other != net {
                    return Err(format!(
                        "edge {:?} is used by both net {:?} and net {:?}",
                        edge, other, net
                    ));
                }
            }
            // The occupancy must agree with the paths it registered.
            if chip.occupancy().edge_owner(edge) != Some(net) {
                return Err(format!(
                    "occupancy drift: edge {:?} of net {:?} is not registered",
                    edge, net
                ));
            }
        }
    }
    Ok(())
}
