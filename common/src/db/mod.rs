pub mod netlist;
pub mod output;
