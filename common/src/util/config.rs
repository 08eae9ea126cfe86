use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub construction: ConstructionConfig,
    #[serde(default)]
    pub irra: IrraConfig,
    #[serde(default)]
    pub reoptimize: ReoptimizeConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            construction: ConstructionConfig::default(),
            irra: IrraConfig::default(),
            reoptimize: ReoptimizeConfig::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConstructionConfig {
    /// One of "greedy", "greedy_random", "pseudo_random", "true_random".
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_max_offset")]
    pub max_offset: u32,
    #[serde(default = "default_allow_short_circuit")]
    pub allow_short_circuit: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_offset: default_max_offset(),
            allow_short_circuit: default_allow_short_circuit(),
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IrraConfig {
    /// One of "bfs", "annealing", "astar".
    #[serde(default = "default_irra_mode")]
    pub mode: String,
    #[serde(default = "default_iteration_budget")]
    pub iteration_budget: usize,
    /// Stop early once the short-circuit count reaches this value.
    #[serde(default = "default_intersection_limit")]
    pub intersection_limit: u64,
    #[serde(default = "default_start_temperature")]
    pub start_temperature: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_patience")]
    pub patience: usize,
    /// Slack added to a net's Manhattan distance when rerouting it.
    #[serde(default = "default_reroute_offset")]
    pub reroute_offset: u32,
}

impl Default for IrraConfig {
    fn default() -> Self {
        Self {
            mode: default_irra_mode(),
            iteration_budget: default_iteration_budget(),
            intersection_limit: default_intersection_limit(),
            start_temperature: default_start_temperature(),
            alpha: default_alpha(),
            patience: default_patience(),
            reroute_offset: default_reroute_offset(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReoptimizeConfig {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    /// Enumerate orderings exhaustively only while group_size! stays
    /// at or below this.
    #[serde(default = "default_permutation_limit")]
    pub permutation_limit: u64,
    #[serde(default = "default_random_iteration_count")]
    pub random_iteration_count: usize,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default = "default_stale_rounds")]
    pub stale_rounds: usize,
}

impl Default for ReoptimizeConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            permutation_limit: default_permutation_limit(),
            random_iteration_count: default_random_iteration_count(),
            max_rounds: default_max_rounds(),
            stale_rounds: default_stale_rounds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_gates_file")]
    pub gates_file: String,
    #[serde(default = "default_netlist_file")]
    pub netlist_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    /// Empty border cells kept beyond the outermost gate.
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default = "default_layers")]
    pub layers: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            gates_file: default_gates_file(),
            netlist_file: default_netlist_file(),
            output_file: default_output_file(),
            padding: default_padding(),
            layers: default_layers(),
        }
    }
}

fn default_strategy() -> String {
    "pseudo_random".to_string()
}

fn default_max_offset() -> u32 {
    10
}

fn default_allow_short_circuit() -> bool {
    true
}

fn default_irra_mode() -> String {
    "astar".to_string()
}

fn default_iteration_budget() -> usize {
    2000
}

fn default_intersection_limit() -> u64 {
    0
}

fn default_start_temperature() -> f64 {
    500.0
}

fn default_alpha() -> f64 {
    0.9
}

fn default_patience() -> usize {
    150
}

fn default_reroute_offset() -> u32 {
    10
}

fn default_group_size() -> usize {
    3
}

fn default_permutation_limit() -> u64 {
    20_000
}

fn default_random_iteration_count() -> usize {
    500
}

fn default_max_rounds() -> usize {
    50
}

fn default_stale_rounds() -> usize {
    5
}

fn default_gates_file() -> String {
    "inputs/gates.csv".to_string()
}

fn default_netlist_file() -> String {
    "inputs/netlist.csv".to_string()
}

fn default_output_file() -> String {
    "output/wires.csv".to_string()
}

fn default_padding() -> u32 {
    1
}

fn default_layers() -> u8 {
    8
}
