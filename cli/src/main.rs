use chiproute_common::db::{netlist, output};
use chiproute_common::util::config::Config;
use chiproute_common::util::{check, generator, logger};
use clap::{Parser, Subcommand};
use rand::prelude::*;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route the configured netlist and write the wire layout.
    Route,
    /// Run many independent construction trials and report the cost
    /// distribution. Trials are independent chips, so they run in
    /// parallel.
    Distribution {
        #[arg(long, default_value_t = 100)]
        trials: usize,
        #[arg(long, default_value = "output/costs.csv")]
        output: String,
    },
    /// Generate a random gates/netlist benchmark.
    Generate {
        #[arg(long, default_value_t = 25)]
        gates: usize,
        #[arg(long, default_value_t = 30)]
        nets: usize,
        #[arg(long, default_value_t = 18)]
        width: u32,
        #[arg(long, default_value_t = 13)]
        height: u32,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Route);

    match command {
        Commands::Route => {
            validate_input_paths(&config)?;
            prepare_output_dir(&config.input.output_file)?;
            if let Err(e) = run_routing(&config) {
                log::error!("Routing failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Distribution { trials, output } => {
            validate_input_paths(&config)?;
            prepare_output_dir(&output)?;
            run_distribution(&config, trials, &output)?;
        }
        Commands::Generate {
            gates,
            nets,
            width,
            height,
        } => {
            prepare_output_dir(&config.input.gates_file)?;
            prepare_output_dir(&config.input.netlist_file)?;
            generator::generate_random_problem(
                &config.input.gates_file,
                &config.input.netlist_file,
                gates,
                nets,
                width,
                height,
                config.construction.seed,
            )?;
            log::info!(
                "Generated: {} and {}",
                config.input.gates_file,
                config.input.netlist_file
            );
        }
    }

    Ok(())
}

fn validate_input_paths(config: &Config) -> anyhow::Result<()> {
    for file in [&config.input.gates_file, &config.input.netlist_file] {
        if !Path::new(file).exists() {
            return Err(anyhow::anyhow!("Input file missing: {}", file));
        }
    }
    Ok(())
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn run_routing(config: &Config) -> anyhow::Result<()> {
    let mut chip = netlist::load(
        &config.input.gates_file,
        &config.input.netlist_file,
        config.input.padding,
        config.input.layers,
    )?;

    log::info!(
        "Starting routing ({} / {})...",
        config.construction.strategy,
        config.irra.mode
    );
    chiproute_router::route(&mut chip, config).map_err(|e| anyhow::anyhow!(e))?;

    check::run(&chip).map_err(|e| anyhow::anyhow!("Verification failed: {}", e))?;

    let label = format!(
        "{}_{}",
        file_stem(&config.input.gates_file),
        file_stem(&config.input.netlist_file)
    );
    log::info!("Writing wire layout to {}", config.input.output_file);
    output::save(&chip, &config.input.output_file, &label)?;

    Ok(())
}

/// Each trial runs the construction stage alone on its own chip with
/// its own seed, giving the cost baseline the optimization stages are
/// judged against.
fn run_distribution(config: &Config, trials: usize, output_file: &str) -> anyhow::Result<()> {
    let base = netlist::load(
        &config.input.gates_file,
        &config.input.netlist_file,
        config.input.padding,
        config.input.layers,
    )?;
    let strategy = chiproute_router::construct::Strategy::parse(&config.construction.strategy)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "unknown construction strategy '{}'",
                config.construction.strategy
            )
        })?;

    log::info!(
        "Running {} construction trials ({})...",
        trials,
        config.construction.strategy
    );

    let costs: Vec<Option<u64>> = (0..trials as u64)
        .into_par_iter()
        .map(|seed| {
            let mut chip = base.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            chiproute_router::construct::run(&mut chip, strategy, &config.construction, &mut rng)
                .ok()
                .map(|_| chip.cost())
        })
        .collect();

    let successful: Vec<u64> = costs.iter().flatten().copied().collect();
    let failures = trials - successful.len();
    if successful.is_empty() {
        return Err(anyhow::anyhow!("all {} trials failed to route", trials));
    }

    let min = successful.iter().min().copied().unwrap_or(0);
    let max = successful.iter().max().copied().unwrap_or(0);
    let mean = successful.iter().sum::<u64>() as f64 / successful.len() as f64;
    log::info!(
        "Cost over {} successful trials ({} failed): min {}, mean {:.1}, max {}",
        successful.len(),
        failures,
        min,
        mean,
        max
    );

    let mut file = File::create(output_file)?;
    writeln!(file, "trial,cost")?;
    for (trial, cost) in costs.iter().enumerate() {
        match cost {
            Some(cost) => writeln!(file, "{},{}", trial, cost)?,
            None => writeln!(file, "{},", trial)?,
        }
    }
    log::info!("Wrote cost distribution to {}", output_file);

    Ok(())
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string()
}
