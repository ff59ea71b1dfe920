use vortsim::{ScenarioConfig, Scenario};
use vortsim::{bench_velocity, bench_update_curve};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "vortex_ring.yaml")]
    file_name: String,

    /// Override the number of steps from the scenario
    #[arg(long)]
    steps: Option<usize>,

    /// Run the tree vs direct benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_velocity();
        bench_update_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    if let Some(threads) = scenario_cfg.engine.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to size the rayon thread pool")?;
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    let steps = args.steps.unwrap_or(scenario.parameters.num_steps);
    info!("running {} for {} steps", args.file_name, steps);

    scenario.run(steps);

    let com = scenario.sim.tracer_center_of_mass();
    info!("tracer center of mass: [{:.6}, {:.6}, {:.6}]", com.x, com.y, com.z);

    Ok(())
}
