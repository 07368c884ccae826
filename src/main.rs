use std::path::PathBuf;
use std::thread;

use aptus::simulation::config::SimulationConfig;
use aptus::simulation::error::Result;
use aptus::simulation::history::HISTORY_EXTENSION;
use aptus::simulation::runner::{RunState, Simulation};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ticks between census log lines.
const CENSUS_EVERY: u64 = 500;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless artificial life simulation", long_about = None)]
struct Args {
    /// JSON configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks even if organisms are still alive
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Run without the per-tick frame delay
    #[arg(long)]
    fast_forward: bool,

    /// Where to write the extinction history
    #[arg(long)]
    history_out: Option<PathBuf>,

    /// Where to write a JSON snapshot of the final world
    #[arg(long)]
    snapshot_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut simulation = Simulation::new(config)?;
    simulation.start()?;
    if args.fast_forward {
        simulation.toggle_fast_forward()?;
    }

    let mut ran = 0;
    while ran < args.ticks && simulation.state().is_ticking() {
        simulation.tick()?;
        ran += 1;
        if ran % CENSUS_EVERY == 0 {
            let census = simulation.census();
            info!(
                tick = census.tick,
                organisms = census.organisms,
                food = census.food,
                largest = census.largest_organism,
                generation = census.highest_generation,
                "census"
            );
        }
        let delay = simulation.state().frame_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    info!(ticks = ran, state = %simulation.state(), "simulation finished");

    if let Some(path) = &args.snapshot_out {
        let snapshot = simulation.environment_mut().snapshot();
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        info!(path = %path.display(), "wrote snapshot");
    }

    if simulation.state() == RunState::Extinct {
        if let Some(history) = simulation.ancestry() {
            let path = args.history_out.clone().unwrap_or_else(|| {
                let stamp = Local::now().format("%Y%m%d-%H%M%S");
                PathBuf::from(format!("extinction-{stamp}.{HISTORY_EXTENSION}"))
            });
            history.write_to(&path)?;
            info!(path = %path.display(), ancestors = history.len(), "wrote extinction history");
        }
    }

    simulation.reset();
    Ok(())
}
