//! Bounce Sim entry point
//!
//! Headless driver: builds a simulation from a preset or a JSON config,
//! runs it against the logging renderer and prints a summary.
//!
//! ```text
//! bounce-sim [PRESET | CONFIG.json] [--events N] [--until T] [--seed S] [--trace OUT.json]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bounce_sim::render::LogRenderer;
use bounce_sim::settings::Preset;
use bounce_sim::{CollisionSystem, Result, RunLimits, SimConfig};

/// Events processed when no limit is given
const DEFAULT_EVENT_BUDGET: u64 = 10_000;

#[derive(Parser, Debug)]
#[command(about = "Event-driven 2D rigid body collision simulator")]
struct Args {
    /// Preset name (balls, mixed, obstacles) or path to a JSON config
    source: Option<String>,

    /// Stop after this many processed events
    #[arg(long)]
    events: Option<u64>,

    /// Stop at this simulation time
    #[arg(long)]
    until: Option<f64>,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the processed event trace as JSON
    #[arg(long)]
    trace: Option<PathBuf>,
}

impl Args {
    /// Run limits, falling back to a fixed event budget
    fn limits(&self) -> RunLimits {
        let mut limits = RunLimits {
            max_events: self.events,
            until: self.until,
        };
        if limits.max_events.is_none() && limits.until.is_none() {
            limits.max_events = Some(DEFAULT_EVENT_BUDGET);
        }
        limits
    }
}

fn load_config(source: Option<&str>) -> Result<SimConfig> {
    match source {
        None => Ok(Preset::default().config()),
        Some(name) => match Preset::from_str(name) {
            Some(preset) => {
                log::info!("Using preset {}", preset.as_str());
                Ok(preset.config())
            }
            None => SimConfig::load(name),
        },
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.source.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.trace.is_some() {
        config.record_trace = true;
    }

    let mut system = CollisionSystem::from_config(&config)?;
    let energy_before = system.kinetic_energy();
    let mut renderer = LogRenderer::default();
    let summary = system.run(&mut renderer, args.limits())?;

    println!("stopped:     {:?}", summary.reason);
    println!("time:        {:.6}", summary.time);
    println!("events:      {}", summary.events);
    println!("discarded:   {}", summary.discarded);
    println!(
        "energy:      {:.6} -> {:.6}",
        energy_before,
        system.kinetic_energy()
    );

    if let Some(path) = args.trace {
        let trace = system.take_trace();
        std::fs::write(&path, serde_json::to_string_pretty(&trace)?)?;
        log::info!("Wrote {} trace records to {}", trace.len(), path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Bounce Sim starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
