use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nbody_sandbox::io::{csv, json};
use nbody_sandbox::physics::constants::AU;
use nbody_sandbox::scenario::{load_scenario_file, Preset};
use nbody_sandbox::sim::{run_frames, Scheme};
use nbody_sandbox::{Camera, CameraConfig, CameraPolicy, SimConfig, SimulationState};

#[derive(Parser, Debug)]
#[command(name = "nbody-sandbox", version, about = "Headless N-body gravity sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in preset scenarios
    Presets,
    /// Load a scenario, play it back headlessly and report the result
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Built-in preset id (see `presets`)
    #[arg(long, conflicts_with = "scenario")]
    preset: Option<Preset>,

    /// YAML scenario file
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Rendered frames to simulate
    #[arg(long, default_value_t = 100)]
    frames: u32,

    /// Time warp (steps per frame multiplier)
    #[arg(long)]
    warp: Option<f64>,

    /// Physical time step in seconds
    #[arg(long)]
    time_step: Option<f64>,

    /// Integration scheme: rk4 or verlet
    #[arg(long)]
    scheme: Option<Scheme>,

    /// Camera policy: manual, cog, fit or focus:<index>
    #[arg(long, default_value = "manual")]
    camera: CameraArg,

    /// Write all trajectories as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum CameraArg {
    Manual,
    Cog,
    Fit,
    Focus(usize),
}

impl std::str::FromStr for CameraArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(CameraArg::Manual),
            "cog" => Ok(CameraArg::Cog),
            "fit" => Ok(CameraArg::Fit),
            _ => match s.strip_prefix("focus:") {
                Some(i) => i
                    .parse()
                    .map(CameraArg::Focus)
                    .map_err(|_| format!("bad body index in '{s}'")),
                None => Err(format!("unknown camera policy '{s}'")),
            },
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Presets => {
            for p in Preset::ALL {
                println!("  {:<20} {}", p.id(), p.description());
            }
            Ok(())
        }
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    // -----------------------------------------------------------------------
    // Scenario and settings
    // -----------------------------------------------------------------------
    let (scenario, mut config, camera_config) = match (&args.preset, &args.scenario) {
        (_, Some(path)) => {
            let file = load_scenario_file(path)
                .with_context(|| format!("loading scenario {}", path.display()))?;
            (file.scenario(), file.simulation, file.camera)
        }
        (Some(preset), None) => (preset.scenario(), SimConfig::default(), CameraConfig::default()),
        (None, None) => bail!("either --preset or --scenario is required"),
    };

    if let Some(warp) = args.warp {
        config.time_warp = warp;
    }
    if let Some(dt) = args.time_step {
        config.time_step = dt;
    }
    if let Some(scheme) = args.scheme {
        config.scheme = scheme;
    }

    let mut sim = SimulationState::new(config).context("invalid simulation settings")?;
    let ids = scenario.load_into(&mut sim)?;
    let mut camera = Camera::new(camera_config).context("invalid camera settings")?;

    match args.camera {
        CameraArg::Manual => {}
        CameraArg::Cog => camera.follow_cog(),
        CameraArg::Fit => camera.fit_all(),
        CameraArg::Focus(i) => match ids.get(i) {
            Some(id) => camera.focus(*id),
            None => bail!("focus index {i} out of range ({} bodies)", ids.len()),
        },
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------
    let stats = run_frames(&mut sim, &mut camera, args.frames)?;

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  N-BODY SANDBOX — {}", scenario.name);
    println!("====================================================================");
    println!();
    println!(
        "  Integrator: {}   dt: {:.0} s   warp: {}x",
        sim.integrator_name().unwrap_or("-"),
        sim.time_step(),
        sim.time_warp()
    );
    println!(
        "  Frames: {}   Steps: {}   Elapsed: {}",
        stats.frames,
        stats.steps,
        sim.elapsed_display()
    );
    println!();
    println!(
        "  {:<14} {:>12} {:>12} {:>12} {:>12}",
        "body", "x (AU)", "y (AU)", "speed (km/s)", "mass (kg)"
    );
    println!("  {}", "─".repeat(66));
    for b in sim.bodies() {
        println!(
            "  {:<14} {:>12.4} {:>12.4} {:>12.3} {:>12.3e}",
            b.name,
            b.position().x / AU,
            b.position().y / AU,
            b.speed() / 1000.0,
            b.mass()
        );
    }
    println!();

    let policy = match camera.policy() {
        CameraPolicy::Manual => "manual".to_string(),
        CameraPolicy::FollowCog => "center of gravity".to_string(),
        CameraPolicy::FitAll => "fit all".to_string(),
        CameraPolicy::FocusBody(id) => match sim.body(id) {
            Some(b) => format!("focus {}", b.name),
            None => format!("focus {id}"),
        },
    };
    println!(
        "  Camera: {}   center: ({:.3}, {:.3}) AU   half-width: {:.3} AU",
        policy,
        camera.center().x / AU,
        camera.center().y / AU,
        camera.zoom() / AU
    );
    println!("====================================================================");
    println!();

    if let Some(path) = &args.csv {
        csv::write_trajectories_file(path, &sim)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.summary {
        json::write_summary_file(path, &json::RunSummary::from_state(&sim))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
