use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::sim::state::{Mode, SimulationState};

/// Per-body statistics over the recorded trail.
#[derive(Debug, Clone, Serialize)]
pub struct BodySummary {
    pub name: String,
    pub color: String,
    pub mass_kg: f64,
    pub position_m: [f64; 2],
    pub velocity_ms: [f64; 2],
    pub speed_ms: f64,
    pub path_length_m: f64,
    /// Largest speed between consecutive trail points (finite differences).
    pub max_speed_ms: f64,
}

/// Summary of a playback run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub elapsed_s: f64,
    pub elapsed: String,
    pub steps: u64,
    pub time_step_s: f64,
    pub time_warp: f64,
    pub integrator: Option<String>,
    pub center_of_mass_m: Option<[f64; 2]>,
    pub bodies: Vec<BodySummary>,
}

impl RunSummary {
    pub fn from_state(sim: &SimulationState) -> Self {
        let dt = sim.time_step();
        let bodies = sim
            .bodies()
            .iter()
            .zip(sim.trajectories())
            .map(|(b, trail)| {
                let (path_length, max_step) = trail
                    .windows(2)
                    .map(|w| (w[1] - w[0]).norm())
                    .fold((0.0, 0.0_f64), |(sum, max), d| (sum + d, max.max(d)));
                BodySummary {
                    name: b.name.clone(),
                    color: b.color.as_str().to_string(),
                    mass_kg: b.mass(),
                    position_m: [b.position().x, b.position().y],
                    velocity_ms: [b.velocity().x, b.velocity().y],
                    speed_ms: b.speed(),
                    path_length_m: path_length,
                    max_speed_ms: max_step / dt,
                }
            })
            .collect();

        RunSummary {
            mode: sim.mode(),
            elapsed_s: sim.elapsed_time(),
            elapsed: sim.elapsed_display(),
            steps: sim.steps_taken(),
            time_step_s: dt,
            time_warp: sim.time_warp(),
            integrator: sim.integrator_name().map(str::to_string),
            center_of_mass_m: sim.center_of_mass().map(|c| [c.x, c.y]),
            bodies,
        }
    }
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &RunSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the run summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &RunSummary) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)?;
    info!(path = %path.display(), "wrote run summary");
    Ok(())
}
