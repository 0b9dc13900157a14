use std::time::Duration;

use tracing::{debug, info};

use crate::camera::Camera;
use crate::error::Result;
use crate::sim::state::{Mode, SimulationState};

// ---------------------------------------------------------------------------
// Frame pacing
// ---------------------------------------------------------------------------

/// Integrator steps per rendered frame: `clamp(round(base_rate * warp), 1, max)`.
///
/// Time warp changes how many steps run per frame, never the physical dt.
pub fn steps_per_frame(base_rate: u32, time_warp: f64, max_steps: u32) -> u32 {
    let max = max_steps.max(1);
    let raw = (f64::from(base_rate) * time_warp).round();
    // A huge finite warp can overflow to +inf; that still means "as many as allowed".
    if raw >= f64::from(max) {
        return max;
    }
    if raw.is_nan() || raw < 1.0 {
        return 1;
    }
    raw as u32
}

/// Wall-clock interval between frames of the driving loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCadence {
    pub running: Duration,
    pub idle: Duration,
}

impl Default for FrameCadence {
    fn default() -> Self {
        Self {
            running: Duration::from_millis(33), // ~30 fps
            idle: Duration::from_millis(100),
        }
    }
}

impl FrameCadence {
    pub fn interval(&self, running: bool) -> Duration {
        if running {
            self.running
        } else {
            self.idle
        }
    }
}

// ---------------------------------------------------------------------------
// Headless driving loop
// ---------------------------------------------------------------------------

/// Totals from a headless run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub frames: u32,
    pub steps: u64,
}

/// Run `frames` frames of playback, updating the camera after each one and
/// handing both to `on_frame`.
///
/// Enters playback first if the simulation is still authoring. Each frame
/// completes all of its steps before the camera reads body positions.
pub fn run_frames_with<F>(
    sim: &mut SimulationState,
    camera: &mut Camera,
    frames: u32,
    mut on_frame: F,
) -> Result<RunStats>
where
    F: FnMut(&SimulationState, &Camera),
{
    if sim.mode() == Mode::Authoring {
        sim.enter_playback()?;
    }
    if !sim.is_running() {
        sim.resume()?;
    }

    let mut stats = RunStats::default();
    for _ in 0..frames {
        let steps = sim.advance_frame()?;
        camera.update(sim.bodies());
        stats.frames += 1;
        stats.steps += u64::from(steps);
        on_frame(sim, camera);
    }

    debug!(frames = stats.frames, steps = stats.steps, "headless run finished");
    info!(elapsed = %sim.elapsed_display(), "simulated");
    Ok(stats)
}

/// `run_frames_with` without a per-frame callback.
pub fn run_frames(
    sim: &mut SimulationState,
    camera: &mut Camera,
    frames: u32,
) -> Result<RunStats> {
    run_frames_with(sim, camera, frames, |_, _| {})
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
