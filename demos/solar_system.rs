use nbody_sandbox::io::json::RunSummary;
use nbody_sandbox::physics::constants::{AU, YEAR};
use nbody_sandbox::{Camera, Preset, Result, SimulationState};

fn main() -> Result<()> {
    let mut sim = SimulationState::default();
    Preset::SolarSystem.scenario().load_into(&mut sim)?;
    sim.set_time_warp(10.0)?;

    let mut camera = Camera::default();
    camera.follow_cog();

    sim.enter_playback()?;
    while sim.elapsed_time() < YEAR {
        sim.advance_frame()?;
        camera.update(sim.bodies());
    }

    println!("Solar system after {}", sim.elapsed_display());
    println!("{:<10} {:>10} {:>12} {:>12}", "body", "r (AU)", "path (AU)", "max km/s");
    let summary = RunSummary::from_state(&sim);
    for b in &summary.bodies {
        let r = (b.position_m[0].powi(2) + b.position_m[1].powi(2)).sqrt();
        println!(
            "{:<10} {:>10.3} {:>12.3} {:>12.2}",
            b.name,
            r / AU,
            b.path_length_m / AU,
            b.max_speed_ms / 1000.0
        );
    }
    Ok(())
}
