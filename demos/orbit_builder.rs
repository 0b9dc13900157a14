use nalgebra::Vector2;

use nbody_sandbox::physics::constants::{AU, JUPITER_MASS, SOLAR_MASS};
use nbody_sandbox::sim::PressOutcome;
use nbody_sandbox::{Camera, Editor, Result, SimulationState};

/// Build a scene the way the viewer does: click to place bodies, pick an
/// orbit target, then play it back with the camera fitted to everything.
fn main() -> Result<()> {
    let mut sim = SimulationState::default();
    let mut editor = Editor::new();

    // Clicking empty space adds an Earth-mass body and selects it
    let star = editor.add_body_at(&mut sim, Vector2::zeros())?;
    sim.rename_body(star, "Star")?;
    sim.set_body_mass(star, SOLAR_MASS)?;

    let giant = editor.add_body_at(&mut sim, Vector2::new(2.0 * AU, 0.0))?;
    sim.rename_body(giant, "Giant")?;
    sim.set_body_mass(giant, JUPITER_MASS)?;

    let rock = editor.add_body_at(&mut sim, Vector2::new(0.0, -0.8 * AU))?;

    // Giant: pick the star as target, clockwise orbit
    sim.select(giant)?;
    editor.start_picking_orbit_target(&sim)?;
    if let PressOutcome::OrbitTargetSet { target, .. } = editor.press(&mut sim, Vector2::zeros())? {
        println!("Giant will orbit body {target}");
    }
    editor.clockwise = true;
    editor.apply_orbit(&mut sim)?;

    // Rock: counter-clockwise around the star
    sim.select(rock)?;
    sim.apply_circular_orbit(rock, star, false)?;

    for b in sim.bodies() {
        println!("  {b}");
    }

    let mut camera = Camera::default();
    camera.fit_all();
    let stats = nbody_sandbox::sim::run_frames(&mut sim, &mut camera, 365)?;

    println!();
    println!("{} frames, {} steps, {}", stats.frames, stats.steps, sim.elapsed_display());
    println!(
        "Camera center ({:.3}, {:.3}) AU, half-width {:.3} AU",
        camera.center().x / AU,
        camera.center().y / AU,
        camera.zoom() / AU
    );

    sim.exit_playback();
    println!("Back to authoring; rock restored to {:?}", sim.body(rock).map(|b| b.position() / AU));
    Ok(())
}
