use nalgebra::Vector2;

use nbody_sandbox::error::{Result, SimError};
use nbody_sandbox::physics::accelerations;
use nbody_sandbox::physics::constants::{AU, EARTH_MASS, G, SOLAR_MASS, YEAR};
use nbody_sandbox::sim::{Integrator, PointMass};
use nbody_sandbox::{BodySpec, SimConfig, SimulationState};

/// First-order semi-implicit Euler: kick with the current acceleration,
/// then drift with the new velocity.
struct SymplecticEuler {
    bodies: Vec<PointMass>,
}

impl Integrator for SymplecticEuler {
    fn step(&mut self, dt: f64) -> Result<()> {
        let pos: Vec<Vector2<f64>> = self.bodies.iter().map(|b| b.pos).collect();
        let mass: Vec<f64> = self.bodies.iter().map(|b| b.mass).collect();
        let acc = accelerations(&pos, &mass, G, 0.0);

        let mut next = self.bodies.clone();
        for (b, a) in next.iter_mut().zip(&acc) {
            b.vel += a * dt;
            b.pos += b.vel * dt;
        }
        if next.iter().any(|b| !(b.pos.x.is_finite() && b.pos.y.is_finite())) {
            return Err(SimError::Integrator("symplectic euler diverged".into()));
        }
        self.bodies = next;
        Ok(())
    }

    fn bodies(&self) -> &[PointMass] {
        &self.bodies
    }

    fn name(&self) -> &str {
        "SymplecticEuler"
    }
}

fn main() -> Result<()> {
    let mut sim = SimulationState::new(SimConfig::default())?.with_integrator(Box::new(
        |bodies: Vec<PointMass>| -> Box<dyn Integrator> { Box::new(SymplecticEuler { bodies }) },
    ));

    let sun = sim.add_body(BodySpec::new("Sun", SOLAR_MASS, Vector2::zeros(), Vector2::zeros(), "#FDB813"))?;
    let earth = sim.add_body(BodySpec::new(
        "Earth",
        EARTH_MASS,
        Vector2::new(AU, 0.0),
        Vector2::zeros(),
        "#4A90E2",
    ))?;
    sim.apply_circular_orbit(earth, sun, false)?;

    sim.enter_playback()?;
    println!("Simulating one year with {}...", sim.integrator_name().unwrap_or("?"));
    while sim.elapsed_time() < YEAR {
        sim.advance_frame()?;
    }

    let r = sim.body(earth).map(|b| b.position().norm()).unwrap_or(0.0);
    println!("  Elapsed:        {}", sim.elapsed_display());
    println!("  Sun-Earth dist: {:.5} AU", r / AU);
    println!("  Drift:          {:.3e}", (r - AU).abs() / AU);
    Ok(())
}
