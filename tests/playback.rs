use nalgebra::Vector2;

use nbody_sandbox::error::{IllegalState, SimError};
use nbody_sandbox::io::{csv, json};
use nbody_sandbox::orbital::{circular_orbit_speed, orbital_velocity_vector};
use nbody_sandbox::physics::constants::{AU, EARTH_MASS, G, SOLAR_MASS};
use nbody_sandbox::sim::{Integrator, PointMass};
use nbody_sandbox::{
    BodyId, BodySpec, Camera, CameraPolicy, Mode, Preset, SimConfig, SimulationState,
};

/// Body at rest at `(x, y)` meters.
pub fn at_rest(name: &str, mass: f64, x: f64, y: f64) -> BodySpec {
    BodySpec::new(name, mass, Vector2::new(x, y), Vector2::zeros(), "#FFFFFF")
}

/// Three equal masses at (-1 AU, 0), (1 AU, 0), (0, 1.5 AU), all at rest.
pub fn three_at_rest(sim: &mut SimulationState) -> Vec<BodyId> {
    vec![
        sim.add_body(at_rest("A", SOLAR_MASS, -AU, 0.0)).unwrap(),
        sim.add_body(at_rest("B", SOLAR_MASS, AU, 0.0)).unwrap(),
        sim.add_body(at_rest("C", SOLAR_MASS, 0.0, 1.5 * AU)).unwrap(),
    ]
}

fn physical_state(sim: &SimulationState) -> Vec<(f64, Vector2<f64>, Vector2<f64>)> {
    sim.bodies()
        .iter()
        .map(|b| (b.mass(), b.position(), b.velocity()))
        .collect()
}

// ==================================================================================
// Mode transitions
// ==================================================================================

#[test]
fn enter_then_exit_restores_every_body() {
    for preset in Preset::ALL {
        let mut sim = SimulationState::default();
        preset.scenario().load_into(&mut sim).unwrap();
        let before = physical_state(&sim);

        sim.enter_playback().unwrap();
        sim.exit_playback();
        assert_eq!(physical_state(&sim), before, "{preset}: immediate round trip");

        sim.enter_playback().unwrap();
        for _ in 0..3 {
            sim.advance_frame().unwrap();
        }
        sim.exit_playback();
        assert_eq!(physical_state(&sim), before, "{preset}: round trip after playback");
    }
}

#[test]
fn trajectory_length_tracks_step_count() {
    let mut sim = SimulationState::default();
    Preset::EarthMoon.scenario().load_into(&mut sim).unwrap();
    sim.enter_playback().unwrap();

    for n in 0..25 {
        for (body, trail) in sim.bodies().iter().zip(sim.trajectories()) {
            assert_eq!(trail.len(), 1 + n, "after {n} steps");
            assert_eq!(*trail.last().unwrap(), body.position());
        }
        sim.advance_one_step().unwrap();
    }

    // A second playback starts fresh
    sim.exit_playback();
    sim.enter_playback().unwrap();
    assert!(sim.trajectories().iter().all(|t| t.len() == 1));
    assert_eq!(sim.elapsed_time(), 0.0);
}

#[test]
fn huge_warp_runs_the_step_ceiling() {
    let mut sim = SimulationState::default();
    sim.add_body(at_rest("Lone", SOLAR_MASS, 0.0, 0.0)).unwrap();
    sim.set_time_warp(1e308).unwrap();
    sim.enter_playback().unwrap();

    let max = sim.config().max_steps_per_frame;
    assert_eq!(sim.advance_frame().unwrap(), max, "warp overflowing to inf still clamps to the ceiling");
    assert_eq!(sim.steps_taken(), u64::from(max));
    assert_eq!(sim.trajectories()[0].len(), max as usize + 1);
}

#[test]
fn exports_agree_with_elapsed_time() {
    let mut sim = SimulationState::default();
    sim.add_body(BodySpec::new(
        "Drifter",
        1.0,
        Vector2::zeros(),
        Vector2::new(1.0, 0.0),
        "#FFFFFF",
    ))
    .unwrap();
    sim.enter_playback().unwrap();
    sim.advance_one_step().unwrap();

    let dt = sim.time_step();
    assert!(matches!(
        sim.set_time_step(60.0),
        Err(SimError::IllegalState(IllegalState::WrongMode { .. }))
    ));
    sim.advance_one_step().unwrap();
    assert_eq!(sim.elapsed_time(), 2.0 * dt);

    let mut buf = Vec::new();
    csv::write_trajectories(&mut buf, &sim).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let last = text.lines().last().unwrap();
    let time: f64 = last.split(',').next().unwrap().parse().unwrap();
    assert_eq!(time, sim.elapsed_time(), "last CSV row: {last}");

    let summary = json::RunSummary::from_state(&sim);
    assert!(
        (summary.bodies[0].max_speed_ms - 1.0).abs() < 1e-9,
        "coasting at 1 m/s, got {}",
        summary.bodies[0].max_speed_ms
    );
}

#[test]
fn empty_scene_is_refused_and_state_stays_usable() {
    let mut sim = SimulationState::default();
    assert_eq!(
        sim.enter_playback().unwrap_err(),
        SimError::IllegalState(IllegalState::NoBodies)
    );
    sim.add_body(at_rest("late", 1.0, 0.0, 0.0)).unwrap();
    sim.enter_playback().unwrap();
    assert_eq!(sim.mode(), Mode::Playback);
}

// ==================================================================================
// Collection edits
// ==================================================================================

#[test]
fn add_then_remove_leaves_others_untouched() {
    let mut sim = SimulationState::default();
    three_at_rest(&mut sim);
    let before = physical_state(&sim);
    let ids_before: Vec<_> = sim.bodies().iter().map(|b| b.id()).collect();

    let extra = sim.add_body(at_rest("extra", 5.0, 2.0, 2.0)).unwrap();
    assert_eq!(sim.len(), 4);
    assert_eq!(sim.trajectories().len(), 4);
    sim.remove_body(extra).unwrap();

    assert_eq!(sim.len(), 3);
    assert_eq!(sim.trajectories().len(), 3);
    assert_eq!(physical_state(&sim), before);
    let ids_after: Vec<_> = sim.bodies().iter().map(|b| b.id()).collect();
    assert_eq!(ids_after, ids_before);
}

#[test]
fn zero_or_negative_mass_is_refused() {
    let mut sim = SimulationState::default();
    let id = sim.add_body(at_rest("m", 10.0, 0.0, 0.0)).unwrap();
    for bad in [0.0, -1.0, -1e30] {
        let err = sim.set_body_mass(id, bad).unwrap_err();
        assert!(err.is_validation(), "{bad}: {err}");
        assert_eq!(sim.body(id).unwrap().mass(), 10.0);
    }
}

// ==================================================================================
// Orbital math
// ==================================================================================

#[test]
fn earth_speed_matches_known_value() {
    let v = circular_orbit_speed(1.989e30, 0.0, 1.496e11, 6.6743e-11);
    assert!((v - 29_785.0).abs() < 10.0, "got {v:.1} m/s");
}

#[test]
fn clockwise_is_exact_mirror() {
    let c = Vector2::new(0.3 * AU, -0.1 * AU);
    let o = Vector2::new(-1.7 * AU, 2.2 * AU);
    let ccw = orbital_velocity_vector(&c, &o, SOLAR_MASS, EARTH_MASS, G, false);
    let cw = orbital_velocity_vector(&c, &o, SOLAR_MASS, EARTH_MASS, G, true);
    assert_eq!(ccw, -cw);
}

#[test]
fn auto_orbit_keeps_separation_over_a_month() {
    let mut sim = SimulationState::default();
    let sun = sim.add_body(at_rest("Sun", SOLAR_MASS, 0.0, 0.0)).unwrap();
    let planet = sim.add_body(at_rest("Planet", EARTH_MASS, 0.0, 0.7 * AU)).unwrap();
    sim.apply_circular_orbit(planet, sun, true).unwrap();
    sim.enter_playback().unwrap();
    for _ in 0..(30 * 24) {
        sim.advance_one_step().unwrap();
        let r = (sim.body(planet).unwrap().position() - sim.body(sun).unwrap().position()).norm();
        assert!((r / (0.7 * AU) - 1.0).abs() < 1e-3, "separation drifted to {} AU", r / AU);
    }
}

// ==================================================================================
// Integrator wiring
// ==================================================================================

#[test]
fn three_bodies_fall_toward_center_of_gravity() {
    let mut sim = SimulationState::default();
    let ids = three_at_rest(&mut sim);
    let cog = sim.center_of_mass().unwrap();
    let start: Vec<_> = sim.bodies().iter().map(|b| b.position()).collect();

    sim.enter_playback().unwrap();
    sim.advance_one_step().unwrap();
    assert_eq!(sim.elapsed_time(), 3600.0);

    for (id, p0) in ids.iter().zip(&start) {
        let p1 = sim.body(*id).unwrap().position();
        let moved = p1 - p0;
        assert!(moved.norm() > 0.0, "{id} did not move");
        let toward = (cog - p0).normalize();
        assert!(
            moved.normalize().dot(&toward) > 0.5,
            "{id} moved {:?}, not toward the center of gravity",
            moved
        );
        assert!((p1 - cog).norm() < (p0 - cog).norm());
        assert_eq!(sim.trajectory(*id).unwrap().len(), 2);
    }
}

#[test]
fn verlet_and_rk4_agree_over_short_runs() {
    let run = |scheme: &str| {
        let config = SimConfig { scheme: scheme.parse().unwrap(), ..SimConfig::default() };
        let mut sim = SimulationState::new(config).unwrap();
        Preset::BinaryStars.scenario().load_into(&mut sim).unwrap();
        sim.enter_playback().unwrap();
        for _ in 0..5 {
            sim.advance_frame().unwrap();
        }
        sim.bodies()[0].position()
    };
    let a = run("rk4");
    let b = run("verlet");
    assert!((a - b).norm() / AU < 1e-4, "schemes diverged by {} AU", (a - b).norm() / AU);
}

/// Reports a bad body count after the first step.
struct Truncating {
    bodies: Vec<PointMass>,
    stepped: bool,
}

impl Integrator for Truncating {
    fn step(&mut self, _dt: f64) -> nbody_sandbox::Result<()> {
        if self.stepped {
            self.bodies.pop();
        }
        self.stepped = true;
        Ok(())
    }

    fn bodies(&self) -> &[PointMass] {
        &self.bodies
    }
}

/// Always fails.
struct Broken {
    bodies: Vec<PointMass>,
}

impl Integrator for Broken {
    fn step(&mut self, _dt: f64) -> nbody_sandbox::Result<()> {
        Err(SimError::Integrator("solver exploded".into()))
    }

    fn bodies(&self) -> &[PointMass] {
        &self.bodies
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn integrator_failure_is_propagated() {
    let mut sim = SimulationState::default().with_integrator(Box::new(
        |bodies: Vec<PointMass>| -> Box<dyn Integrator> { Box::new(Broken { bodies }) },
    ));
    three_at_rest(&mut sim);
    sim.enter_playback().unwrap();
    assert_eq!(sim.integrator_name(), Some("broken"));

    let err = sim.advance_frame().unwrap_err();
    assert_eq!(err, SimError::Integrator("solver exploded".into()));
    assert_eq!(sim.steps_taken(), 0);
    assert!(sim.trajectories().iter().all(|t| t.len() == 1));

    // Exiting always works
    sim.exit_playback();
    assert_eq!(sim.mode(), Mode::Authoring);
}

#[test]
fn integrator_dropping_bodies_is_reported() {
    let mut sim = SimulationState::default().with_integrator(Box::new(
        |bodies: Vec<PointMass>| -> Box<dyn Integrator> {
            Box::new(Truncating { bodies, stepped: false })
        },
    ));
    three_at_rest(&mut sim);
    sim.enter_playback().unwrap();
    sim.advance_one_step().unwrap();
    let err = sim.advance_one_step().unwrap_err();
    assert!(matches!(err, SimError::Integrator(_)), "got {err}");
    assert_eq!(sim.len(), sim.trajectories().len());
    assert!(sim.trajectories().iter().all(|t| t.len() == 2));
}

// ==================================================================================
// Camera against a live simulation
// ==================================================================================

#[test]
fn focus_reverts_when_target_is_deleted() {
    let mut sim = SimulationState::default();
    let ids = three_at_rest(&mut sim);
    let mut camera = Camera::default();
    camera.focus(ids[2]);
    camera.update(sim.bodies());
    assert_eq!(camera.center(), Vector2::new(0.0, 1.5 * AU));

    sim.remove_body(ids[2]).unwrap();
    camera.update(sim.bodies());
    assert_eq!(camera.policy(), CameraPolicy::Manual);
    assert_eq!(camera.center(), Vector2::new(0.0, 1.5 * AU), "view stays where it was");
}

#[test]
fn fit_all_contains_every_body() {
    let mut sim = SimulationState::default();
    Preset::ThreeBodyProblem.scenario().load_into(&mut sim).unwrap();
    let mut camera = Camera::default();
    camera.fit_all();
    sim.enter_playback().unwrap();
    for _ in 0..20 {
        sim.advance_frame().unwrap();
        camera.update(sim.bodies());
        let (min, max) = camera.bounds();
        for b in sim.bodies() {
            let p = b.position();
            assert!(p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y, "{} outside view", b.name);
        }
    }
}
