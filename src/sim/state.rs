use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{IllegalState, Result, SimError, ValidationError};
use crate::orbital::maneuvers::{normalize_or_zero, orbital_velocity_vector};
use crate::physics::constants::{DAY, G, YEAR};
use crate::physics::gravity::center_of_mass;
use crate::sim::body::{Body, BodyId, BodySpec};
use crate::sim::integrator::{Integrator, IntegratorFactory, Scheme};
use crate::sim::runner::steps_per_frame;

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub time_step: f64,              // s, physical dt of one step
    pub time_warp: f64,              // multiplier on steps per frame
    pub gravitational_constant: f64, // m^3 kg^-1 s^-2
    pub softening: f64,              // m, 0 = exact inverse-square
    pub scheme: Scheme,
    pub base_rate: u32,              // steps per frame at warp 1
    pub max_steps_per_frame: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step: 3600.0, // 1 hour
            time_warp: 1.0,
            gravitational_constant: G,
            softening: 0.0,
            scheme: Scheme::Rk4,
            base_rate: 10,
            max_steps_per_frame: 1000,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        validate_time_step(self.time_step)?;
        validate_time_warp(self.time_warp)?;
        if !(self.gravitational_constant.is_finite() && self.gravitational_constant > 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "gravitational_constant",
                value: self.gravitational_constant,
            }
            .into());
        }
        if !(self.softening.is_finite() && self.softening >= 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "softening",
                value: self.softening,
            }
            .into());
        }
        if self.max_steps_per_frame == 0 {
            return Err(ValidationError::OutOfRange {
                field: "max_steps_per_frame",
                value: 0.0,
            }
            .into());
        }
        Ok(())
    }
}

fn validate_time_step(dt: f64) -> Result<()> {
    if !dt.is_finite() {
        return Err(ValidationError::NonFinite("time step").into());
    }
    if dt <= 0.0 {
        return Err(ValidationError::NonPositiveTimeStep(dt).into());
    }
    Ok(())
}

fn validate_time_warp(warp: f64) -> Result<()> {
    if !warp.is_finite() {
        return Err(ValidationError::NonFinite("time warp").into());
    }
    if warp <= 0.0 {
        return Err(ValidationError::NonPositiveTimeWarp(warp).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Bodies are editable; no integrator exists.
    #[default]
    Authoring,
    /// Physical state is owned by the integrator; bodies mirror it.
    Playback,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Authoring => write!(f, "authoring"),
            Mode::Playback => write!(f, "playback"),
        }
    }
}

/// Human-readable elapsed simulated time: hours, days, or years.
pub fn format_elapsed(seconds: f64) -> String {
    if seconds >= YEAR {
        format!("{:.2} years", seconds / YEAR)
    } else if seconds >= DAY {
        format!("{:.2} days", seconds / DAY)
    } else {
        format!("{:.2} hours", seconds / 3600.0)
    }
}

// ---------------------------------------------------------------------------
// Simulation state machine
// ---------------------------------------------------------------------------

/// Owns the bodies, their trajectories, and the integrator.
///
/// `bodies` and `trajectories` are index-aligned at all times; every
/// operation that touches one touches the other.
pub struct SimulationState {
    config: SimConfig,
    mode: Mode,
    running: bool,
    elapsed_time: f64,
    steps: u64,
    bodies: Vec<Body>,
    trajectories: Vec<Vec<Vector2<f64>>>,
    selected: Option<BodyId>,
    next_id: u64,
    integrator: Option<Box<dyn Integrator>>,
    factory: Option<IntegratorFactory>,
}

impl SimulationState {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SimConfig) -> Self {
        Self {
            config,
            mode: Mode::Authoring,
            running: false,
            elapsed_time: 0.0,
            steps: 0,
            bodies: Vec::new(),
            trajectories: Vec::new(),
            selected: None,
            next_id: 0,
            integrator: None,
            factory: None,
        }
    }

    /// Replace the bundled integrator with a custom one.
    /// Takes effect at the next `enter_playback`.
    pub fn with_integrator(mut self, factory: IntegratorFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    // --- queries -----------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time_step(&self) -> f64 {
        self.config.time_step
    }

    pub fn time_warp(&self) -> f64 {
        self.config.time_warp
    }

    /// Simulated seconds since the last `enter_playback`.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_time)
    }

    /// Steps taken since the last `enter_playback`.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn integrator_name(&self) -> Option<&str> {
        self.integrator.as_ref().map(|i| i.name())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn trajectories(&self) -> &[Vec<Vector2<f64>>] {
        &self.trajectories
    }

    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| b.id() == id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    pub fn trajectory(&self, id: BodyId) -> Option<&[Vector2<f64>]> {
        self.index_of(id).map(|i| self.trajectories[i].as_slice())
    }

    /// First body (in insertion order) strictly within `tolerance` of `point`.
    pub fn body_at(&self, point: &Vector2<f64>, tolerance: f64) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|b| b.distance_to(point) < tolerance)
            .map(Body::id)
    }

    pub fn center_of_mass(&self) -> Option<Vector2<f64>> {
        center_of_mass(self.bodies.iter().map(|b| (b.mass(), b.position())))
    }

    // --- settings ----------------------------------------------------------

    /// Authoring only: every recorded trail sample is one `time_step` apart.
    pub fn set_time_step(&mut self, dt: f64) -> Result<()> {
        self.require_mode(Mode::Authoring)?;
        validate_time_step(dt)?;
        self.config.time_step = dt;
        Ok(())
    }

    pub fn set_time_warp(&mut self, warp: f64) -> Result<()> {
        validate_time_warp(warp)?;
        self.config.time_warp = warp;
        debug!(warp, "time warp changed");
        Ok(())
    }

    /// Authoring only; applies from the next playback.
    pub fn set_config(&mut self, config: SimConfig) -> Result<()> {
        self.require_mode(Mode::Authoring)?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // --- collection edits (authoring only) ---------------------------------

    pub fn add_body(&mut self, spec: BodySpec) -> Result<BodyId> {
        self.require_mode(Mode::Authoring)?;
        spec.validate()?;

        let id = BodyId(self.next_id);
        self.next_id += 1;
        debug!(%id, name = %spec.name, mass = spec.mass, "adding body");
        self.bodies.push(Body::from_spec(id, spec));
        self.trajectories.push(Vec::new());
        Ok(id)
    }

    /// Remove by identity; the trajectory at the same index goes with it.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body> {
        self.require_mode(Mode::Authoring)?;
        let index = self.require_index(id)?;

        let body = self.bodies.remove(index);
        self.trajectories.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(%id, name = %body.name, "removed body");
        Ok(body)
    }

    /// Drop every body and return to the initial authoring state.
    /// Permitted from either mode.
    pub fn clear_all(&mut self) {
        self.bodies.clear();
        self.trajectories.clear();
        self.integrator = None;
        self.selected = None;
        self.running = false;
        self.elapsed_time = 0.0;
        self.steps = 0;
        self.mode = Mode::Authoring;
        debug!("cleared all bodies");
    }

    /// Replace the scene with `specs`. Every spec is validated first, so a
    /// bad entry leaves the current scene untouched.
    pub fn load_bodies(&mut self, specs: Vec<BodySpec>) -> Result<Vec<BodyId>> {
        for spec in &specs {
            spec.validate()?;
        }
        self.clear_all();
        let count = specs.len();
        let ids = specs
            .into_iter()
            .map(|spec| self.add_body(spec))
            .collect::<Result<Vec<_>>>()?;
        info!(bodies = count, "scene loaded");
        Ok(ids)
    }

    // --- selection ---------------------------------------------------------

    pub fn selected_id(&self) -> Option<BodyId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Body> {
        self.selected.and_then(|id| self.body(id))
    }

    /// Select `id`, deselecting whatever was selected before.
    pub fn select(&mut self, id: BodyId) -> Result<()> {
        self.require_mode(Mode::Authoring)?;
        self.require_index(id)?;
        self.deselect_all();
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.selected = None;
    }

    // --- body edits --------------------------------------------------------

    /// Names are display-only and may change in either mode.
    pub fn rename_body(&mut self, id: BodyId, name: impl Into<String>) -> Result<()> {
        let index = self.require_index(id)?;
        self.bodies[index].name = name.into();
        Ok(())
    }

    pub fn set_body_mass(&mut self, id: BodyId, mass: f64) -> Result<()> {
        let index = self.authoring_index(id)?;
        self.bodies[index].set_mass(mass).inspect_err(|e| warn!(%id, "{e}"))
    }

    pub fn set_body_position(&mut self, id: BodyId, position: Vector2<f64>) -> Result<()> {
        let index = self.authoring_index(id)?;
        self.bodies[index].set_position(position)
    }

    pub fn set_body_velocity(&mut self, id: BodyId, velocity: Vector2<f64>) -> Result<()> {
        let index = self.authoring_index(id)?;
        self.bodies[index].set_velocity(velocity)
    }

    /// Rescale the body's current velocity direction to `speed` (m/s).
    pub fn set_body_speed(&mut self, id: BodyId, speed: f64) -> Result<()> {
        let index = self.authoring_index(id)?;
        if !speed.is_finite() {
            return Err(ValidationError::NonFinite("speed").into());
        }
        if speed < 0.0 {
            return Err(ValidationError::NegativeSpeed(speed).into());
        }
        let dir = normalize_or_zero(&self.bodies[index].velocity());
        if dir == Vector2::zeros() {
            return Err(ValidationError::NoVelocityDirection.into());
        }
        self.bodies[index].set_velocity(dir * speed)
    }

    /// Give `id` the circular-orbit velocity around `central` (two-body
    /// approximation, configured G). Returns the applied velocity.
    pub fn apply_circular_orbit(
        &mut self,
        id: BodyId,
        central: BodyId,
        clockwise: bool,
    ) -> Result<Vector2<f64>> {
        let index = self.authoring_index(id)?;
        let central_index = self.require_index(central)?;
        if index == central_index {
            return Err(ValidationError::SelfOrbit(id).into());
        }

        let c = &self.bodies[central_index];
        let o = &self.bodies[index];
        let velocity = orbital_velocity_vector(
            &c.position(),
            &o.position(),
            c.mass(),
            o.mass(),
            self.config.gravitational_constant,
            clockwise,
        );
        self.bodies[index].set_velocity(velocity)?;
        debug!(%id, %central, speed = velocity.norm(), clockwise, "applied circular orbit");
        Ok(velocity)
    }

    // --- mode transitions --------------------------------------------------

    /// Seed the integrator from the current bodies and start playback.
    pub fn enter_playback(&mut self) -> Result<()> {
        self.require_mode(Mode::Authoring)?;
        if self.bodies.is_empty() {
            warn!("refusing to enter playback with no bodies");
            return Err(IllegalState::NoBodies.into());
        }

        let seed = self.bodies.iter().map(Body::to_point_mass).collect();
        let integrator = match &self.factory {
            Some(factory) => factory(seed),
            None => self
                .config
                .scheme
                .factory(self.config.gravitational_constant, self.config.softening)(seed),
        };

        for (traj, body) in self.trajectories.iter_mut().zip(&self.bodies) {
            traj.clear();
            traj.push(body.position());
        }

        info!(
            bodies = self.bodies.len(),
            integrator = integrator.name(),
            dt = self.config.time_step,
            "entering playback"
        );
        self.integrator = Some(integrator);
        self.elapsed_time = 0.0;
        self.steps = 0;
        self.running = true;
        self.mode = Mode::Playback;
        Ok(())
    }

    /// Discard the integrator and restore every body's initial conditions.
    /// Always permitted; a no-op in authoring mode.
    pub fn exit_playback(&mut self) {
        self.running = false;
        if self.mode == Mode::Authoring {
            return;
        }

        self.integrator = None;
        for body in self.bodies.iter_mut() {
            body.reset_to_initial();
        }
        for traj in self.trajectories.iter_mut() {
            traj.clear();
        }
        info!(
            elapsed = %format_elapsed(self.elapsed_time),
            steps = self.steps,
            "returning to authoring"
        );
        self.elapsed_time = 0.0;
        self.steps = 0;
        self.mode = Mode::Authoring;
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require_mode(Mode::Playback)?;
        self.running = false;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require_mode(Mode::Playback)?;
        self.running = true;
        Ok(())
    }

    /// Returns the new running flag.
    pub fn toggle_running(&mut self) -> Result<bool> {
        self.require_mode(Mode::Playback)?;
        self.running = !self.running;
        Ok(self.running)
    }

    // --- stepping ----------------------------------------------------------

    /// One integrator step of `time_step` seconds.
    ///
    /// All bodies are mirrored from the integrator before any trajectory is
    /// appended. Integrator failures propagate and leave bodies and
    /// trajectories as they were after the previous step.
    pub fn advance_one_step(&mut self) -> Result<()> {
        self.require_mode(Mode::Playback)?;
        if !self.running {
            return Err(IllegalState::Paused.into());
        }
        let dt = self.config.time_step;
        let integrator = self.integrator.as_mut().ok_or(IllegalState::WrongMode {
            expected: Mode::Playback,
            actual: Mode::Authoring,
        })?;

        integrator.step(dt).inspect_err(|e| warn!("{e}"))?;

        let out = integrator.bodies();
        if out.len() != self.bodies.len() {
            return Err(SimError::Integrator(format!(
                "{} returned {} bodies, expected {}",
                integrator.name(),
                out.len(),
                self.bodies.len()
            )));
        }

        for (body, pm) in self.bodies.iter_mut().zip(out) {
            body.mirror(pm);
        }
        for (traj, body) in self.trajectories.iter_mut().zip(&self.bodies) {
            traj.push(body.position());
        }

        self.elapsed_time += dt;
        self.steps += 1;
        trace!(steps = self.steps, elapsed = self.elapsed_time, "step");
        Ok(())
    }

    /// Run one rendered frame's worth of steps (time warp applied).
    /// Returns the number of steps taken.
    pub fn advance_frame(&mut self) -> Result<u32> {
        let n = steps_per_frame(
            self.config.base_rate,
            self.config.time_warp,
            self.config.max_steps_per_frame,
        );
        for _ in 0..n {
            self.advance_one_step()?;
        }
        Ok(n)
    }

    // --- helpers -----------------------------------------------------------

    fn require_mode(&self, expected: Mode) -> Result<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(IllegalState::WrongMode {
                expected,
                actual: self.mode,
            }
            .into())
        }
    }

    fn require_index(&self, id: BodyId) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| IllegalState::UnknownBody(id).into())
    }

    fn authoring_index(&self, id: BodyId) -> Result<usize> {
        self.require_mode(Mode::Authoring)?;
        self.require_index(id)
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::from_valid_config(SimConfig::default())
    }
}

impl fmt::Debug for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationState")
            .field("mode", &self.mode)
            .field("running", &self.running)
            .field("elapsed_time", &self.elapsed_time)
            .field("steps", &self.steps)
            .field("bodies", &self.bodies.len())
            .field("integrator", &self.integrator_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
