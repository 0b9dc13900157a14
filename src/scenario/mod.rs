pub mod config;
pub mod presets;

use nalgebra::Vector2;
use tracing::info;

use crate::error::Result;
use crate::sim::body::{BodyId, BodySpec, Color};
use crate::sim::state::SimulationState;

pub use config::{load_scenario_file, parse_scenario, ScenarioError, ScenarioFile};
pub use presets::Preset;

// ---------------------------------------------------------------------------
// Scenario: ordered list of bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub bodies: Vec<BodySpec>,
}

impl Scenario {
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    /// Replace the scene in `sim` with this scenario's bodies.
    ///
    /// Every body is validated before the current scene is cleared.
    pub fn load_into(&self, sim: &mut SimulationState) -> Result<Vec<BodyId>> {
        let ids = sim.load_bodies(self.bodies.clone())?;
        info!(scenario = %self.name, bodies = ids.len(), "scenario loaded");
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Scenario builder
// ---------------------------------------------------------------------------

pub struct ScenarioBuilder {
    name: String,
    bodies: Vec<BodySpec>,
}

impl ScenarioBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), bodies: vec![] }
    }

    /// Body from `(name, mass, x, y, vx, vy, color)`, SI units.
    #[allow(clippy::too_many_arguments)]
    pub fn body(
        mut self,
        name: &str,
        mass: f64,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
        color: &str,
    ) -> Self {
        self.bodies.push(BodySpec::new(
            name,
            mass,
            Vector2::new(x, y),
            Vector2::new(vx, vy),
            Color::new(color),
        ));
        self
    }

    pub fn spec(mut self, spec: BodySpec) -> Self {
        self.bodies.push(spec);
        self
    }

    pub fn build(self) -> Scenario {
        Scenario { name: self.name, bodies: self.bodies }
    }
}
