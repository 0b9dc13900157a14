pub mod camera;
pub mod error;
pub mod io;
pub mod orbital;
pub mod physics;
pub mod scenario;
pub mod sim;

pub use camera::{Camera, CameraConfig, CameraPolicy};
pub use error::{IllegalState, Result, SimError, ValidationError};
pub use scenario::{Preset, Scenario, ScenarioBuilder};
pub use sim::{Body, BodyId, BodySpec, Editor, Mode, SimConfig, SimulationState};
