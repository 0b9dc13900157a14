pub mod body;
pub mod editor;
pub mod integrator;
pub mod runner;
pub mod state;

pub use body::{Body, BodyId, BodySpec, Color};
pub use editor::{Editor, Interaction, PressOutcome};
pub use integrator::{Integrator, IntegratorFactory, PointMass, Scheme};
pub use runner::{run_frames, run_frames_with, steps_per_frame, FrameCadence, RunStats};
pub use state::{Mode, SimConfig, SimulationState};
