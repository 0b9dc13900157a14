use std::fmt;

use crate::sim::body::BodyId;
use crate::sim::state::Mode;

// ---------------------------------------------------------------------------
// Failure kinds
// ---------------------------------------------------------------------------

/// Input that was rejected before it touched any state.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    NonPositiveMass(f64),
    NonPositiveTimeStep(f64),
    NonPositiveTimeWarp(f64),
    NegativeSpeed(f64),
    /// A speed change needs an existing velocity to take the direction from.
    NoVelocityDirection,
    NonFinite(&'static str),
    OutOfRange { field: &'static str, value: f64 },
    SelfOrbit(BodyId),
    NoOrbitTarget,
    UnknownPreset(String),
    UnknownScheme(String),
}

/// Operation not permitted in the current state. Nothing was changed.
#[derive(Debug, Clone, PartialEq)]
pub enum IllegalState {
    WrongMode { expected: Mode, actual: Mode },
    NoBodies,
    UnknownBody(BodyId),
    NoSelection,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    Validation(ValidationError),
    IllegalState(IllegalState),
    /// The integrator could not complete a step. Its internal state is
    /// undefined; the last successfully mirrored body state is kept.
    Integrator(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SimError::Validation(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, SimError::IllegalState(_))
    }
}

impl From<ValidationError> for SimError {
    fn from(e: ValidationError) -> Self {
        SimError::Validation(e)
    }
}

impl From<IllegalState> for SimError {
    fn from(e: IllegalState) -> Self {
        SimError::IllegalState(e)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NonPositiveMass(m) => write!(f, "mass must be positive, got {m}"),
            ValidationError::NonPositiveTimeStep(dt) => {
                write!(f, "time step must be positive, got {dt}")
            }
            ValidationError::NonPositiveTimeWarp(w) => {
                write!(f, "time warp must be positive, got {w}")
            }
            ValidationError::NegativeSpeed(s) => write!(f, "speed must be non-negative, got {s}"),
            ValidationError::NoVelocityDirection => {
                write!(f, "body has no velocity direction yet; set a velocity arrow first")
            }
            ValidationError::NonFinite(what) => write!(f, "{what} must be a finite number"),
            ValidationError::OutOfRange { field, value } => {
                write!(f, "{field} is out of range: {value}")
            }
            ValidationError::SelfOrbit(id) => write!(f, "body {id} cannot orbit itself"),
            ValidationError::NoOrbitTarget => write!(f, "no orbit target has been picked"),
            ValidationError::UnknownPreset(name) => write!(f, "unknown preset '{name}'"),
            ValidationError::UnknownScheme(name) => {
                write!(f, "unknown integration scheme '{name}' (expected rk4 or verlet)")
            }
        }
    }
}

impl fmt::Display for IllegalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalState::WrongMode { expected, actual } => {
                write!(f, "operation requires {expected} mode, simulation is in {actual} mode")
            }
            IllegalState::NoBodies => write!(f, "cannot start playback without any bodies"),
            IllegalState::UnknownBody(id) => write!(f, "no body with id {id}"),
            IllegalState::NoSelection => write!(f, "no body is selected"),
            IllegalState::Paused => write!(f, "playback is paused"),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Validation(e) => write!(f, "invalid input: {e}"),
            SimError::IllegalState(e) => write!(f, "illegal state: {e}"),
            SimError::Integrator(msg) => write!(f, "integrator failure: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl std::error::Error for IllegalState {}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Validation(e) => Some(e),
            SimError::IllegalState(e) => Some(e),
            SimError::Integrator(_) => None,
        }
    }
}
