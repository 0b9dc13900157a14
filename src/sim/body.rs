use std::fmt;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::sim::integrator::PointMass;

// ---------------------------------------------------------------------------
// Identity and display metadata
// ---------------------------------------------------------------------------

/// Stable identity of a body within one `SimulationState`.
/// Never reused, so a stale id simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub(crate) u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Colors handed out to bodies added by clicking on empty space.
pub const PALETTE: [&str; 7] = [
    "#FDB813", "#FF6B35", "#FF0000", "#4A90E2", "#00FF00", "#FF00FF", "#FFFF00",
];

/// Opaque display token. Conventionally a `#RRGGBB` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse `#RRGGBB` into components, if the token has that shape.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        let hex = self.0.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some([channel(0)?, channel(2)?, channel(4)?])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("#FFFFFF")
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Body description (preset / scenario input)
// ---------------------------------------------------------------------------

/// Everything needed to create a body. Positions in m, velocities in m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub mass: f64,
    pub position: Vector2<f64>,
    #[serde(default = "zero_vector")]
    pub velocity: Vector2<f64>,
    #[serde(default)]
    pub color: Color,
}

impl BodySpec {
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        color: impl Into<Color>,
    ) -> Self {
        Self {
            name: name.into(),
            mass,
            position,
            velocity,
            color: color.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_mass(self.mass)?;
        validate_vector(&self.position, "position")?;
        validate_vector(&self.velocity, "velocity")?;
        Ok(())
    }
}

fn zero_vector() -> Vector2<f64> {
    Vector2::zeros()
}

fn validate_mass(mass: f64) -> Result<()> {
    if !mass.is_finite() {
        return Err(ValidationError::NonFinite("mass").into());
    }
    if mass <= 0.0 {
        return Err(ValidationError::NonPositiveMass(mass).into());
    }
    Ok(())
}

fn validate_vector(v: &Vector2<f64>, what: &'static str) -> Result<()> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(what).into())
    }
}

// ---------------------------------------------------------------------------
// Body entity
// ---------------------------------------------------------------------------

/// Physical state a body returns to when playback stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub mass: f64,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
}

/// One point mass plus its authoring metadata.
///
/// The entity itself knows nothing about simulation modes; `SimulationState`
/// decides when edits are allowed and is the only holder of `&mut Body`.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    pub name: String,
    pub color: Color,
    mass: f64,
    position: Vector2<f64>,
    velocity: Vector2<f64>,
    initial: Snapshot,
}

impl Body {
    /// Build from a spec; the spec must already have passed `validate`.
    pub(crate) fn from_spec(id: BodyId, spec: BodySpec) -> Self {
        let initial = Snapshot {
            mass: spec.mass,
            position: spec.position,
            velocity: spec.velocity,
        };
        Self {
            id,
            name: spec.name,
            color: spec.color,
            mass: spec.mass,
            position: spec.position,
            velocity: spec.velocity,
            initial,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn initial(&self) -> &Snapshot {
        &self.initial
    }

    /// Reject `mass <= 0`, leaving the old value in place.
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        validate_mass(mass)?;
        self.mass = mass;
        self.capture_initial();
        Ok(())
    }

    pub fn set_position(&mut self, position: Vector2<f64>) -> Result<()> {
        validate_vector(&position, "position")?;
        self.position = position;
        self.capture_initial();
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f64>) -> Result<()> {
        validate_vector(&velocity, "velocity")?;
        self.velocity = velocity;
        self.capture_initial();
        Ok(())
    }

    /// Restore mass, position and velocity from the last explicit edit.
    pub fn reset_to_initial(&mut self) {
        self.mass = self.initial.mass;
        self.position = self.initial.position;
        self.velocity = self.initial.velocity;
    }

    pub fn distance_to(&self, point: &Vector2<f64>) -> f64 {
        (self.position - point).norm()
    }

    pub fn to_point_mass(&self) -> PointMass {
        PointMass {
            mass: self.mass,
            pos: self.position,
            vel: self.velocity,
        }
    }

    pub fn to_spec(&self) -> BodySpec {
        BodySpec {
            name: self.name.clone(),
            mass: self.mass,
            position: self.position,
            velocity: self.velocity,
            color: self.color.clone(),
        }
    }

    /// Overwrite physical state from integrator output (playback only).
    /// Does not touch the initial snapshot.
    pub(crate) fn mirror(&mut self, pm: &PointMass) {
        self.mass = pm.mass;
        self.position = pm.pos;
        self.velocity = pm.vel;
    }

    fn capture_initial(&mut self) {
        self.initial = Snapshot {
            mass: self.mass,
            position: self.position,
            velocity: self.velocity,
        };
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pos=({:.2e}, {:.2e}) m, vel=({:.2e}, {:.2e}) m/s, mass={:.3e} kg)",
            self.name,
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
            self.mass
        )
    }
}
