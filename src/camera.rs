use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::physics::constants::AU;
use crate::physics::gravity::center_of_mass;
use crate::sim::body::{Body, BodyId};

// ---------------------------------------------------------------------------
// Camera configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub default_zoom: f64,    // m, half-width of the view
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub fit_margin: f64,      // fraction of the bounding box added per side
    pub cog_cadence: u32,     // frames between center-of-gravity updates
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_zoom: 3.0 * AU,
            zoom_in_factor: 0.7,
            zoom_out_factor: 1.3,
            fit_margin: 0.2,
            cog_cadence: 10,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("default_zoom", self.default_zoom),
            ("zoom_in_factor", self.zoom_in_factor),
            ("zoom_out_factor", self.zoom_out_factor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::OutOfRange { field, value }.into());
            }
        }
        if !(self.fit_margin.is_finite() && self.fit_margin >= 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "fit_margin",
                value: self.fit_margin,
            }
            .into());
        }
        if self.cog_cadence == 0 {
            return Err(ValidationError::OutOfRange {
                field: "cog_cadence",
                value: 0.0,
            }
            .into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tracking policy
// ---------------------------------------------------------------------------

/// At most one automatic tracking policy is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraPolicy {
    #[default]
    Manual,
    FollowCog,
    FitAll,
    /// Re-resolved by id every frame; a missing target falls back to `Manual`.
    FocusBody(BodyId),
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// View center and zoom computed from body positions.
///
/// Reads bodies, never mutates them. `zoom` is the half-width of the view in
/// meters.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    policy: CameraPolicy,
    center: Vector2<f64>,
    zoom: f64,
    frame: u64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_valid(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: CameraConfig) -> Self {
        Self {
            zoom: config.default_zoom,
            config,
            policy: CameraPolicy::Manual,
            center: Vector2::zeros(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn policy(&self) -> CameraPolicy {
        self.policy
    }

    pub fn center(&self) -> Vector2<f64> {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Visible rectangle as `(min, max)` corners for a square view.
    pub fn bounds(&self) -> (Vector2<f64>, Vector2<f64>) {
        let half = Vector2::new(self.zoom, self.zoom);
        (self.center - half, self.center + half)
    }

    // --- policy switches ---------------------------------------------------

    pub fn set_policy(&mut self, policy: CameraPolicy) {
        if self.policy != policy {
            debug!(from = ?self.policy, to = ?policy, "camera policy");
        }
        self.policy = policy;
    }

    pub fn follow_cog(&mut self) {
        self.set_policy(CameraPolicy::FollowCog);
    }

    pub fn fit_all(&mut self) {
        self.set_policy(CameraPolicy::FitAll);
    }

    pub fn focus(&mut self, target: BodyId) {
        self.set_policy(CameraPolicy::FocusBody(target));
    }

    /// Toggle center-of-gravity following. Returns whether it is now active.
    pub fn toggle_follow_cog(&mut self) -> bool {
        self.toggle(CameraPolicy::FollowCog)
    }

    /// Toggle fit-all. Returns whether it is now active.
    pub fn toggle_fit_all(&mut self) -> bool {
        self.toggle(CameraPolicy::FitAll)
    }

    /// Toggle focus on `target`. Focusing a different body switches target.
    pub fn toggle_focus(&mut self, target: BodyId) -> bool {
        self.toggle(CameraPolicy::FocusBody(target))
    }

    fn toggle(&mut self, policy: CameraPolicy) -> bool {
        if self.policy == policy {
            self.set_policy(CameraPolicy::Manual);
            false
        } else {
            self.set_policy(policy);
            true
        }
    }

    // --- manual interaction ------------------------------------------------

    /// Translate the view by `delta` (m). Cancels any tracking.
    pub fn pan(&mut self, delta: Vector2<f64>) {
        self.set_policy(CameraPolicy::Manual);
        self.center += delta;
    }

    pub fn zoom_in(&mut self) {
        self.set_policy(CameraPolicy::Manual);
        self.zoom *= self.config.zoom_in_factor;
    }

    pub fn zoom_out(&mut self) {
        self.set_policy(CameraPolicy::Manual);
        self.zoom *= self.config.zoom_out_factor;
    }

    /// Back to the origin at default zoom.
    pub fn reset_view(&mut self) {
        self.set_policy(CameraPolicy::Manual);
        self.center = Vector2::zeros();
        self.zoom = self.config.default_zoom;
    }

    // --- per-frame update --------------------------------------------------

    /// Apply the active policy for one rendered frame.
    ///
    /// Focus and fit-all recompute every frame; center-of-gravity following
    /// only every `cog_cadence` frames. Returns whether the view changed.
    pub fn update(&mut self, bodies: &[Body]) -> bool {
        self.frame += 1;
        match self.policy {
            CameraPolicy::Manual => false,
            CameraPolicy::FocusBody(id) => match bodies.iter().find(|b| b.id() == id) {
                Some(target) => {
                    self.center = target.position();
                    true
                }
                None => {
                    debug!(%id, "focus target gone");
                    self.set_policy(CameraPolicy::Manual);
                    false
                }
            },
            CameraPolicy::FollowCog => {
                if self.frame % u64::from(self.config.cog_cadence) != 0 {
                    return false;
                }
                match center_of_mass(bodies.iter().map(|b| (b.mass(), b.position()))) {
                    Some(cog) => {
                        self.center = cog;
                        true
                    }
                    None => false,
                }
            }
            CameraPolicy::FitAll => self.fit(bodies),
        }
    }

    fn fit(&mut self, bodies: &[Body]) -> bool {
        let Some(first) = bodies.first() else {
            return false;
        };
        let (mut min, mut max) = (first.position(), first.position());
        for b in &bodies[1..] {
            let p = b.position();
            min = min.inf(&p);
            max = max.sup(&p);
        }

        let range = max - min;
        let pad = range * self.config.fit_margin;
        let (min, max) = (min - pad, max + pad);

        self.center = (min + max) * 0.5;
        let span = ((max.x - min.x) * 0.5).max((max.y - min.y) * 0.5);
        self.zoom = if span > 0.0 { span } else { self.config.default_zoom };
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
