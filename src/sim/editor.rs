use nalgebra::Vector2;
use tracing::debug;

use crate::error::{IllegalState, Result, ValidationError};
use crate::physics::constants::{AU, EARTH_MASS};
use crate::sim::body::{BodyId, BodySpec, PALETTE};
use crate::sim::state::{Mode, SimulationState};

/// Velocity per unit of arrow length: 1 AU of drag is 30 km/s.
pub const ARROW_SCALE: f64 = 30_000.0 / AU;

/// Default click radius for picking a body.
pub const HIT_TOLERANCE: f64 = 0.1 * AU;

/// Arrows shorter than this are not drawn.
pub const MIN_ARROW_LENGTH: f64 = 0.01 * AU;

/// Velocity given by an arrow dragged from `start` to `end`.
pub fn velocity_from_drag(start: &Vector2<f64>, end: &Vector2<f64>) -> Vector2<f64> {
    (end - start) * ARROW_SCALE
}

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

/// What a pointer press means right now. Bodies are referenced by id and
/// re-resolved on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Presses start a velocity arrow from this body.
    EditingVelocity(BodyId),
    /// An arrow is being dragged; release sets the velocity.
    DraggingArrow(BodyId),
    /// The next press on a body makes it the orbit target of this one.
    PickingOrbitTarget(BodyId),
}

/// Result of a press in the authoring view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    Selected(BodyId),
    Added(BodyId),
    ArrowStarted(BodyId),
    OrbitTargetSet { body: BodyId, target: BodyId },
    /// Pressed empty space while picking a target.
    Cancelled,
}

/// Authoring-time pointer handling on top of `SimulationState`.
#[derive(Debug, Clone)]
pub struct Editor {
    interaction: Interaction,
    orbit_target: Option<BodyId>,
    pub clockwise: bool,
    pub hit_tolerance: f64,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            interaction: Interaction::Idle,
            orbit_target: None,
            clockwise: false,
            hit_tolerance: HIT_TOLERANCE,
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current interaction, with stale body references dropped.
    pub fn interaction(&mut self, sim: &SimulationState) -> Interaction {
        self.revalidate(sim);
        self.interaction
    }

    pub fn orbit_target(&mut self, sim: &SimulationState) -> Option<BodyId> {
        self.revalidate(sim);
        self.orbit_target
    }

    /// Drop everything; used when leaving authoring or clearing the scene.
    pub fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.orbit_target = None;
    }

    fn revalidate(&mut self, sim: &SimulationState) {
        let alive = |id: BodyId| sim.body(id).is_some();
        let stale = match self.interaction {
            Interaction::Idle => false,
            Interaction::EditingVelocity(id)
            | Interaction::DraggingArrow(id)
            | Interaction::PickingOrbitTarget(id) => !alive(id),
        };
        if stale || sim.mode() != Mode::Authoring {
            self.interaction = Interaction::Idle;
        }
        if self.orbit_target.is_some_and(|id| !alive(id)) {
            self.orbit_target = None;
        }
    }

    fn require_selected(&self, sim: &SimulationState) -> Result<BodyId> {
        if sim.mode() != Mode::Authoring {
            return Err(IllegalState::WrongMode {
                expected: Mode::Authoring,
                actual: sim.mode(),
            }
            .into());
        }
        sim.selected_id()
            .filter(|id| sim.body(*id).is_some())
            .ok_or_else(|| IllegalState::NoSelection.into())
    }

    // --- modes -------------------------------------------------------------

    /// Toggle velocity-arrow editing for the selected body.
    /// Returns whether arrow editing is now active.
    pub fn toggle_velocity_edit(&mut self, sim: &SimulationState) -> Result<bool> {
        self.revalidate(sim);
        let id = self.require_selected(sim)?;
        match self.interaction {
            Interaction::EditingVelocity(cur) | Interaction::DraggingArrow(cur) if cur == id => {
                self.interaction = Interaction::Idle;
                Ok(false)
            }
            _ => {
                self.interaction = Interaction::EditingVelocity(id);
                Ok(true)
            }
        }
    }

    /// Next press on a body picks it as the selected body's orbit target.
    pub fn start_picking_orbit_target(&mut self, sim: &SimulationState) -> Result<()> {
        self.revalidate(sim);
        let id = self.require_selected(sim)?;
        self.interaction = Interaction::PickingOrbitTarget(id);
        Ok(())
    }

    pub fn clear_orbit_target(&mut self) {
        self.orbit_target = None;
    }

    // --- pointer events ----------------------------------------------------

    /// Press at `point` (m) in the authoring view.
    pub fn press(&mut self, sim: &mut SimulationState, point: Vector2<f64>) -> Result<PressOutcome> {
        self.revalidate(sim);
        if sim.mode() != Mode::Authoring {
            return Err(IllegalState::WrongMode {
                expected: Mode::Authoring,
                actual: sim.mode(),
            }
            .into());
        }

        let hit = sim.body_at(&point, self.hit_tolerance);

        match self.interaction {
            Interaction::PickingOrbitTarget(body) => {
                self.interaction = Interaction::Idle;
                match hit {
                    Some(target) if target == body => Err(ValidationError::SelfOrbit(body).into()),
                    Some(target) => {
                        self.orbit_target = Some(target);
                        debug!(%body, %target, "orbit target picked");
                        Ok(PressOutcome::OrbitTargetSet { body, target })
                    }
                    None => Ok(PressOutcome::Cancelled),
                }
            }
            Interaction::EditingVelocity(id) | Interaction::DraggingArrow(id) => {
                self.interaction = Interaction::DraggingArrow(id);
                Ok(PressOutcome::ArrowStarted(id))
            }
            Interaction::Idle => match hit {
                Some(id) => {
                    sim.select(id)?;
                    Ok(PressOutcome::Selected(id))
                }
                None => self.add_body_at(sim, point).map(PressOutcome::Added),
            },
        }
    }

    /// Arrow to draw while dragging: `(start, velocity)`, or `None` when no
    /// arrow is being dragged or it is too short to show.
    pub fn arrow_preview(
        &self,
        sim: &SimulationState,
        point: Vector2<f64>,
    ) -> Option<(Vector2<f64>, Vector2<f64>)> {
        let Interaction::DraggingArrow(id) = self.interaction else {
            return None;
        };
        let start = sim.body(id)?.position();
        if (point - start).norm() <= MIN_ARROW_LENGTH {
            return None;
        }
        Some((start, velocity_from_drag(&start, &point)))
    }

    /// Release at `point`. Finishing an arrow drag sets the body's velocity
    /// and returns it.
    pub fn release(
        &mut self,
        sim: &mut SimulationState,
        point: Vector2<f64>,
    ) -> Result<Option<Vector2<f64>>> {
        self.revalidate(sim);
        let Interaction::DraggingArrow(id) = self.interaction else {
            return Ok(None);
        };
        self.interaction = Interaction::EditingVelocity(id);

        let start = match sim.body(id) {
            Some(b) => b.position(),
            None => return Err(IllegalState::UnknownBody(id).into()),
        };
        let velocity = velocity_from_drag(&start, &point);
        sim.set_body_velocity(id, velocity)?;
        debug!(%id, speed = velocity.norm(), "velocity set from arrow");
        Ok(Some(velocity))
    }

    // --- edits -------------------------------------------------------------

    /// Add an Earth-mass body at rest at `point` and select it.
    pub fn add_body_at(&mut self, sim: &mut SimulationState, point: Vector2<f64>) -> Result<BodyId> {
        let n = sim.len() + 1;
        let spec = BodySpec::new(
            format!("Body {n}"),
            EARTH_MASS,
            point,
            Vector2::zeros(),
            PALETTE[n % PALETTE.len()],
        );
        let id = sim.add_body(spec)?;
        sim.select(id)?;
        Ok(id)
    }

    /// Put the selected body on a circular orbit around the picked target.
    pub fn apply_orbit(&mut self, sim: &mut SimulationState) -> Result<Vector2<f64>> {
        self.revalidate(sim);
        let id = self.require_selected(sim)?;
        let target = self
            .orbit_target
            .ok_or(ValidationError::NoOrbitTarget)?;
        sim.apply_circular_orbit(id, target, self.clockwise)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::physics::constants::SOLAR_MASS;

    fn scene() -> (SimulationState, BodyId) {
        let mut sim = SimulationState::default();
        let sun = sim
            .add_body(BodySpec::new("Sun", SOLAR_MASS, Vector2::zeros(), Vector2::zeros(), "#FDB813"))
            .unwrap();
        (sim, sun)
    }

    #[test]
    fn arrow_scale_is_30_kms_per_au() {
        let v = velocity_from_drag(&Vector2::zeros(), &Vector2::new(0.0, AU));
        assert!((v.y - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn click_on_empty_space_adds_and_selects() {
        let (mut sim, _) = scene();
        let mut ed = Editor::new();
        let out = ed.press(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        let PressOutcome::Added(id) = out else {
            panic!("expected a new body, got {:?}", out);
        };
        let body = sim.body(id).unwrap();
        assert_eq!(body.name, "Body 2");
        assert_eq!(body.mass(), EARTH_MASS);
        assert_eq!(body.color.as_str(), PALETTE[2]);
        assert_eq!(sim.selected_id(), Some(id));
    }

    #[test]
    fn click_on_body_selects_it() {
        let (mut sim, sun) = scene();
        let mut ed = Editor::new();
        let out = ed.press(&mut sim, Vector2::new(0.05 * AU, 0.0)).unwrap();
        assert_eq!(out, PressOutcome::Selected(sun));
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn arrow_drag_sets_velocity() {
        let (mut sim, _) = scene();
        let mut ed = Editor::new();
        let earth = ed.add_body_at(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        assert!(ed.toggle_velocity_edit(&sim).unwrap());

        let out = ed.press(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        assert_eq!(out, PressOutcome::ArrowStarted(earth));
        assert!(ed.arrow_preview(&sim, Vector2::new(AU, 0.001 * AU)).is_none());
        let (start, preview) = ed.arrow_preview(&sim, Vector2::new(AU, AU)).unwrap();
        assert_eq!(start, Vector2::new(AU, 0.0));

        let v = ed.release(&mut sim, Vector2::new(AU, AU)).unwrap().unwrap();
        assert_eq!(v, preview);
        assert_eq!(sim.body(earth).unwrap().velocity(), v);
        assert_eq!(ed.interaction(&sim), Interaction::EditingVelocity(earth));
        assert!(!ed.toggle_velocity_edit(&sim).unwrap());
    }

    #[test]
    fn orbit_target_flow() {
        let (mut sim, sun) = scene();
        let mut ed = Editor::new();
        let earth = ed.add_body_at(&mut sim, Vector2::new(AU, 0.0)).unwrap();

        ed.start_picking_orbit_target(&sim).unwrap();
        let out = ed.press(&mut sim, Vector2::zeros()).unwrap();
        assert_eq!(out, PressOutcome::OrbitTargetSet { body: earth, target: sun });

        let v = ed.apply_orbit(&mut sim).unwrap();
        assert!(v.y > 29_000.0, "counter-clockwise from +x moves toward +y");
        ed.clockwise = true;
        let v = ed.apply_orbit(&mut sim).unwrap();
        assert!(v.y < -29_000.0);
    }

    #[test]
    fn picking_self_as_target_is_rejected() {
        let (mut sim, _) = scene();
        let mut ed = Editor::new();
        let earth = ed.add_body_at(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        ed.start_picking_orbit_target(&sim).unwrap();
        let err = ed.press(&mut sim, Vector2::new(AU, 0.0)).unwrap_err();
        assert_eq!(err, SimError::Validation(ValidationError::SelfOrbit(earth)));
        assert_eq!(ed.interaction(&sim), Interaction::Idle);
    }

    #[test]
    fn deleted_target_is_forgotten() {
        let (mut sim, sun) = scene();
        let mut ed = Editor::new();
        ed.add_body_at(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        ed.start_picking_orbit_target(&sim).unwrap();
        ed.press(&mut sim, Vector2::zeros()).unwrap();
        sim.remove_body(sun).unwrap();
        assert_eq!(ed.orbit_target(&sim), None);
        assert!(ed.apply_orbit(&mut sim).is_err());
    }

    #[test]
    fn deleted_arrow_body_resets_interaction() {
        let (mut sim, _) = scene();
        let mut ed = Editor::new();
        let earth = ed.add_body_at(&mut sim, Vector2::new(AU, 0.0)).unwrap();
        ed.toggle_velocity_edit(&sim).unwrap();
        sim.remove_body(earth).unwrap();
        assert_eq!(ed.interaction(&sim), Interaction::Idle);
        // A press now behaves as a plain click again
        let out = ed.press(&mut sim, Vector2::new(2.0 * AU, 0.0)).unwrap();
        assert!(matches!(out, PressOutcome::Added(_)));
    }

    #[test]
    fn presses_are_rejected_during_playback() {
        let (mut sim, _) = scene();
        let mut ed = Editor::new();
        sim.enter_playback().unwrap();
        assert!(ed.press(&mut sim, Vector2::new(AU, 0.0)).unwrap_err().is_illegal_state());
        assert_eq!(sim.len(), 1);
    }
}
