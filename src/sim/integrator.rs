use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError, ValidationError};
use crate::physics::gravity::accelerations;

// ---------------------------------------------------------------------------
// Integrator seam
// ---------------------------------------------------------------------------

/// Integrator-side body representation: `{mass, x, y, vx, vy}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub mass: f64,
    pub pos: Vector2<f64>, // m
    pub vel: Vector2<f64>, // m/s
}

/// Trait for gravitational integrators.
///
/// Implementations are seeded with an ordered body list and must report
/// bodies in that same order and count after every step. A step is atomic:
/// on error the previous state must still be what `bodies` returns.
pub trait Integrator {
    /// Advance every body by exactly `dt` seconds.
    fn step(&mut self, dt: f64) -> Result<()>;

    /// Current state, index-aligned with the seed list.
    fn bodies(&self) -> &[PointMass];

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Builds an integrator from the seed bodies, in insertion order.
pub type IntegratorFactory = Box<dyn Fn(Vec<PointMass>) -> Box<dyn Integrator>>;

/// Bundled integration schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Classical 4th-order Runge-Kutta.
    #[default]
    Rk4,
    /// Velocity Verlet (kick-drift-kick), symplectic.
    Verlet,
}

impl Scheme {
    /// Factory for this scheme with the given gravity constant and softening.
    pub fn factory(self, g: f64, softening: f64) -> IntegratorFactory {
        match self {
            Scheme::Rk4 => Box::new(move |bodies: Vec<PointMass>| -> Box<dyn Integrator> {
                Box::new(Rk4::new(bodies, g, softening))
            }),
            Scheme::Verlet => Box::new(move |bodies: Vec<PointMass>| -> Box<dyn Integrator> {
                Box::new(VelocityVerlet::new(bodies, g, softening))
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Rk4 => write!(f, "rk4"),
            Scheme::Verlet => write!(f, "verlet"),
        }
    }
}

impl FromStr for Scheme {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rk4" => Ok(Scheme::Rk4),
            "verlet" => Ok(Scheme::Verlet),
            _ => Err(ValidationError::UnknownScheme(s.to_string()).into()),
        }
    }
}

fn positions(bodies: &[PointMass]) -> Vec<Vector2<f64>> {
    bodies.iter().map(|b| b.pos).collect()
}

fn masses(bodies: &[PointMass]) -> Vec<f64> {
    bodies.iter().map(|b| b.mass).collect()
}

/// Fail if any body left the representable range.
fn check_finite(bodies: &[PointMass], scheme: &str) -> Result<()> {
    match bodies
        .iter()
        .position(|b| !(b.pos.iter().chain(b.vel.iter()).all(|c| c.is_finite())))
    {
        Some(i) => Err(SimError::Integrator(format!(
            "{scheme}: body {i} has a non-finite state (close encounter without softening?)"
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta
// ---------------------------------------------------------------------------

pub struct Rk4 {
    bodies: Vec<PointMass>,
    g: f64,
    softening: f64,
}

impl Rk4 {
    pub fn new(bodies: Vec<PointMass>, g: f64, softening: f64) -> Self {
        Self { bodies, g, softening }
    }

    fn accel(&self, pos: &[Vector2<f64>], mass: &[f64]) -> Vec<Vector2<f64>> {
        accelerations(pos, mass, self.g, self.softening)
    }
}

impl Integrator for Rk4 {
    fn step(&mut self, dt: f64) -> Result<()> {
        let mass = masses(&self.bodies);
        let p0 = positions(&self.bodies);
        let v0: Vec<Vector2<f64>> = self.bodies.iter().map(|b| b.vel).collect();

        // Stage states: p + k_dp * h, v + k_dv * h
        let offset = |base: &[Vector2<f64>], k: &[Vector2<f64>], h: f64| -> Vec<Vector2<f64>> {
            base.iter().zip(k).map(|(b, k)| b + k * h).collect()
        };

        let k1_dp = v0.clone();
        let k1_dv = self.accel(&p0, &mass);

        let p2 = offset(&p0, &k1_dp, dt * 0.5);
        let k2_dp = offset(&v0, &k1_dv, dt * 0.5);
        let k2_dv = self.accel(&p2, &mass);

        let p3 = offset(&p0, &k2_dp, dt * 0.5);
        let k3_dp = offset(&v0, &k2_dv, dt * 0.5);
        let k3_dv = self.accel(&p3, &mass);

        let p4 = offset(&p0, &k3_dp, dt);
        let k4_dp = offset(&v0, &k3_dv, dt);
        let k4_dv = self.accel(&p4, &mass);

        let next: Vec<PointMass> = (0..self.bodies.len())
            .map(|i| PointMass {
                mass: mass[i],
                pos: p0[i]
                    + (k1_dp[i] + 2.0 * k2_dp[i] + 2.0 * k3_dp[i] + k4_dp[i]) * (dt / 6.0),
                vel: v0[i]
                    + (k1_dv[i] + 2.0 * k2_dv[i] + 2.0 * k3_dv[i] + k4_dv[i]) * (dt / 6.0),
            })
            .collect();

        check_finite(&next, self.name())?;
        self.bodies = next;
        Ok(())
    }

    fn bodies(&self) -> &[PointMass] {
        &self.bodies
    }

    fn name(&self) -> &str {
        "rk4"
    }
}

// ---------------------------------------------------------------------------
// Velocity Verlet
// ---------------------------------------------------------------------------

pub struct VelocityVerlet {
    bodies: Vec<PointMass>,
    g: f64,
    softening: f64,
}

impl VelocityVerlet {
    pub fn new(bodies: Vec<PointMass>, g: f64, softening: f64) -> Self {
        Self { bodies, g, softening }
    }
}

impl Integrator for VelocityVerlet {
    fn step(&mut self, dt: f64) -> Result<()> {
        let half_dt = 0.5 * dt;
        let mass = masses(&self.bodies);
        let mut next = self.bodies.clone();

        // Kick: v_{n+1/2} = v_n + dt/2 * a_n
        let a_old = accelerations(&positions(&next), &mass, self.g, self.softening);
        for (b, a) in next.iter_mut().zip(&a_old) {
            b.vel += a * half_dt;
        }

        // Drift: x_{n+1} = x_n + dt * v_{n+1/2}
        for b in next.iter_mut() {
            b.pos += b.vel * dt;
        }

        // Kick: v_{n+1} = v_{n+1/2} + dt/2 * a_{n+1}
        let a_new = accelerations(&positions(&next), &mass, self.g, self.softening);
        for (b, a) in next.iter_mut().zip(&a_new) {
            b.vel += a * half_dt;
        }

        check_finite(&next, self.name())?;
        self.bodies = next;
        Ok(())
    }

    fn bodies(&self) -> &[PointMass] {
        &self.bodies
    }

    fn name(&self) -> &str {
        "verlet"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::circular_orbit_speed;
    use crate::physics::constants::{AU, EARTH_MASS, G, SOLAR_MASS, YEAR};

    fn sun_earth() -> Vec<PointMass> {
        let v = circular_orbit_speed(SOLAR_MASS, EARTH_MASS, AU, G);
        vec![
            PointMass {
                mass: SOLAR_MASS,
                pos: Vector2::zeros(),
                vel: Vector2::zeros(),
            },
            PointMass {
                mass: EARTH_MASS,
                pos: Vector2::new(AU, 0.0),
                vel: Vector2::new(0.0, v),
            },
        ]
    }

    fn separation_drift(scheme: Scheme) -> f64 {
        let mut integ = scheme.factory(G, 0.0)(sun_earth());
        let dt = 3600.0;
        let steps = (YEAR / dt) as usize;
        let mut worst: f64 = 0.0;
        for _ in 0..steps {
            integ.step(dt).unwrap();
            let b = integ.bodies();
            let r = (b[1].pos - b[0].pos).norm();
            worst = worst.max((r - AU).abs() / AU);
        }
        worst
    }

    #[test]
    fn rk4_circular_orbit_stays_circular() {
        let drift = separation_drift(Scheme::Rk4);
        assert!(drift < 1e-3, "RK4 separation drift over a year: {:.2e}", drift);
    }

    #[test]
    fn verlet_circular_orbit_stays_circular() {
        let drift = separation_drift(Scheme::Verlet);
        assert!(drift < 1e-3, "Verlet separation drift over a year: {:.2e}", drift);
    }

    #[test]
    fn order_and_count_preserved() {
        let seed = sun_earth();
        let mut integ = Rk4::new(seed.clone(), G, 0.0);
        integ.step(60.0).unwrap();
        assert_eq!(integ.bodies().len(), seed.len());
        for (before, after) in seed.iter().zip(integ.bodies()) {
            assert_eq!(before.mass, after.mass);
        }
        // Earth is still the one far from the origin
        assert!(integ.bodies()[1].pos.x > 0.9 * AU);
    }

    #[test]
    fn coincident_bodies_fail_atomically() {
        let seed = vec![
            PointMass { mass: 1.0, pos: Vector2::zeros(), vel: Vector2::zeros() },
            PointMass { mass: 1.0, pos: Vector2::zeros(), vel: Vector2::zeros() },
        ];
        for scheme in [Scheme::Rk4, Scheme::Verlet] {
            let mut integ = scheme.factory(1.0, 0.0)(seed.clone());
            let err = integ.step(1.0).unwrap_err();
            assert!(matches!(err, SimError::Integrator(_)), "{scheme}: {err}");
            assert_eq!(integ.bodies(), &seed[..], "{scheme}: state must be unchanged");
        }
    }

    #[test]
    fn softening_lets_coincident_bodies_step() {
        let seed = vec![
            PointMass { mass: 1.0, pos: Vector2::zeros(), vel: Vector2::zeros() },
            PointMass { mass: 1.0, pos: Vector2::zeros(), vel: Vector2::zeros() },
        ];
        let mut integ = Scheme::Verlet.factory(1.0, 0.5)(seed);
        assert!(integ.step(1.0).is_ok());
    }

    #[test]
    fn scheme_parses() {
        assert_eq!("RK4".parse::<Scheme>().unwrap(), Scheme::Rk4);
        assert_eq!("verlet".parse::<Scheme>().unwrap(), Scheme::Verlet);
        assert!("euler".parse::<Scheme>().is_err());
    }
}
