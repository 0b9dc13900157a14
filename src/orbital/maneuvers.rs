use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Two-body orbit helpers used when authoring initial conditions
// ---------------------------------------------------------------------------

/// Circular orbit speed `sqrt(G (M + m) / r)`.
///
/// `distance <= 0` is degenerate and yields 0 rather than an error.
pub fn circular_orbit_speed(central_mass: f64, orbiting_mass: f64, distance: f64, g: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    (g * (central_mass + orbiting_mass) / distance).sqrt()
}

/// Escape speed `sqrt(2 G M / r)`; 0 for `distance <= 0`.
pub fn escape_speed(mass: f64, distance: f64, g: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    (2.0 * g * mass / distance).sqrt()
}

/// Velocity that puts `orbiting_pos` on a circular orbit around `central_pos`.
///
/// The result is perpendicular to the separation: rotated +90 deg for a
/// counter-clockwise orbit, -90 deg for clockwise. Every other body in the
/// scene is ignored (two-body approximation). Coincident positions give the
/// zero vector.
pub fn orbital_velocity_vector(
    central_pos: &Vector2<f64>,
    orbiting_pos: &Vector2<f64>,
    central_mass: f64,
    orbiting_mass: f64,
    g: f64,
    clockwise: bool,
) -> Vector2<f64> {
    let d = orbiting_pos - central_pos;
    let distance = d.norm();
    if distance == 0.0 {
        return Vector2::zeros();
    }

    let speed = circular_orbit_speed(central_mass, orbiting_mass, distance, g);
    let dir = d / distance;

    if clockwise {
        Vector2::new(dir.y, -dir.x) * speed
    } else {
        Vector2::new(-dir.y, dir.x) * speed
    }
}

/// Unit vector along `v`, or zero for the zero vector.
pub fn normalize_or_zero(v: &Vector2<f64>) -> Vector2<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}
