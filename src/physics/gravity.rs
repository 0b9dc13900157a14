use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Pairwise Newtonian gravity (direct summation, O(n^2))
// ---------------------------------------------------------------------------

/// Gravitational acceleration on every body from every other body.
///
/// `positions` and `masses` are index-aligned. `softening` is a length (m)
/// added in quadrature to each separation; 0 gives the exact inverse-square
/// law, which is singular for coincident bodies.
pub fn accelerations(
    positions: &[Vector2<f64>],
    masses: &[f64],
    g: f64,
    softening: f64,
) -> Vec<Vector2<f64>> {
    let n = positions.len().min(masses.len());
    let eps2 = softening * softening;
    let mut acc = vec![Vector2::zeros(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            let d = positions[j] - positions[i];
            let r2 = d.norm_squared() + eps2;
            let inv_r3 = 1.0 / (r2 * r2.sqrt());
            // Newton's third law: one evaluation per pair
            acc[i] += d * (g * masses[j] * inv_r3);
            acc[j] -= d * (g * masses[i] * inv_r3);
        }
    }

    acc
}

/// Mass-weighted centroid `Σ(m_i · r_i) / Σ(m_i)`.
/// `None` when there are no bodies or the total mass is not positive.
pub fn center_of_mass<I>(bodies: I) -> Option<Vector2<f64>>
where
    I: IntoIterator<Item = (f64, Vector2<f64>)>,
{
    let (total_mass, weighted) = bodies
        .into_iter()
        .fold((0.0, Vector2::zeros()), |(m, acc), (mass, pos)| {
            (m + mass, acc + pos * mass)
        });

    if total_mass > 0.0 {
        Some(weighted / total_mass)
    } else {
        None
    }
}
