//! Equation of state for the droplet fluid.
//!
//! A linear spring toward the target density: pressure is negative
//! (attractive) below the target and positive (repulsive) above it.

/// Linear equation of state.
///
/// ```text
/// P = (rho - rho_target) * k     for rho >= 0
/// P = 0                          for rho < 0
/// ```
///
/// # Arguments
/// * `density` - Local density estimate.
/// * `target_density` - Density the fluid relaxes toward.
/// * `pressure_multiplier` - Stiffness `k`.
pub fn density_to_pressure(density: f32, target_density: f32, pressure_multiplier: f32) -> f32 {
    if density < 0.0 {
        return 0.0;
    }
    (density - target_density) * pressure_multiplier
}

/// Symmetrized pressure of a particle pair, the mean of both pressures.
///
/// Using the same value for `(a, b)` and `(b, a)` keeps pairwise forces
/// equal and opposite.
pub fn shared_pressure(
    density_a: f32,
    density_b: f32,
    target_density: f32,
    pressure_multiplier: f32,
) -> f32 {
    let pressure_a = density_to_pressure(density_a, target_density, pressure_multiplier);
    let pressure_b = density_to_pressure(density_b, target_density, pressure_multiplier);
    0.5 * (pressure_a + pressure_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_at_target_is_zero() {
        let p = density_to_pressure(2.75, 2.75, 10.0);
        assert!(p.abs() < 1.0e-6, "pressure at target density should be 0, got {p}");
    }

    #[test]
    fn pressure_positive_when_compressed() {
        let p = density_to_pressure(3.0, 2.0, 4.0);
        assert!((p - 4.0).abs() < 1.0e-6, "got {p}");
    }

    #[test]
    fn pressure_negative_when_sparse() {
        let p = density_to_pressure(1.0, 2.0, 4.0);
        assert!(p < 0.0, "sub-target density should pull, got {p}");
    }

    #[test]
    fn negative_density_has_no_pressure() {
        assert_eq!(density_to_pressure(-1.0, 2.0, 4.0), 0.0);
    }

    #[test]
    fn shared_pressure_is_symmetric_mean() {
        let ab = shared_pressure(1.0, 5.0, 2.0, 3.0);
        let ba = shared_pressure(5.0, 1.0, 2.0, 3.0);
        assert_eq!(ab, ba);
        // (-3 + 9) / 2
        assert!((ab - 3.0).abs() < 1.0e-6);
    }
}
