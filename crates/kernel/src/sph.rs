//! SPH smoothing kernel and the density / pressure operators built on it.
//!
//! The kernel is the 2D quadratic falloff
//! ```text
//! W(r, d) = (r - d)^2 / (pi r^4 / 6)    for d < r
//! W(r, d) = 0                            for d >= r
//! ```
//! which integrates to one over the disk of radius `r`. All sums run over
//! every particle (O(n^2) per tick); there is no neighbor search.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::constants::SimulationConstants;
use crate::eos;
use crate::particle::Particle;

/// Normalization `pi r^4 / 6` of the 2D quadratic kernel.
#[inline]
pub fn volume_normalization(radius: f32) -> f32 {
    PI * radius.powi(4) / 6.0
}

/// Smoothing kernel `W(radius, distance)`.
///
/// Maximal at `distance = 0`, zero at and beyond `radius`, continuous at the
/// support boundary. `radius` must be > 0.
pub fn smoothing_kernel(radius: f32, distance: f32) -> f32 {
    if distance >= radius {
        return 0.0;
    }
    let v = radius - distance;
    v * v / volume_normalization(radius)
}

/// Derivative of [`smoothing_kernel`] with respect to `distance`.
///
/// ```text
/// dW/dd = (d - r) * 12 / (pi r^4)    for d < r
/// ```
/// Negative inside the support, zero outside.
pub fn smoothing_kernel_derivative(radius: f32, distance: f32) -> f32 {
    if distance >= radius {
        return 0.0;
    }
    let scale = 12.0 / (PI * radius.powi(4));
    (distance - radius) * scale
}

// ---------------------------------------------------------------------------
// Density estimation
// ---------------------------------------------------------------------------

/// Density at an arbitrary sample point.
///
/// ```text
/// rho(x) = sum_i m * W(r, |x_i - x|)
/// ```
///
/// `points` are the particle locations to sum over. When the sample point is
/// one of them its self-contribution `m * W(r, 0)` is included.
pub fn density_at<I>(sample: Vec2, points: I, mass: f32, radius: f32) -> f32
where
    I: IntoIterator<Item = Vec2>,
{
    points
        .into_iter()
        .map(|p| mass * smoothing_kernel(radius, p.distance(sample)))
        .sum()
}

/// Recompute every particle's density at its predicted position, summing
/// over all predicted positions.
pub fn compute_densities(particles: &mut [Particle], mass: f32, radius: f32) {
    let predicted: Vec<Vec2> = particles.iter().map(|p| p.predicted_position).collect();
    for (particle, &sample) in particles.iter_mut().zip(&predicted) {
        particle.density = density_at(sample, predicted.iter().copied(), mass, radius);
    }
}

// ---------------------------------------------------------------------------
// Pressure forces
// ---------------------------------------------------------------------------

/// Uniformly distributed unit vector in the plane.
///
/// Rejection-sampled: components are drawn from `[-1, 1]^2` until the
/// candidate is inside the unit disk and not the zero vector, then
/// normalized.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec2 {
    loop {
        let candidate = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        let length_sq = candidate.length_squared();
        if length_sq > 0.0 && length_sq <= 1.0 {
            return candidate / length_sq.sqrt();
        }
    }
}

/// Density used as a divisor, raised to `floor` when one is configured.
#[inline]
fn divisor_density(density: f32, floor: Option<f32>) -> f32 {
    match floor {
        Some(floor) => density.max(floor),
        None => density,
    }
}

/// Pressure force on particle `index`.
///
/// ```text
/// F_i = sum_{j != i} P_shared(rho_j, rho_i) * u_ij * dW/dd(r, |x_j - x_i|) * m / rho_j
/// ```
/// where `u_ij` is the unit vector from `x_i` toward `x_j` (predicted
/// positions). `dW/dd` is negative, so a positive shared pressure pushes the
/// pair apart and a negative one pulls it together. Coincident particles get
/// a random `u_ij` from `rng`.
///
/// Densities must already be computed for this tick.
pub fn pressure_force<R: Rng>(
    index: usize,
    particles: &[Particle],
    constants: &SimulationConstants,
    rng: &mut R,
) -> Vec2 {
    let radius = constants.kernel_radius;
    let this = &particles[index];
    let mut force = Vec2::ZERO;

    for (j, other) in particles.iter().enumerate() {
        if j == index {
            continue;
        }
        let offset = other.predicted_position - this.predicted_position;
        let distance = offset.length();
        if distance >= radius {
            continue;
        }
        let direction = if distance == 0.0 {
            random_direction(rng)
        } else {
            offset / distance
        };
        let slope = smoothing_kernel_derivative(radius, distance);
        let shared = eos::shared_pressure(
            other.density,
            this.density,
            constants.target_density,
            constants.pressure_multiplier,
        );
        let other_density = divisor_density(other.density, constants.min_density);
        force += shared * direction * slope * constants.mass / other_density;
    }

    force
}

/// Pressure acceleration `F_i / rho_i` for every particle, in particle order.
pub fn compute_pressure_accelerations<R: Rng>(
    particles: &[Particle],
    constants: &SimulationConstants,
    rng: &mut R,
) -> Vec<Vec2> {
    (0..particles.len())
        .map(|i| {
            let force = pressure_force(i, particles, constants, rng);
            force / divisor_density(particles[i].density, constants.min_density)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn kernel_at_zero_distance() {
        let r = 0.5;
        let w = smoothing_kernel(r, 0.0);
        let expected = 6.0 / (PI * r * r);
        assert!((w - expected).abs() < 1.0e-4, "w={w}, expected={expected}");
    }

    #[test]
    fn kernel_zero_at_and_beyond_support() {
        for &(r, d) in &[(0.5_f32, 0.5_f32), (0.5, 0.75), (1.0, 10.0), (0.1, 0.1)] {
            assert_eq!(smoothing_kernel(r, d), 0.0, "W({r}, {d})");
            assert_eq!(smoothing_kernel_derivative(r, d), 0.0, "dW({r}, {d})");
        }
    }

    #[test]
    fn kernel_continuous_at_support_edge() {
        let r = 0.35;
        let w = smoothing_kernel(r, r * (1.0 - 1.0e-4));
        assert!(w < 1.0e-5, "kernel just inside support should vanish, got {w}");
    }

    #[test]
    fn kernel_positive_inside_support() {
        let r = 1.0;
        for i in 0..20 {
            let d = i as f32 * 0.05;
            assert!(smoothing_kernel(r, d) > 0.0, "kernel should be positive at d={d}");
            assert!(smoothing_kernel_derivative(r, d) < 0.0, "slope should be negative at d={d}");
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let r = 0.8_f32;
        let eps = 1.0e-3_f32;
        for i in 1..16 {
            let d = r * i as f32 / 16.0;
            let numeric =
                (smoothing_kernel(r, d + eps) - smoothing_kernel(r, d - eps)) / (2.0 * eps);
            let analytic = smoothing_kernel_derivative(r, d);
            assert!(
                (numeric - analytic).abs() < 1.0e-2 * analytic.abs().max(1.0),
                "d={d}: numeric={numeric}, analytic={analytic}"
            );
        }
    }

    #[test]
    fn kernel_normalization_numerical() {
        // Riemann sum over the square enclosing the support disk.
        let r = 0.5_f32;
        let n = 400;
        let cell = 2.0 * r / n as f32;
        let mut integral = 0.0_f64;
        for ix in 0..n {
            let x = -r + (ix as f32 + 0.5) * cell;
            for iy in 0..n {
                let y = -r + (iy as f32 + 0.5) * cell;
                let d = (x * x + y * y).sqrt();
                integral += smoothing_kernel(r, d) as f64 * (cell * cell) as f64;
            }
        }
        assert!((integral - 1.0).abs() < 0.01, "kernel integral = {integral}, expected ~1.0");
    }

    #[test]
    fn density_decays_with_distance() {
        let r = 1.0;
        let source = [Vec2::ZERO];
        let mut previous = f32::INFINITY;
        for i in 0..10 {
            let sample = Vec2::new(i as f32 * 0.1, 0.0);
            let rho = density_at(sample, source, 1.0, r);
            assert!(rho < previous, "density should strictly decrease, step {i}");
            previous = rho;
        }
        assert_eq!(density_at(Vec2::new(1.0, 0.0), source, 1.0, r), 0.0);
    }

    #[test]
    fn density_includes_self_contribution() {
        let mut particles = vec![Particle::new(Vec2::ZERO, 0.1)];
        compute_densities(&mut particles, 1.0, 0.5);
        assert!((particles[0].density - smoothing_kernel(0.5, 0.0)).abs() < 1.0e-6);
    }

    #[test]
    fn density_uses_predicted_positions() {
        let mut a = Particle::new(Vec2::ZERO, 0.1);
        let mut b = Particle::new(Vec2::new(5.0, 0.0), 0.1);
        a.predicted_position = Vec2::new(0.1, 0.0);
        b.predicted_position = Vec2::new(0.2, 0.0);
        let mut particles = vec![a, b];
        compute_densities(&mut particles, 1.0, 0.5);
        let expected = smoothing_kernel(0.5, 0.0) + smoothing_kernel(0.5, 0.1);
        assert!((particles[0].density - expected).abs() < 1.0e-5);
        assert!((particles[1].density - expected).abs() < 1.0e-5);
    }

    #[test]
    fn random_direction_is_unit_length() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1.0e-5, "|d| = {}", d.length());
        }
    }

    fn pair(separation: f32) -> Vec<Particle> {
        vec![
            Particle::new(Vec2::ZERO, 0.05),
            Particle::new(Vec2::new(separation, 0.0), 0.05),
        ]
    }

    #[test]
    fn compressed_pair_repels() {
        let constants = SimulationConstants {
            kernel_radius: 0.5,
            target_density: 0.0,
            pressure_multiplier: 1.0,
            ..Default::default()
        };
        let mut particles = pair(0.2);
        compute_densities(&mut particles, constants.mass, constants.kernel_radius);
        let mut rng = StdRng::seed_from_u64(1);
        let acc = compute_pressure_accelerations(&particles, &constants, &mut rng);
        assert!(acc[0].x < 0.0, "left particle should be pushed left, got {:?}", acc[0]);
        assert!(acc[1].x > 0.0, "right particle should be pushed right, got {:?}", acc[1]);
        assert!((acc[0] + acc[1]).length() < 1.0e-5, "forces should cancel: {acc:?}");
        assert!(acc[0].y.abs() < 1.0e-6);
    }

    #[test]
    fn sparse_pair_attracts() {
        let constants = SimulationConstants {
            kernel_radius: 0.5,
            target_density: 100.0,
            pressure_multiplier: 1.0,
            ..Default::default()
        };
        let mut particles = pair(0.2);
        compute_densities(&mut particles, constants.mass, constants.kernel_radius);
        let mut rng = StdRng::seed_from_u64(1);
        let acc = compute_pressure_accelerations(&particles, &constants, &mut rng);
        assert!(acc[0].x > 0.0, "below target the pair should pull together");
        assert!(acc[1].x < 0.0);
    }

    #[test]
    fn isolated_particle_feels_no_pressure() {
        let constants = SimulationConstants::default();
        let mut particles = pair(10.0);
        compute_densities(&mut particles, constants.mass, constants.kernel_radius);
        let mut rng = StdRng::seed_from_u64(3);
        let acc = compute_pressure_accelerations(&particles, &constants, &mut rng);
        assert_eq!(acc, vec![Vec2::ZERO, Vec2::ZERO]);
    }

    #[test]
    fn coincident_pair_gets_finite_force() {
        let constants = SimulationConstants {
            kernel_radius: 0.5,
            ..Default::default()
        };
        let magnitudes: Vec<f32> = (0..8)
            .map(|seed| {
                let mut particles = pair(0.0);
                compute_densities(&mut particles, constants.mass, constants.kernel_radius);
                let mut rng = StdRng::seed_from_u64(seed);
                let force = pressure_force(0, &particles, &constants, &mut rng);
                assert!(force.is_finite(), "seed {seed}: {force:?}");
                force.length()
            })
            .collect();
        for m in &magnitudes {
            assert!((m - magnitudes[0]).abs() < 1.0e-4 * magnitudes[0].max(1.0));
        }
    }

    #[test]
    fn density_floor_limits_divisor() {
        assert_eq!(divisor_density(0.0, Some(0.5)), 0.5);
        assert_eq!(divisor_density(2.0, Some(0.5)), 2.0);
        assert_eq!(divisor_density(0.0, None), 0.0);
    }
}
