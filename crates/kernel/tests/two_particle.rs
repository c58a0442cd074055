//! Two-particle symmetry test.
//!
//! Verifies Newton's 3rd law (pressure accelerations equal and opposite) and
//! momentum conservation for small systems without gravity.

use droplet_kernel::sph::compute_pressure_accelerations;
use droplet_kernel::{Particle, Simulation, SimulationConstants, SimulationKernel};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn weightless() -> SimulationConstants {
    SimulationConstants {
        gravity: Vec2::ZERO,
        ..Default::default()
    }
}

/// Two particles at rest separated by `d` along the x-axis, centered on the origin.
fn setup_two_particles(constants: SimulationConstants, d: f32) -> Simulation {
    let mut sim = Simulation::seeded(constants, 3).unwrap();
    sim.replace_particles(vec![
        Particle::new(Vec2::new(-0.5 * d, 0.0), 0.05),
        Particle::new(Vec2::new(0.5 * d, 0.0), 0.05),
    ])
    .unwrap();
    sim
}

#[test]
fn forces_equal_and_opposite() {
    let mut sim = setup_two_particles(weightless(), 0.2);
    sim.step(1.0 / 120.0);

    let p = sim.particles();
    let sum = p[0].velocity + p[1].velocity;
    assert!(
        sum.length() < 1.0e-6,
        "velocities not equal and opposite: v0={:?}, v1={:?}, sum={sum:?}",
        p[0].velocity,
        p[1].velocity
    );
    assert!(p[0].velocity.y.abs() < 1.0e-7 && p[1].velocity.y.abs() < 1.0e-7);
    assert_eq!(p[0].density, p[1].density, "symmetric pair must share density");
}

#[test]
fn compressed_pair_repels() {
    // Target zero: any positive density is over-compressed.
    let constants = SimulationConstants {
        target_density: 0.0,
        pressure_multiplier: 1.0,
        ..weightless()
    };
    let mut sim = setup_two_particles(constants, 0.2);
    sim.step(1.0 / 120.0);

    let p = sim.particles();
    assert!(p[0].velocity.x < 0.0, "left particle should move left, v={:?}", p[0].velocity);
    assert!(p[1].velocity.x > 0.0, "right particle should move right, v={:?}", p[1].velocity);
}

#[test]
fn sparse_pair_attracts() {
    let constants = SimulationConstants {
        target_density: 100.0,
        pressure_multiplier: 1.0,
        ..weightless()
    };
    let mut sim = setup_two_particles(constants, 0.2);
    sim.step(1.0 / 120.0);

    let p = sim.particles();
    assert!(p[0].velocity.x > 0.0, "left particle should move right, v={:?}", p[0].velocity);
    assert!(p[1].velocity.x < 0.0, "right particle should move left, v={:?}", p[1].velocity);
}

#[test]
fn separated_pair_feels_nothing() {
    let mut sim = setup_two_particles(weightless(), 1.0);
    sim.step(1.0 / 120.0);
    for p in sim.particles() {
        assert_eq!(p.velocity, Vec2::ZERO);
    }
}

#[test]
fn momentum_conserved_for_random_cluster() {
    let constants = SimulationConstants {
        pressure_multiplier: 2.0,
        ..weightless()
    };
    let mut rng = StdRng::seed_from_u64(99);
    let mut particles: Vec<Particle> = (0..30)
        .map(|_| {
            let x = rng.random_range(-0.4..0.4);
            let y = rng.random_range(-0.4..0.4);
            Particle::new(Vec2::new(x, y), 0.02)
        })
        .collect();
    droplet_kernel::sph::compute_densities(&mut particles, constants.mass, constants.kernel_radius);

    let accelerations = compute_pressure_accelerations(&particles, &constants, &mut rng);
    let total: Vec2 = accelerations.iter().copied().sum();
    let scale = accelerations
        .iter()
        .map(|a| a.length())
        .fold(0.0_f32, f32::max);

    assert!(scale > 0.0, "cluster should feel pressure");
    assert!(
        total.length() < 1.0e-4 * scale * accelerations.len() as f32,
        "net pressure acceleration {total:?} (largest |a| = {scale})"
    );
}
