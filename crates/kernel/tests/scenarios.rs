//! End-to-end scenarios through the public `SimulationKernel` interface.
//!
//! - A single drop falling onto the floor and settling (or not) depending on
//!   collision damping
//! - Two coincident drops, which exercise the random-direction fallback
//! - A nine-drop grid reset
//! - Long random runs that must stay contained and finite

use droplet_kernel::boundary::is_contained;
use droplet_kernel::sph::pressure_force;
use droplet_kernel::{Layout, Particle, Simulation, SimulationConstants, SimulationKernel};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn single_drop(collision_damping: f32) -> Simulation {
    let constants = SimulationConstants {
        collision_damping,
        ..Default::default()
    };
    let mut sim = Simulation::seeded(constants, 1).unwrap();
    sim.reset(Layout::Grid, 1).unwrap();
    sim
}

/// Largest |vy| over `ticks` ticks after `warmup` ticks.
fn peak_speed(sim: &mut Simulation, warmup: usize, ticks: usize) -> f32 {
    for _ in 0..warmup {
        sim.step(DT);
    }
    let mut peak = 0.0_f32;
    for _ in 0..ticks {
        sim.step(DT);
        peak = peak.max(sim.particles()[0].velocity.y.abs());
    }
    peak
}

#[test]
fn damped_drop_settles_on_floor() {
    let mut sim = single_drop(0.5);
    assert_eq!(sim.particles()[0].radius, 0.1);

    for _ in 0..540 {
        sim.step(DT);
    }
    // Gravity is re-applied every tick, so a resting drop keeps a small
    // bounce of at most one tick's worth of gravity.
    let bound = 9.81 * DT;
    for tick in 0..60 {
        sim.step(DT);
        let p = sim.particles()[0];
        assert!(
            (p.position.y + 1.9).abs() < 1.0e-3,
            "tick {tick}: drop should rest on the floor, y = {}",
            p.position.y
        );
        assert!(
            p.velocity.y.abs() <= bound,
            "tick {tick}: residual bounce too large, vy = {}",
            p.velocity.y
        );
        assert_eq!(p.position.x, 0.0);
    }
}

#[test]
fn damping_shrinks_the_steady_bounce() {
    let damped = peak_speed(&mut single_drop(0.5), 480, 120);
    let undamped = peak_speed(&mut single_drop(1.0), 480, 120);
    assert!(
        damped < 0.1 * undamped,
        "damped peak {damped} should be far below undamped peak {undamped}"
    );
}

#[test]
fn coincident_pair_gets_finite_force() {
    let constants = SimulationConstants::default();
    let mut particles = vec![
        Particle::new(Vec2::new(0.3, 0.2), 0.05),
        Particle::new(Vec2::new(0.3, 0.2), 0.05),
    ];
    droplet_kernel::sph::compute_densities(&mut particles, constants.mass, constants.kernel_radius);

    let forces: Vec<Vec2> = (0..8)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            pressure_force(0, &particles, &constants, &mut rng)
        })
        .collect();
    for (seed, force) in forces.iter().enumerate() {
        assert!(force.is_finite(), "seed {seed}: force {force:?}");
    }

    // Only the direction is random.
    let magnitude = forces[0].length();
    assert!(magnitude > 0.0);
    for force in &forces {
        assert!(
            (force.length() - magnitude).abs() < 1.0e-3 * magnitude.max(1.0),
            "magnitudes differ: {forces:?}"
        );
    }
    let first = forces[0].normalize();
    assert!(
        forces[1..].iter().any(|f| f.normalize().dot(first) < 0.99),
        "every seed pushed the same way: {forces:?}"
    );
}

#[test]
fn coincident_pair_step_stays_finite() {
    let mut sim = Simulation::seeded(SimulationConstants::default(), 5).unwrap();
    sim.replace_particles(vec![
        Particle::new(Vec2::ZERO, 0.05),
        Particle::new(Vec2::ZERO, 0.05),
    ])
    .unwrap();
    for _ in 0..10 {
        sim.step(DT);
    }
    for p in sim.particles() {
        assert!(p.position.is_finite() && p.velocity.is_finite(), "{p:?}");
        assert!(is_contained(p, 6.0, 4.0));
    }
}

#[test]
fn grid_reset_of_nine() {
    let mut sim = Simulation::seeded(SimulationConstants::default(), 0).unwrap();
    sim.reset(Layout::Grid, 9).unwrap();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.len(), 9);

    let centroid: Vec2 = snapshot.iter().map(|p| p.position).sum::<Vec2>() / 9.0;
    assert!(centroid.length() < 1.0e-5, "grid should be centered, got {centroid:?}");
    for p in &snapshot {
        assert!((p.radius - 1.0 / 3.0).abs() < 1.0e-6);
        let mirrored = -p.position;
        assert!(
            snapshot.iter().any(|q| (q.position - mirrored).length() < 1.0e-5),
            "no mirror image for {:?}",
            p.position
        );
    }
}

#[test]
fn random_box_stays_contained_and_non_negative() {
    let mut sim = Simulation::seeded(SimulationConstants::default(), 2024).unwrap();
    sim.reset(Layout::Random, 200).unwrap();
    for tick in 0..200 {
        sim.step(DT);
        for (k, p) in sim.particles().iter().enumerate() {
            assert!(is_contained(p, 6.0, 4.0), "tick {tick}: particle {k} escaped at {:?}", p.position);
            assert!(p.density > 0.0, "tick {tick}: particle {k} density {}", p.density);
            assert!(p.velocity.is_finite());
        }
    }
}
