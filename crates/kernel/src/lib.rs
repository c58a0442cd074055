//! 2D SPH Water-Drop Simulation Kernel
//!
//! This crate provides the simulation core for a planar collection of fluid
//! drops driven by a simplified Smoothed Particle Hydrodynamics model. It is
//! pure computation: no windowing, rendering, threads or I/O.
//!
//! # Modules
//! - [`particle`] -- Particle state, grid/random layouts, semi-implicit Euler step.
//! - [`sph`] -- Quadratic smoothing kernel, density estimation, pressure forces.
//! - [`eos`] -- Linear equation of state and symmetrized pair pressure.
//! - [`boundary`] -- Snap/reflect collision against the rectangular container.
//! - [`constants`] -- Tunable simulation constants and their validation.
//! - [`error`] -- Configuration errors.

#![warn(missing_docs)]

pub mod boundary;
pub mod constants;
pub mod eos;
pub mod error;
pub mod particle;
pub mod sph;

pub use constants::SimulationConstants;
pub use error::ConfigError;
pub use particle::{grid_layout, random_layout, Layout, Particle};
pub use sph::{smoothing_kernel, smoothing_kernel_derivative};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SimulationKernel trait
// ---------------------------------------------------------------------------

/// What the presentation layer reads for one particle after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    /// Drop center.
    pub position: Vec2,
    /// Drop radius.
    pub radius: f32,
    /// Density estimated during the last completed tick.
    pub density: f32,
}

impl From<&Particle> for ParticleSnapshot {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position,
            radius: p.radius,
            density: p.density,
        }
    }
}

/// Aggregate diagnostics for the current particle set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DensityMetrics {
    /// Largest `|rho_i - rho_target| / rho_target` over the set. Absolute
    /// deviation when the target is zero.
    pub max_density_error: f32,
    /// Mean density over the set.
    pub mean_density: f32,
    /// Total kinetic energy `sum 0.5 m |v|^2`.
    pub kinetic_energy: f32,
}

/// Interface every simulation back-end exposes to orchestration.
///
/// A `SimulationKernel` owns the particle set and the constants. One call to
/// [`step`](SimulationKernel::step) is one full tick:
///
/// 1. Predict positions `x + v * lookahead`
/// 2. Density at every predicted position
/// 3. Pressure acceleration `F_i / rho_i`
/// 4. Integrate pressure, then gravity, then apply velocity damping
/// 5. Resolve container collisions
pub trait SimulationKernel {
    /// Replace the simulation constants. Rejected constants leave the
    /// current ones in place.
    fn configure(&mut self, constants: SimulationConstants) -> Result<(), ConfigError>;

    /// Replace the particle set with `count` particles in `layout`.
    fn reset(&mut self, layout: Layout, count: usize) -> Result<(), ConfigError>;

    /// Replace the particle set with explicitly placed particles.
    fn replace_particles(&mut self, particles: Vec<Particle>) -> Result<(), ConfigError>;

    /// Advance one tick of `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Density at an arbitrary point, from current positions. Read-only.
    fn query_density(&self, point: Vec2) -> f32;

    /// Positions, radii and densities as of the last completed tick.
    fn snapshot(&self) -> Vec<ParticleSnapshot>;

    /// Full particle state.
    fn particles(&self) -> &[Particle];

    /// Constants in effect.
    fn constants(&self) -> &SimulationConstants;

    /// Diagnostics over the current set.
    fn metrics(&self) -> DensityMetrics;

    /// Number of particles in the simulation.
    fn particle_count(&self) -> usize {
        self.particles().len()
    }

    /// Save the particle set for a later rollback.
    /// Returns true if checkpointing is supported and succeeded.
    fn save_checkpoint(&mut self) -> bool {
        false
    }

    /// Restore the last saved checkpoint, undoing any steps since save.
    /// Returns true if restoration succeeded.
    fn restore_checkpoint(&mut self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Simulation -- CPU implementation of SimulationKernel
// ---------------------------------------------------------------------------

/// Single-threaded CPU implementation.
///
/// All pair sums are O(n^2). The random source `R` only breaks symmetry for
/// coincident particles and scatters random layouts; seed it for
/// reproducible runs.
pub struct Simulation<R: Rng = StdRng> {
    /// Particle set, stably ordered within a tick.
    particles: Vec<Particle>,
    /// Constants read by every tick.
    constants: SimulationConstants,
    /// Random source for symmetry breaking and random layouts.
    rng: R,
    /// Completed ticks since the last reset.
    tick: u64,
    /// Saved particle set for rollback.
    checkpoint: Option<Vec<Particle>>,
}

impl Simulation<StdRng> {
    /// Create an empty simulation seeded from the operating system.
    pub fn new(constants: SimulationConstants) -> Result<Self, ConfigError> {
        Self::with_rng(constants, StdRng::from_os_rng())
    }

    /// Create an empty simulation with a deterministic random source.
    pub fn seeded(constants: SimulationConstants, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(constants, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Create an empty simulation drawing randomness from `rng`.
    pub fn with_rng(constants: SimulationConstants, rng: R) -> Result<Self, ConfigError> {
        constants.validate()?;
        tracing::info!(
            "Simulation created: {}x{} container, kernel radius {}",
            constants.width,
            constants.height,
            constants.kernel_radius
        );
        Ok(Self {
            particles: Vec::new(),
            constants,
            rng,
            tick: 0,
            checkpoint: None,
        })
    }

    /// Completed ticks since the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Refresh predictions and densities without moving anything. Lets a
    /// paused orchestrator show up-to-date densities.
    pub fn refresh_densities(&mut self) {
        let c = &self.constants;
        for particle in &mut self.particles {
            particle.predict(c.lookahead);
        }
        sph::compute_densities(&mut self.particles, c.mass, c.kernel_radius);
    }

    fn install(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
        self.tick = 0;
        self.checkpoint = None;
        self.refresh_densities();
    }
}

impl<R: Rng> SimulationKernel for Simulation<R> {
    fn configure(&mut self, constants: SimulationConstants) -> Result<(), ConfigError> {
        constants.validate()?;
        tracing::info!(
            "Constants updated: target density {}, pressure multiplier {}, kernel radius {}",
            constants.target_density,
            constants.pressure_multiplier,
            constants.kernel_radius
        );
        self.constants = constants;
        Ok(())
    }

    fn reset(&mut self, layout: Layout, count: usize) -> Result<(), ConfigError> {
        if count > constants::MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles {
                requested: count,
                max: constants::MAX_PARTICLE_COUNT,
            });
        }
        let particles = particle::layout_particles(
            layout,
            count,
            self.constants.width,
            self.constants.height,
            &mut self.rng,
        );
        tracing::info!("Reset: {} particles in {:?} layout", particles.len(), layout);
        self.install(particles);
        Ok(())
    }

    fn replace_particles(&mut self, particles: Vec<Particle>) -> Result<(), ConfigError> {
        if let Some((index, p)) = particles
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.radius > 0.0))
        {
            return Err(ConfigError::NonPositiveParticleRadius {
                index,
                radius: p.radius,
            });
        }
        tracing::info!("Particle set replaced: {} particles", particles.len());
        self.install(particles);
        Ok(())
    }

    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!("Ignoring step with invalid dt = {}", dt);
            return;
        }
        let c = self.constants;

        // --- 1-2. Predict and estimate density ---
        self.refresh_densities();

        // --- 3. Pressure acceleration F_i / rho_i ---
        let pressure = sph::compute_pressure_accelerations(&self.particles, &c, &mut self.rng);

        // --- 4. Integrate pressure, then gravity, then damp ---
        for (particle, acceleration) in self.particles.iter_mut().zip(pressure) {
            particle.integrate(acceleration, dt);
            particle.integrate(c.gravity, dt);
            particle.velocity *= c.velocity_damping;
        }

        // --- 5. Container collisions ---
        boundary::enforce_container(&mut self.particles, c.width, c.height, c.collision_damping);

        self.tick += 1;
    }

    fn query_density(&self, point: Vec2) -> f32 {
        sph::density_at(
            point,
            self.particles.iter().map(|p| p.position),
            self.constants.mass,
            self.constants.kernel_radius,
        )
    }

    fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(ParticleSnapshot::from).collect()
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn constants(&self) -> &SimulationConstants {
        &self.constants
    }

    fn metrics(&self) -> DensityMetrics {
        let n = self.particles.len();
        if n == 0 {
            return DensityMetrics::default();
        }
        let target = self.constants.target_density;
        let mut max_error = 0.0_f32;
        let mut density_sum = 0.0_f64;
        let mut kinetic = 0.0_f64;
        for p in &self.particles {
            let deviation = (p.density - target).abs();
            let error = if target.abs() > 1.0e-12 {
                deviation / target.abs()
            } else {
                deviation
            };
            max_error = max_error.max(error);
            density_sum += p.density as f64;
            kinetic += 0.5 * self.constants.mass as f64 * p.velocity.length_squared() as f64;
        }
        DensityMetrics {
            max_density_error: max_error,
            mean_density: (density_sum / n as f64) as f32,
            kinetic_energy: kinetic as f32,
        }
    }

    fn save_checkpoint(&mut self) -> bool {
        self.checkpoint = Some(self.particles.clone());
        true
    }

    fn restore_checkpoint(&mut self) -> bool {
        if let Some(cp) = self.checkpoint.take() {
            self.particles = cp;
            true
        } else {
            false
        }
    }
}
