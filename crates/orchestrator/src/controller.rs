//! Command handling for an interactive simulation.
//!
//! Whether the simulation is running is orchestration state: the kernel only
//! knows how to advance one tick. [`SimulationController`] owns a
//! [`Simulation`] together with that flag, the current layout and particle
//! count, and turns [`Command`]s into kernel calls.

use droplet_kernel::constants::clamp_kernel_radius;
use droplet_kernel::{
    ConfigError, Layout, Particle, Simulation, SimulationConstants, SimulationKernel,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::error::OrchestratorError;

/// A request from the user or a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Flip between running and paused.
    ToggleRunning,
    /// Advance exactly one tick and leave the simulation paused.
    StepOnce,
    /// Replace the particle set with the current count in `layout`.
    Reset {
        /// Arrangement of the new set.
        layout: Layout,
    },
    /// Add (or remove, if negative) particles, then reset in the current layout.
    ResizeParticles(i64),
    /// Replace the particle set with explicit drops.
    ReplaceParticles(Vec<Particle>),
    /// Replace every constant at once.
    Configure(SimulationConstants),
    /// Set a single tunable constant.
    Tune(Adjustment),
}

/// New value for one tunable constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Rest density.
    TargetDensity(f32),
    /// Equation-of-state stiffness.
    PressureMultiplier(f32),
    /// Kernel support radius, raised to at least 0.1.
    KernelRadius(f32),
    /// Wall restitution, clamped into `[0, 1]`.
    CollisionDamping(f32),
    /// Gravity vector.
    Gravity(Vec2),
}

/// What a successfully applied command did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// Applied as requested.
    Applied,
    /// Applied after clamping the requested value.
    Clamped {
        /// Value that was asked for.
        requested: f32,
        /// Value that was used.
        applied: f32,
    },
}

/// Single-threaded owner of a simulation and its run state.
pub struct SimulationController<R: Rng = StdRng> {
    simulation: Simulation<R>,
    running: bool,
    layout: Layout,
    particle_count: usize,
    timestep: f32,
}

impl SimulationController<StdRng> {
    /// Build a controller from a validated configuration and lay out the
    /// initial particles.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, OrchestratorError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let simulation = Simulation::with_rng(config.to_constants(), rng)?;
        Ok(Self::new(
            simulation,
            config.layout,
            config.particle_count,
            config.timestep,
        )?)
    }
}

impl<R: Rng> SimulationController<R> {
    /// Take ownership of `simulation` and reset it to `particle_count`
    /// particles in `layout`. Starts paused.
    pub fn new(
        mut simulation: Simulation<R>,
        layout: Layout,
        particle_count: usize,
        timestep: f32,
    ) -> Result<Self, ConfigError> {
        simulation.reset(layout, particle_count)?;
        Ok(Self {
            simulation,
            running: false,
            layout,
            particle_count,
            timestep,
        })
    }

    /// Whether [`advance`](Self::advance) will step.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set the run state directly.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Underlying simulation.
    pub fn simulation(&self) -> &Simulation<R> {
        &self.simulation
    }

    /// Tick length used by [`advance`](Self::advance) and [`Command::StepOnce`].
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Layout used by the next resize.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Particle count used by the next reset.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Advance one tick if running. Returns `true` if a tick was taken.
    pub fn advance(&mut self) -> bool {
        if self.running {
            self.simulation.step(self.timestep);
        }
        self.running
    }

    /// Apply one command. A rejected command leaves the simulation untouched.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, ConfigError> {
        match command {
            Command::ToggleRunning => {
                self.running = !self.running;
                tracing::info!("Simulation {}", if self.running { "running" } else { "paused" });
                Ok(CommandOutcome::Applied)
            }
            Command::StepOnce => {
                self.simulation.step(self.timestep);
                self.running = false;
                Ok(CommandOutcome::Applied)
            }
            Command::Reset { layout } => {
                self.simulation.reset(layout, self.particle_count)?;
                self.layout = layout;
                Ok(CommandOutcome::Applied)
            }
            Command::ResizeParticles(delta) => {
                let overflow = ConfigError::ParticleCountOverflow {
                    current: self.particle_count,
                    delta,
                };
                let requested = i64::try_from(self.particle_count)
                    .ok()
                    .and_then(|current| current.checked_add(delta))
                    .ok_or_else(|| overflow.clone())?;
                if requested < 0 {
                    return Err(ConfigError::NegativeParticleCount(requested));
                }
                let count = usize::try_from(requested).map_err(|_| overflow)?;
                self.simulation.reset(self.layout, count)?;
                self.particle_count = count;
                Ok(CommandOutcome::Applied)
            }
            Command::ReplaceParticles(particles) => {
                let count = particles.len();
                self.simulation.replace_particles(particles)?;
                self.particle_count = count;
                Ok(CommandOutcome::Applied)
            }
            Command::Configure(constants) => {
                self.simulation.configure(constants)?;
                Ok(CommandOutcome::Applied)
            }
            Command::Tune(adjustment) => self.tune(adjustment),
        }
    }

    fn tune(&mut self, adjustment: Adjustment) -> Result<CommandOutcome, ConfigError> {
        let mut constants = *self.simulation.constants();
        let mut outcome = CommandOutcome::Applied;

        match adjustment {
            Adjustment::TargetDensity(value) => constants.target_density = value,
            Adjustment::PressureMultiplier(value) => constants.pressure_multiplier = value,
            Adjustment::Gravity(value) => constants.gravity = value,
            Adjustment::KernelRadius(requested) => {
                let radius = clamp_kernel_radius(requested);
                if radius.clamped {
                    tracing::warn!(
                        "Kernel radius {} below minimum, using {}",
                        requested,
                        radius.value
                    );
                    outcome = CommandOutcome::Clamped {
                        requested,
                        applied: radius.value,
                    };
                }
                constants.kernel_radius = radius.value;
            }
            Adjustment::CollisionDamping(requested) => {
                let applied = requested.clamp(0.0, 1.0);
                if applied != requested && !requested.is_nan() {
                    tracing::warn!(
                        "Collision damping {} outside [0, 1], using {}",
                        requested,
                        applied
                    );
                    outcome = CommandOutcome::Clamped { requested, applied };
                }
                constants.collision_damping = applied;
            }
        }

        self.simulation.configure(constants)?;
        Ok(outcome)
    }
}
