//! Configuration parsing and validation for droplet simulations

use std::fs;

use droplet_kernel::constants::{
    DEFAULT_HEIGHT, DEFAULT_LOOKAHEAD, DEFAULT_VELOCITY_DAMPING, DEFAULT_WIDTH,
};
use droplet_kernel::{Layout, SimulationConstants};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable simulation name
    pub name: String,
    /// Container dimensions, centered on the origin
    #[serde(default)]
    pub container: ContainerSize,
    /// Gravity vector
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],
    /// Velocity retained (and reversed) on wall contact, in [0, 1]
    #[serde(default = "default_collision_damping")]
    pub collision_damping: f32,
    /// Rest density the pressure solver relaxes toward
    #[serde(default = "default_target_density")]
    pub target_density: f32,
    /// Equation-of-state stiffness
    #[serde(default = "default_pressure_multiplier")]
    pub pressure_multiplier: f32,
    /// Smoothing kernel support radius
    #[serde(default = "default_kernel_radius")]
    pub kernel_radius: f32,
    /// Mass of every particle
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Per-tick velocity retention factor
    #[serde(default = "default_velocity_damping")]
    pub velocity_damping: f32,
    /// Horizon for predicted positions (seconds)
    #[serde(default = "default_lookahead")]
    pub lookahead: f32,
    /// Optional floor applied to densities used as divisors
    #[serde(default)]
    pub min_density: Option<f32>,
    /// Initial particle arrangement
    #[serde(default = "default_layout")]
    pub layout: Layout,
    /// Number of particles at reset
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Seed for the random source; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fixed tick length (seconds)
    #[serde(default = "default_timestep")]
    pub timestep: f32,
    /// Stop after this many timesteps
    pub max_timesteps: Option<u64>,
    /// Stop after this much simulated time (seconds)
    pub max_time: Option<f64>,
}

/// Container dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl Default for ContainerSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// Default values
fn default_gravity() -> [f32; 2] {
    [0.0, -9.81]
}

fn default_collision_damping() -> f32 {
    1.0
}

fn default_target_density() -> f32 {
    2.75
}

fn default_pressure_multiplier() -> f32 {
    0.5
}

fn default_kernel_radius() -> f32 {
    0.35
}

fn default_mass() -> f32 {
    1.0
}

fn default_velocity_damping() -> f32 {
    DEFAULT_VELOCITY_DAMPING
}

fn default_lookahead() -> f32 {
    DEFAULT_LOOKAHEAD
}

fn default_layout() -> Layout {
    Layout::Grid
}

fn default_particle_count() -> usize {
    100
}

fn default_timestep() -> f32 {
    0.016
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &str) -> Result<Self, OrchestratorError> {
        let contents = fs::read_to_string(path).map_err(|source| OrchestratorError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, OrchestratorError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        // Check timestep
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(OrchestratorError::Runner(format!(
                "timestep must be positive and finite, got {}",
                self.timestep
            )));
        }

        // Check max_timesteps
        if let Some(max_timesteps) = self.max_timesteps {
            if max_timesteps == 0 {
                return Err(OrchestratorError::Runner(
                    "max_timesteps must be at least 1".to_string(),
                ));
            }
        }

        // Check max_time
        if let Some(max_time) = self.max_time {
            if !(max_time > 0.0) {
                return Err(OrchestratorError::Runner(
                    "max_time must be positive".to_string(),
                ));
            }
        }

        // Physical constants
        self.to_constants().validate()?;
        Ok(())
    }

    /// Kernel constants described by this configuration
    pub fn to_constants(&self) -> SimulationConstants {
        SimulationConstants {
            mass: self.mass,
            velocity_damping: self.velocity_damping,
            lookahead: self.lookahead,
            min_density: self.min_density,
            ..Default::default()
        }
        .with_tuning(
            self.container.width,
            self.container.height,
            Vec2::from_array(self.gravity),
            self.collision_damping,
            self.target_density,
            self.pressure_multiplier,
            self.kernel_radius,
        )
    }
}
