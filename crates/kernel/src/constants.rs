//! Tunable simulation constants.
//!
//! The constants are owned by the [`Simulation`](crate::Simulation) and passed
//! by reference into every tick. Only `configure` replaces them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default container width.
pub const DEFAULT_WIDTH: f32 = 6.0;

/// Default container height.
pub const DEFAULT_HEIGHT: f32 = 4.0;

/// Standard gravity, pointing down the y-axis.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

/// Short prediction horizon used for density and pressure (seconds).
pub const DEFAULT_LOOKAHEAD: f32 = 1.0 / 120.0;

/// Unconditional per-tick velocity damping, distinct from collision damping.
pub const DEFAULT_VELOCITY_DAMPING: f32 = 0.995;

/// Floor applied by callers that nudge the kernel radius interactively.
pub const MIN_KERNEL_RADIUS: f32 = 0.1;

/// Largest particle count `reset` accepts. Every tick is O(n^2) in it.
pub const MAX_PARTICLE_COUNT: usize = 100_000;

/// Constants read by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConstants {
    /// Container width; walls sit at `±width / 2`.
    pub width: f32,
    /// Container height; walls sit at `±height / 2`.
    pub height: f32,
    /// Gravitational acceleration, applied unscaled.
    pub gravity: Vec2,
    /// Multiplier on the reflected velocity after a wall hit. 1.0 is a pure
    /// sign flip.
    pub collision_damping: f32,
    /// Density the pressure solver relaxes toward.
    pub target_density: f32,
    /// Stiffness of the equation of state.
    pub pressure_multiplier: f32,
    /// Smoothing support radius.
    pub kernel_radius: f32,
    /// Uniform particle mass.
    pub mass: f32,
    /// Factor applied to every velocity at the end of each tick.
    pub velocity_damping: f32,
    /// Horizon of the predicted positions (seconds).
    pub lookahead: f32,
    /// Optional lower bound on densities used as divisors in the pressure
    /// solver. `None` divides by the raw density.
    pub min_density: Option<f32>,
}

impl Default for SimulationConstants {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            gravity: DEFAULT_GRAVITY,
            collision_damping: 1.0,
            target_density: 2.75,
            pressure_multiplier: 0.5,
            kernel_radius: 0.35,
            mass: 1.0,
            velocity_damping: DEFAULT_VELOCITY_DAMPING,
            lookahead: DEFAULT_LOOKAHEAD,
            min_density: None,
        }
    }
}

impl SimulationConstants {
    /// Replace the seven externally tuned constants, keeping mass, damping,
    /// lookahead and density floor.
    #[allow(clippy::too_many_arguments)]
    pub fn with_tuning(
        mut self,
        width: f32,
        height: f32,
        gravity: Vec2,
        collision_damping: f32,
        target_density: f32,
        pressure_multiplier: f32,
        kernel_radius: f32,
    ) -> Self {
        self.width = width;
        self.height = height;
        self.gravity = gravity;
        self.collision_damping = collision_damping;
        self.target_density = target_density;
        self.pressure_multiplier = pressure_multiplier;
        self.kernel_radius = kernel_radius;
        self
    }

    /// Check every constant. Nothing is clamped here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("width", self.width),
            ("height", self.height),
            ("gravity.x", self.gravity.x),
            ("gravity.y", self.gravity.y),
            ("collision_damping", self.collision_damping),
            ("target_density", self.target_density),
            ("pressure_multiplier", self.pressure_multiplier),
            ("kernel_radius", self.kernel_radius),
            ("mass", self.mass),
            ("velocity_damping", self.velocity_damping),
            ("lookahead", self.lookahead),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }

        if self.width <= 0.0 {
            return Err(ConfigError::NonPositiveExtent {
                axis: "width",
                value: self.width,
            });
        }
        if self.height <= 0.0 {
            return Err(ConfigError::NonPositiveExtent {
                axis: "height",
                value: self.height,
            });
        }
        if self.kernel_radius <= 0.0 {
            return Err(ConfigError::NonPositiveKernelRadius(self.kernel_radius));
        }
        if !(0.0..=1.0).contains(&self.collision_damping) {
            return Err(ConfigError::CollisionDampingOutOfRange(
                self.collision_damping,
            ));
        }
        if !(0.0..=1.0).contains(&self.velocity_damping) {
            return Err(ConfigError::VelocityDampingOutOfRange(self.velocity_damping));
        }
        if self.mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass(self.mass));
        }
        if self.lookahead < 0.0 {
            return Err(ConfigError::NegativeLookahead(self.lookahead));
        }
        if let Some(floor) = self.min_density {
            if !floor.is_finite() {
                return Err(ConfigError::NonFinite {
                    name: "min_density",
                    value: floor,
                });
            }
            if floor <= 0.0 {
                return Err(ConfigError::NonPositiveDensityFloor(floor));
            }
        }
        Ok(())
    }
}

/// Result of clamping a kernel radius to [`MIN_KERNEL_RADIUS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedRadius {
    /// Radius actually usable by the kernel.
    pub value: f32,
    /// `true` if the requested radius was raised to the floor.
    pub clamped: bool,
}

/// Raise `requested` to [`MIN_KERNEL_RADIUS`] if it falls below it, reporting
/// whether that happened so the caller can surface it.
pub fn clamp_kernel_radius(requested: f32) -> ClampedRadius {
    if requested >= MIN_KERNEL_RADIUS {
        ClampedRadius {
            value: requested,
            clamped: false,
        }
    } else {
        ClampedRadius {
            value: MIN_KERNEL_RADIUS,
            clamped: true,
        }
    }
}
