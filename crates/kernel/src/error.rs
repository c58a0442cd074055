//! Configuration errors reported at the `configure` / `reset` boundary.
//!
//! Per-tick physics never fails; everything that can go wrong is a bad
//! constant or a bad particle count handed in from outside.

use thiserror::Error;

/// A simulation constant or reset request that the kernel refuses to accept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A constant was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending constant.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// Container width or height was zero or negative.
    #[error("container {axis} must be positive, got {value}")]
    NonPositiveExtent {
        /// `"width"` or `"height"`.
        axis: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// Kernel support radius was zero or negative.
    #[error("kernel radius must be positive, got {0}")]
    NonPositiveKernelRadius(f32),

    /// Collision damping outside `[0, 1]`.
    #[error("collision damping must lie in [0, 1], got {0}")]
    CollisionDampingOutOfRange(f32),

    /// Per-tick velocity damping outside `[0, 1]`.
    #[error("velocity damping must lie in [0, 1], got {0}")]
    VelocityDampingOutOfRange(f32),

    /// Particle mass was zero or negative.
    #[error("particle mass must be positive, got {0}")]
    NonPositiveMass(f32),

    /// Prediction horizon was negative.
    #[error("lookahead must be non-negative, got {0}")]
    NegativeLookahead(f32),

    /// Configured density floor was zero or negative.
    #[error("minimum density must be positive when set, got {0}")]
    NonPositiveDensityFloor(f32),

    /// A particle count resolved to a negative number.
    #[error("particle count must be non-negative, got {0}")]
    NegativeParticleCount(i64),

    /// Adding a resize delta to the current particle count overflowed.
    #[error("particle count {current} plus {delta} overflows")]
    ParticleCountOverflow {
        /// Count before the resize.
        current: usize,
        /// Requested change.
        delta: i64,
    },

    /// A reset asked for more particles than the kernel accepts.
    #[error("particle count {requested} exceeds the limit of {max}")]
    TooManyParticles {
        /// Requested count.
        requested: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// A particle handed to `replace_particles` had a non-positive radius.
    #[error("particle {index} has non-positive radius {radius}")]
    NonPositiveParticleRadius {
        /// Position of the particle in the supplied set.
        index: usize,
        /// Rejected radius.
        radius: f32,
    },
}
