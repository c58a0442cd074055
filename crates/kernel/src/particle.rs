//! Particle state, initial layouts and the semi-implicit Euler integrator.
//!
//! Particles are stored array-of-structs: every per-tick quantity (predicted
//! position, density) lives next to the state it was derived from, so the
//! density and pressure passes cannot be joined against the wrong index.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Radius of the lone particle produced by a one-particle grid.
pub const SINGLE_DROP_RADIUS: f32 = 0.1;

/// Radius of every particle in a random scatter.
pub const RANDOM_LAYOUT_RADIUS: f32 = 0.05;

/// One fluid sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Center of the drop.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Drop radius, always > 0. Used for rendering and wall collisions.
    pub radius: f32,
    /// `position + velocity * lookahead`, refreshed at the start of each tick.
    pub predicted_position: Vec2,
    /// Density estimated at the predicted position during the last tick.
    pub density: f32,
}

impl Particle {
    /// Create a particle at rest.
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            predicted_position: position,
            density: 0.0,
        }
    }

    /// Set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// `false` once position, velocity or density has gone NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.density.is_finite()
    }

    /// Position lifted into 3D with `z = 0`, for renderers working in 3D.
    pub fn position3(&self) -> Vec3 {
        self.position.extend(0.0)
    }

    /// Advance by one semi-implicit Euler step.
    ///
    /// ```text
    /// v += a * dt
    /// x += v * dt
    /// ```
    pub fn integrate(&mut self, acceleration: Vec2, dt: f32) {
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Refresh the predicted position for a horizon of `lookahead` seconds.
    pub fn predict(&mut self, lookahead: f32) {
        self.predicted_position = self.position + self.velocity * lookahead;
    }
}

/// Initial arrangement of a freshly reset particle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Deterministic square grid centered on the origin.
    Grid,
    /// Uniform scatter over the container.
    Random,
}

/// Lay `count` particles out on the smallest square grid that holds them.
///
/// With `s = ceil(sqrt(count))`, slot `(i, j)` (column `i`, row `j`) sits at
/// ```text
/// x =  (2 - 2/sqrt(count)) * (i / (s - 1) - 0.5)
/// y = -(2 - 2/sqrt(count)) * (j / (s - 1) - 0.5)
/// ```
/// and every particle has radius `1 / sqrt(count)`. Slots are visited
/// row-major and the grid is truncated once `count` particles are placed.
/// A single particle is placed at the origin with [`SINGLE_DROP_RADIUS`].
pub fn grid_layout(count: usize) -> Vec<Particle> {
    match count {
        0 => Vec::new(),
        1 => vec![Particle::new(Vec2::ZERO, SINGLE_DROP_RADIUS)],
        _ => {
            let sqrt_count = (count as f32).sqrt();
            let side = sqrt_count.ceil() as usize;
            let span = 2.0 - 2.0 / sqrt_count;
            let last = (side - 1) as f32;
            let radius = 1.0 / sqrt_count;

            let mut particles = Vec::with_capacity(count);
            'rows: for j in 0..side {
                for i in 0..side {
                    if j * side + i >= count {
                        break 'rows;
                    }
                    let x = span * (i as f32 / last - 0.5);
                    let y = -span * (j as f32 / last - 0.5);
                    particles.push(Particle::new(Vec2::new(x, y), radius));
                }
            }
            particles
        }
    }
}

/// Scatter `count` particles uniformly over a `width` x `height` container
/// centered on the origin. Centers are kept at least one radius from every
/// wall.
pub fn random_layout<R: Rng>(
    count: usize,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Particle> {
    let half_x = (0.5 * width - RANDOM_LAYOUT_RADIUS).max(0.0);
    let half_y = (0.5 * height - RANDOM_LAYOUT_RADIUS).max(0.0);

    (0..count)
        .map(|_| {
            let x = if half_x > 0.0 {
                rng.random_range(-half_x..=half_x)
            } else {
                0.0
            };
            let y = if half_y > 0.0 {
                rng.random_range(-half_y..=half_y)
            } else {
                0.0
            };
            Particle::new(Vec2::new(x, y), RANDOM_LAYOUT_RADIUS)
        })
        .collect()
}

/// Build a particle set for `layout`.
pub fn layout_particles<R: Rng>(
    layout: Layout,
    count: usize,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Particle> {
    match layout {
        Layout::Grid => grid_layout(count),
        Layout::Random => random_layout(count, width, height, rng),
    }
}
