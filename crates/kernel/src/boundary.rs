//! Collision of drops with the rectangular container.
//!
//! The container is centered on the origin with walls at `±width / 2` and
//! `±height / 2`. Each axis is resolved on its own: the penetration depth of
//! the drop's disk past a wall decides between snapping onto the wall and
//! reflecting back into the container.

use glam::Vec2;

use crate::particle::Particle;

/// Penetrations shallower than this snap onto the wall instead of reflecting.
pub const SNAP_EPSILON: f32 = 0.1;

/// Result of resolving one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    /// Inside the container on this axis.
    Clear,
    /// Shallow penetration, snapped flush against the wall.
    Snapped,
    /// Deep penetration, reflected back by twice the excess.
    Reflected,
}

/// Resolve one axis of a disk with center `position`, velocity `velocity` and
/// radius `radius` against walls at `±half_extent`.
///
/// Velocity along the axis is negated and scaled by `collision_damping`
/// whenever the disk penetrates. A reflection that would carry the disk past
/// the opposite wall is clamped to it.
pub fn resolve_axis(
    position: &mut f32,
    velocity: &mut f32,
    radius: f32,
    half_extent: f32,
    collision_damping: f32,
) -> WallContact {
    let limit = (half_extent - radius).max(0.0);
    let below = -half_extent - (*position - radius);
    let above = (*position + radius) - half_extent;

    let contact = if below > 0.0 {
        if below < SNAP_EPSILON {
            *position = -limit;
            WallContact::Snapped
        } else {
            *position += 2.0 * below;
            WallContact::Reflected
        }
    } else if above > 0.0 {
        if above < SNAP_EPSILON {
            *position = limit;
            WallContact::Snapped
        } else {
            *position -= 2.0 * above;
            WallContact::Reflected
        }
    } else {
        return WallContact::Clear;
    };

    *position = position.clamp(-limit, limit);
    *velocity = -*velocity * collision_damping;
    contact
}

/// Resolve both axes of one particle against a `width` x `height` container.
pub fn resolve_out_of_bounds(
    particle: &mut Particle,
    width: f32,
    height: f32,
    collision_damping: f32,
) -> [WallContact; 2] {
    let half = Vec2::new(0.5 * width, 0.5 * height);
    let radius = particle.radius;
    let Particle {
        position, velocity, ..
    } = particle;

    let y = resolve_axis(&mut position.y, &mut velocity.y, radius, half.y, collision_damping);
    let x = resolve_axis(&mut position.x, &mut velocity.x, radius, half.x, collision_damping);
    [x, y]
}

/// Resolve every particle against the container.
pub fn enforce_container(
    particles: &mut [Particle],
    width: f32,
    height: f32,
    collision_damping: f32,
) {
    for particle in particles {
        resolve_out_of_bounds(particle, width, height, collision_damping);
    }
}

/// `true` if the particle's disk lies inside the container on both axes.
pub fn is_contained(particle: &Particle, width: f32, height: f32) -> bool {
    let half = Vec2::new(0.5 * width, 0.5 * height);
    let tol = 1.0e-5 * half.max_element().max(1.0);
    let extent = particle.position.abs() + Vec2::splat(particle.radius);
    (extent.x <= half.x + tol || particle.radius > half.x)
        && (extent.y <= half.y + tol || particle.radius > half.y)
}
