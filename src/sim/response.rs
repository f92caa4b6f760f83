//! Collision response
//!
//! Post-contact velocities for body pairs, arena walls and barrier segments.
//! These functions only compute; `Body` applies the results and keeps the
//! collision counters.

use glam::DVec2;

use super::body::Body;
use super::geometry::apparent_radius;
use crate::consts::CONTACT_EPSILON;
use crate::error::{Result, SimError};

/// Impulse vector handed from `b` to `a` along the line of centres.
///
/// J = 2 m1 m2 (dv . dr) / ((m1 + m2) * dist), applied as J * dr / dist.
#[inline]
pub fn contact_impulse(dr: DVec2, dv: DVec2, m1: f64, m2: f64, dist: f64) -> DVec2 {
    let j = 2.0 * m1 * m2 * dv.dot(dr) / ((m1 + m2) * dist);
    dr * (j / dist)
}

/// Velocities of `a` and `b` after an elastic contact.
///
/// A pinned participant keeps its velocity; the movable one receives twice
/// the impulse an equal-mass partner would deliver, which reflects the normal
/// component of relative velocity. Coincident centres are rejected before
/// any division.
pub fn pair_velocities(a: &Body, b: &Body) -> Result<(DVec2, DVec2)> {
    let dr = b.pos - a.pos;
    if dr.length_squared() <= CONTACT_EPSILON * CONTACT_EPSILON {
        return Err(SimError::DegenerateContact { a: a.id, b: b.id });
    }
    let dv = b.vel - a.vel;
    let dist = apparent_radius(&a.shape, dr) + apparent_radius(&b.shape, -dr);

    let velocities = match (a.immovable, b.immovable) {
        (true, true) => (a.vel, b.vel),
        (false, false) => {
            let force = contact_impulse(dr, dv, a.mass, b.mass, dist);
            (a.vel + force / a.mass, b.vel - force / b.mass)
        }
        (false, true) => {
            let force = contact_impulse(dr, dv, a.mass, a.mass, dist);
            (a.vel + 2.0 * force / a.mass, b.vel)
        }
        (true, false) => {
            let force = contact_impulse(dr, dv, b.mass, b.mass, dist);
            (a.vel, b.vel - 2.0 * force / b.mass)
        }
    };
    Ok(velocities)
}

/// Bounce off x = 0 / x = width
#[inline]
pub fn reflect_vertical_wall(vel: DVec2) -> DVec2 {
    DVec2::new(-vel.x, vel.y)
}

/// Bounce off y = 0 / y = height
#[inline]
pub fn reflect_horizontal_wall(vel: DVec2) -> DVec2 {
    DVec2::new(vel.x, -vel.y)
}

/// Reflect velocity off a surface with unit `normal`
#[inline]
pub fn reflect(vel: DVec2, normal: DVec2) -> DVec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
