//! Exact time-to-contact prediction
//!
//! Everything here is a pure function of current positions and velocities.
//! Motion between events is linear, so each contact reduces to the earliest
//! root of a closed-form equation. A missing or receding contact is reported
//! as `f64::INFINITY` rather than an error.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::body::{Body, Shape};

/// A static line segment obstacle between two endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn delta(&self) -> DVec2 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    /// Unit normal (left-hand perpendicular of start -> end)
    #[inline]
    pub fn normal(&self) -> DVec2 {
        self.delta().perp().normalize_or_zero()
    }

    /// Crossing point of two segments, `None` when parallel, colinear or disjoint
    pub fn intersection(&self, other: &Segment) -> Option<DVec2> {
        let da = self.delta();
        let db = other.delta();

        let denom = da.perp_dot(db);
        if denom == 0.0 {
            return None; // parallel or colinear
        }

        let offset = other.start - self.start;
        let t = offset.perp_dot(db) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let u = offset.perp_dot(da) / denom;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        Some(self.start + da * t)
    }
}

/// Distance from a shape's centre to its boundary in direction `dir`.
///
/// Circles answer their radius. Rectangles map the direction angle into one
/// of four sectors split by the diagonals and measure along the ray to the
/// edge owning that sector. Rectangle contact times built on this radius are
/// approximate: an elongated rectangle approached along its long axis by a
/// body offset from the centreline gets the short-edge distance.
pub fn apparent_radius(shape: &Shape, dir: DVec2) -> f64 {
    match *shape {
        Shape::Circle { radius } => radius,
        Shape::Rect { width, height } => {
            let theta = dir.y.atan2(dir.x);
            let corner = height.atan2(width);

            let side_edge = (theta > -corner && theta <= corner)
                || theta > PI - corner
                || theta <= -(PI - corner);

            if side_edge {
                (width / 2.0) / theta.cos().abs()
            } else {
                (height / 2.0) / theta.sin().abs()
            }
        }
    }
}

/// Earliest time at which two centres separated by `dr` (moving apart at
/// `dv`) come within `sigma` of each other.
///
/// Hard-sphere form: d = (dv.dr)^2 - (dv.dv)(dr.dr - sigma^2). Receding or
/// parallel motion (dv.dr >= 0) and grazing/missing paths (d <= 0) never
/// collide.
pub fn time_to_contact(dr: DVec2, dv: DVec2, sigma: f64) -> f64 {
    let dvdr = dv.dot(dr);
    if dvdr >= 0.0 {
        return f64::INFINITY;
    }
    let dvdv = dv.dot(dv);
    let drdr = dr.dot(dr);

    let d = dvdr * dvdr - dvdv * (drdr - sigma * sigma);
    if d <= 0.0 {
        return f64::INFINITY;
    }

    -(dvdr + d.sqrt()) / dvdv
}

/// Time until a body at `pos` moving at `vel` along one axis touches either
/// boundary of `[0, limit]` with its `half_extent`.
pub fn time_to_axis_wall(pos: f64, vel: f64, half_extent: f64, limit: f64) -> f64 {
    let dt = if vel > 0.0 {
        (limit - half_extent - pos) / vel
    } else if vel < 0.0 {
        (half_extent - pos) / vel
    } else {
        return f64::INFINITY;
    };

    // Already past the contact plane and still heading out: contact is now
    dt.max(0.0)
}

/// Time until `a` first touches `b`, `INFINITY` for self or no contact
pub fn time_to_hit(a: &Body, b: &Body) -> f64 {
    if a.id == b.id {
        return f64::INFINITY;
    }

    let dr = b.pos - a.pos;
    let dv = b.vel - a.vel;
    let sigma = apparent_radius(&a.shape, dr) + apparent_radius(&b.shape, -dr);

    time_to_contact(dr, dv, sigma)
}

/// Time until the body reaches x = 0 or x = width
pub fn time_to_vertical_wall(body: &Body) -> f64 {
    let half = body.shape.half_extents();
    time_to_axis_wall(body.pos.x, body.vel.x, half.x, body.arena.x)
}

/// Time until the body reaches y = 0 or y = height
pub fn time_to_horizontal_wall(body: &Body) -> f64 {
    let half = body.shape.half_extents();
    time_to_axis_wall(body.pos.y, body.vel.y, half.y, body.arena.y)
}

/// Time until the body's boundary touches the segment from its current side.
///
/// Contact is taken against the segment's supporting line at the body's
/// apparent radius toward the line; the contact is kept only if the centre's
/// foot point at that moment lies within the segment. Endpoint caps are not
/// modelled.
pub fn time_to_segment(body: &Body, segment: &Segment) -> f64 {
    let n = segment.normal();
    if n == DVec2::ZERO {
        return f64::INFINITY;
    }

    let side = (body.pos - segment.start).dot(n);
    let approach = body.vel.dot(n);
    if side == 0.0 || side * approach >= 0.0 {
        return f64::INFINITY;
    }

    let toward = -n * side.signum();
    let reach = apparent_radius(&body.shape, toward);
    // Clamped at zero when already inside the reach and closing in
    let dt = ((side.signum() * reach - side) / approach).max(0.0);

    let centre = body.pos + body.vel * dt;
    let along = (centre - segment.start).dot(segment.delta()) / segment.delta().length_squared();
    if (0.0..=1.0).contains(&along) {
        dt
    } else {
        f64::INFINITY
    }
}
