//! Rigid body state
//!
//! A body's position and velocity change only through `move_by` (linear
//! drift between events) and the `bounce_off*` responses. Collision counters
//! only ever grow; the engine compares them against event snapshots to drop
//! predictions made before a body's last collision.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{self, Segment};
use super::response;
use crate::error::{Result, SimError};

/// Body outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f64 },
    /// Axis-aligned rectangle centred on the body position
    Rect { width: f64, height: f64 },
}

impl Shape {
    /// Half width and half height of the shape's bounding box
    #[inline]
    pub fn half_extents(&self) -> DVec2 {
        match *self {
            Shape::Circle { radius } => DVec2::splat(radius),
            Shape::Rect { width, height } => DVec2::new(width / 2.0, height / 2.0),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Shape::Circle { radius } => {
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(SimError::config("radius must be finite and > 0"));
                }
            }
            Shape::Rect { width, height } => {
                if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
                    return Err(SimError::config("rectangle width and height must be finite and > 0"));
                }
            }
        }
        Ok(())
    }
}

/// RGB fill colour handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.random(),
            g: rng.random(),
            b: rng.random(),
        }
    }

    /// Parse `#rgb` or `#rrggbb`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).unwrap_or(0) as u8 * 17);
                Some(Self::new(digits.next()?, digits.next()?, digits.next()?))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }

    /// Normalised RGBA for vertex buffers
    pub fn to_rgba(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// A moving (or pinned) rigid body inside the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Stable index into the engine's body list
    pub id: usize,
    pub pos: DVec2,
    pub vel: DVec2,
    pub mass: f64,
    pub shape: Shape,
    pub color: Color,
    /// Pinned obstacle: never moves, never changes velocity
    pub immovable: bool,
    /// Arena extent (width, height); walls sit at 0 and at these values
    pub arena: DVec2,
    collisions: u64,
}

impl Body {
    pub fn builder(id: usize, shape: Shape) -> BodyBuilder {
        BodyBuilder::new(id, shape)
    }

    /// Number of collisions this body has taken part in
    #[inline]
    pub fn collision_count(&self) -> u64 {
        self.collisions
    }

    #[inline]
    fn bump_collision_count(&mut self) {
        self.collisions = self.collisions.saturating_add(1);
    }

    /// Drift linearly for `dt`. No bounds checks: walls are handled by events.
    #[inline]
    pub fn move_by(&mut self, dt: f64) {
        self.pos += self.vel * dt;
    }

    pub fn time_to_hit(&self, other: &Body) -> f64 {
        geometry::time_to_hit(self, other)
    }

    pub fn time_to_hit_vertical_wall(&self) -> f64 {
        geometry::time_to_vertical_wall(self)
    }

    pub fn time_to_hit_horizontal_wall(&self) -> f64 {
        geometry::time_to_horizontal_wall(self)
    }

    pub fn time_to_hit_segment(&self, segment: &Segment) -> f64 {
        geometry::time_to_segment(self, segment)
    }

    /// Exchange impulse with `other`. Movable participants get one more
    /// collision on their counter; pinned bodies keep theirs.
    pub fn bounce_off(&mut self, other: &mut Body) -> Result<()> {
        let (va, vb) = response::pair_velocities(self, other)?;
        for body in [&mut *self, &mut *other] {
            if !body.immovable {
                body.bump_collision_count();
            }
        }
        self.vel = va;
        other.vel = vb;
        Ok(())
    }

    pub fn bounce_off_vertical_wall(&mut self) {
        if self.immovable {
            return;
        }
        self.vel = response::reflect_vertical_wall(self.vel);
        self.bump_collision_count();
    }

    pub fn bounce_off_horizontal_wall(&mut self) {
        if self.immovable {
            return;
        }
        self.vel = response::reflect_horizontal_wall(self.vel);
        self.bump_collision_count();
    }

    pub fn bounce_off_segment(&mut self, segment: &Segment) {
        if self.immovable {
            return;
        }
        self.vel = response::reflect(self.vel, segment.normal());
        self.bump_collision_count();
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.immovable {
            0.0
        } else {
            0.5 * self.mass * self.vel.length_squared()
        }
    }

    pub fn momentum(&self) -> DVec2 {
        if self.immovable {
            DVec2::ZERO
        } else {
            self.vel * self.mass
        }
    }
}

/// Validating constructor for [`Body`]
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    id: usize,
    shape: Shape,
    pos: DVec2,
    vel: DVec2,
    mass: f64,
    color: Color,
    immovable: bool,
    arena: DVec2,
}

impl BodyBuilder {
    pub fn new(id: usize, shape: Shape) -> Self {
        use crate::consts::*;
        Self {
            id,
            shape,
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            mass: DEFAULT_MASS,
            color: Color::BLACK,
            immovable: false,
            arena: DVec2::new(DEFAULT_ARENA_WIDTH, DEFAULT_ARENA_HEIGHT),
        }
    }

    pub fn position(mut self, pos: DVec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn immovable(mut self, immovable: bool) -> Self {
        self.immovable = immovable;
        self
    }

    pub fn arena(mut self, arena: DVec2) -> Self {
        self.arena = arena;
        self
    }

    pub fn build(self) -> Result<Body> {
        self.shape.validate()?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::config(format!("body {}: mass must be finite and > 0", self.id)));
        }
        if !self.pos.is_finite() || !self.vel.is_finite() {
            return Err(SimError::config(format!(
                "body {}: position and velocity must be finite",
                self.id
            )));
        }
        if !self.arena.is_finite() || self.arena.x <= 0.0 || self.arena.y <= 0.0 {
            return Err(SimError::config("arena width and height must be finite and > 0"));
        }
        let half = self.shape.half_extents();
        if half.x * 2.0 > self.arena.x || half.y * 2.0 > self.arena.y {
            return Err(SimError::config(format!("body {}: does not fit inside the arena", self.id)));
        }

        Ok(Body {
            id: self.id,
            pos: self.pos,
            vel: if self.immovable { DVec2::ZERO } else { self.vel },
            mass: self.mass,
            shape: self.shape,
            color: self.color,
            immovable: self.immovable,
            arena: self.arena,
            collisions: 0,
        })
    }
}
