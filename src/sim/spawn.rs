//! Body factory
//!
//! Turns a [`SimConfig`] into the engine's body list. Explicit specs come
//! first, in order, followed by the random population; each body's id is its
//! index. Anything a body spec leaves out is drawn from the config ranges with a
//! seeded PCG stream, so the same config always yields the same bodies.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{Body, Color, Shape};
use super::geometry::{Segment, apparent_radius};
use crate::consts::*;
use crate::error::{Result, SimError};
use crate::settings::{BodySpec, SampleRange, ShapeSpec, SimConfig};

/// Seeded generator for a config
pub fn rng_for(config: &SimConfig) -> Pcg32 {
    Pcg32::seed_from_u64(config.seed)
}

/// Build every body described by `config`
pub fn build_bodies(config: &SimConfig) -> Result<Vec<Body>> {
    config.validate()?;
    let mut rng = rng_for(config);
    let arena = DVec2::new(config.arena.width, config.arena.height);

    let mut bodies: Vec<Body> = Vec::with_capacity(config.body_count());
    for spec in &config.bodies {
        let body = spawn(spec, config, arena, &bodies, &mut rng)?;
        bodies.push(body);
    }

    if let Some(random) = &config.random {
        let spec = BodySpec {
            shape: random.shape,
            immovable: random.immovable,
            ..Default::default()
        };
        for _ in 0..random.count {
            let body = spawn(&spec, config, arena, &bodies, &mut rng)?;
            bodies.push(body);
        }
    }

    log::debug!("Spawned {} bodies (seed {})", bodies.len(), config.seed);
    Ok(bodies)
}

fn sample<R: Rng + ?Sized>(rng: &mut R, range: SampleRange) -> f64 {
    if range.min == range.max {
        range.min
    } else {
        rng.random_range(range.min..=range.max)
    }
}

fn resolve_shape<R: Rng + ?Sized>(spec: ShapeSpec, config: &SimConfig, rng: &mut R) -> Shape {
    match spec {
        ShapeSpec::Circle { radius } => Shape::Circle {
            radius: radius.unwrap_or_else(|| sample(rng, config.ranges.radius)),
        },
        ShapeSpec::Rect { width, height } => Shape::Rect {
            width: width.unwrap_or(DEFAULT_RECT_SIZE),
            height: height.unwrap_or(DEFAULT_RECT_SIZE),
        },
    }
}

fn resolve_color<R: Rng + ?Sized>(color: Option<&str>, rng: &mut R) -> Color {
    match color {
        None | Some("random") => Color::random(rng),
        Some(s) => Color::from_hex(s).unwrap_or_else(|| {
            log::warn!("Unrecognised colour {s:?}, using a random one");
            Color::random(rng)
        }),
    }
}

fn spawn<R: Rng + ?Sized>(
    spec: &BodySpec,
    config: &SimConfig,
    arena: DVec2,
    existing: &[Body],
    rng: &mut R,
) -> Result<Body> {
    let id = existing.len();
    let shape = resolve_shape(spec.shape, config, rng);
    let pos = place(spec, shape, arena, existing, &config.segments, rng)
        .ok_or_else(|| {
            SimError::config(format!(
                "could not place body {id} without overlap; use fewer or smaller bodies"
            ))
        })?;

    let vel = DVec2::new(
        spec.vx.unwrap_or_else(|| sample(rng, config.ranges.vx)),
        spec.vy.unwrap_or_else(|| sample(rng, config.ranges.vy)),
    );
    let mass = spec.mass.unwrap_or_else(|| sample(rng, config.ranges.mass));
    let color = resolve_color(spec.color.as_deref(), rng);

    Body::builder(id, shape)
        .position(pos)
        .velocity(vel)
        .mass(mass)
        .color(color)
        .immovable(spec.immovable)
        .arena(arena)
        .build()
}

/// Explicit coordinates are taken as given. Sampled ones stay inside the
/// arena and are rejection sampled against existing bodies and segments.
fn place<R: Rng + ?Sized>(
    spec: &BodySpec,
    shape: Shape,
    arena: DVec2,
    existing: &[Body],
    segments: &[Segment],
    rng: &mut R,
) -> Option<DVec2> {
    if let (Some(x), Some(y)) = (spec.x, spec.y) {
        return Some(DVec2::new(x, y));
    }

    let half = shape.half_extents();
    if half.x * 2.0 > arena.x || half.y * 2.0 > arena.y {
        return None;
    }

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = DVec2::new(
            spec.x.unwrap_or_else(|| sample(rng, SampleRange::new(half.x, arena.x - half.x))),
            spec.y.unwrap_or_else(|| sample(rng, SampleRange::new(half.y, arena.y - half.y))),
        );
        if !overlaps(pos, shape, existing, segments) {
            return Some(pos);
        }
    }
    None
}

fn overlaps(pos: DVec2, shape: Shape, existing: &[Body], segments: &[Segment]) -> bool {
    let hits_body = existing.iter().any(|other| {
        let dr = other.pos - pos;
        dr.length() < apparent_radius(&shape, dr) + apparent_radius(&other.shape, -dr)
    });
    let hits_segment = segments.iter().any(|seg| {
        let along = ((pos - seg.start).dot(seg.delta()) / seg.delta().length_squared()).clamp(0.0, 1.0);
        let foot = seg.start + seg.delta() * along;
        let reach = shape.half_extents().max_element();
        (pos - foot).length() < reach
    });
    hits_body || hits_segment
}
