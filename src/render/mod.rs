//! Drawing collaborator
//!
//! The engine hands every body to a [`Renderer`] after each processed event
//! and polls it for cancellation before the next one. Renderers only ever see
//! shared references, so they cannot disturb the simulation.

pub mod shapes;
pub mod vertex;

use glam::{DVec2, Vec2};

pub use vertex::{Vertex, colors};

use crate::sim::{Body, Segment, Shape};

/// Circle tessellation used by [`MeshRenderer`]
const CIRCLE_SEGMENTS: u32 = 24;
const OUTLINE_WIDTH: f32 = 1.5;

/// Receives the bodies after each simulation step
pub trait Renderer {
    /// Render one body at its current position
    fn draw_body(&mut self, body: &Body);

    /// Non-blocking check for a requested stop
    fn poll_cancelled(&mut self) -> bool {
        false
    }

    /// Called once all bodies of a step have been drawn
    fn end_frame(&mut self, _time: f64) {}
}

/// Writes body states to the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn draw_body(&mut self, body: &Body) {
        log::trace!(
            "body {} at ({:.3}, {:.3}) v=({:.3}, {:.3})",
            body.id,
            body.pos.x,
            body.pos.y,
            body.vel.x,
            body.vel.y
        );
    }

    fn end_frame(&mut self, time: f64) {
        self.frames += 1;
        log::debug!("frame {} t={:.6}", self.frames, time);
    }
}

/// Tessellates each frame into a triangle list ready for upload
#[derive(Debug, Default)]
pub struct MeshRenderer {
    background: Vec<Vertex>,
    building: Vec<Vertex>,
    frame: Vec<Vertex>,
    frames: u64,
    frame_time: f64,
    max_frames: Option<u64>,
}

impl MeshRenderer {
    /// Static geometry (arena border and segments) is built once here
    pub fn new(arena: DVec2, segments: &[Segment]) -> Self {
        let extent = arena.as_vec2();
        let mut background =
            shapes::rect_outline(extent / 2.0, extent / 2.0, OUTLINE_WIDTH, colors::ARENA_WALL);
        for segment in segments {
            background.extend(shapes::line(
                segment.start.as_vec2(),
                segment.end.as_vec2(),
                OUTLINE_WIDTH,
                colors::SEGMENT,
            ));
        }
        Self {
            background,
            ..Default::default()
        }
    }

    /// Ask to be cancelled once `frames` frames have been completed
    pub fn stop_after(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn background(&self) -> &[Vertex] {
        &self.background
    }

    /// Body triangles of the last completed frame
    pub fn frame(&self) -> &[Vertex] {
        &self.frame
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last completed frame as a packed vertex buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.frame)
    }
}

impl Renderer for MeshRenderer {
    fn draw_body(&mut self, body: &Body) {
        let center: Vec2 = body.pos.as_vec2();
        let color = body.color.to_rgba();
        match body.shape {
            Shape::Circle { radius } => {
                let radius = radius as f32;
                self.building
                    .extend(shapes::circle(center, radius, color, CIRCLE_SEGMENTS));
                if body.immovable {
                    self.building.extend(shapes::ring(
                        center,
                        (radius - OUTLINE_WIDTH).max(0.0),
                        radius,
                        colors::PINNED_OUTLINE,
                        CIRCLE_SEGMENTS,
                    ));
                }
            }
            Shape::Rect { .. } => {
                let half = body.shape.half_extents().as_vec2();
                self.building.extend(shapes::rect(center, half, color));
                if body.immovable {
                    self.building.extend(shapes::rect_outline(
                        center,
                        half,
                        OUTLINE_WIDTH,
                        colors::PINNED_OUTLINE,
                    ));
                }
            }
        }
    }

    fn poll_cancelled(&mut self) -> bool {
        self.max_frames.is_some_and(|max| self.frames >= max)
    }

    fn end_frame(&mut self, time: f64) {
        std::mem::swap(&mut self.frame, &mut self.building);
        self.building.clear();
        self.frames += 1;
        self.frame_time = time;
    }
}
