//! Shape tessellation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Unit direction of the `i`-th of `segments` evenly spaced rim points
fn rim(i: u32, segments: u32) -> Vec2 {
    Vec2::from_angle(i as f32 / segments as f32 * 2.0 * PI)
}

/// Generate vertices for a filled circle as a triangle fan
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    for i in 0..segments {
        let a = center + rim(i, segments) * radius;
        let b = center + rim(i + 1, segments) * radius;
        vertices.extend([center, a, b].map(|p| Vertex::new(p.x, p.y, color)));
    }
    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    for i in 0..segments {
        let (dir1, dir2) = (rim(i, segments), rim(i + 1, segments));
        quad(
            &mut vertices,
            [
                center + dir1 * inner_radius,
                center + dir1 * outer_radius,
                center + dir2 * inner_radius,
                center + dir2 * outer_radius,
            ],
            color,
        );
    }
    vertices
}

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(center: Vec2, half: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    let min = center - half;
    let max = center + half;
    quad(
        &mut vertices,
        [min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max],
        color,
    );
    vertices
}

/// Generate vertices for the outline of an axis-aligned rectangle
pub fn rect_outline(center: Vec2, half: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let min = center - half;
    let max = center + half;
    let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];

    let mut vertices = Vec::with_capacity(24);
    for i in 0..4 {
        vertices.extend(line(corners[i], corners[(i + 1) % 4], thickness, color));
    }
    vertices
}

/// Generate vertices for a thick line from `a` to `b`
pub fn line(a: Vec2, b: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (thickness / 2.0);

    let mut vertices = Vec::with_capacity(6);
    quad(&mut vertices, [a + perp, a - perp, b + perp, b - perp], color);
    vertices
}

/// Two triangles over corners ordered (a1, a2, b1, b2)
fn quad(vertices: &mut Vec<Vertex>, [a1, a2, b1, b2]: [Vec2; 4], color: [f32; 4]) {
    vertices.push(Vertex::new(a1.x, a1.y, color));
    vertices.push(Vertex::new(a2.x, a2.y, color));
    vertices.push(Vertex::new(b1.x, b1.y, color));

    vertices.push(Vertex::new(b1.x, b1.y, color));
    vertices.push(Vertex::new(a2.x, a2.y, color));
    vertices.push(Vertex::new(b2.x, b2.y, color));
}
