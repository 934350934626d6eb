//! # Debug Drawing
//!
//! Read-only visualisation hook. The renderer is supplied by the caller;
//! nothing drawn here feeds back into the simulation.

use tessel_shared::Vec2;

use super::narrow_phase::WorldShape;

/// Length of drawn contact normals.
pub const NORMAL_DRAW_LENGTH: f32 = 0.5;

/// Role of a drawn primitive; the renderer picks the actual colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugColor {
    /// Static collider outline.
    Static,
    /// Dynamic collider outline, not touching anything.
    Dynamic,
    /// Collider outline currently in contact.
    Colliding,
    /// Contact point.
    ContactPoint,
    /// Contact normal.
    ContactNormal,
}

/// Target of [`crate::PhysicsSystem::debug_draw`].
pub trait DebugRenderer {
    /// Closed polygon outline, counter-clockwise.
    fn draw_polygon(&mut self, vertices: &[Vec2], color: DebugColor);
    /// Circle outline.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor);
    /// Capsule outline around segment `a -> b`.
    fn draw_capsule(&mut self, a: Vec2, b: Vec2, radius: f32, color: DebugColor);
    /// Line segment.
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: DebugColor);
    /// Point marker.
    fn draw_point(&mut self, point: Vec2, color: DebugColor);
}

/// Draws one placed shape outline.
pub fn draw_shape(renderer: &mut dyn DebugRenderer, shape: &WorldShape, color: DebugColor) {
    match *shape {
        WorldShape::Polygon(ref polygon) => renderer.draw_polygon(polygon.vertices(), color),
        WorldShape::Circle { center, radius } => renderer.draw_circle(center, radius, color),
        WorldShape::Capsule { a, b, radius } => renderer.draw_capsule(a, b, radius, color),
    }
}
