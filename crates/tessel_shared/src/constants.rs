//! # Engine Constants
//!
//! Compile-time limits shared by the entity store and the collision code.
//! Runtime-tunable values live in the engine configuration instead.

/// Default number of entity slots in a world.
pub const MAX_ENTITIES: usize = 4096;

/// Width of the component presence mask (one bit per registered type).
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Maximum vertex count of a convex polygon collider.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Default fixed simulation step (seconds).
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Tolerance for half-plane tests and degenerate-geometry guards.
pub const GEOMETRY_EPSILON: f32 = 1.0e-5;
