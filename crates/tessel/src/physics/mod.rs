//! # tessel Physics
//!
//! Overlap detection for 2D colliders: no forces, no integration.
//!
//! Features:
//! - Box, circle, capsule and convex polygon colliders
//! - Brute-force broad phase with a bounding-circle reject
//! - Separating-axis polygon clipping and round-shape distance tests
//! - Persistent per-pair manifolds with enter/leave callbacks and events
//! - Ray and circle casts
//! - Debug drawing hook

mod cast;
mod collider;
mod debug;
mod manifold;
mod narrow_phase;
mod shape;
mod system;

pub use cast::{Cast, CastHit, ShapeHit};
pub use collider::{
    Collider, ColliderShape, EnterCallback, LeaveCallback, ShapeTag, COLLIDER_TAG,
};
pub use debug::{draw_shape, DebugColor, DebugRenderer, NORMAL_DRAW_LENGTH};
pub use manifold::{pair_key, CollisionEvent, CollisionManifold, ManifoldEntry, ManifoldStore};
pub use narrow_phase::{collide, resolve, Contact, NarrowPhaseFn, WorldShape};
pub use shape::{validate_dimension, ConvexPolygon, ShapeError};
pub use system::{ColliderProxy, ContactEvent, PhysicsSystem, StepStats};
