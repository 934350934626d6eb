//! # tessel Core
//!
//! Entity/component store for the tessel 2D simulation core:
//! - Fixed-capacity entity table with versioned handles
//! - One dense, slot-stable array per component type
//! - Lazy per-type registration with a pull-based registration log
//! - Mask-based entity views
//!
//! ## Architecture Rules
//!
//! 1. **Absence, not panics** - invalid handles make every operation a no-op
//! 2. **Stable storage** - slots never move; removal never shifts neighbours
//! 3. **Deterministic iteration** - views walk slots in index order
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessel_core::{World, Transform};
//!
//! let mut world = World::new(4096);
//! let e = world.create();
//! world.add_component::<Transform>(e);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;

pub use ecs::{
    Component, ComponentRegistration, ComponentRegistry, ComponentStorage, DestroyHook,
    EcsError, EcsResult, EntityId, EntitySlot, EntityView, ErasedStorage, MatchMode, ViewIter,
    World, TRANSFORM_TAG,
};
pub use tessel_shared::{Transform, Vec2};
