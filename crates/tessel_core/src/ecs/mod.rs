//! # Entity Component System
//!
//! A fixed-capacity entity table with per-type dense component arrays.
//!
//! ## Design Philosophy
//!
//! - Entity slots are allocated once and never relocated
//! - Handles carry a version so recycled slots never alias stale handles
//! - Component types get a small index on first use (one bit in the mask)
//! - Components are stored in dense arrays with stable slots

mod component;
mod entity;
mod error;
mod registry;
mod storage;
mod view;
mod world;

pub use component::{Component, TRANSFORM_TAG};
pub use entity::{EntityId, EntitySlot};
pub use error::{EcsError, EcsResult};
pub use registry::{ComponentRegistration, ComponentRegistry};
pub use storage::{ComponentStorage, ErasedStorage};
pub use view::{EntityView, MatchMode, ViewIter};
pub use world::{DestroyHook, World};
