//! # tessel Shared
//!
//! Math types and constants used by every tessel crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must stay dependency-light. It must NEVER depend on:
//! - `tessel_core`
//! - `tessel`
//!
//! If a type needs entity handles, it belongs in `tessel_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    DEFAULT_FIXED_TIMESTEP, GEOMETRY_EPSILON, MAX_COMPONENT_TYPES, MAX_ENTITIES,
    MAX_POLYGON_VERTICES,
};
pub use math::{Transform, Vec2};
