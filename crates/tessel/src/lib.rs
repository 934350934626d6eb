//! # tessel
//!
//! 2D simulation core: entity/component store, collision detection and a
//! fixed-step driver.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               TESSEL                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │  tessel_shared  │────>│  tessel_core    │────>│  physics        │   │
//! │  │                 │     │                 │     │                 │   │
//! │  │  • Vec2         │     │  • Entities     │     │  • Broad phase  │   │
//! │  │  • Transform    │     │  • Components   │     │  • SAT / round  │   │
//! │  │  • Constants    │     │  • Views        │     │  • Manifolds    │   │
//! │  └─────────────────┘     └─────────────────┘     │  • Casts        │   │
//! │                                                  └────────┬────────┘   │
//! │                          ┌─────────────────┐              │            │
//! │                          │  game_loop      │<─────────────┘            │
//! │                          │  • Fixed step   │                           │
//! │                          │  • Config       │                           │
//! │                          └─────────────────┘                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML engine configuration
//! - `game_loop`: Fixed-step orchestration
//! - `physics`: Colliders, contact tracking, casts

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod game_loop;
pub mod physics;

// Re-export the layers below
pub use tessel_core as ecs;
pub use tessel_shared as shared;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigResult, EngineConfig, GameLoopConfig, PhysicsConfig, WorldConfig,
};
pub use game_loop::{FrameStats, GameLoop, MAX_FRAME_TIME};
pub use physics::{
    CastHit, Collider, ColliderShape, CollisionEvent, CollisionManifold, ContactEvent,
    DebugColor, DebugRenderer, ManifoldStore, PhysicsSystem, ShapeError, StepStats,
};
pub use tessel_core::{EntityId, MatchMode, Transform, Vec2, World};
