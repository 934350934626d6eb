//! # ECS Error Types
//!
//! Store operations report absence (`None`, `false`, `EntityId::NULL`) rather
//! than errors. The few fallible setup operations use these types.

use thiserror::Error;

/// Errors that can occur while configuring the entity/component store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The presence mask has no bit left for another component type.
    #[error("too many component types: limit {limit}, tried to register {type_name}")]
    TooManyComponentTypes {
        /// Maximum number of component types.
        limit: usize,
        /// Type that could not be registered.
        type_name: &'static str,
    },

    /// Requested world capacity is outside `1..=u32::MAX`.
    #[error("invalid world capacity: {0}")]
    InvalidCapacity(usize),
}

/// Result type for ECS setup operations.
pub type EcsResult<T> = Result<T, EcsError>;
