//! # Component System
//!
//! Components are data containers stored in per-type dense arrays.
//! They need a default value so recycled slots can be reset before reuse.

use tessel_shared::Transform;

/// Tag carried by [`Transform`] registrations.
pub const TRANSFORM_TAG: &str = "transform";

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: recycled storage slots are reset to this value
/// - `'static`: storages are type-erased and recovered by downcasting
///
/// Unlike plain data, components may own heap data (boxed callbacks, for
/// instance), so `Copy` is not required.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Health(u32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Default + 'static {
    /// Category tag reported when the type is first registered.
    ///
    /// Systems use tags to build interest masks without hard-coding the
    /// indices the registry hands out.
    const TAG: Option<&'static str> = None;
}

impl Component for Transform {
    const TAG: Option<&'static str> = Some(TRANSFORM_TAG);
}
