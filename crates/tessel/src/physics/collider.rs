//! # Colliders
//!
//! One component type covers every shape: a closed [`ColliderShape`] enum
//! plus the data all shapes share (static flag, bounding radius, cached
//! transform, owner callbacks).

use std::fmt;

use tessel_core::{Component, EntityId};
use tessel_shared::{Transform, Vec2};

use super::manifold::CollisionEvent;
use super::shape::{validate_dimension, ConvexPolygon, ShapeError};

/// Registration tag of collider components.
pub const COLLIDER_TAG: &str = "collider";

/// Callback run when the owner starts touching another collider.
pub type EnterCallback = Box<dyn FnMut(&CollisionEvent)>;

/// Callback run when the owner stops touching another collider.
pub type LeaveCallback = Box<dyn FnMut(EntityId)>;

/// Discriminant of [`ColliderShape`], used to index the narrow-phase table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShapeTag {
    /// Oriented rectangle.
    Box = 0,
    /// Circle.
    Circle = 1,
    /// Segment swept by a radius.
    Capsule = 2,
    /// Convex polygon.
    Polygon = 3,
}

impl ShapeTag {
    /// Number of shape tags.
    pub const COUNT: usize = 4;

    /// Every tag, in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Box, Self::Circle, Self::Capsule, Self::Polygon];

    /// Table index of the tag.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Shape-specific collider data, in the collider's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    /// Rectangle; `polygon` is derived from `half_extents`.
    Box {
        /// Half width and half height.
        half_extents: Vec2,
        /// Counter-clockwise rectangle.
        polygon: ConvexPolygon,
    },
    /// Circle centred on the origin.
    Circle {
        /// Radius.
        radius: f32,
    },
    /// Capsule whose core segment runs along local Y, centred on the origin.
    Capsule {
        /// Radius around the segment.
        radius: f32,
        /// Length of the core segment.
        segment_length: f32,
    },
    /// Arbitrary convex polygon.
    Polygon(ConvexPolygon),
}

impl ColliderShape {
    /// Box shape from half extents.
    #[must_use]
    pub fn rectangle(half_extents: Vec2) -> Self {
        Self::Box {
            half_extents,
            polygon: ConvexPolygon::rectangle(half_extents),
        }
    }

    /// Tag of this shape.
    #[must_use]
    pub const fn tag(&self) -> ShapeTag {
        match self {
            Self::Box { .. } => ShapeTag::Box,
            Self::Circle { .. } => ShapeTag::Circle,
            Self::Capsule { .. } => ShapeTag::Capsule,
            Self::Polygon(_) => ShapeTag::Polygon,
        }
    }

    /// Conservative outer radius around the local origin.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Box { polygon, .. } | Self::Polygon(polygon) => polygon.bounding_radius(),
            Self::Circle { radius } => *radius,
            Self::Capsule {
                radius,
                segment_length,
            } => segment_length * 0.5 + radius,
        }
    }
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::rectangle(Vec2::new(0.5, 0.5))
    }
}

/// Collision shape attached to an entity.
///
/// Shape setters validate their input and leave the previous shape in place
/// on failure.
pub struct Collider {
    shape: ColliderShape,
    bounding_radius: f32,
    is_static: bool,
    owner: EntityId,
    transform: Transform,
    on_enter: Option<EnterCallback>,
    on_leave: Option<LeaveCallback>,
}

impl Default for Collider {
    fn default() -> Self {
        let shape = ColliderShape::default();
        Self {
            bounding_radius: shape.bounding_radius(),
            shape,
            is_static: false,
            owner: EntityId::NULL,
            transform: Transform::IDENTITY,
            on_enter: None,
            on_leave: None,
        }
    }
}

impl Component for Collider {
    const TAG: Option<&'static str> = Some(COLLIDER_TAG);
}

impl Collider {
    /// Creates a dynamic collider with the given shape.
    #[must_use]
    pub fn new(shape: ColliderShape) -> Self {
        let mut collider = Self::default();
        collider.assign(shape);
        collider
    }

    /// Replaces the shape with an already validated one.
    pub fn set_shape(&mut self, shape: ColliderShape) {
        self.assign(shape);
    }

    fn assign(&mut self, shape: ColliderShape) {
        self.bounding_radius = shape.bounding_radius();
        self.shape = shape;
    }

    /// The local-space shape.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Shape tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> ShapeTag {
        self.shape.tag()
    }

    /// Conservative outer radius used by the broad phase.
    #[inline]
    #[must_use]
    pub const fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Static colliders never test against other static colliders.
    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Marks the collider static or dynamic.
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    /// Entity this collider belonged to at the last refresh.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Transform snapshot taken at the last refresh.
    #[inline]
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Turns the collider into a box.
    ///
    /// # Errors
    ///
    /// [`ShapeError::InvalidDimension`] for negative or non-finite extents.
    pub fn set_box(&mut self, half_extents: Vec2) -> Result<(), ShapeError> {
        validate_dimension(half_extents.x)?;
        validate_dimension(half_extents.y)?;
        self.assign(ColliderShape::rectangle(half_extents));
        Ok(())
    }

    /// Turns the collider into a circle.
    ///
    /// # Errors
    ///
    /// [`ShapeError::InvalidDimension`] for a negative or non-finite radius.
    pub fn set_circle(&mut self, radius: f32) -> Result<(), ShapeError> {
        let radius = validate_dimension(radius)?;
        self.assign(ColliderShape::Circle { radius });
        Ok(())
    }

    /// Turns the collider into a capsule along local Y.
    ///
    /// # Errors
    ///
    /// [`ShapeError::InvalidDimension`] for negative or non-finite values.
    pub fn set_capsule(&mut self, radius: f32, segment_length: f32) -> Result<(), ShapeError> {
        let radius = validate_dimension(radius)?;
        let segment_length = validate_dimension(segment_length)?;
        self.assign(ColliderShape::Capsule {
            radius,
            segment_length,
        });
        Ok(())
    }

    /// Turns the collider into a convex polygon.
    ///
    /// # Errors
    ///
    /// Any [`ShapeError`] from [`ConvexPolygon::new`]; the previous shape is
    /// kept.
    pub fn set_polygon(&mut self, vertices: &[Vec2]) -> Result<(), ShapeError> {
        match ConvexPolygon::new(vertices) {
            Ok(polygon) => {
                self.assign(ColliderShape::Polygon(polygon));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "polygon collider rejected");
                Err(err)
            }
        }
    }

    /// Registers the enter callback, replacing any previous one.
    pub fn on_body_enter<F>(&mut self, callback: F)
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        self.on_enter = Some(Box::new(callback));
    }

    /// Registers the leave callback, replacing any previous one.
    pub fn on_body_leave<F>(&mut self, callback: F)
    where
        F: FnMut(EntityId) + 'static,
    {
        self.on_leave = Some(Box::new(callback));
    }

    /// Drops both callbacks.
    pub fn clear_callbacks(&mut self) {
        self.on_enter = None;
        self.on_leave = None;
    }

    /// Records the owner and transform snapshot for this tick.
    pub(crate) fn refresh(&mut self, owner: EntityId, transform: Transform) {
        self.owner = owner;
        self.transform = transform;
        self.bounding_radius = self.shape.bounding_radius();
    }

    pub(crate) fn notify_enter(&mut self, event: &CollisionEvent) {
        if let Some(callback) = self.on_enter.as_mut() {
            callback(event);
        }
    }

    pub(crate) fn notify_leave(&mut self, other: EntityId) {
        if let Some(callback) = self.on_leave.as_mut() {
            callback(other);
        }
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("shape", &self.shape)
            .field("bounding_radius", &self.bounding_radius)
            .field("is_static", &self.is_static)
            .field("owner", &self.owner)
            .field("transform", &self.transform)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}
