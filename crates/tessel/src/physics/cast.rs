//! # Shape Casts
//!
//! Ray and swept-circle queries against placed shapes.
//!
//! A circle cast of radius `r` is a ray cast against every shape inflated by
//! `r` (its Minkowski sum with a disc), so both queries share one code path.

use tessel_core::EntityId;
use tessel_shared::{Vec2, GEOMETRY_EPSILON};

use super::narrow_phase::{closest_point_on_segment, WorldShape};
use super::shape::ConvexPolygon;

/// Nearest hit of a cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    /// Entity owning the hit collider.
    pub entity: EntityId,
    /// Contact point on the collider surface.
    pub point: Vec2,
    /// Surface normal at the hit, facing the caster.
    pub normal: Vec2,
    /// Distance travelled along the cast direction.
    pub distance: f32,
}

/// A ray or swept circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cast {
    /// Start point (circle centre for circle casts).
    pub origin: Vec2,
    /// Unit direction.
    pub direction: Vec2,
    /// Maximum travel.
    pub max_length: f32,
    /// Swept radius, 0 for rays.
    pub radius: f32,
}

/// Where a cast meets one shape: `(distance, normal)`.
pub type ShapeHit = (f32, Vec2);

impl Cast {
    /// Builds a cast, normalising `direction`.
    ///
    /// Returns None for a zero direction or a negative/non-finite length or
    /// radius.
    #[must_use]
    pub fn new(origin: Vec2, direction: Vec2, max_length: f32, radius: f32) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        let valid = direction != Vec2::ZERO
            && max_length.is_finite()
            && max_length >= 0.0
            && radius.is_finite()
            && radius >= 0.0;
        valid.then_some(Self {
            origin,
            direction,
            max_length,
            radius,
        })
    }

    /// Point reached after travelling `distance`.
    #[inline]
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec2 {
        self.origin + self.direction * distance
    }

    /// Tests the cast against one shape.
    #[must_use]
    pub fn against(&self, shape: &WorldShape) -> Option<ShapeHit> {
        match *shape {
            WorldShape::Polygon(ref polygon) => self.against_polygon(polygon),
            WorldShape::Circle { center, radius } => {
                self.against_rounded_segment(center, center, radius + self.radius)
            }
            WorldShape::Capsule { a, b, radius } => {
                self.against_rounded_segment(a, b, radius + self.radius)
            }
        }
    }

    /// Full hit record against one shape.
    #[must_use]
    pub fn hit(&self, entity: EntityId, shape: &WorldShape) -> Option<CastHit> {
        let (distance, normal) = self.against(shape)?;
        let point = if distance <= 0.0 {
            self.origin
        } else {
            self.at(distance) - normal * self.radius
        };
        Some(CastHit {
            entity,
            point,
            normal,
            distance,
        })
    }

    fn starting_inside(&self) -> ShapeHit {
        (0.0, -self.direction)
    }

    fn against_rounded_segment(&self, a: Vec2, b: Vec2, radius: f32) -> Option<ShapeHit> {
        let closest = closest_point_on_segment(a, b, self.origin);
        if self.origin.distance_squared(closest) <= radius * radius {
            return Some(self.starting_inside());
        }
        self.enter_rounded_segment(a, b, radius)
    }

    /// Entry into a capsule from outside.
    fn enter_rounded_segment(&self, a: Vec2, b: Vec2, radius: f32) -> Option<ShapeHit> {
        let mut best: Option<ShapeHit> = None;
        let mut keep = |hit: Option<ShapeHit>| {
            if let Some(hit) = hit {
                if best.map_or(true, |(t, _)| hit.0 < t) {
                    best = Some(hit);
                }
            }
        };

        keep(self.enter_circle(a, radius));
        let axis = b - a;
        let length = axis.length();
        if length > GEOMETRY_EPSILON {
            keep(self.enter_circle(b, radius));
            let along = axis / length;
            for side in [along.perp(), -along.perp()] {
                keep(self.enter_side(a, along, length, side, radius));
            }
        }
        best
    }

    fn enter_circle(&self, center: Vec2, radius: f32) -> Option<ShapeHit> {
        let m = self.origin - center;
        let b = m.dot(self.direction);
        let c = m.length_squared() - radius * radius;
        if c > 0.0 && b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()).max(0.0);
        if t > self.max_length {
            return None;
        }
        let normal = (self.at(t) - center).normalize_or_zero();
        Some((t, normal))
    }

    /// Flat side of a capsule: the segment offset by `radius` along `side`.
    fn enter_side(
        &self,
        start: Vec2,
        along: Vec2,
        length: f32,
        side: Vec2,
        radius: f32,
    ) -> Option<ShapeHit> {
        let denom = side.dot(self.direction);
        if denom >= -f32::EPSILON {
            return None;
        }
        let plane_point = start + side * radius;
        let t = side.dot(plane_point - self.origin) / denom;
        if t < 0.0 || t > self.max_length {
            return None;
        }
        let s = (self.at(t) - plane_point).dot(along);
        (0.0..=length).contains(&s).then_some((t, side))
    }

    fn against_polygon(&self, polygon: &ConvexPolygon) -> Option<ShapeHit> {
        if polygon.is_empty() {
            return None;
        }
        if self.radius <= 0.0 {
            return self.clip_polygon(polygon);
        }

        if polygon.contains_point(self.origin) {
            return Some(self.starting_inside());
        }
        let inside_margin = (0..polygon.len()).any(|i| {
            let (a, b) = polygon.edge(i);
            let closest = closest_point_on_segment(a, b, self.origin);
            self.origin.distance_squared(closest) <= self.radius * self.radius
        });
        if inside_margin {
            return Some(self.starting_inside());
        }

        // Inflated polygon = union of its edge capsules and interior
        let mut best: Option<ShapeHit> = None;
        for i in 0..polygon.len() {
            let (a, b) = polygon.edge(i);
            if let Some(hit) = self.enter_rounded_segment(a, b, self.radius) {
                if best.map_or(true, |(t, _)| hit.0 < t) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    /// Cyrus-Beck clipping of the ray against the polygon's half-planes.
    fn clip_polygon(&self, polygon: &ConvexPolygon) -> Option<ShapeHit> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = self.max_length;
        let mut enter_normal: Option<Vec2> = None;

        for (i, normal) in polygon.normals().iter().enumerate() {
            let numerator = normal.dot(polygon.vertices()[i] - self.origin);
            let denominator = normal.dot(self.direction);

            if denominator.abs() <= f32::EPSILON {
                if numerator < 0.0 {
                    return None;
                }
                continue;
            }

            let t = numerator / denominator;
            if denominator < 0.0 {
                if t > t_enter {
                    t_enter = t;
                    enter_normal = Some(*normal);
                }
            } else if t < t_exit {
                t_exit = t;
            }

            if t_enter > t_exit {
                return None;
            }
        }

        match enter_normal {
            Some(normal) => Some((t_enter, normal)),
            None => Some(self.starting_inside()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_shared::Transform;

    use crate::physics::collider::ColliderShape;

    fn unit_box_at(x: f32, y: f32) -> WorldShape {
        WorldShape::from_collider(
            &ColliderShape::rectangle(Vec2::new(1.0, 1.0)),
            &Transform::new(Vec2::new(x, y), 0.0),
        )
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_invalid_casts_are_rejected() {
        assert!(Cast::new(Vec2::ZERO, Vec2::ZERO, 1.0, 0.0).is_none());
        assert!(Cast::new(Vec2::ZERO, Vec2::X, -1.0, 0.0).is_none());
        assert!(Cast::new(Vec2::ZERO, Vec2::X, 1.0, f32::NAN).is_none());
        let cast = Cast::new(Vec2::ZERO, Vec2::new(3.0, 0.0), 1.0, 0.0).unwrap();
        assert_eq!(cast.direction, Vec2::X);
    }

    #[test]
    fn test_ray_hits_box_face() {
        let ray = Cast::new(Vec2::new(0.0, 5.0), -Vec2::Y, 10.0, 0.0).unwrap();
        let (distance, normal) = ray.against(&unit_box_at(0.0, 0.0)).unwrap();
        assert!(close(distance, 4.0));
        assert_eq!(normal, Vec2::Y);
    }

    #[test]
    fn test_ray_respects_max_length_and_misses() {
        let short = Cast::new(Vec2::new(0.0, 5.0), -Vec2::Y, 3.0, 0.0).unwrap();
        assert!(short.against(&unit_box_at(0.0, 0.0)).is_none());

        let beside = Cast::new(Vec2::new(3.0, 5.0), -Vec2::Y, 10.0, 0.0).unwrap();
        assert!(beside.against(&unit_box_at(0.0, 0.0)).is_none());

        let away = Cast::new(Vec2::new(0.0, 5.0), Vec2::Y, 10.0, 0.0).unwrap();
        assert!(away.against(&unit_box_at(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_starting_inside() {
        let ray = Cast::new(Vec2::ZERO, Vec2::X, 10.0, 0.0).unwrap();
        assert_eq!(ray.against(&unit_box_at(0.0, 0.0)), Some((0.0, -Vec2::X)));

        let circle = WorldShape::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
        };
        assert_eq!(ray.against(&circle), Some((0.0, -Vec2::X)));
    }

    #[test]
    fn test_ray_hits_circle_and_capsule() {
        let ray = Cast::new(Vec2::new(-5.0, 0.0), Vec2::X, 10.0, 0.0).unwrap();
        let circle = WorldShape::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
        };
        let (distance, normal) = ray.against(&circle).unwrap();
        assert!(close(distance, 4.0));
        assert!(close(normal.x, -1.0));

        let capsule = WorldShape::Capsule {
            a: Vec2::new(0.0, -1.0),
            b: Vec2::new(0.0, 1.0),
            radius: 0.5,
        };
        let high = Cast::new(Vec2::new(-5.0, 0.5), Vec2::X, 10.0, 0.0).unwrap();
        let (distance, normal) = high.against(&capsule).unwrap();
        assert!(close(distance, 4.5));
        assert!(close(normal.x, -1.0));
    }

    #[test]
    fn test_circle_cast_hits_inflated_box() {
        let cast = Cast::new(Vec2::new(0.0, 5.0), -Vec2::Y, 10.0, 0.5).unwrap();
        let hit = cast.hit(EntityId::new(1, 0), &unit_box_at(0.0, 0.0)).unwrap();
        assert!(close(hit.distance, 3.5));
        assert!(close(hit.normal.y, 1.0));
        assert!(close(hit.point.y, 1.0));

        // Grazing the corner goes round the vertex disc
        let corner = Cast::new(Vec2::new(1.3, 5.0), -Vec2::Y, 10.0, 0.5).unwrap();
        let (distance, normal) = corner.against(&unit_box_at(0.0, 0.0)).unwrap();
        assert!(distance > 3.5 && distance < 4.0);
        assert!(normal.x > 0.0 && normal.y > 0.0);
    }

    #[test]
    fn test_circle_cast_overlapping_start() {
        let cast = Cast::new(Vec2::new(0.0, 1.2), Vec2::Y, 10.0, 0.5).unwrap();
        let hit = cast.hit(EntityId::new(0, 0), &unit_box_at(0.0, 0.0)).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.normal, -Vec2::Y);
        assert_eq!(hit.point, Vec2::new(0.0, 1.2));
    }
}
