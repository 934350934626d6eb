//! # Narrow Phase
//!
//! Exact intersection tests for every pair of collider shapes.
//!
//! Tests are looked up in a table indexed by the two [`ShapeTag`]s. Only one
//! orientation of each unordered pair is filled in; the other is served by
//! swapping the arguments and inverting [`Contact::body1_is_reference`].
//!
//! Every test works on [`WorldShape`]s, the world-space snapshots built once
//! per tick, and returns a manifold whose normal points from the reference
//! body toward the other body.

use tessel_shared::{Transform, Vec2, GEOMETRY_EPSILON};

use super::collider::{ColliderShape, ShapeTag};
use super::manifold::CollisionManifold;
use super::shape::ConvexPolygon;

// ============================================================================
// WORLD-SPACE SHAPES
// ============================================================================

/// A collider shape placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldShape {
    /// Box or convex polygon, vertices in world space.
    Polygon(ConvexPolygon),
    /// Circle.
    Circle {
        /// World-space centre.
        center: Vec2,
        /// Radius.
        radius: f32,
    },
    /// Segment `a -> b` swept by `radius`.
    Capsule {
        /// First segment endpoint.
        a: Vec2,
        /// Second segment endpoint.
        b: Vec2,
        /// Radius.
        radius: f32,
    },
}

impl WorldShape {
    /// Places a local shape with a transform.
    #[must_use]
    pub fn from_collider(shape: &ColliderShape, transform: &Transform) -> Self {
        match shape {
            ColliderShape::Box { polygon, .. } | ColliderShape::Polygon(polygon) => {
                Self::Polygon(polygon.transformed(transform))
            }
            ColliderShape::Circle { radius } => Self::Circle {
                center: transform.position,
                radius: *radius,
            },
            ColliderShape::Capsule {
                radius,
                segment_length,
            } => {
                let half = Vec2::new(0.0, segment_length * 0.5);
                Self::Capsule {
                    a: transform.apply(-half),
                    b: transform.apply(half),
                    radius: *radius,
                }
            }
        }
    }

    /// Core segment and radius: polygons have none.
    #[must_use]
    pub fn as_rounded_segment(&self) -> Option<(Vec2, Vec2, f32)> {
        match *self {
            Self::Polygon(_) => None,
            Self::Circle { center, radius } => Some((center, center, radius)),
            Self::Capsule { a, b, radius } => Some((a, b, radius)),
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Result of a positive intersection test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Contact data in the reference body's frame.
    pub manifold: CollisionManifold,
    /// Whether the first shape passed to the test owns the reference feature.
    pub body1_is_reference: bool,
}

impl Contact {
    fn body1(manifold: CollisionManifold) -> Self {
        Self {
            manifold,
            body1_is_reference: true,
        }
    }

    /// The same contact with the argument order reversed.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            manifold: self.manifold,
            body1_is_reference: !self.body1_is_reference,
        }
    }
}

/// Signature of a shape-pair test.
pub type NarrowPhaseFn = fn(&WorldShape, &WorldShape) -> Option<Contact>;

/// Pair tests by `[tag1][tag2]`; `None` entries are served swapped.
const NARROW_PHASE_TABLE: [[Option<NarrowPhaseFn>; ShapeTag::COUNT]; ShapeTag::COUNT] = [
    // Box
    [
        Some(polygon_polygon),
        Some(polygon_circle),
        Some(polygon_capsule),
        Some(polygon_polygon),
    ],
    // Circle
    [None, Some(circle_circle), Some(circle_capsule), None],
    // Capsule
    [None, None, Some(capsule_capsule), None],
    // Polygon
    [None, Some(polygon_circle), Some(polygon_capsule), Some(polygon_polygon)],
];

/// Resolves the test for an ordered tag pair.
///
/// # Returns
///
/// The test and whether its arguments must be swapped.
#[must_use]
pub fn resolve(tag1: ShapeTag, tag2: ShapeTag) -> Option<(NarrowPhaseFn, bool)> {
    if let Some(test) = NARROW_PHASE_TABLE[tag1.index()][tag2.index()] {
        return Some((test, false));
    }
    NARROW_PHASE_TABLE[tag2.index()][tag1.index()].map(|test| (test, true))
}

/// Runs the exact test for two placed shapes.
#[must_use]
pub fn collide(
    tag1: ShapeTag,
    shape1: &WorldShape,
    tag2: ShapeTag,
    shape2: &WorldShape,
) -> Option<Contact> {
    match resolve(tag1, tag2)? {
        (test, false) => test(shape1, shape2),
        (test, true) => test(shape2, shape1).map(Contact::swapped),
    }
}

// ============================================================================
// POLYGON / POLYGON
// ============================================================================

fn polygon_polygon(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (WorldShape::Polygon(p1), WorldShape::Polygon(p2)) = (shape1, shape2) else {
        return None;
    };
    sat_polygons(p1, p2)
}

/// Overlap of the two projections on `axis`, negative when separated.
fn axis_penetration(p1: &ConvexPolygon, p2: &ConvexPolygon, axis: Vec2) -> f32 {
    let (min1, max1) = p1.project(axis);
    let (min2, max2) = p2.project(axis);
    let combined_span = max1.max(max2) - min1.min(min2);
    (max1 - min1) + (max2 - min2) - combined_span
}

/// Normals whose dots differ by less than this count as equally opposed.
const PARALLEL_TOLERANCE: f32 = 1.0e-4;

/// Edge of `polygon` whose normal is most anti-parallel to `normal`.
///
/// Ties keep the lowest edge index.
fn most_opposed_edge(polygon: &ConvexPolygon, normal: Vec2) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, n) in polygon.normals().iter().enumerate() {
        let d = n.dot(normal);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Edge of `p2` opposing `normal1`, with its penetration depth.
///
/// Among edges within [`PARALLEL_TOLERANCE`] of the most anti-parallel one,
/// the shallowest wins, then the lowest index.
fn opposing_edge(p1: &ConvexPolygon, p2: &ConvexPolygon, normal1: Vec2) -> Option<(usize, f32)> {
    let min_dot = p2
        .normals()
        .iter()
        .map(|n| n.dot(normal1))
        .fold(f32::INFINITY, f32::min);

    let mut best: Option<(usize, f32)> = None;
    for (i, n) in p2.normals().iter().enumerate() {
        if n.dot(normal1) > min_dot + PARALLEL_TOLERANCE {
            continue;
        }
        let depth = if n.length_squared() <= GEOMETRY_EPSILON {
            f32::INFINITY
        } else {
            axis_penetration(p1, p2, *n)
        };
        if best.map_or(true, |(_, d)| depth < d) {
            best = Some((i, depth));
        }
    }
    best
}

/// Separating-axis test with reference/incident edge clipping.
///
/// Every edge normal of both polygons is a candidate separating axis. The
/// reference edge is the minimum-penetration edge of `p1` among those
/// facing `p2`, unless the opposing edge of `p2` penetrates less; ties go
/// to `p1`.
pub(crate) fn sat_polygons(p1: &ConvexPolygon, p2: &ConvexPolygon) -> Option<Contact> {
    if p1.is_empty() || p2.is_empty() {
        return None;
    }

    let toward_p2 = p2.centroid() - p1.centroid();
    let mut best: Option<(usize, f32)> = None;

    for (i, normal) in p1.normals().iter().enumerate() {
        if normal.length_squared() <= GEOMETRY_EPSILON {
            continue;
        }
        let penetration = axis_penetration(p1, p2, *normal);
        if penetration < 0.0 {
            return None;
        }
        if normal.dot(toward_p2) < 0.0 {
            continue;
        }
        if best.map_or(true, |(_, best_pen)| penetration < best_pen) {
            best = Some((i, penetration));
        }
    }

    // p2's axes can separate shapes that p1's cannot
    for normal in p2.normals() {
        if normal.length_squared() > GEOMETRY_EPSILON && axis_penetration(p1, p2, *normal) < 0.0 {
            return None;
        }
    }

    let (edge1, depth1) = best?;
    let (edge2, depth2) = opposing_edge(p1, p2, p1.normals()[edge1])?;

    let (reference, ref_edge, incident, body1_is_reference, depth) = if depth1 <= depth2 {
        (p1, edge1, p2, true, depth1)
    } else {
        (p2, edge2, p1, false, depth2)
    };

    let ref_normal = reference.normals()[ref_edge];
    let inc_edge = most_opposed_edge(incident, ref_normal)?;
    let points = clip_incident_edge(reference, ref_edge, incident.edge(inc_edge));

    Some(Contact {
        manifold: CollisionManifold::new(ref_normal, depth, &points),
        body1_is_reference,
    })
}

/// Clips the incident edge to the reference edge's side planes and keeps
/// the points behind the reference face.
fn clip_incident_edge(
    reference: &ConvexPolygon,
    ref_edge: usize,
    incident: (Vec2, Vec2),
) -> Vec<Vec2> {
    let mut segment = [incident.0, incident.1];

    for neighbour in [reference.previous_edge(ref_edge), reference.next_edge(ref_edge)] {
        let (origin, _) = reference.edge(neighbour);
        let normal = reference.normals()[neighbour];
        match clip_to_half_plane(segment, normal, origin) {
            Some(clipped) => segment = clipped,
            None => return Vec::new(),
        }
    }

    let (ref_start, _) = reference.edge(ref_edge);
    let ref_normal = reference.normals()[ref_edge];
    segment
        .into_iter()
        .filter(|p| ref_normal.dot(*p - ref_start) <= GEOMETRY_EPSILON)
        .collect()
}

/// Keeps the part of a segment inside `dot(normal, p - origin) <= 0`.
///
/// An endpoint outside the plane is replaced by the line intersection.
/// Returns None when both endpoints are outside.
fn clip_to_half_plane(segment: [Vec2; 2], normal: Vec2, origin: Vec2) -> Option<[Vec2; 2]> {
    let [a, b] = segment;
    let da = normal.dot(a - origin);
    let db = normal.dot(b - origin);
    let outside_a = da > GEOMETRY_EPSILON;
    let outside_b = db > GEOMETRY_EPSILON;

    match (outside_a, outside_b) {
        (false, false) => Some(segment),
        (true, true) => None,
        _ => {
            let denom = da - db;
            if denom.abs() <= f32::EPSILON {
                return Some(segment);
            }
            let hit = a + (b - a) * (da / denom);
            if outside_a {
                Some([hit, b])
            } else {
                Some([a, hit])
            }
        }
    }
}

// ============================================================================
// ROUND SHAPES
// ============================================================================

fn circle_circle(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (
        WorldShape::Circle {
            center: c1,
            radius: r1,
        },
        WorldShape::Circle {
            center: c2,
            radius: r2,
        },
    ) = (*shape1, *shape2)
    else {
        return None;
    };
    round_contact(c1, r1, c2, r2).map(Contact::body1)
}

fn circle_capsule(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (WorldShape::Circle { center, radius }, Some((a, b, cap_radius))) =
        (*shape1, shape2.as_rounded_segment())
    else {
        return None;
    };
    let closest = closest_point_on_segment(a, b, center);
    round_contact(center, radius, closest, cap_radius).map(Contact::body1)
}

fn capsule_capsule(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (Some((a1, b1, r1)), Some((a2, b2, r2))) =
        (shape1.as_rounded_segment(), shape2.as_rounded_segment())
    else {
        return None;
    };
    let (p1, p2) = closest_points_on_segments(a1, b1, a2, b2);
    round_contact(p1, r1, p2, r2).map(Contact::body1)
}

/// Two discs; coincident centres separate along +X.
fn round_contact(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> Option<CollisionManifold> {
    let delta = c2 - c1;
    let radii = r1 + r2;
    let dist_sq = delta.length_squared();
    if dist_sq > radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist <= GEOMETRY_EPSILON {
        Vec2::X
    } else {
        delta / dist
    };
    let depth = radii - dist;
    let point = c1 + normal * (r1 - depth * 0.5);
    Some(CollisionManifold::new(normal, depth, &[point]))
}

/// Closest point to `p` on segment `a -> b`.
pub(crate) fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest pair of points between segments `p1 -> q1` and `p2 -> q2`.
pub(crate) fn closest_points_on_segments(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> (Vec2, Vec2) {
    let eps = GEOMETRY_EPSILON * GEOMETRY_EPSILON;
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a <= eps && e <= eps {
        return (p1, p2);
    }

    let (s, t) = if a <= eps {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= eps {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let s = if denom > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

// ============================================================================
// POLYGON / ROUND SHAPES
// ============================================================================

/// Edge of maximum separation from a point: `(edge, separation)`.
fn max_separation_edge(polygon: &ConvexPolygon, point: Vec2) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, normal) in polygon.normals().iter().enumerate() {
        let separation = normal.dot(point - polygon.vertices()[i]);
        if best.map_or(true, |(_, s)| separation > s) {
            best = Some((i, separation));
        }
    }
    best
}

fn polygon_circle(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (WorldShape::Polygon(polygon), WorldShape::Circle { center, radius }) = (shape1, *shape2)
    else {
        return None;
    };

    let (edge, separation) = max_separation_edge(polygon, center)?;
    if separation > radius {
        return None;
    }

    let normal = polygon.normals()[edge];
    if separation <= GEOMETRY_EPSILON {
        // Centre inside: push out through the nearest face
        let point = center - normal * separation;
        return Some(Contact::body1(CollisionManifold::new(
            normal,
            radius - separation,
            &[point],
        )));
    }

    let (a, b) = polygon.edge(edge);
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq <= GEOMETRY_EPSILON {
        0.0
    } else {
        (center - a).dot(ab) / len_sq
    };

    let manifold = if t < 0.0 || t > 1.0 {
        let corner = if t < 0.0 { a } else { b };
        let delta = center - corner;
        let dist = delta.length();
        if dist > radius {
            return None;
        }
        let normal = if dist <= GEOMETRY_EPSILON {
            normal
        } else {
            delta / dist
        };
        CollisionManifold::new(normal, radius - dist, &[corner])
    } else {
        CollisionManifold::new(normal, radius - separation, &[center - normal * separation])
    };
    Some(Contact::body1(manifold))
}

fn polygon_capsule(shape1: &WorldShape, shape2: &WorldShape) -> Option<Contact> {
    let (WorldShape::Polygon(polygon), Some((a, b, radius))) =
        (shape1, shape2.as_rounded_segment())
    else {
        return None;
    };
    if polygon.is_empty() {
        return None;
    }

    // Closest features of the segment and the polygon boundary
    let mut closest: Option<(Vec2, Vec2, f32)> = None;
    for i in 0..polygon.len() {
        let (start, end) = polygon.edge(i);
        let (on_polygon, on_segment) = closest_points_on_segments(start, end, a, b);
        let dist_sq = on_polygon.distance_squared(on_segment);
        if closest.map_or(true, |(_, _, d)| dist_sq < d) {
            closest = Some((on_polygon, on_segment, dist_sq));
        }
    }
    let (on_polygon, on_segment, dist_sq) = closest?;

    let touching_core = dist_sq <= GEOMETRY_EPSILON * GEOMETRY_EPSILON
        || polygon.contains_point(a)
        || polygon.contains_point(b);

    if !touching_core {
        if dist_sq > radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        let normal = (on_segment - on_polygon) / dist;
        return Some(Contact::body1(CollisionManifold::new(
            normal,
            radius - dist,
            &[on_polygon],
        )));
    }

    deep_polygon_segment(polygon, a, b, radius).map(Contact::body1)
}

/// Segment core inside or crossing the polygon: minimum-overlap axis.
fn deep_polygon_segment(
    polygon: &ConvexPolygon,
    a: Vec2,
    b: Vec2,
    radius: f32,
) -> Option<CollisionManifold> {
    let toward_segment = (a + b) * 0.5 - polygon.centroid();
    let segment_axis = (b - a).perp().normalize_or_zero();

    let axes = polygon
        .normals()
        .iter()
        .copied()
        .chain([segment_axis, -segment_axis]);

    let mut best: Option<(Vec2, f32)> = None;
    for axis in axes {
        if axis.length_squared() <= GEOMETRY_EPSILON || axis.dot(toward_segment) <= 0.0 {
            continue;
        }
        let overlap = segment_overlap(polygon, a, b, radius, axis);
        if overlap < 0.0 {
            return None;
        }
        if best.map_or(true, |(_, o)| overlap < o) {
            best = Some((axis, overlap));
        }
    }

    // A segment centred on the centroid faces no axis
    let (normal, depth) = best.or_else(|| {
        polygon
            .normals()
            .first()
            .map(|n| (*n, segment_overlap(polygon, a, b, radius, *n)))
    })?;

    let inside: Vec<Vec2> = [a, b]
        .into_iter()
        .filter(|p| polygon.contains_point(*p))
        .collect();
    let points = if inside.is_empty() {
        vec![if normal.dot(a) <= normal.dot(b) { a } else { b }]
    } else {
        inside
    };

    Some(CollisionManifold::new(normal, depth, &points))
}

/// Overlap on `axis` of a polygon and a segment inflated by `radius`.
fn segment_overlap(polygon: &ConvexPolygon, a: Vec2, b: Vec2, radius: f32, axis: Vec2) -> f32 {
    let (poly_min, poly_max) = polygon.project(axis);
    let (da, db) = (a.dot(axis), b.dot(axis));
    poly_max.min(da.max(db) + radius) - poly_min.max(da.min(db) - radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn boxed(x: f32, y: f32, half: f32, rotation: f32) -> WorldShape {
        WorldShape::from_collider(
            &ColliderShape::rectangle(Vec2::new(half, half)),
            &Transform::new(Vec2::new(x, y), rotation),
        )
    }

    fn circle(x: f32, y: f32, radius: f32) -> WorldShape {
        WorldShape::Circle {
            center: Vec2::new(x, y),
            radius,
        }
    }

    fn capsule(x: f32, y: f32, radius: f32, length: f32) -> WorldShape {
        WorldShape::from_collider(
            &ColliderShape::Capsule {
                radius,
                segment_length: length,
            },
            &Transform::new(Vec2::new(x, y), 0.0),
        )
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn close_vec(a: Vec2, b: Vec2) -> bool {
        close(a.x, b.x) && close(a.y, b.y)
    }

    #[test]
    fn test_every_tag_pair_resolves() {
        for tag1 in ShapeTag::ALL {
            for tag2 in ShapeTag::ALL {
                assert!(resolve(tag1, tag2).is_some(), "{tag1:?} {tag2:?}");
            }
        }
        assert!(!resolve(ShapeTag::Box, ShapeTag::Circle).unwrap().1);
        assert!(resolve(ShapeTag::Circle, ShapeTag::Box).unwrap().1);
    }

    #[test]
    fn test_axis_aligned_boxes_overlap() {
        let contact = collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Box,
            &boxed(1.5, 0.0, 1.0, 0.0),
        )
        .unwrap();

        assert!(contact.body1_is_reference);
        let manifold = contact.manifold;
        assert!(close(manifold.penetration_depth, 0.5));
        assert!(close_vec(manifold.normal, Vec2::X));
        assert_eq!(manifold.points().len(), 2);
        assert!(close_vec(manifold.points()[0], Vec2::new(0.5, 1.0)));
        assert!(close_vec(manifold.points()[1], Vec2::new(0.5, -1.0)));
    }

    #[test]
    fn test_swapped_boxes_report_other_reference() {
        let contact = collide(
            ShapeTag::Box,
            &boxed(1.5, 0.0, 1.0, 0.0),
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
        )
        .unwrap();
        // Depth tie keeps the first body as reference
        assert!(contact.body1_is_reference);
        assert!(close_vec(contact.manifold.normal, -Vec2::X));
        assert!(close(contact.manifold.penetration_depth, 0.5));
    }

    #[test]
    fn test_rotated_box_corner_contact() {
        let contact = collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Box,
            &boxed(2.0, 0.0, 1.0, FRAC_PI_4),
        )
        .unwrap();

        let depth = 2.0_f32.sqrt() - 1.0;
        assert!(contact.body1_is_reference);
        assert!(close(contact.manifold.penetration_depth, depth));
        assert!(close_vec(contact.manifold.normal, Vec2::X));
        assert_eq!(contact.manifold.points().len(), 1);
        assert!(close_vec(
            contact.manifold.points()[0],
            Vec2::new(2.0 - 2.0_f32.sqrt(), 0.0)
        ));
    }

    #[test]
    fn test_rotated_box_second_body_reference() {
        // Two edges of the flat box oppose the chosen face equally; the
        // shallower one becomes the reference
        let contact = collide(
            ShapeTag::Box,
            &boxed(2.0, 0.0, 1.0, FRAC_PI_4),
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
        )
        .unwrap();

        assert!(!contact.body1_is_reference);
        assert!(close(contact.manifold.penetration_depth, 2.0_f32.sqrt() - 1.0));
        assert!(close_vec(contact.manifold.normal, Vec2::X));
        assert_eq!(contact.manifold.points().len(), 1);
        assert!(close_vec(
            contact.manifold.points()[0],
            Vec2::new(2.0 - 2.0_f32.sqrt(), 0.0)
        ));
    }

    #[test]
    fn test_separated_boxes() {
        assert!(collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Box,
            &boxed(3.0, 0.0, 1.0, 0.0),
        )
        .is_none());
        assert!(collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Box,
            &boxed(2.5, 0.0, 1.0, FRAC_PI_4),
        )
        .is_none());
    }

    #[test]
    fn test_triangle_against_box() {
        let triangle = ConvexPolygon::new(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
        ])
        .unwrap();
        let tri = WorldShape::Polygon(triangle);
        let probe = boxed(1.6, 1.6, 0.25, 0.0);
        assert!(collide(ShapeTag::Polygon, &tri, ShapeTag::Box, &probe).is_none());

        let probe = boxed(0.5, 0.5, 0.25, 0.0);
        assert!(collide(ShapeTag::Polygon, &tri, ShapeTag::Box, &probe).is_some());
    }

    #[test]
    fn test_degenerate_box_never_collides() {
        let flat = boxed(0.0, 0.0, 0.0, 0.0);
        assert!(collide(ShapeTag::Box, &flat, ShapeTag::Box, &boxed(0.0, 0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_circle_circle() {
        let contact = collide(
            ShapeTag::Circle,
            &circle(0.0, 0.0, 1.0),
            ShapeTag::Circle,
            &circle(1.5, 0.0, 1.0),
        )
        .unwrap();
        assert!(close(contact.manifold.penetration_depth, 0.5));
        assert!(close_vec(contact.manifold.normal, Vec2::X));
        assert!(close_vec(contact.manifold.points()[0], Vec2::new(0.75, 0.0)));

        let coincident = collide(
            ShapeTag::Circle,
            &circle(1.0, 1.0, 1.0),
            ShapeTag::Circle,
            &circle(1.0, 1.0, 1.0),
        )
        .unwrap();
        assert_eq!(coincident.manifold.normal, Vec2::X);
        assert!(close(coincident.manifold.penetration_depth, 2.0));

        assert!(collide(
            ShapeTag::Circle,
            &circle(0.0, 0.0, 1.0),
            ShapeTag::Circle,
            &circle(10.0, 0.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_box_circle_face_and_corner() {
        let face = collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Circle,
            &circle(0.0, 1.5, 1.0),
        )
        .unwrap();
        assert!(face.body1_is_reference);
        assert!(close_vec(face.manifold.normal, Vec2::Y));
        assert!(close(face.manifold.penetration_depth, 0.5));

        let corner = collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Circle,
            &circle(1.5, 1.5, 1.0),
        )
        .unwrap();
        let diag = std::f32::consts::FRAC_1_SQRT_2;
        assert!(close_vec(corner.manifold.normal, Vec2::new(diag, diag)));
        assert!(close_vec(corner.manifold.points()[0], Vec2::new(1.0, 1.0)));

        assert!(collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Circle,
            &circle(1.8, 1.8, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_circle_box_is_served_swapped() {
        let contact = collide(
            ShapeTag::Circle,
            &circle(0.0, 1.5, 1.0),
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!(!contact.body1_is_reference);
        // Normal still points from the box (the reference) to the circle
        assert!(close_vec(contact.manifold.normal, Vec2::Y));
    }

    #[test]
    fn test_circle_inside_box() {
        let contact = collide(
            ShapeTag::Box,
            &boxed(0.0, 0.0, 1.0, 0.0),
            ShapeTag::Circle,
            &circle(0.8, 0.0, 0.1),
        )
        .unwrap();
        assert!(close_vec(contact.manifold.normal, Vec2::X));
        assert!(close(contact.manifold.penetration_depth, 0.3));
    }

    #[test]
    fn test_capsule_pairs() {
        let upright = capsule(0.0, 0.0, 0.5, 2.0);

        let side = collide(ShapeTag::Circle, &circle(0.9, 0.5, 0.5), ShapeTag::Capsule, &upright)
            .unwrap();
        assert!(close(side.manifold.penetration_depth, 0.1));
        assert!(close_vec(side.manifold.normal, -Vec2::X));

        let stacked = collide(ShapeTag::Capsule, &upright, ShapeTag::Capsule, &capsule(0.0, 2.5, 0.5, 2.0))
            .unwrap();
        assert!(close(stacked.manifold.penetration_depth, 0.5));
        assert!(close_vec(stacked.manifold.normal, Vec2::Y));

        assert!(collide(ShapeTag::Capsule, &upright, ShapeTag::Capsule, &capsule(2.0, 0.0, 0.5, 2.0))
            .is_none());
    }

    #[test]
    fn test_box_capsule_shallow_and_deep() {
        let ground = boxed(0.0, 0.0, 1.0, 0.0);

        let resting = collide(ShapeTag::Box, &ground, ShapeTag::Capsule, &capsule(0.0, 2.4, 0.5, 2.0))
            .unwrap();
        assert!(close_vec(resting.manifold.normal, Vec2::Y));
        assert!(close(resting.manifold.penetration_depth, 0.1));

        let sunk = collide(ShapeTag::Box, &ground, ShapeTag::Capsule, &capsule(0.0, 1.5, 0.5, 2.0))
            .unwrap();
        assert!(close_vec(sunk.manifold.normal, Vec2::Y));
        assert!(close(sunk.manifold.penetration_depth, 1.0));
        assert_eq!(sunk.manifold.points().len(), 1);

        assert!(collide(ShapeTag::Box, &ground, ShapeTag::Capsule, &capsule(3.0, 0.0, 0.5, 2.0))
            .is_none());
    }

    #[test]
    fn test_closest_points_on_crossing_segments() {
        let (p, q) = closest_points_on_segments(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
        );
        assert!(close_vec(p, Vec2::ZERO));
        assert!(close_vec(q, Vec2::ZERO));
    }
}
