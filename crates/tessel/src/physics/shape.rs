//! # Convex Polygons
//!
//! Bounded convex polygon with precomputed centroid and outward edge normals.
//! Vertices are stored counter-clockwise in a fixed array so a polygon is
//! `Copy` and never touches the heap.

use thiserror::Error;

use tessel_shared::{Transform, Vec2, GEOMETRY_EPSILON, MAX_POLYGON_VERTICES};

/// Reasons a vertex ring or shape dimension is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// More vertices than a collider polygon can hold.
    #[error("polygon has {count} vertices, limit is {max}")]
    TooManyVertices {
        /// Number of vertices supplied.
        count: usize,
        /// Maximum supported.
        max: usize,
    },

    /// Two consecutive vertices coincide.
    #[error("polygon edge {index} has zero length")]
    DegenerateEdge {
        /// Index of the edge's first vertex.
        index: usize,
    },

    /// All vertices are collinear.
    #[error("polygon has zero area")]
    ZeroArea,

    /// The ring is not convex.
    #[error("polygon is not convex at edge {index}")]
    NotConvex {
        /// First edge whose half-plane excludes another vertex.
        index: usize,
    },

    /// A radius, extent or length is negative or not finite.
    #[error("invalid shape dimension: {value}")]
    InvalidDimension {
        /// Offending value.
        value: f32,
    },
}

/// Checks a radius/extent/length.
///
/// # Errors
///
/// [`ShapeError::InvalidDimension`] for negative or non-finite values.
pub fn validate_dimension(value: f32) -> Result<f32, ShapeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidDimension { value })
    }
}

/// A convex polygon of at most [`MAX_POLYGON_VERTICES`] vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvexPolygon {
    vertices: [Vec2; MAX_POLYGON_VERTICES],
    normals: [Vec2; MAX_POLYGON_VERTICES],
    count: usize,
    centroid: Vec2,
}

impl Default for ConvexPolygon {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConvexPolygon {
    /// A polygon with no vertices. Never collides.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            vertices: [Vec2::ZERO; MAX_POLYGON_VERTICES],
            normals: [Vec2::ZERO; MAX_POLYGON_VERTICES],
            count: 0,
            centroid: Vec2::ZERO,
        }
    }

    /// Builds a polygon from a vertex ring of either winding.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] for rings that are too small, too large,
    /// degenerate or not convex.
    pub fn new(points: &[Vec2]) -> Result<Self, ShapeError> {
        let count = points.len();
        if count < 3 {
            return Err(ShapeError::TooFewVertices { count });
        }
        if count > MAX_POLYGON_VERTICES {
            return Err(ShapeError::TooManyVertices {
                count,
                max: MAX_POLYGON_VERTICES,
            });
        }

        for i in 0..count {
            if points[i].distance_squared(points[(i + 1) % count])
                <= GEOMETRY_EPSILON * GEOMETRY_EPSILON
            {
                return Err(ShapeError::DegenerateEdge { index: i });
            }
        }

        let twice_area: f32 = (0..count)
            .map(|i| points[i].cross(points[(i + 1) % count]))
            .sum();
        if twice_area.abs() <= GEOMETRY_EPSILON {
            return Err(ShapeError::ZeroArea);
        }

        let mut vertices = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        if twice_area > 0.0 {
            vertices[..count].copy_from_slice(points);
        } else {
            // Clockwise input, rewind
            for (dst, src) in vertices[..count].iter_mut().zip(points.iter().rev()) {
                *dst = *src;
            }
        }

        let polygon = Self::from_ccw(vertices, count);

        // Every vertex must lie inside every edge's half-plane
        for i in 0..count {
            let (start, _) = polygon.edge(i);
            let normal = polygon.normals[i];
            let outside = polygon.vertices[..count]
                .iter()
                .any(|v| normal.dot(*v - start) > GEOMETRY_EPSILON);
            if outside {
                return Err(ShapeError::NotConvex { index: i });
            }
        }

        Ok(polygon)
    }

    /// Axis-aligned rectangle centred on the origin.
    ///
    /// Negative extents are mirrored; zero extents give a degenerate polygon
    /// that the narrow phase treats as non-colliding.
    #[must_use]
    pub fn rectangle(half_extents: Vec2) -> Self {
        let hx = half_extents.x.abs();
        let hy = half_extents.y.abs();
        let mut vertices = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        vertices[0] = Vec2::new(-hx, -hy);
        vertices[1] = Vec2::new(hx, -hy);
        vertices[2] = Vec2::new(hx, hy);
        vertices[3] = Vec2::new(-hx, hy);
        Self::from_ccw(vertices, 4)
    }

    /// Computes normals and centroid for an already counter-clockwise ring.
    fn from_ccw(vertices: [Vec2; MAX_POLYGON_VERTICES], count: usize) -> Self {
        let mut normals = [Vec2::ZERO; MAX_POLYGON_VERTICES];
        let mut sum = Vec2::ZERO;
        for i in 0..count {
            let edge = vertices[(i + 1) % count] - vertices[i];
            normals[i] = Vec2::new(edge.y, -edge.x).normalize_or_zero();
            sum += vertices[i];
        }
        let centroid = if count == 0 {
            Vec2::ZERO
        } else {
            sum / count as f32
        };

        Self {
            vertices,
            normals,
            count,
            centroid,
        }
    }

    /// Number of vertices (and edges).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True for the empty polygon.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Vertices, counter-clockwise.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices[..self.count]
    }

    /// Outward unit normal of each edge `i -> i+1`.
    #[inline]
    #[must_use]
    pub fn normals(&self) -> &[Vec2] {
        &self.normals[..self.count]
    }

    /// Vertex average.
    #[inline]
    #[must_use]
    pub const fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Endpoints of edge `index` (wraps around).
    #[inline]
    #[must_use]
    pub fn edge(&self, index: usize) -> (Vec2, Vec2) {
        let i = index % self.count.max(1);
        (self.vertices[i], self.vertices[(i + 1) % self.count.max(1)])
    }

    /// Index of the edge before `index`, without unsigned underflow.
    #[inline]
    #[must_use]
    pub const fn previous_edge(&self, index: usize) -> usize {
        if self.count == 0 {
            0
        } else {
            (index + self.count - 1) % self.count
        }
    }

    /// Index of the edge after `index`.
    #[inline]
    #[must_use]
    pub const fn next_edge(&self, index: usize) -> usize {
        if self.count == 0 {
            0
        } else {
            (index + 1) % self.count
        }
    }

    /// Distance from the local origin to the farthest vertex.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.vertices()
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max)
    }

    /// World-space copy of the polygon.
    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        let mut out = *self;
        for i in 0..self.count {
            out.vertices[i] = transform.apply(self.vertices[i]);
            out.normals[i] = transform.rotate_vector(self.normals[i]);
        }
        out.centroid = transform.apply(self.centroid);
        out
    }

    /// Projects every vertex on `axis`, returning `(min, max)`.
    #[must_use]
    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        self.vertices()
            .iter()
            .map(|v| v.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    /// Checks whether a point lies inside or on the polygon.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        !self.is_empty()
            && (0..self.count)
                .all(|i| self.normals[i].dot(point - self.vertices[i]) <= GEOMETRY_EPSILON)
    }
}
