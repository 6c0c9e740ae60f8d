//! Bounding volumes and rays for hit testing.

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4, Zero};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray; `direction` is normalized
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    pub fn is_finite(&self) -> bool {
        [self.origin, self.direction]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices; empty input yields a point box at the origin
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Slab test. Returns the distance along the ray to the entry point, or to the
    /// exit point when the origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if direction.abs() <= f32::EPSILON {
                // Parallel to this slab: must already be inside it
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let t0 = (lo - origin) * inv;
            let t1 = (hi - origin) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners and compute new bounds
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|i| {
                let corner = Vector4::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                    1.0,
                );
                let p = matrix * corner;
                [p.x / p.w, p.y / p.w, p.z / p.w]
            })
            .collect();

        Self::from_vertices(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = Aabb::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let distance = aabb.intersect_ray(&ray);
        assert!(distance.is_some_and(|d| (d - 4.0).abs() < 1e-5));

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());

        // Box behind the ray
        let ray_away = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect_ray(&ray_away).is_none());
    }

    #[test]
    fn test_transform_translates() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.min.x, 1.0);
        assert_eq!(moved.max.x, 3.0);
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vector3::new(-1.0, 0.5, 0.0), Vector3::new(0.5, 2.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vector3::new(1.0, 2.0, 1.0));
    }
}
