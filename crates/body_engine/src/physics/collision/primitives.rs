//! Primitive collision shapes and intersection algorithms
//!
//! Provides the basic geometric primitives the broad-phase works with.

use crate::foundation::math::Vec3d;

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere in frame space
    pub center: Vec3d,
    /// The radius of the sphere
    pub radius: f64,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3d, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f64 {
        let distance = (self.center - other.center).magnitude();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }
}

/// A triangle of collision geometry
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex (model space)
    pub v0: Vec3d,
    /// Second vertex
    pub v1: Vec3d,
    /// Third vertex
    pub v2: Vec3d,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3d, v1: Vec3d, v2: Vec3d) -> Self {
        Self { v0, v1, v2 }
    }

    /// The three vertices in winding order
    pub fn vertices(&self) -> [Vec3d; 3] {
        [self.v0, self.v1, self.v2]
    }
}
