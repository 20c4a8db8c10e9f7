//! Axis-aligned bounding volumes in simulation precision

use crate::foundation::math::Vec3d;

/// Axis-Aligned Bounding Box
///
/// Besides its corners the box tracks `radius`, the largest distance of any
/// included point from the local origin. For model geometry that is the
/// bounding sphere about the model origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3d,
    /// Maximum corner of the bounding box
    pub max: Vec3d,
    /// Furthest included point from the origin
    pub radius: f64,
}

impl Aabb {
    /// Create an AABB from min and max points
    pub fn new(min: Vec3d, max: Vec3d) -> Self {
        let radius = min.magnitude().max(max.magnitude());
        Self { min, max, radius }
    }

    /// An inverted box that contains nothing until points are included
    pub fn empty() -> Self {
        Self {
            min: Vec3d::repeat(f64::INFINITY),
            max: Vec3d::repeat(f64::NEG_INFINITY),
            radius: 0.0,
        }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3d, extents: Vec3d) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Build the tightest box around a set of points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3d>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.include_point(point);
        }
        aabb
    }

    /// Grow the box to include `point`
    pub fn include_point(&mut self, point: &Vec3d) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
        self.radius = self.radius.max(point.magnitude());
    }

    /// True until at least one point has been included
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Bounding radius about the origin
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3d {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3d {
        (self.max - self.min) * 0.5
    }

    /// Copy of this box padded by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(self.min - Vec3d::repeat(margin), self.max + Vec3d::repeat(margin))
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3d) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Squared distance from `point` to the closest point of the box
    pub fn distance_squared_to(&self, point: &Vec3d) -> f64 {
        let closest = Vec3d::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        );
        (closest - point).magnitude_squared()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_radius_tracks_furthest_point() {
        let points = [
            Vec3d::new(1.0, 0.0, 0.0),
            Vec3d::new(0.0, -3.0, 4.0),
            Vec3d::new(-2.0, 0.0, 0.0),
        ];
        let aabb = Aabb::from_points(&points);

        assert_relative_eq!(aabb.radius(), 5.0);
        assert_eq!(aabb.min, Vec3d::new(-2.0, -3.0, 0.0));
        assert_eq!(aabb.max, Vec3d::new(1.0, 0.0, 4.0));
    }

    #[test]
    fn test_empty_box_has_zero_radius() {
        let aabb = Aabb::from_points(&Vec::<Vec3d>::new());
        assert!(aabb.is_empty());
        assert_eq!(aabb.radius(), 0.0);
    }

    #[test]
    fn test_distance_to_box() {
        let aabb = Aabb::from_center_extents(Vec3d::zeros(), Vec3d::repeat(1.0));
        assert_eq!(aabb.distance_squared_to(&Vec3d::new(0.5, 0.0, 0.0)), 0.0);
        assert_relative_eq!(aabb.distance_squared_to(&Vec3d::new(3.0, 0.0, 0.0)), 4.0);
    }
}
