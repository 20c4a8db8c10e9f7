//! Collision mesh representations
//!
//! A [`CollisionMesh`] is derived from a model instance and never mutated
//! afterwards. Geoms share its [`GeomTree`] and place it in a frame.

use std::sync::Arc;

use crate::foundation::math::Vec3d;
use crate::spatial::Aabb;
use super::primitives::Triangle;

/// Immutable triangle geometry in MODEL SPACE, with its bounding volume
#[derive(Debug)]
pub struct GeomTree {
    triangles: Vec<Triangle>,
    aabb: Aabb,
}

impl GeomTree {
    /// Build from model-space vertices and a triangle index list
    ///
    /// Triangles referencing a missing vertex are skipped. Empty input gives
    /// an empty tree whose bounding radius is zero.
    pub fn from_indexed(vertices: &[Vec3d], indices: &[u32]) -> Self {
        let mut triangles = Vec::with_capacity(indices.len() / 3);
        let mut skipped = 0usize;

        for chunk in indices.chunks_exact(3) {
            let corner = |i: u32| usize::try_from(i).ok().and_then(|i| vertices.get(i)).copied();
            match (corner(chunk[0]), corner(chunk[1]), corner(chunk[2])) {
                (Some(v0), Some(v1), Some(v2)) => triangles.push(Triangle::new(v0, v1, v2)),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} collision triangles with out-of-range indices", skipped);
        }

        let mut aabb = Aabb::empty();
        for tri in &triangles {
            for vertex in tri.vertices() {
                aabb.include_point(&vertex);
            }
        }

        Self { triangles, aabb }
    }

    /// Triangles in model space
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Bounding volume in model space
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Bounding sphere radius about the model origin
    pub fn bounding_radius(&self) -> f64 {
        self.aabb.radius()
    }
}

/// Collision geometry derived from one model instance
#[derive(Debug)]
pub struct CollisionMesh {
    geom_tree: Arc<GeomTree>,
}

impl CollisionMesh {
    /// Wrap a geometry tree
    pub fn new(geom_tree: GeomTree) -> Self {
        Self {
            geom_tree: Arc::new(geom_tree),
        }
    }

    /// Shared geometry for building geoms
    pub fn geom_tree(&self) -> &Arc<GeomTree> {
        &self.geom_tree
    }

    /// Model-space bounding volume
    pub fn aabb(&self) -> &Aabb {
        self.geom_tree.aabb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tree_from_indexed_vertices() {
        let vertices = [
            Vec3d::new(0.0, 0.0, 0.0),
            Vec3d::new(2.0, 0.0, 0.0),
            Vec3d::new(0.0, 0.0, 2.0),
        ];
        let tree = GeomTree::from_indexed(&vertices, &[0, 1, 2]);

        assert_eq!(tree.triangles().len(), 1);
        assert_relative_eq!(tree.bounding_radius(), 2.0);
    }

    #[test]
    fn test_bad_indices_are_skipped() {
        let vertices = [Vec3d::zeros(), Vec3d::x(), Vec3d::y()];
        let tree = GeomTree::from_indexed(&vertices, &[0, 1, 2, 0, 1, 9]);
        assert_eq!(tree.triangles().len(), 1);
    }

    #[test]
    fn test_degenerate_mesh_has_zero_radius() {
        let mesh = CollisionMesh::new(GeomTree::from_indexed(&[], &[]));
        assert_eq!(mesh.aabb().radius(), 0.0);
        assert!(mesh.geom_tree().triangles().is_empty());
    }
}
