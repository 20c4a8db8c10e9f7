//! Geoms: posed collision handles registered in a frame's collision space
//!
//! A [`Geom`] is exclusively owned by the body that built it. Collision
//! spaces only hold [`GeomRef`]s, which observe the geom's live pose and
//! enabled flag without keeping it alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::body::BodyId;
use crate::foundation::collections::IdSource;
use crate::foundation::math::{Mat3d, Vec3d};
use super::mesh::GeomTree;
use super::primitives::BoundingSphere;

static GEOM_IDS: IdSource = IdSource::new();

/// Process-unique geom identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeomId(u64);

impl fmt::Display for GeomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "geom#{}", self.0)
    }
}

#[derive(Debug)]
struct GeomState {
    orient: Mat3d,
    position: Vec3d,
    enabled: bool,
    user_data: Option<BodyId>,
}

/// Owning collision handle
#[derive(Debug)]
pub struct Geom {
    id: GeomId,
    tree: Arc<GeomTree>,
    state: Rc<RefCell<GeomState>>,
}

impl Geom {
    /// Create an enabled geom at the origin
    pub fn new(tree: Arc<GeomTree>) -> Self {
        Self {
            id: GeomId(GEOM_IDS.allocate()),
            tree,
            state: Rc::new(RefCell::new(GeomState {
                orient: Mat3d::identity(),
                position: Vec3d::zeros(),
                enabled: true,
                user_data: None,
            })),
        }
    }

    /// Identifier used by collision space registries
    pub fn id(&self) -> GeomId {
        self.id
    }

    /// Shared geometry
    pub fn tree(&self) -> &Arc<GeomTree> {
        &self.tree
    }

    /// Place the geom in its frame
    pub fn move_to(&self, orient: &Mat3d, position: &Vec3d) {
        let mut state = self.state.borrow_mut();
        state.orient = *orient;
        state.position = *position;
        log::trace!("{} moved to {:?}", self.id, position);
    }

    /// Let the geom take part in collision queries
    pub fn enable(&self) {
        self.state.borrow_mut().enabled = true;
    }

    /// Exclude the geom from collision queries; registration is untouched
    pub fn disable(&self) {
        self.state.borrow_mut().enabled = false;
    }

    /// Whether collision queries consider this geom
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// Record the body that owns this geom, for resolving contacts
    pub fn set_user_data(&self, body: BodyId) {
        self.state.borrow_mut().user_data = Some(body);
    }

    /// Owning body, if recorded
    pub fn user_data(&self) -> Option<BodyId> {
        self.state.borrow().user_data
    }

    /// Current frame-space position
    pub fn position(&self) -> Vec3d {
        self.state.borrow().position
    }

    /// Current frame-space orientation
    pub fn orient(&self) -> Mat3d {
        self.state.borrow().orient
    }

    /// Bounding sphere radius of the geometry
    pub fn bounding_radius(&self) -> f64 {
        self.tree.bounding_radius()
    }

    /// Non-owning reference for registries
    pub fn downgrade(&self) -> GeomRef {
        GeomRef {
            id: self.id,
            tree: Arc::clone(&self.tree),
            state: Rc::downgrade(&self.state),
        }
    }
}

/// Point-in-time view of a registered geom
#[derive(Debug, Clone, Copy)]
pub struct GeomSnapshot {
    /// Geom identifier
    pub id: GeomId,
    /// Frame-space position
    pub position: Vec3d,
    /// Bounding sphere radius
    pub radius: f64,
    /// Whether the geom takes part in collision queries
    pub enabled: bool,
    /// Owning body
    pub user_data: Option<BodyId>,
}

impl GeomSnapshot {
    /// Bounding sphere at the snapshot pose
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.position, self.radius)
    }
}

/// Non-owning geom reference held by collision spaces
#[derive(Debug, Clone)]
pub struct GeomRef {
    id: GeomId,
    tree: Arc<GeomTree>,
    state: Weak<RefCell<GeomState>>,
}

impl GeomRef {
    /// Identifier of the referenced geom
    pub fn id(&self) -> GeomId {
        self.id
    }

    /// False once the owning geom has been dropped
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Read the live state, if the geom still exists
    pub fn snapshot(&self) -> Option<GeomSnapshot> {
        let state = self.state.upgrade()?;
        let state = state.borrow();
        Some(GeomSnapshot {
            id: self.id,
            position: state.position,
            radius: self.tree.bounding_radius(),
            enabled: state.enabled,
            user_data: state.user_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Arc<GeomTree> {
        let vertices = [Vec3d::zeros(), Vec3d::new(3.0, 0.0, 0.0), Vec3d::new(0.0, 4.0, 0.0)];
        Arc::new(GeomTree::from_indexed(&vertices, &[0, 1, 2]))
    }

    #[test]
    fn test_reference_sees_live_pose() {
        let geom = Geom::new(tree());
        let handle = geom.downgrade();

        geom.move_to(&Mat3d::identity(), &Vec3d::new(10.0, 0.0, 0.0));
        geom.disable();

        let snapshot = handle.snapshot().unwrap();
        assert_eq!(snapshot.position, Vec3d::new(10.0, 0.0, 0.0));
        assert!(!snapshot.enabled);
        assert_eq!(snapshot.radius, 4.0);
    }

    #[test]
    fn test_reference_does_not_keep_geom_alive() {
        let geom = Geom::new(tree());
        let handle = geom.downgrade();
        assert!(handle.is_alive());

        drop(geom);
        assert!(!handle.is_alive());
        assert!(handle.snapshot().is_none());
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = Geom::new(tree());
        let b = Geom::new(tree());
        assert_ne!(a.id(), b.id());
    }
}
