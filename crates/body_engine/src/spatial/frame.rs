//! Hierarchical reference frames
//!
//! Frames are owned by the [`FrameTree`]. Bodies refer to them by
//! [`FrameId`] only and never control their lifetime. Every frame carries
//! its own [`CollisionSpace`].

use thiserror::Error;

use crate::config::CollisionConfig;
use crate::foundation::collections::{new_key_type, IdSource, SlotMap};
use crate::physics::collision::{Geom, GeomId};
use crate::physics::CollisionSpace;

new_key_type! {
    struct FrameKey;
}

static TREE_IDS: IdSource = IdSource::new();

/// Handle to a frame in a [`FrameTree`]
///
/// A handle remembers the tree that issued it and is never found in any
/// other tree, even when both trees have a frame in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId {
    tree: u64,
    key: FrameKey,
}

/// Frame tree errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// Handle does not name a frame of this tree
    #[error("Frame not found: {0:?}")]
    NotFound(FrameId),

    /// Persisted frame index has no frame in this tree
    #[error("No frame at index {0}")]
    IndexOutOfRange(u32),
}

/// One node of the frame hierarchy
#[derive(Debug)]
pub struct Frame {
    label: String,
    parent: Option<FrameId>,
    children: Vec<FrameId>,
    space: CollisionSpace,
}

impl Frame {
    fn new(label: &str, parent: Option<FrameId>, config: &CollisionConfig) -> Self {
        Self {
            label: label.to_string(),
            parent,
            children: Vec::new(),
            space: CollisionSpace::new(config.clone()),
        }
    }

    /// Human readable name
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent frame, `None` for the root
    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// Child frames in creation order
    pub fn children(&self) -> &[FrameId] {
        &self.children
    }

    /// This frame's collision space
    pub fn space(&self) -> &CollisionSpace {
        &self.space
    }

    /// Mutable access to the collision space, for running collision
    pub fn space_mut(&mut self) -> &mut CollisionSpace {
        &mut self.space
    }

    /// Register a geom in the dynamic partition
    pub fn add_geom(&mut self, geom: &Geom) {
        self.space.add_geom(geom);
    }

    /// Remove a geom from the dynamic partition
    pub fn remove_geom(&mut self, geom: &Geom) {
        self.space.remove_geom(geom);
    }

    /// Register a geom in the static partition
    pub fn add_static_geom(&mut self, geom: &Geom) {
        self.space.add_static_geom(geom);
    }

    /// Remove a geom from the static partition
    pub fn remove_static_geom(&mut self, geom: &Geom) {
        self.space.remove_static_geom(geom);
    }

    /// True if the geom is in the dynamic partition
    pub fn has_geom(&self, id: GeomId) -> bool {
        self.space.has_geom(id)
    }

    /// True if the geom is in the static partition
    pub fn has_static_geom(&self, id: GeomId) -> bool {
        self.space.has_static_geom(id)
    }
}

/// Owner of all frames
#[derive(Debug)]
pub struct FrameTree {
    id: u64,
    frames: SlotMap<FrameKey, Frame>,
    root: FrameId,
    config: CollisionConfig,
}

impl FrameTree {
    /// Create a tree holding only a root frame
    pub fn new(root_label: &str, config: CollisionConfig) -> Self {
        let id = TREE_IDS.allocate();
        let mut frames = SlotMap::with_key();
        let key = frames.insert(Frame::new(root_label, None, &config));
        Self {
            id,
            frames,
            root: FrameId { tree: id, key },
            config,
        }
    }

    /// Slot of a handle issued by this tree
    fn key(&self, id: FrameId) -> Option<FrameKey> {
        (id.tree == self.id && self.frames.contains_key(id.key)).then_some(id.key)
    }

    /// The root frame
    pub fn root(&self) -> FrameId {
        self.root
    }

    /// Add a child frame under `parent`
    pub fn create_frame(&mut self, parent: FrameId, label: &str) -> Result<FrameId, FrameError> {
        let parent_key = self.key(parent).ok_or(FrameError::NotFound(parent))?;
        let key = self.frames.insert(Frame::new(label, Some(parent), &self.config));
        let id = FrameId { tree: self.id, key };
        self.frames[parent_key].children.push(id);
        log::debug!("Created frame '{}' under '{}'", label, self.frames[parent_key].label);
        Ok(id)
    }

    /// True if `id` names a frame of this tree
    pub fn contains(&self, id: FrameId) -> bool {
        self.key(id).is_some()
    }

    /// Look up a frame
    pub fn get(&self, id: FrameId) -> Result<&Frame, FrameError> {
        self.key(id)
            .and_then(|key| self.frames.get(key))
            .ok_or(FrameError::NotFound(id))
    }

    /// Look up a frame mutably
    pub fn get_mut(&mut self, id: FrameId) -> Result<&mut Frame, FrameError> {
        match self.key(id) {
            Some(key) => self.frames.get_mut(key).ok_or(FrameError::NotFound(id)),
            None => Err(FrameError::NotFound(id)),
        }
    }

    /// Number of frames including the root
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false, a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in depth-first order from the root
    ///
    /// This order is stable for a given tree shape and is what persisted
    /// frame indices refer to.
    pub fn depth_first(&self) -> Vec<FrameId> {
        let mut order = Vec::with_capacity(self.frames.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(frame) = self.frames.get(id.key) {
                stack.extend(frame.children.iter().rev().copied());
            }
        }
        order
    }

    /// Persisted index of a frame
    pub fn index_of(&self, id: FrameId) -> Option<u32> {
        self.key(id)?;
        self.depth_first()
            .iter()
            .position(|&f| f == id)
            .and_then(|i| u32::try_from(i).ok())
    }

    /// Frame for a persisted index
    pub fn frame_at(&self, index: u32) -> Result<FrameId, FrameError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.depth_first().get(i).copied())
            .ok_or(FrameError::IndexOutOfRange(index))
    }

    /// Run collision in every frame, in depth-first order
    pub fn collide_all(&mut self, mut on_contact: impl FnMut(FrameId, &crate::physics::Contact)) {
        for id in self.depth_first() {
            if let Some(frame) = self.frames.get_mut(id.key) {
                frame.space.collide(|contact| on_contact(id, contact));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_walk_tree() {
        let mut tree = FrameTree::new("system", CollisionConfig::default());
        let star = tree.create_frame(tree.root(), "star").unwrap();
        let planet = tree.create_frame(star, "planet").unwrap();
        let moon = tree.create_frame(planet, "moon").unwrap();
        let station = tree.create_frame(star, "station").unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.get(moon).unwrap().parent(), Some(planet));
        assert_eq!(tree.get(star).unwrap().children(), &[planet, station]);
        assert_eq!(tree.depth_first(), vec![tree.root(), star, planet, moon, station]);
    }

    #[test]
    fn test_index_roundtrip() {
        let mut tree = FrameTree::new("system", CollisionConfig::default());
        let a = tree.create_frame(tree.root(), "a").unwrap();
        let b = tree.create_frame(a, "b").unwrap();

        let index = tree.index_of(b).unwrap();
        assert_eq!(index, 2);
        assert_eq!(tree.frame_at(index).unwrap(), b);
        assert!(matches!(tree.frame_at(9), Err(FrameError::IndexOutOfRange(9))));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut tree = FrameTree::new("system", CollisionConfig::default());
        let mut other = FrameTree::new("other", CollisionConfig::default());
        let foreign = other.create_frame(other.root(), "x").unwrap();

        assert!(matches!(tree.create_frame(foreign, "y"), Err(FrameError::NotFound(_))));
    }

    #[test]
    fn test_handles_from_another_tree_are_not_found() {
        let mut tree = FrameTree::new("system", CollisionConfig::default());
        let mut other = FrameTree::new("other", CollisionConfig::default());
        let local = tree.create_frame(tree.root(), "local").unwrap();
        let foreign = other.create_frame(other.root(), "foreign").unwrap();

        assert_ne!(local, foreign);
        assert_ne!(tree.root(), other.root());
        assert!(!tree.contains(foreign));
        assert!(!tree.contains(other.root()));
        assert!(matches!(tree.get(foreign), Err(FrameError::NotFound(_))));
        assert!(matches!(tree.get_mut(foreign), Err(FrameError::NotFound(_))));
        assert_eq!(tree.index_of(foreign), None);
        assert!(tree.contains(local));
    }
}
