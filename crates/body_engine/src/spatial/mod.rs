//! Spatial data structures
//!
//! The frame tree that bodies attach to, plus the bounding volumes and
//! octree used by each frame's collision space.

mod aabb;
mod frame;
mod octree;

pub use aabb::Aabb;
pub use frame::{Frame, FrameError, FrameId, FrameTree};
pub use octree::{Octree, OctreeConfig, OctreeEntry, OctreeNode};
