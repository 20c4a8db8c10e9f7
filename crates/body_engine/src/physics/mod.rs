//! Physics module for collision geometry and broad-phase registration
//!
//! Collision geometry is derived from model instances, wrapped in geoms
//! and registered in the collision space of the frame a body lives in.

pub mod collision;
pub mod collision_space;

pub use collision::{
    BoundingSphere,
    CollisionMesh,
    Geom,
    GeomId,
    GeomRef,
    GeomTree,
};
pub use collision_space::{CollisionSpace, Contact, Partition};
