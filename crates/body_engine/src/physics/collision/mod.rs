//! Collision geometry and broad-phase handles
//!
//! # Module Organization
//!
//! - [`primitives`] - Bounding spheres and triangles
//! - [`mesh`] - Immutable model-space collision geometry
//! - [`geom`] - Posed, frame-registered handles over that geometry

pub mod primitives;
pub mod mesh;
pub mod geom;

pub use primitives::{BoundingSphere, Triangle};
pub use mesh::{CollisionMesh, GeomTree};
pub use geom::{Geom, GeomId, GeomRef, GeomSnapshot};
