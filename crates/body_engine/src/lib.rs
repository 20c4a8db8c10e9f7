//! # Body Engine
//!
//! Simulation bodies that carry a renderable model and a collision proxy
//! derived from it, placed in a tree of reference frames.
//!
//! ## Features
//!
//! - **Double precision simulation**: positions stay exact at astronomical scale
//! - **View-relative rendering**: transforms are rebased on the camera before
//!   narrowing to single precision
//! - **Partitioned broad-phase**: each frame keeps static and dynamic geoms
//!   apart, with an octree over the static ones
//! - **Persistence**: bodies save and load through an ordered binary stream
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use body_engine::prelude::*;
//!
//! fn main() -> Result<(), BodyError> {
//!     let mut models = ModelCache::new();
//!     models.insert(Arc::new(MeshModel::cube("probe", 1.0)));
//!
//!     let mut frames = FrameTree::new("system", CollisionConfig::default());
//!     let orbit = frames.create_frame(frames.root(), "orbit")?;
//!
//!     let mut probe = ModelBody::new("probe");
//!     probe.set_model(&models, &mut frames, "probe")?;
//!     probe.set_frame(&mut frames, Some(orbit))?;
//!     probe.set_position(&mut frames, Vec3d::new(1.0e9, 0.0, 0.0))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;
pub mod assets;
pub mod render;
pub mod serializer;
pub mod body;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{MeshModel, ModelAsset, ModelCache, ModelError, ModelInstance},
        body::{Body, BodyError, BodyId, ModelBody},
        config::{CollisionConfig, Config, EngineConfig},
        foundation::math::{Mat3d, Mat4, Mat4d, Vec3, Vec3d},
        physics::{Contact, Geom, GeomId, Partition},
        render::{RecordingRenderer, Renderer, TransformScope},
        serializer::{Reader, SerializeError, Writer},
        spatial::{FrameError, FrameId, FrameTree},
    };
}
