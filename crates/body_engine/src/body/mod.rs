//! Simulated bodies
//!
//! [`Body`] carries the authoritative double precision pose, the render-only
//! interpolated pose and the frame a body lives in. [`ModelBody`] adds a
//! model instance and the collision geom derived from it, and keeps both
//! consistent with the frame's collision space.

mod base;
mod model_body;

pub use base::{Body, BodyId};
pub use model_body::ModelBody;

use thiserror::Error;

use crate::assets::ModelError;
use crate::serializer::SerializeError;
use crate::spatial::FrameError;

/// Body operation errors
#[derive(Debug, Error)]
pub enum BodyError {
    /// Model lookup failed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Frame reference is not part of the tree
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Persistence stream failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),

    /// Operation needs a model and none is set
    #[error("Body has no model")]
    NoModel,
}
