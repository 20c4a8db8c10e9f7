//! Capability traits for model assets and their per-body instances

use std::fmt::Debug;

use crate::foundation::math::Mat4;
use crate::physics::CollisionMesh;
use crate::render::Renderer;
use crate::serializer::{Reader, SerializeError, Writer};

/// Shared, immutable model data
pub trait ModelAsset: Debug {
    /// Name the asset is registered under
    fn name(&self) -> &str;

    /// Create an independent instance for one body
    fn make_instance(&self) -> Box<dyn ModelInstance>;
}

/// One body's instantiation of a model asset
pub trait ModelInstance: Debug {
    /// Name of the asset this instance was made from
    fn model_name(&self) -> &str;

    /// Derive fresh collision geometry from this instance
    fn create_collision_mesh(&self) -> CollisionMesh;

    /// Radius used for draw culling
    fn draw_clip_radius(&self) -> f64;

    /// Advance per-instance animation by `dt` seconds
    fn advance(&mut self, dt: f64);

    /// Normalized progress (0..1) of a named animation track
    fn animation_progress(&self, name: &str) -> Option<f64>;

    /// Jump a track to `progress`, clamped to 0..1; false if the track is unknown
    fn set_animation_progress(&mut self, name: &str, progress: f64) -> bool;

    /// Draw with a single precision model-view transform
    fn render(&self, renderer: &mut dyn Renderer, transform: &Mat4);

    /// Persist per-instance state
    fn save(&self, writer: &mut Writer) -> Result<(), SerializeError>;

    /// Restore per-instance state written by [`ModelInstance::save`]
    fn load(&mut self, reader: &mut Reader<'_>) -> Result<(), SerializeError>;
}
