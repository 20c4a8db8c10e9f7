//! Base body: identity, pose and frame membership

use std::fmt;

use crate::foundation::collections::IdSource;
use crate::foundation::math::{interpolate_orient, interpolate_position, Mat3d, Vec3d};
use crate::serializer::{Reader, Writer};
use crate::spatial::{FrameId, FrameTree};
use super::BodyError;

static BODY_IDS: IdSource = IdSource::new();

/// Process-unique body identifier
///
/// Geoms carry this as user data so collision contacts can be resolved back
/// to the body that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Movable entity placed in a frame
#[derive(Debug)]
pub struct Body {
    id: BodyId,
    label: String,
    position: Vec3d,
    orient: Mat3d,
    prev_position: Vec3d,
    prev_orient: Mat3d,
    interp_position: Vec3d,
    interp_orient: Mat3d,
    /// Non-owning, the frame tree owns frames
    frame: Option<FrameId>,
    phys_radius: f64,
    clip_radius: f64,
}

impl Body {
    /// Create a body at the origin, outside any frame
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: BodyId(BODY_IDS.allocate()),
            label: label.into(),
            position: Vec3d::zeros(),
            orient: Mat3d::identity(),
            prev_position: Vec3d::zeros(),
            prev_orient: Mat3d::identity(),
            interp_position: Vec3d::zeros(),
            interp_orient: Mat3d::identity(),
            frame: None,
            phys_radius: 0.0,
            clip_radius: 0.0,
        }
    }

    /// Unique id
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Authoritative position in the body's frame
    pub fn position(&self) -> Vec3d {
        self.position
    }

    /// Move the body
    pub fn set_position(&mut self, position: Vec3d) {
        self.position = position;
    }

    /// Authoritative orientation
    pub fn orient(&self) -> Mat3d {
        self.orient
    }

    /// Rotate the body
    pub fn set_orient(&mut self, orient: Mat3d) {
        self.orient = orient;
    }

    /// Remember the current pose as the start of the next simulation step
    pub fn begin_step(&mut self) {
        self.prev_position = self.position;
        self.prev_orient = self.orient;
    }

    /// Blend the previous and current pose for rendering
    ///
    /// `alpha` is the fraction of the step elapsed; 1.0 renders the current
    /// pose. Only the interpolated pose changes.
    pub fn update_interp_transform(&mut self, alpha: f64) {
        self.interp_position = interpolate_position(&self.prev_position, &self.position, alpha);
        self.interp_orient = interpolate_orient(&self.prev_orient, &self.orient, alpha);
    }

    /// Render-only position
    pub fn interp_position(&self) -> Vec3d {
        self.interp_position
    }

    /// Render-only orientation
    pub fn interp_orient(&self) -> Mat3d {
        self.interp_orient
    }

    /// Frame this body lives in
    pub fn frame(&self) -> Option<FrameId> {
        self.frame
    }

    /// Change the frame reference without touching any collision space
    pub(crate) fn set_frame_id(&mut self, frame: Option<FrameId>) {
        self.frame = frame;
    }

    /// Radius used by physics, from the collision mesh bounds
    pub fn phys_radius(&self) -> f64 {
        self.phys_radius
    }

    pub(crate) fn set_phys_radius(&mut self, radius: f64) {
        self.phys_radius = radius;
    }

    /// Radius used for draw culling
    pub fn clip_radius(&self) -> f64 {
        self.clip_radius
    }

    pub(crate) fn set_clip_radius(&mut self, radius: f64) {
        self.clip_radius = radius;
    }

    /// Write label, frame index, pose and radii
    pub fn save(&self, writer: &mut Writer, frames: &FrameTree) -> Result<(), BodyError> {
        writer.string(&self.label)?;
        writer.optional_u32(self.frame.and_then(|f| frames.index_of(f)))?;
        writer.vector3d(&self.position)?;
        writer.matrix3x3d(&self.orient)?;
        writer.f64(self.phys_radius)?;
        writer.f64(self.clip_radius)?;
        Ok(())
    }

    /// Read back what [`Body::save`] wrote
    ///
    /// The loaded pose also becomes the previous and interpolated pose, so a
    /// freshly loaded body renders where it was saved. Nothing changes if
    /// the record cannot be read.
    pub fn load(&mut self, reader: &mut Reader<'_>, frames: &FrameTree) -> Result<(), BodyError> {
        let record = Self::read_record(reader, frames)?;
        self.apply_record(record);
        Ok(())
    }

    pub(crate) fn read_record(reader: &mut Reader<'_>, frames: &FrameTree) -> Result<BodyRecord, BodyError> {
        let label = reader.string()?;
        let frame = reader.optional_u32()?.map(|i| frames.frame_at(i)).transpose()?;
        Ok(BodyRecord {
            label,
            frame,
            position: reader.vector3d()?,
            orient: reader.matrix3x3d()?,
            phys_radius: reader.f64()?,
            clip_radius: reader.f64()?,
        })
    }

    pub(crate) fn apply_record(&mut self, record: BodyRecord) {
        self.label = record.label;
        self.frame = record.frame;
        self.position = record.position;
        self.orient = record.orient;
        self.prev_position = record.position;
        self.prev_orient = record.orient;
        self.interp_position = record.position;
        self.interp_orient = record.orient;
        self.phys_radius = record.phys_radius;
        self.clip_radius = record.clip_radius;
    }
}

/// Decoded base body fields, not yet applied to a body
#[derive(Debug)]
pub(crate) struct BodyRecord {
    pub(crate) label: String,
    pub(crate) frame: Option<FrameId>,
    pub(crate) position: Vec3d,
    pub(crate) orient: Mat3d,
    pub(crate) phys_radius: f64,
    pub(crate) clip_radius: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionConfig;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn test_ids_are_distinct() {
        assert_ne!(Body::new("a").id(), Body::new("b").id());
    }

    #[test]
    fn test_interpolation_leaves_pose_alone() {
        let mut body = Body::new("ship");
        body.begin_step();
        body.set_position(Vec3d::new(10.0, 0.0, 0.0));
        body.set_orient(*Rotation3::from_axis_angle(&Vec3d::y_axis(), 1.0).matrix());

        body.update_interp_transform(0.5);

        assert_relative_eq!(body.interp_position(), Vec3d::new(5.0, 0.0, 0.0));
        let half = Rotation3::from_axis_angle(&Vec3d::y_axis(), 0.5);
        assert_relative_eq!(body.interp_orient(), *half.matrix(), epsilon = 1.0e-12);
        assert_relative_eq!(body.position(), Vec3d::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_save_load_keeps_frame_and_pose() {
        let mut frames = FrameTree::new("system", CollisionConfig::default());
        let planet = frames.create_frame(frames.root(), "planet").unwrap();

        let mut body = Body::new("beacon");
        body.set_frame_id(Some(planet));
        body.set_position(Vec3d::new(1.0e12, 2.0, -3.0));
        body.set_phys_radius(4.0);
        body.set_clip_radius(6.0);

        let mut writer = Writer::new();
        body.save(&mut writer, &frames).unwrap();
        let bytes = writer.into_bytes();

        let mut loaded = Body::new("blank");
        loaded.load(&mut Reader::new(&bytes), &frames).unwrap();

        assert_eq!(loaded.label(), "beacon");
        assert_eq!(loaded.frame(), Some(planet));
        assert_eq!(loaded.position(), body.position());
        assert_eq!(loaded.interp_position(), body.position());
        assert_eq!(loaded.phys_radius(), 4.0);
        assert_eq!(loaded.clip_radius(), 6.0);
        assert_ne!(loaded.id(), body.id());
    }

    #[test]
    fn test_load_rejects_unknown_frame_index() {
        let frames = FrameTree::new("system", CollisionConfig::default());
        let mut writer = Writer::new();
        writer.string("lost").unwrap();
        writer.optional_u32(Some(7)).unwrap();
        let bytes = writer.into_bytes();

        let mut body = Body::new("blank");
        let result = body.load(&mut Reader::new(&bytes), &frames);
        assert!(matches!(result, Err(BodyError::Frame(_))));
        assert_eq!(body.label(), "blank");
    }
}
