//! Bodies carrying a model instance and its collision geom
//!
//! A [`ModelBody`] keeps three things in step:
//!
//! - the model instance it exclusively owns
//! - the [`Geom`] derived from that model, registered in exactly one
//!   partition of its frame's collision space (static or dynamic, per
//!   [`ModelBody::is_static`]), or in none while the body has no frame
//! - the double precision pose, mirrored onto the geom on every move
//!
//! The frame tree and model cache are external registries, so operations
//! that touch them take them as arguments.

use std::sync::Arc;

use crate::assets::{ModelCache, ModelInstance};
use crate::foundation::math::{orient_translate, rebase_to_view, Mat3d, Mat4d, Vec3d};
use crate::physics::Geom;
use crate::render::{Renderer, TransformScope};
use crate::serializer::{Reader, Writer};
use crate::spatial::{Frame, FrameError, FrameId, FrameTree};
use super::{Body, BodyError, BodyId};

fn register(frame: &mut Frame, geom: &Geom, is_static: bool) {
    if is_static {
        frame.add_static_geom(geom);
    } else {
        frame.add_geom(geom);
    }
}

fn unregister(frame: &mut Frame, geom: &Geom, is_static: bool) {
    if is_static {
        frame.remove_static_geom(geom);
    } else {
        frame.remove_geom(geom);
    }
}

/// Body with a renderable model and a collision proxy built from it
#[derive(Debug)]
pub struct ModelBody {
    body: Body,
    is_static: bool,
    colliding: bool,
    model_name: String,
    model: Option<Box<dyn ModelInstance>>,
    geom: Option<Geom>,
}

impl ModelBody {
    /// Create a dynamic, colliding body with no model and no frame
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            body: Body::new(label),
            is_static: false,
            colliding: true,
            model_name: String::new(),
            model: None,
            geom: None,
        }
    }

    /// Base body state
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Unique id, also the user data of the geom
    pub fn id(&self) -> BodyId {
        self.body.id()
    }

    /// Frame this body lives in
    pub fn frame(&self) -> Option<FrameId> {
        self.body.frame()
    }

    /// True if the geom belongs in the static partition
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True if the geom takes part in collision queries
    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Name of the current model, empty before the first [`ModelBody::set_model`]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Current model instance
    pub fn model(&self) -> Option<&dyn ModelInstance> {
        self.model.as_deref()
    }

    /// Current model instance, for per-instance state such as animation
    pub fn model_mut(&mut self) -> Option<&mut (dyn ModelInstance + 'static)> {
        self.model.as_deref_mut()
    }

    /// Collision proxy, present once a model is set
    pub fn geom(&self) -> Option<&Geom> {
        self.geom.as_ref()
    }

    /// Radius of the collision mesh bounds
    pub fn phys_radius(&self) -> f64 {
        self.body.phys_radius()
    }

    /// Draw culling radius of the model
    pub fn clip_radius(&self) -> f64 {
        self.body.clip_radius()
    }

    /// Authoritative position
    pub fn position(&self) -> Vec3d {
        self.body.position()
    }

    /// Authoritative orientation
    pub fn orient(&self) -> Mat3d {
        self.body.orient()
    }

    /// See [`Body::begin_step`]
    pub fn begin_step(&mut self) {
        self.body.begin_step();
    }

    /// See [`Body::update_interp_transform`]
    pub fn update_interp_transform(&mut self, alpha: f64) {
        self.body.update_interp_transform(alpha);
    }

    /// Replace the model and rebuild the collision proxy from it
    ///
    /// The name is resolved first: an unknown model is returned as an error
    /// and leaves the body untouched. Per-instance state of the previous
    /// model (animation progress and the like) is discarded.
    pub fn set_model(
        &mut self,
        models: &ModelCache,
        frames: &mut FrameTree,
        name: &str,
    ) -> Result<(), BodyError> {
        let asset = models.find_model(name)?;
        if let Some(frame) = self.body.frame() {
            frames.get(frame)?;
        }

        let instance = asset.make_instance();
        self.install_model(frames, name, instance)
    }

    fn install_model(
        &mut self,
        frames: &mut FrameTree,
        name: &str,
        instance: Box<dyn ModelInstance>,
    ) -> Result<(), BodyError> {
        debug_assert_eq!(instance.model_name(), name, "cache returned a model under another name");
        log::debug!("{} model '{}' -> '{}'", self.body.id(), self.model_name, name);

        self.body.set_clip_radius(instance.draw_clip_radius());
        self.model = Some(instance);
        self.model_name = name.to_string();
        self.rebuild_collision_mesh(frames)
    }

    /// Derive a fresh collision mesh and geom from the current model
    ///
    /// The new geom is built, posed and given this body as user data before
    /// the old one is deregistered and dropped. It is then registered in the
    /// current frame, if any, in the partition matching `is_static`.
    pub fn rebuild_collision_mesh(&mut self, frames: &mut FrameTree) -> Result<(), BodyError> {
        let model = self.model.as_deref().ok_or(BodyError::NoModel)?;
        let mut frame = match self.body.frame() {
            Some(id) => Some(frames.get_mut(id)?),
            None => None,
        };

        let mesh = model.create_collision_mesh();
        let geom = Geom::new(Arc::clone(mesh.geom_tree()));
        geom.set_user_data(self.body.id());
        geom.move_to(&self.body.orient(), &self.body.position());
        if !self.colliding {
            geom.disable();
        }
        self.body.set_phys_radius(mesh.aabb().radius());

        if let Some(old) = self.geom.take() {
            if let Some(frame) = frame.as_deref_mut() {
                unregister(frame, &old, self.is_static);
            }
        }
        if let Some(frame) = frame.as_deref_mut() {
            register(frame, &geom, self.is_static);
        }

        log::debug!(
            "{} collision mesh rebuilt as {} (radius {:.3})",
            self.body.id(),
            geom.id(),
            self.body.phys_radius()
        );
        self.geom = Some(geom);
        Ok(())
    }

    /// Move the body to another frame, or out of every frame with `None`
    ///
    /// Setting the current frame again does nothing. Without a geom only the
    /// frame reference changes; registration happens once a model is set.
    pub fn set_frame(&mut self, frames: &mut FrameTree, frame: Option<FrameId>) -> Result<(), BodyError> {
        let current = self.body.frame();
        if frame == current {
            return Ok(());
        }
        if let Some(new) = frame {
            if !frames.contains(new) {
                return Err(FrameError::NotFound(new).into());
            }
        }

        if let Some(geom) = &self.geom {
            if let Some(old) = current {
                unregister(frames.get_mut(old)?, geom, self.is_static);
            }
            if let Some(new) = frame {
                register(frames.get_mut(new)?, geom, self.is_static);
            }
        }

        log::debug!("{} frame {:?} -> {:?}", self.body.id(), current, frame);
        self.body.set_frame_id(frame);
        Ok(())
    }

    /// Switch the geom between the static and dynamic partitions
    pub fn set_static(&mut self, frames: &mut FrameTree, is_static: bool) -> Result<(), BodyError> {
        if is_static == self.is_static {
            return Ok(());
        }
        if let (Some(geom), Some(id)) = (&self.geom, self.body.frame()) {
            let frame = frames.get_mut(id)?;
            unregister(frame, geom, self.is_static);
            register(frame, geom, is_static);
        }
        self.is_static = is_static;
        Ok(())
    }

    /// Enable or disable collision without touching registration
    pub fn set_colliding(&mut self, colliding: bool) {
        self.colliding = colliding;
        if let Some(geom) = &self.geom {
            if colliding {
                geom.enable();
            } else {
                geom.disable();
            }
        }
    }

    /// Move the body and its geom
    ///
    /// Static geoms are re-registered after a move so the frame rebuilds its
    /// static index on the next collision pass. Static bodies are expected
    /// to move rarely.
    pub fn set_position(&mut self, frames: &mut FrameTree, position: Vec3d) -> Result<(), BodyError> {
        self.body.set_position(position);
        let Some(geom) = &self.geom else {
            return Ok(());
        };
        geom.move_to(&self.body.orient(), &position);

        if self.is_static {
            if let Some(id) = self.body.frame() {
                let frame = frames.get_mut(id)?;
                frame.remove_static_geom(geom);
                frame.add_static_geom(geom);
                log::debug!("{} static {} re-registered after move", self.body.id(), geom.id());
            }
        }
        Ok(())
    }

    /// Rotate the body and its geom
    pub fn set_orient(&mut self, orient: Mat3d) {
        self.body.set_orient(orient);
        if let Some(geom) = &self.geom {
            geom.move_to(&orient, &self.body.position());
        }
    }

    /// Draw the model at its interpolated pose
    ///
    /// `view_coords` is the body's camera-relative position, computed in
    /// double precision by the caller. It replaces the translation of
    /// `view_transform * interpolated pose` before narrowing, so large
    /// absolute coordinates never reach single precision. The renderer's
    /// transform is restored afterwards.
    pub fn render_model(
        &self,
        renderer: &mut dyn Renderer,
        view_coords: &Vec3d,
        view_transform: &Mat4d,
    ) -> Result<(), BodyError> {
        let model = self.model.as_deref().ok_or(BodyError::NoModel)?;
        let world = orient_translate(&self.body.interp_orient(), &self.body.interp_position());
        let transform = rebase_to_view(&(view_transform * world), view_coords);

        let mut scope = TransformScope::new(renderer);
        model.render(&mut *scope, &transform);
        Ok(())
    }

    /// Write base body state, flags, model name and model instance state
    ///
    /// The collision mesh is never written; loading derives it again.
    pub fn save(&self, writer: &mut Writer, frames: &FrameTree) -> Result<(), BodyError> {
        let model = self.model.as_deref().ok_or(BodyError::NoModel)?;
        self.body.save(writer, frames)?;
        writer.bool(self.is_static)?;
        writer.bool(self.colliding)?;
        writer.string(&self.model_name)?;
        model.save(writer)?;
        Ok(())
    }

    /// Read back what [`ModelBody::save`] wrote
    ///
    /// The whole record is decoded and its model resolved and loaded before
    /// the body changes, so a failed load leaves the body as it was. On
    /// success the body leaves its current frame, takes the saved state,
    /// rebuilds its geom and registers in the saved frame.
    pub fn load(
        &mut self,
        reader: &mut Reader<'_>,
        models: &ModelCache,
        frames: &mut FrameTree,
    ) -> Result<(), BodyError> {
        let mut record = Body::read_record(reader, frames)?;
        let is_static = reader.bool()?;
        let colliding = reader.bool()?;
        let name = reader.string()?;
        let mut instance = models.find_model(&name)?.make_instance();
        instance.load(reader)?;
        if let Some(current) = self.body.frame() {
            frames.get(current)?;
        }

        self.set_frame(frames, None)?;
        let frame = record.frame.take();
        self.body.apply_record(record);
        self.is_static = is_static;
        self.colliding = colliding;
        self.install_model(frames, &name, instance)?;
        self.set_frame(frames, frame)
    }

    /// Leave the frame, then release the geom and the model
    pub fn destroy(mut self, frames: &mut FrameTree) -> Result<(), BodyError> {
        self.set_frame(frames, None)?;
        self.geom = None;
        self.model = None;
        log::debug!("{} destroyed", self.body.id());
        Ok(())
    }
}
