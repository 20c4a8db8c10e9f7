//! Triangle mesh models
//!
//! [`MeshModel`] is the stock model kind: static triangle geometry used both
//! for drawing and, through [`GeomTree`], for collision. Its instances carry
//! named animation progress as their only per-body state.

use std::sync::Arc;

use crate::assets::{ModelAsset, ModelInstance};
use crate::foundation::math::{Mat4, Vec3, Vec3d};
use crate::physics::{CollisionMesh, GeomTree};
use crate::render::Renderer;
use crate::serializer::{Reader, SerializeError, Writer};

/// Named, looping animation track
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Track name
    pub name: String,
    /// Length of one loop in seconds
    pub duration: f64,
}

#[derive(Debug, Clone)]
struct MeshData {
    name: String,
    vertices: Vec<Vec3d>,
    render_vertices: Vec<Vec3>,
    indices: Vec<u32>,
    clip_radius: f64,
    animations: Vec<Animation>,
}

/// Shared triangle mesh asset
#[derive(Debug, Clone)]
pub struct MeshModel {
    data: Arc<MeshData>,
}

impl MeshModel {
    /// Create from model-space vertices and a triangle index list
    ///
    /// The draw clip radius defaults to the furthest vertex from the origin.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3d>, indices: Vec<u32>) -> Self {
        let clip_radius = vertices.iter().map(Vec3d::magnitude).fold(0.0, f64::max);
        let render_vertices = vertices
            .iter()
            .map(|v| Vec3::new(v.x as f32, v.y as f32, v.z as f32))
            .collect();

        Self {
            data: Arc::new(MeshData {
                name: name.into(),
                vertices,
                render_vertices,
                indices,
                clip_radius,
                animations: Vec::new(),
            }),
        }
    }

    /// Axis-aligned cube centered on the origin
    pub fn cube(name: impl Into<String>, half_extent: f64) -> Self {
        let h = half_extent;
        let vertices = vec![
            // Front face
            Vec3d::new(-h, -h, h),
            Vec3d::new(h, -h, h),
            Vec3d::new(h, h, h),
            Vec3d::new(-h, h, h),
            // Back face
            Vec3d::new(-h, -h, -h),
            Vec3d::new(-h, h, -h),
            Vec3d::new(h, h, -h),
            Vec3d::new(h, -h, -h),
        ];

        let indices = vec![
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Top
            3, 2, 6, 6, 5, 3,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self::new(name, vertices, indices)
    }

    /// Override the draw clip radius
    #[must_use]
    pub fn with_clip_radius(self, clip_radius: f64) -> Self {
        self.modify(|data| data.clip_radius = clip_radius)
    }

    /// Add a looping animation track
    #[must_use]
    pub fn with_animation(self, name: impl Into<String>, duration: f64) -> Self {
        let animation = Animation {
            name: name.into(),
            duration,
        };
        self.modify(|data| data.animations.push(animation))
    }

    fn modify(self, edit: impl FnOnce(&mut MeshData)) -> Self {
        let mut data = Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone());
        edit(&mut data);
        Self { data: Arc::new(data) }
    }

    /// Animation tracks defined by this model
    pub fn animations(&self) -> &[Animation] {
        &self.data.animations
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.data.indices.len() / 3
    }
}

impl ModelAsset for MeshModel {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn make_instance(&self) -> Box<dyn ModelInstance> {
        Box::new(MeshModelInstance {
            progress: vec![0.0; self.data.animations.len()],
            data: Arc::clone(&self.data),
        })
    }
}

/// Per-body instance of a [`MeshModel`]
#[derive(Debug)]
pub struct MeshModelInstance {
    data: Arc<MeshData>,
    /// Normalized progress (0..1) of each animation track
    progress: Vec<f64>,
}

impl MeshModelInstance {
    fn track(&self, name: &str) -> Option<usize> {
        self.data.animations.iter().position(|a| a.name == name)
    }

    /// Animation tracks of the underlying model
    pub fn animations(&self) -> &[Animation] {
        &self.data.animations
    }
}

impl ModelInstance for MeshModelInstance {
    fn model_name(&self) -> &str {
        &self.data.name
    }

    fn create_collision_mesh(&self) -> CollisionMesh {
        CollisionMesh::new(GeomTree::from_indexed(&self.data.vertices, &self.data.indices))
    }

    fn draw_clip_radius(&self) -> f64 {
        self.data.clip_radius
    }

    /// Tracks loop; zero-length tracks stay put
    fn advance(&mut self, dt: f64) {
        for (progress, animation) in self.progress.iter_mut().zip(&self.data.animations) {
            if animation.duration > 0.0 {
                *progress = (*progress + dt / animation.duration).rem_euclid(1.0);
            }
        }
    }

    fn animation_progress(&self, name: &str) -> Option<f64> {
        self.track(name).map(|i| self.progress[i])
    }

    fn set_animation_progress(&mut self, name: &str, progress: f64) -> bool {
        match self.track(name) {
            Some(i) => {
                self.progress[i] = progress.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    fn render(&self, renderer: &mut dyn Renderer, transform: &Mat4) {
        renderer.set_transform(*transform);
        renderer.draw_triangles(&self.data.render_vertices, &self.data.indices);
    }

    fn save(&self, writer: &mut Writer) -> Result<(), SerializeError> {
        let count = u32::try_from(self.progress.len())
            .map_err(|_| SerializeError::InvalidData("too many animation tracks".to_string()))?;
        writer.u32(count)?;
        for progress in &self.progress {
            writer.f64(*progress)?;
        }
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>) -> Result<(), SerializeError> {
        let count = reader.u32()?;
        if usize::try_from(count).ok() != Some(self.progress.len()) {
            return Err(SerializeError::InvalidData(format!(
                "model '{}' has {} animation tracks, record has {}",
                self.data.name,
                self.progress.len(),
                count
            )));
        }
        for progress in &mut self.progress {
            *progress = reader.f64()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_radii() {
        let model = MeshModel::cube("crate", 2.0);
        let instance = model.make_instance();

        assert_eq!(model.triangle_count(), 12);
        assert_relative_eq!(instance.draw_clip_radius(), 2.0 * 3f64.sqrt());
        assert_relative_eq!(instance.create_collision_mesh().aabb().radius(), 2.0 * 3f64.sqrt());
    }

    #[test]
    fn test_clip_radius_override() {
        let model = MeshModel::cube("crate", 1.0).with_clip_radius(40.0);
        assert_eq!(model.make_instance().draw_clip_radius(), 40.0);
    }

    #[test]
    fn test_advance_loops_tracks() {
        let model = MeshModel::cube("turret", 1.0).with_animation("spin", 2.0);
        let mut instance = MeshModelInstance {
            progress: vec![0.0],
            data: Arc::clone(&model.data),
        };

        instance.advance(3.0);
        assert_relative_eq!(instance.animation_progress("spin").unwrap(), 0.5);
        assert_eq!(instance.animation_progress("missing"), None);

        // Fresh instances of the same model start from zero
        let other = model.make_instance();
        let mut writer = Writer::new();
        other.save(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.u32().unwrap(), 1);
        assert_eq!(reader.f64().unwrap(), 0.0);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_animation_state_roundtrip() {
        let model = MeshModel::cube("gear", 1.0)
            .with_animation("extend", 4.0)
            .with_animation("spin", 1.0);
        let mut source = model.make_instance();
        let mut writer = Writer::new();
        {
            let mut instance = MeshModelInstance {
                progress: vec![0.0, 0.0],
                data: Arc::clone(&model.data),
            };
            assert!(instance.set_animation_progress("extend", 0.75));
            assert!(!instance.set_animation_progress("missing", 0.1));
            instance.save(&mut writer).unwrap();
        }

        let bytes = writer.into_bytes();
        source.load(&mut Reader::new(&bytes)).unwrap();

        let mut check = Writer::new();
        source.save(&mut check).unwrap();
        assert_eq!(check.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_load_rejects_track_mismatch() {
        let mut writer = Writer::new();
        writer.u32(3).unwrap();
        let bytes = writer.into_bytes();

        let mut instance = MeshModel::cube("plain", 1.0).make_instance();
        let result = instance.load(&mut Reader::new(&bytes));
        assert!(matches!(result, Err(SerializeError::InvalidData(_))));
    }

    #[test]
    fn test_render_submits_transform() {
        let model = MeshModel::cube("crate", 1.0);
        let mut renderer = RecordingRenderer::new();
        let transform = Mat4::new_translation(&Vec3::new(5.0, 0.0, -2.0));

        model.make_instance().render(&mut renderer, &transform);

        let commands = renderer.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].transform, transform);
        assert_eq!(commands[0].triangle_count, 12);
    }
}
