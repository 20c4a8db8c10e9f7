//! Recorded draw commands
//!
//! [`RecordingRenderer`] is a headless [`Renderer`] that keeps every draw as
//! a [`DrawCommand`]. Tools and tests use it to inspect exactly what a body
//! handed to the renderer.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::Renderer;

/// A single draw, as submitted
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Model-view transform in effect for the draw
    pub transform: Mat4,
    /// Vertices submitted
    pub vertex_count: usize,
    /// Complete triangles submitted
    pub triangle_count: usize,
}

/// Renderer that records instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    transform: Mat4,
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    /// Create a renderer with an identity transform and no commands
    pub fn new() -> Self {
        Self {
            transform: Mat4::identity(),
            commands: Vec::new(),
        }
    }

    /// Commands recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for RecordingRenderer {
    fn transform(&self) -> Mat4 {
        self.transform
    }

    fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn draw_triangles(&mut self, vertices: &[Vec3], indices: &[u32]) {
        self.commands.push(DrawCommand {
            transform: self.transform,
            vertex_count: vertices.len(),
            triangle_count: indices.len() / 3,
        });
    }
}
