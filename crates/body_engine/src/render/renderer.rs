//! Renderer trait and scoped transform state

use std::ops::{Deref, DerefMut};

use crate::foundation::math::{Mat4, Vec3};

/// Drawing backend as seen by models
///
/// The renderer keeps one ambient model-view transform, applied to every
/// draw until it is changed.
pub trait Renderer {
    /// Current model-view transform
    fn transform(&self) -> Mat4;

    /// Replace the model-view transform
    fn set_transform(&mut self, transform: Mat4);

    /// Draw an indexed triangle list with the current transform
    fn draw_triangles(&mut self, vertices: &[Vec3], indices: &[u32]);
}

/// Saves the renderer's transform and restores it when dropped
///
/// Restoration happens on every exit path, so a model that leaves the
/// transform dirty, returns early or panics cannot leak it into the next
/// draw.
pub struct TransformScope<'r, R: Renderer + ?Sized> {
    renderer: &'r mut R,
    saved: Mat4,
}

impl<'r, R: Renderer + ?Sized> TransformScope<'r, R> {
    /// Capture the current transform
    pub fn new(renderer: &'r mut R) -> Self {
        let saved = renderer.transform();
        Self { renderer, saved }
    }
}

impl<R: Renderer + ?Sized> Deref for TransformScope<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> DerefMut for TransformScope<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> Drop for TransformScope<'_, R> {
    fn drop(&mut self) {
        self.renderer.set_transform(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;

    #[test]
    fn test_scope_restores_transform() {
        let mut renderer = RecordingRenderer::new();
        let outer = Mat4::new_scaling(2.0);
        renderer.set_transform(outer);

        {
            let mut scope = TransformScope::new(&mut renderer);
            scope.set_transform(Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));
            scope.draw_triangles(&[Vec3::zeros(), Vec3::x(), Vec3::y()], &[0, 1, 2]);
        }

        assert_eq!(renderer.transform(), outer);
        assert_eq!(renderer.commands()[0].transform[(0, 3)], 1.0);
    }

    #[test]
    fn test_scope_restores_on_early_return() {
        fn draw_and_bail(renderer: &mut dyn Renderer) -> Result<(), &'static str> {
            let mut scope = TransformScope::new(renderer);
            scope.set_transform(Mat4::zeros());
            Err("bail")
        }

        let mut renderer = RecordingRenderer::new();
        assert!(draw_and_bail(&mut renderer).is_err());
        assert_eq!(renderer.transform(), Mat4::identity());
    }
}
