//! Math utilities and types
//!
//! Simulation state is kept in double precision so that positions at
//! astronomical scale stay exact. Rendering happens in single precision,
//! so this module also owns the narrowing step between the two.

pub use nalgebra::{
    Vector3,
    Matrix3, Matrix4,
    Rotation3,
    UnitQuaternion,
};

/// 3D vector type (render precision)
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type (render precision)
pub type Mat4 = Matrix4<f32>;

/// 3D vector type (simulation precision)
pub type Vec3d = Vector3<f64>;

/// 3x3 rotation matrix type (simulation precision)
pub type Mat3d = Matrix3<f64>;

/// 4x4 matrix type (simulation precision)
pub type Mat4d = Matrix4<f64>;

/// Compose an orientation block with a translation column
pub fn orient_translate(orient: &Mat3d, position: &Vec3d) -> Mat4d {
    Mat4d::new_translation(position) * orient.to_homogeneous()
}

/// Narrow a double precision view-space transform for the renderer
///
/// The rotation/scale block of `view_space` is narrowed as-is. Its
/// translation column is discarded and replaced by `view_coords`, the
/// camera-relative offset computed upstream in double precision. Only that
/// small offset ever goes through `f32`, never the absolute world position.
#[allow(clippy::cast_possible_truncation)]
pub fn rebase_to_view(view_space: &Mat4d, view_coords: &Vec3d) -> Mat4 {
    let mut narrowed = Mat4::identity();
    for col in 0..3 {
        for row in 0..4 {
            narrowed[(row, col)] = view_space[(row, col)] as f32;
        }
    }
    narrowed[(0, 3)] = view_coords.x as f32;
    narrowed[(1, 3)] = view_coords.y as f32;
    narrowed[(2, 3)] = view_coords.z as f32;
    narrowed[(3, 3)] = 1.0;
    narrowed
}

/// Blend two orientations for interpolated rendering
///
/// Falls back to `to` when the rotations are opposite and the slerp axis is
/// undefined.
pub fn interpolate_orient(from: &Mat3d, to: &Mat3d, alpha: f64) -> Mat3d {
    let q_from = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(from));
    let q_to = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(to));
    q_from
        .try_slerp(&q_to, alpha, 1.0e-9)
        .map_or(*to, |q| q.to_rotation_matrix().into_inner())
}

/// Linear interpolation between two positions
pub fn interpolate_position(from: &Vec3d, to: &Vec3d, alpha: f64) -> Vec3d {
    from.lerp(to, alpha)
}
