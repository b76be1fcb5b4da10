//! Camera math shared by the interactive camera and the light camera

use glam::{Mat4, Vec3};

/// Unit direction for a yaw/pitch pair given in degrees.
///
/// Yaw is measured in the XZ plane from +X towards +Z, pitch towards +Y.
/// A yaw of -90° with zero pitch looks down -Z.
pub fn direction_from_yaw_pitch(yaw_deg: f32, pitch_deg: f32) -> Vec3 {
    let yaw = yaw_deg.to_radians();
    let pitch = pitch_deg.to_radians();
    Vec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy)]
pub struct Perspective {
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_y_deg: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_deg.to_radians(),
            aspect_ratio,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }
}

/// Symmetric orthographic projection; `half_height` is scaled by `aspect_ratio`
/// horizontally.
pub fn orthographic(half_height: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    let half_width = half_height * aspect_ratio;
    Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, near, far)
}

/// Right-handed view matrix
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_minus_ninety_looks_down_negative_z() {
        let dir = direction_from_yaw_pitch(-90.0, 0.0);
        assert!(dir.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn pitch_raises_direction() {
        let dir = direction_from_yaw_pitch(0.0, 45.0);
        assert!(dir.y > 0.7 && dir.x > 0.7);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthographic_maps_extent_to_clip_edges() {
        let proj = orthographic(10.0, 2.0, 0.1, 100.0);
        let corner = proj.project_point3(Vec3::new(20.0, 10.0, -50.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn look_at_moves_eye_to_origin() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = look_at(eye, Vec3::ZERO, Vec3::Y);
        assert!(view.transform_point3(eye).abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
