//! Transform hierarchy for Earth, Moon and Moon's-moon, plus the sun light
//!
//! Everything here is a pure function of simulation time. Each body's world
//! matrix is its parent's world matrix followed by orbit rotation, orbit
//! translation, spin and scale, in that order.

use glam::{Mat3, Mat4, Vec3};

/// One of the three fixed bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Earth,
    Moon,
    MoonsMoon,
}

/// Fixed orbital and shape parameters of a body
#[derive(Debug, Clone, Copy)]
pub struct BodyParams {
    pub parent: Option<Body>,
    pub orbit_radius: f32,
    /// Radians per second of simulation time
    pub orbit_rate: f32,
    /// Radians per second of simulation time
    pub spin_rate: f32,
    pub scale: f32,
}

impl Body {
    pub const ALL: [Body; 3] = [Body::Earth, Body::Moon, Body::MoonsMoon];

    pub fn params(self) -> BodyParams {
        match self {
            Body::Earth => BodyParams {
                parent: None,
                orbit_radius: 0.0,
                orbit_rate: 0.0,
                spin_rate: 0.2,
                scale: 1.0,
            },
            Body::Moon => BodyParams {
                parent: Some(Body::Earth),
                orbit_radius: 5.0,
                orbit_rate: 0.5,
                spin_rate: 0.3,
                scale: 0.27,
            },
            Body::MoonsMoon => BodyParams {
                parent: Some(Body::Moon),
                orbit_radius: 2.0,
                orbit_rate: 1.0,
                spin_rate: 0.7,
                scale: 0.5,
            },
        }
    }
}

/// Transform of a body relative to its parent
pub fn local_transform(body: Body, time: f32) -> Mat4 {
    let p = body.params();
    let spin_and_scale =
        Mat4::from_rotation_y(time * p.spin_rate) * Mat4::from_scale(Vec3::splat(p.scale));

    match p.parent {
        None => spin_and_scale,
        Some(_) => {
            Mat4::from_rotation_y(time * p.orbit_rate)
                * Mat4::from_translation(Vec3::new(p.orbit_radius, 0.0, 0.0))
                * spin_and_scale
        }
    }
}

pub fn earth_transform(time: f32) -> Mat4 {
    local_transform(Body::Earth, time)
}

pub fn moon_transform(time: f32) -> Mat4 {
    earth_transform(time) * local_transform(Body::Moon, time)
}

pub fn moons_moon_transform(time: f32) -> Mat4 {
    moon_transform(time) * local_transform(Body::MoonsMoon, time)
}

pub fn world_transform(body: Body, time: f32) -> Mat4 {
    match body {
        Body::Earth => earth_transform(time),
        Body::Moon => moon_transform(time),
        Body::MoonsMoon => moons_moon_transform(time),
    }
}

/// Inverse-transpose of the upper-left 3x3, for transforming normals
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model).transpose().inverse()
}

/// Approximate body position used to aim the orbit camera.
///
/// Only the orbit angles are used; parent spin is ignored, so this is not
/// the translation column of [`world_transform`].
pub fn body_position(body: Body, time: f32) -> Vec3 {
    let circle = |radius: f32, angle: f32| Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());

    match body {
        Body::Earth => Vec3::ZERO,
        Body::Moon => {
            let p = Body::Moon.params();
            circle(p.orbit_radius, time * p.orbit_rate)
        }
        Body::MoonsMoon => {
            let p = Body::MoonsMoon.params();
            body_position(Body::Moon, time) + circle(p.orbit_radius, time * p.orbit_rate)
        }
    }
}

/// The cloud shell rides at Earth's position but does not share its spin
pub const CLOUD_SCALE: f32 = 1.015;

/// World matrices of every drawable for one instant
#[derive(Debug, Clone, Copy)]
pub struct SceneTransforms {
    pub earth: Mat4,
    pub clouds: Mat4,
    pub moon: Mat4,
    pub moons_moon: Mat4,
}

impl SceneTransforms {
    pub fn at(time: f32) -> Self {
        let earth = earth_transform(time);
        let clouds = Mat4::from_translation(earth.w_axis.truncate())
            * Mat4::from_scale(Vec3::splat(CLOUD_SCALE));

        Self {
            earth,
            clouds,
            moon: moon_transform(time),
            moons_moon: moons_moon_transform(time),
        }
    }

    pub fn body(&self, body: Body) -> Mat4 {
        match body {
            Body::Earth => self.earth,
            Body::Moon => self.moon,
            Body::MoonsMoon => self.moons_moon,
        }
    }
}

/// Directional sun light
#[derive(Debug, Clone, Copy)]
pub struct Light {
    /// Unit vector; the sun sits at `-direction`
    pub direction: Vec3,
    pub color: Vec3,
}

pub const LIGHT_COLOR: Vec3 = Vec3::new(1.0, 0.95, 0.9);
pub const LIGHT_ANGULAR_RATE: f32 = 0.1;

impl Light {
    pub fn at(time: f32) -> Self {
        let angle = time * LIGHT_ANGULAR_RATE;
        Self {
            direction: Vec3::new(angle.cos(), 0.0, angle.sin()).normalize(),
            color: LIGHT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMES: [f32; 7] = [-37.5, -1.0, 0.0, 0.25, 3.0, 12.7, 1000.0];

    #[test]
    fn earth_stays_at_origin() {
        for t in TIMES {
            let translation = earth_transform(t).w_axis.truncate();
            assert!(translation.abs_diff_eq(Vec3::ZERO, 1e-6), "t = {}", t);
        }
    }

    #[test]
    fn moons_moon_has_moon_as_prefix() {
        for t in TIMES {
            let residual = moon_transform(t).inverse() * moons_moon_transform(t);
            assert!(
                residual.abs_diff_eq(local_transform(Body::MoonsMoon, t), 1e-3),
                "t = {}",
                t
            );
        }
    }

    #[test]
    fn moon_has_earth_as_prefix() {
        for t in TIMES {
            let residual = earth_transform(t).inverse() * moon_transform(t);
            assert!(residual.abs_diff_eq(local_transform(Body::Moon, t), 1e-4));
        }
    }

    #[test]
    fn moon_sits_five_units_from_earth() {
        for t in TIMES {
            let moon = moon_transform(t).w_axis.truncate();
            assert!((moon.length() - 5.0).abs() < 1e-3);
            assert!(moon.y.abs() < 1e-5);
        }
    }

    #[test]
    fn moons_moon_distance_from_moon_is_scaled_by_parent() {
        // The 2.0 offset lives inside the moon's 0.27 scale
        let t = 4.2;
        let moon = moon_transform(t).w_axis.truncate();
        let child = moons_moon_transform(t).w_axis.truncate();
        assert!(((child - moon).length() - 2.0 * 0.27).abs() < 1e-4);
    }

    #[test]
    fn world_transform_scales_bodies() {
        let scale = |m: Mat4| m.x_axis.truncate().length();
        assert!((scale(world_transform(Body::Earth, 2.0)) - 1.0).abs() < 1e-5);
        assert!((scale(world_transform(Body::Moon, 2.0)) - 0.27).abs() < 1e-5);
        assert!((scale(world_transform(Body::MoonsMoon, 2.0)) - 0.135).abs() < 1e-5);
    }

    #[test]
    fn normal_matrix_handles_non_uniform_scale() {
        let model = Mat4::from_rotation_y(0.7) * Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0));
        let normal = normal_matrix(&model);

        // A surface tangent and its normal must stay perpendicular after transform
        let tangent = Vec3::new(1.0, 1.0, 0.0);
        let surface_normal = Vec3::new(1.0, -1.0, 0.0);
        let t = model.transform_vector3(tangent);
        let n = normal * surface_normal;
        assert!(t.dot(n).abs() < 1e-5);
    }

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let model = Mat4::from_rotation_y(1.1);
        assert!(normal_matrix(&model).abs_diff_eq(Mat3::from_rotation_y(1.1), 1e-6));
    }

    #[test]
    fn body_position_follows_orbit_angles() {
        assert_eq!(body_position(Body::Earth, 9.0), Vec3::ZERO);
        assert!(body_position(Body::Moon, 0.0).abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-6));

        let t = std::f32::consts::PI;
        let moon = Vec3::new(5.0 * (0.5 * t).cos(), 0.0, 5.0 * (0.5 * t).sin());
        let expected = moon + Vec3::new(2.0 * t.cos(), 0.0, 2.0 * t.sin());
        assert!(body_position(Body::MoonsMoon, t).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn clouds_do_not_spin_with_earth() {
        let transforms = SceneTransforms::at(5.0);
        let expected = Mat4::from_scale(Vec3::splat(CLOUD_SCALE));
        assert!(transforms.clouds.abs_diff_eq(expected, 1e-6));
        assert!(!transforms.earth.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn light_circles_in_xz_plane() {
        for t in TIMES {
            let light = Light::at(t);
            assert!((light.direction.length() - 1.0).abs() < 1e-5);
            assert_eq!(light.direction.y, 0.0);
        }
        assert!(Light::at(0.0).direction.abs_diff_eq(Vec3::X, 1e-6));
    }
}
