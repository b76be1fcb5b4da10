//! Per-frame state and the snapshot consumed by the render passes

use common::{look_at, orthographic, Perspective};
use glam::{Mat4, Vec3};

use crate::camera::CameraState;
use crate::clock::SimulationClock;
use crate::input::{ButtonState, InputSink, Key, PointerButton};
use crate::scene::{Light, SceneTransforms};
use crate::shadow::LightSpace;

pub const FOV_Y_DEG: f32 = 50.0;
pub const NEAR: f32 = 0.01;
pub const FAR: f32 = 1000.0;

/// Radius of the star sphere drawn around the camera; inside `FAR`
pub const BACKGROUND_RADIUS: f32 = 500.0;
pub const SUN_DISTANCE: f32 = 100.0;
pub const SUN_RADIUS: f32 = 5.0;
/// Orthographic half-extent for the sun; must cover both the star sphere and the sun
pub const BACKGROUND_ORTHO_EXTENT: f32 = 600.0;
pub const BACKGROUND_ORTHO_NEAR: f32 = 0.1;
pub const BACKGROUND_ORTHO_FAR: f32 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Owns everything that changes between frames: camera, clock and viewport
pub struct FrameContext {
    pub camera: CameraState,
    pub clock: SimulationClock,
    pub viewport: Viewport,
}

/// Everything the render passes need for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot {
    pub time: f32,
    pub transforms: SceneTransforms,
    pub light: Light,
    pub light_space: LightSpace,
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub ortho_projection: Mat4,
    pub background_model: Mat4,
    pub sun_model: Mat4,
}

impl FrameContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: CameraState::default(),
            clock: SimulationClock::default(),
            viewport: Viewport { width, height },
        }
    }

    /// Advance simulation time and the camera, then capture the frame
    pub fn advance(&mut self, dt: f32) -> FrameSnapshot {
        self.clock.advance(dt);
        self.camera.update(dt, self.clock.current_time);
        self.snapshot()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let time = self.clock.current_time;
        let light = Light::at(time);
        let aspect = self.viewport.aspect_ratio();
        let eye = self.camera.position;

        let background_model =
            Mat4::from_translation(eye) * Mat4::from_scale(Vec3::splat(BACKGROUND_RADIUS));
        let sun_model = Mat4::from_translation(eye - light.direction * SUN_DISTANCE)
            * Mat4::from_scale(Vec3::splat(SUN_RADIUS));

        FrameSnapshot {
            time,
            transforms: SceneTransforms::at(time),
            light,
            light_space: LightSpace::new(light.direction),
            camera_position: eye,
            view: look_at(eye, self.camera.gaze, self.camera.up),
            projection: Perspective::new(FOV_Y_DEG, aspect, NEAR, FAR).matrix(),
            ortho_projection: orthographic(
                BACKGROUND_ORTHO_EXTENT,
                aspect,
                BACKGROUND_ORTHO_NEAR,
                BACKGROUND_ORTHO_FAR,
            ),
            background_model,
            sun_model,
        }
    }
}

impl InputSink for FrameContext {
    fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.camera.on_pointer_move(x, y);
    }

    fn on_button(&mut self, button: PointerButton, state: ButtonState) {
        self.camera.on_button(button, state);
    }

    fn on_scroll(&mut self, dx: f64, dy: f64) {
        self.camera.on_scroll(dx, dy);
    }

    fn on_key(&mut self, key: Key, state: ButtonState) {
        match key {
            Key::L if state == ButtonState::Pressed => {
                println!("Time speed: {:.1}x", self.clock.speed_up());
            }
            Key::K if state == ButtonState::Pressed => {
                println!("Time speed: {:.1}x", self.clock.slow_down());
            }
            _ => self.camera.on_key(key, state),
        }
    }

    /// Zero-sized requests come from minimised windows and are ignored
    fn on_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = Viewport { width, height };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;

    #[test]
    fn time_keys_step_clock() {
        let mut frame = FrameContext::new(1280, 720);
        frame.on_key(Key::L, ButtonState::Pressed);
        assert_eq!(frame.clock.time_speed, 1.5);
        frame.on_key(Key::L, ButtonState::Released);
        assert_eq!(frame.clock.time_speed, 1.5);
        frame.on_key(Key::K, ButtonState::Pressed);
        frame.on_key(Key::K, ButtonState::Pressed);
        assert_eq!(frame.clock.time_speed, 0.5);
    }

    #[test]
    fn camera_keys_pass_through() {
        let mut frame = FrameContext::new(1280, 720);
        frame.on_key(Key::P, ButtonState::Pressed);
        frame.on_key(Key::W, ButtonState::Pressed);
        assert_eq!(frame.camera.mode, CameraMode::OrbitEarth);
        assert!(frame.camera.input.forward);
    }

    #[test]
    fn advance_moves_time_then_camera() {
        let mut frame = FrameContext::new(1280, 720);
        frame.camera.mode = CameraMode::OrbitMoon;
        frame.clock.time_speed = 2.0;

        let snapshot = frame.advance(0.5);
        assert_eq!(snapshot.time, 1.0);
        assert_eq!(frame.camera.gaze, crate::scene::body_position(crate::scene::Body::Moon, 1.0));
    }

    #[test]
    fn resize_updates_aspect() {
        let mut frame = FrameContext::new(1280, 720);
        frame.on_resize(800, 800);
        assert_eq!(frame.viewport.aspect_ratio(), 1.0);
    }

    #[test]
    fn minimised_resize_keeps_viewport() {
        let mut frame = FrameContext::new(1280, 720);
        frame.on_resize(1280, 0);
        assert_eq!(frame.viewport, Viewport { width: 1280, height: 720 });
        frame.on_resize(0, 0);
        assert_eq!(frame.viewport, Viewport { width: 1280, height: 720 });

        let snapshot = frame.snapshot();
        let expected = Perspective::new(FOV_Y_DEG, 1280.0 / 720.0, NEAR, FAR).matrix();
        assert_eq!(snapshot.projection, expected);
    }

    #[test]
    fn sun_sits_opposite_the_light() {
        let frame = FrameContext::new(1280, 720);
        let snapshot = frame.snapshot();
        let sun = snapshot.sun_model.w_axis.truncate();
        let expected = frame.camera.position - snapshot.light.direction * SUN_DISTANCE;
        assert!(sun.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn background_and_sun_fit_their_projections() {
        assert!(BACKGROUND_ORTHO_EXTENT >= BACKGROUND_RADIUS.max(SUN_DISTANCE));
        assert!(BACKGROUND_RADIUS < FAR);
        assert!(SUN_DISTANCE + SUN_RADIUS < BACKGROUND_ORTHO_FAR);
    }

    #[test]
    fn background_follows_camera() {
        let mut frame = FrameContext::new(1280, 720);
        frame.camera.input.forward = true;
        let snapshot = frame.advance(2.0);
        let center = snapshot.background_model.w_axis.truncate();
        assert!(center.abs_diff_eq(frame.camera.position, 1e-5));
    }
}
