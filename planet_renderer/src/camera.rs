//! Interactive camera: orbit modes around each body plus a free first-person mode

use common::direction_from_yaw_pitch;
use glam::Vec3;

use crate::scene::{body_position, Body};

pub const MIN_PITCH: f32 = -89.0;
pub const MAX_PITCH: f32 = 89.0;
pub const MIN_DISTANCE: f32 = 2.0;
pub const MAX_DISTANCE: f32 = 50.0;
/// Degrees of yaw/pitch per pixel of pointer travel
pub const MOUSE_SENSITIVITY: f32 = 0.1;
/// World units per scroll unit, for both dolly and zoom
pub const SCROLL_STEP: f32 = 0.5;
/// First-person movement speed in world units per second
pub const MOVE_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    OrbitEarth,
    OrbitMoon,
    OrbitMoonsMoon,
    FirstPerson,
}

impl CameraMode {
    pub const CYCLE: [CameraMode; 4] = [
        CameraMode::OrbitEarth,
        CameraMode::OrbitMoon,
        CameraMode::OrbitMoonsMoon,
        CameraMode::FirstPerson,
    ];

    pub fn index(self) -> usize {
        match self {
            CameraMode::OrbitEarth => 0,
            CameraMode::OrbitMoon => 1,
            CameraMode::OrbitMoonsMoon => 2,
            CameraMode::FirstPerson => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::CYCLE[(self.index() + 1) % Self::CYCLE.len()]
    }

    pub fn prev(self) -> Self {
        Self::CYCLE[(self.index() + Self::CYCLE.len() - 1) % Self::CYCLE.len()]
    }

    /// Body the camera orbits, `None` in first-person mode
    pub fn target_body(self) -> Option<Body> {
        match self {
            CameraMode::OrbitEarth => Some(Body::Earth),
            CameraMode::OrbitMoon => Some(Body::Moon),
            CameraMode::OrbitMoonsMoon => Some(Body::MoonsMoon),
            CameraMode::FirstPerson => None,
        }
    }
}

/// Raw device state collected from input events
#[derive(Debug, Clone)]
pub struct InputState {
    pub rotating: bool,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub last_cursor: (f64, f64),
    pub first_move: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            rotating: false,
            forward: false,
            backward: false,
            left: false,
            right: false,
            last_cursor: (0.0, 0.0),
            first_move: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: Vec3,
    pub gaze: Vec3,
    pub up: Vec3,
    /// Degrees. Look direction in first-person, azimuth in orbit modes.
    pub yaw: f32,
    /// Degrees, kept in `[MIN_PITCH, MAX_PITCH]`
    pub pitch: f32,
    pub distance: f32,
    pub mode: CameraMode,
    pub input: InputState,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            gaze: Vec3::ZERO,
            up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            distance: 10.0,
            mode: CameraMode::FirstPerson,
            input: InputState::default(),
        }
    }
}

impl CameraState {
    pub fn forward(&self) -> Vec3 {
        direction_from_yaw_pitch(self.yaw, self.pitch)
    }

    /// Per-frame update; runs every frame whether or not input arrived
    pub fn update(&mut self, dt: f32, time: f32) {
        match self.mode.target_body() {
            Some(body) => self.update_orbit(body_position(body, time)),
            None => self.update_first_person(dt),
        }
    }

    fn update_first_person(&mut self, dt: f32) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let step = MOVE_SPEED * dt;

        if self.input.forward {
            self.position += step * forward;
        }
        if self.input.backward {
            self.position -= step * forward;
        }
        if self.input.left {
            self.position -= step * right;
        }
        if self.input.right {
            self.position += step * right;
        }

        self.gaze = self.position + forward;
    }

    fn update_orbit(&mut self, target: Vec3) {
        let offset = direction_from_yaw_pitch(self.yaw, self.pitch.clamp(MIN_PITCH, MAX_PITCH));
        self.position = target + self.distance * offset;
        self.gaze = target;
    }

    /// Track the cursor; the first event only sets the reference point
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if self.input.first_move {
            self.input.last_cursor = (x, y);
            self.input.first_move = false;
        }

        let (last_x, last_y) = self.input.last_cursor;
        let dx = x - last_x;
        // Screen Y grows downwards
        let dy = last_y - y;
        self.input.last_cursor = (x, y);

        if self.input.rotating {
            self.yaw += dx as f32 * MOUSE_SENSITIVITY;
            self.pitch = (self.pitch + dy as f32 * MOUSE_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
        }
    }

    /// First-person dollies along the view direction; orbit modes zoom
    pub fn scroll(&mut self, dy: f64) {
        let amount = dy as f32 * SCROLL_STEP;
        match self.mode {
            CameraMode::FirstPerson => {
                let forward = self.forward();
                self.position += forward * amount;
                self.gaze = self.position + forward;
            }
            _ => {
                self.distance = (self.distance - amount).clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
        }
    }

    pub fn next_mode(&mut self) -> CameraMode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn prev_mode(&mut self) -> CameraMode {
        self.mode = self.mode.prev();
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_cycle_both_ways() {
        assert_eq!(CameraMode::FirstPerson.next(), CameraMode::OrbitEarth);
        assert_eq!(CameraMode::OrbitEarth.prev(), CameraMode::FirstPerson);
        for mode in CameraMode::CYCLE {
            assert_eq!(mode.next().prev(), mode);
        }
    }

    #[test]
    fn orbit_earth_scenario() {
        let mut camera = CameraState {
            mode: CameraMode::OrbitEarth,
            yaw: -90.0,
            pitch: 0.0,
            distance: 10.0,
            ..Default::default()
        };
        camera.update(0.016, 0.0);

        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
        assert_eq!(camera.gaze, Vec3::ZERO);
    }

    #[test]
    fn orbit_follows_target_body() {
        let mut camera = CameraState {
            mode: CameraMode::OrbitMoon,
            ..Default::default()
        };
        let t = 2.0;
        camera.update(0.016, t);

        let target = body_position(Body::Moon, t);
        assert_eq!(camera.gaze, target);
        assert!(((camera.position - target).length() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn first_person_walks_forward() {
        let mut camera = CameraState::default();
        camera.input.forward = true;
        let start = camera.position;
        camera.update(1.0, 0.0);

        assert!(camera.position.abs_diff_eq(start + Vec3::new(0.0, 0.0, -5.0), 1e-5));
        assert!(camera.gaze.abs_diff_eq(camera.position + Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn first_person_strafes_right() {
        let mut camera = CameraState::default();
        camera.input.right = true;
        camera.update(0.5, 0.0);
        // Looking down -Z, right is +X
        assert!(camera.position.abs_diff_eq(Vec3::new(2.5, 0.0, 10.0), 1e-5));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut camera = CameraState::default();
        camera.input.forward = true;
        camera.input.backward = true;
        camera.input.left = true;
        camera.input.right = true;
        camera.update(1.0, 0.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
    }

    #[test]
    fn keys_ignored_in_orbit_mode() {
        let mut camera = CameraState {
            mode: CameraMode::OrbitEarth,
            ..Default::default()
        };
        camera.input.forward = true;
        camera.update(1.0, 0.0);
        let first = camera.position;
        camera.update(1.0, 0.0);
        assert_eq!(camera.position, first);
    }

    #[test]
    fn first_pointer_move_is_absorbed() {
        let mut camera = CameraState::default();
        camera.input.rotating = true;
        camera.pointer_moved(812.0, -344.0);
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.pitch, 0.0);

        camera.pointer_moved(822.0, -354.0);
        assert!((camera.yaw - -89.0).abs() < 1e-5);
        assert!((camera.pitch - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pointer_without_button_only_tracks() {
        let mut camera = CameraState::default();
        camera.pointer_moved(0.0, 0.0);
        camera.pointer_moved(100.0, 100.0);
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.input.last_cursor, (100.0, 100.0));

        // Pressing later must not replay the travel made while released
        camera.input.rotating = true;
        camera.pointer_moved(101.0, 100.0);
        assert!((camera.yaw - -89.9).abs() < 1e-4);
    }

    #[test]
    fn pitch_settles_at_limits() {
        let mut camera = CameraState::default();
        camera.input.rotating = true;
        camera.pointer_moved(0.0, 0.0);

        let mut y = 0.0;
        for _ in 0..50 {
            y -= 100.0;
            camera.pointer_moved(0.0, y);
            assert!(camera.pitch <= MAX_PITCH);
        }
        assert_eq!(camera.pitch, MAX_PITCH);

        for _ in 0..100 {
            y += 100.0;
            camera.pointer_moved(0.0, y);
            assert!(camera.pitch >= MIN_PITCH);
        }
        assert_eq!(camera.pitch, MIN_PITCH);
    }

    #[test]
    fn orbit_distance_settles_at_limits() {
        let mut camera = CameraState {
            mode: CameraMode::OrbitMoon,
            ..Default::default()
        };
        for _ in 0..100 {
            camera.scroll(3.0);
            assert!(camera.distance >= MIN_DISTANCE);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);

        for _ in 0..100 {
            camera.scroll(-7.0);
            assert!(camera.distance <= MAX_DISTANCE);
        }
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn first_person_scroll_dollies() {
        let mut camera = CameraState::default();
        camera.scroll(2.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 9.0), 1e-5));
        assert!(camera.gaze.abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), 1e-5));
        assert_eq!(camera.distance, 10.0);
    }

    #[test]
    fn switching_to_orbit_recomputes_position() {
        let mut camera = CameraState::default();
        camera.input.forward = true;
        camera.update(3.0, 0.0);
        assert_eq!(camera.next_mode(), CameraMode::OrbitEarth);
        camera.update(0.0, 0.0);
        assert!((camera.position.length() - camera.distance).abs() < 1e-4);
    }
}
