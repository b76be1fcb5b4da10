//! Input routing from window events to the camera and clock
//!
//! The window loop translates winit events into the small vocabulary below
//! and hands them to an [`InputSink`]. Handlers mutate state in place.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use crate::camera::CameraState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other,
}

/// Keys the application reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Next camera mode
    P,
    /// Previous camera mode
    O,
    /// Speed time up
    L,
    /// Slow time down
    K,
    Other,
}

/// Receiver of device events
pub trait InputSink {
    fn on_pointer_move(&mut self, x: f64, y: f64);
    fn on_button(&mut self, button: PointerButton, state: ButtonState);
    fn on_scroll(&mut self, dx: f64, dy: f64);
    fn on_key(&mut self, key: Key, state: ButtonState);
    fn on_resize(&mut self, _width: u32, _height: u32) {}
}

impl From<ElementState> for ButtonState {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => ButtonState::Pressed,
            ElementState::Released => ButtonState::Released,
        }
    }
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Right => PointerButton::Right,
            MouseButton::Middle => PointerButton::Middle,
            _ => PointerButton::Other,
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyP => Key::P,
            KeyCode::KeyO => Key::O,
            KeyCode::KeyL => Key::L,
            KeyCode::KeyK => Key::K,
            _ => Key::Other,
        }
    }
}

impl InputSink for CameraState {
    fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer_moved(x, y);
    }

    fn on_button(&mut self, button: PointerButton, state: ButtonState) {
        if button == PointerButton::Left {
            self.input.rotating = state == ButtonState::Pressed;
        }
    }

    fn on_scroll(&mut self, _dx: f64, dy: f64) {
        self.scroll(dy);
    }

    fn on_key(&mut self, key: Key, state: ButtonState) {
        let pressed = state == ButtonState::Pressed;
        match key {
            Key::W => self.input.forward = pressed,
            Key::A => self.input.left = pressed,
            Key::S => self.input.backward = pressed,
            Key::D => self.input.right = pressed,
            Key::P if pressed => {
                let mode = self.next_mode();
                println!("Camera mode: {} ({:?})", mode.index(), mode);
            }
            Key::O if pressed => {
                let mode = self.prev_mode();
                println!("Camera mode: {} ({:?})", mode.index(), mode);
            }
            _ => {}
        }
    }
}
