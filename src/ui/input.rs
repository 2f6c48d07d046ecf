use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{Key, NamedKey};

use super::viewport::ViewportEvent;

/// Movement (px) between press and release beyond which a press is a drag, not a tap.
pub const TAP_SLOP: f32 = 4.0;

/// Zoom multiplier per wheel line.
const WHEEL_ZOOM_PER_LINE: f32 = 1.1;

/// Pixels per wheel "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Mouse state tracking.
#[derive(Debug, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left_pressed: bool,
    /// Where the current left press started
    press_origin: Option<(f32, f32)>,
    /// Whether the current press has moved past [`TAP_SLOP`]
    dragged: bool,
}

/// Input action produced from raw input events.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// Change the viewport transform
    Viewport(ViewportEvent),
    /// Fit the dendrogram to the window width
    Fit,
    /// Replace the sample tree with a fresh one
    Regenerate,
    /// Single tap / click without drag
    Tap,
    Exit,
    /// No action
    None,
}

/// Process cursor motion. Dragging with the left button pans.
pub fn process_cursor_moved(mouse: &mut MouseState, x: f32, y: f32) -> InputAction {
    let (dx, dy) = (x - mouse.x, y - mouse.y);
    mouse.x = x;
    mouse.y = y;

    if !mouse.left_pressed {
        return InputAction::None;
    }
    if let Some((ox, oy)) = mouse.press_origin {
        if (x - ox).hypot(y - oy) > TAP_SLOP {
            mouse.dragged = true;
        }
    }
    InputAction::Viewport(ViewportEvent::Pan { dx, dy })
}

/// Process a mouse button event. A left press released without dragging is a tap.
pub fn process_mouse_button(
    button: MouseButton,
    state: ElementState,
    mouse: &mut MouseState,
) -> InputAction {
    if button != MouseButton::Left {
        return InputAction::None;
    }

    match state {
        ElementState::Pressed => {
            mouse.left_pressed = true;
            mouse.press_origin = Some((mouse.x, mouse.y));
            mouse.dragged = false;
            InputAction::None
        }
        ElementState::Released => {
            let was_pressed = std::mem::take(&mut mouse.left_pressed);
            mouse.press_origin = None;
            if was_pressed && !std::mem::take(&mut mouse.dragged) {
                InputAction::Tap
            } else {
                InputAction::None
            }
        }
    }
}

/// Process a wheel event into a multiplicative zoom.
pub fn process_wheel(delta: MouseScrollDelta) -> InputAction {
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    };
    if lines == 0.0 {
        return InputAction::None;
    }
    InputAction::Viewport(ViewportEvent::Zoom {
        factor: WHEEL_ZOOM_PER_LINE.powf(lines),
    })
}

/// Process a touchpad pinch (winit reports the scale change as a delta around 0).
pub fn process_pinch(delta: f64) -> InputAction {
    InputAction::Viewport(ViewportEvent::Zoom {
        factor: 1.0 + delta as f32,
    })
}

/// Process a keyboard event.
pub fn process_key(key: Key, state: ElementState) -> InputAction {
    if state != ElementState::Pressed {
        return InputAction::None;
    }

    match key.as_ref() {
        Key::Named(NamedKey::Escape) => InputAction::Exit,
        Key::Character("+") | Key::Character("=") => InputAction::Viewport(ViewportEvent::ZoomIn),
        Key::Character("-") => InputAction::Viewport(ViewportEvent::ZoomOut),
        Key::Character("0") => InputAction::Viewport(ViewportEvent::Reset),
        Key::Character("f") | Key::Character("F") => InputAction::Fit,
        Key::Character("r") | Key::Character("R") => InputAction::Regenerate,
        _ => InputAction::None,
    }
}
