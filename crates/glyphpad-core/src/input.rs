//! Input events delivered by the UI layer.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event for a single active pointer (mouse, pen or finger).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
    /// The platform took the pointer away (e.g. a system gesture).
    Cancel,
}

/// Buttons on the drawing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Clear,
    Undo,
    Submit,
}

/// Flat, serializable form of every inbound event.
///
/// ```json
/// { "type": "down", "x": 10, "y": 10 }
/// { "type": "move", "x": 10, "y": 20 }
/// { "type": "up" }
/// { "type": "undo" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Cancel,
    Clear,
    Undo,
    Submit,
}

impl InputEvent {
    /// The pointer event this input carries, if any.
    pub fn pointer(&self) -> Option<PointerEvent> {
        match *self {
            InputEvent::Down { x, y } => Some(PointerEvent::Down {
                position: Point::new(x, y),
            }),
            InputEvent::Move { x, y } => Some(PointerEvent::Move {
                position: Point::new(x, y),
            }),
            InputEvent::Up => Some(PointerEvent::Up),
            InputEvent::Cancel => Some(PointerEvent::Cancel),
            InputEvent::Clear | InputEvent::Undo | InputEvent::Submit => None,
        }
    }

    /// The button this input presses, if any.
    pub fn button(&self) -> Option<Button> {
        match self {
            InputEvent::Clear => Some(Button::Clear),
            InputEvent::Undo => Some(Button::Undo),
            InputEvent::Submit => Some(Button::Submit),
            _ => None,
        }
    }
}
