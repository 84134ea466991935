//! glyphpad Core Library
//!
//! Platform-agnostic stroke capture, canvas state and undo history for the
//! glyphpad drawing screen.

pub mod canvas;
pub mod gesture;
pub mod history;
pub mod input;
pub mod path_builder;
pub mod stroke;

pub use canvas::{CanvasState, Snapshot};
pub use gesture::{GestureController, DEFAULT_MIN_DISTANCE};
pub use history::{HistoryStack, HistoryState};
pub use input::{Button, InputEvent, PointerEvent};
pub use path_builder::{GestureError, GestureResult, PathBuilder};
pub use stroke::{PathCommand, SerializableColor, Stroke, StrokeId};
