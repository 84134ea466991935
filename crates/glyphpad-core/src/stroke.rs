//! Stroke data model: points, path commands and committed strokes.

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A single drawing command in a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
}

impl PathCommand {
    /// The point this command targets.
    pub fn point(&self) -> Point {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
        }
    }
}

/// One continuous pen-down-to-pen-up drawing action.
///
/// The first command is always a `MoveTo`; every following command is a
/// `LineTo`. A stroke holding only its `MoveTo` is a point-stroke and still
/// renders as a dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStroke")]
pub struct Stroke {
    id: StrokeId,
    commands: Vec<PathCommand>,
    /// Stroke color.
    pub color: SerializableColor,
}

/// Unchecked wire form of a [`Stroke`].
#[derive(Deserialize)]
struct RawStroke {
    id: StrokeId,
    commands: Vec<PathCommand>,
    color: SerializableColor,
}

impl TryFrom<RawStroke> for Stroke {
    type Error = String;

    fn try_from(raw: RawStroke) -> Result<Self, Self::Error> {
        match raw.commands.split_first() {
            None => return Err("stroke has no commands".to_string()),
            Some((PathCommand::LineTo(_), _)) => {
                return Err("stroke must start with move_to".to_string());
            }
            Some((_, rest)) if rest.iter().any(|c| matches!(c, PathCommand::MoveTo(_))) => {
                return Err("stroke has more than one move_to".to_string());
            }
            Some(_) => {}
        }
        Ok(Self {
            id: raw.id,
            commands: raw.commands,
            color: raw.color,
        })
    }
}

impl Stroke {
    /// Start a stroke at `origin`.
    pub fn new(origin: Point, color: SerializableColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            commands: vec![PathCommand::MoveTo(origin)],
            color,
        }
    }

    /// Build a stroke through `points`, the first one becoming the `MoveTo`.
    ///
    /// Returns `None` for an empty point list.
    pub fn from_points(points: &[Point], color: SerializableColor) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut stroke = Self::new(*first, color);
        for point in rest {
            stroke.line_to(*point);
        }
        Some(stroke)
    }

    pub(crate) fn line_to(&mut self, point: Point) {
        self.commands.push(PathCommand::LineTo(point));
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// All commands, `MoveTo` first.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Number of commands (1 + number of line segments).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the stroke has no commands (never true once built).
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Check if this stroke has no `LineTo` commands.
    pub fn is_point(&self) -> bool {
        self.commands.len() == 1
    }

    /// The pen-down point.
    pub fn origin(&self) -> Point {
        self.commands
            .first()
            .map(PathCommand::point)
            .unwrap_or(Point::ZERO)
    }

    /// The most recently recorded point.
    pub fn last_point(&self) -> Point {
        self.commands
            .last()
            .map(PathCommand::point)
            .unwrap_or(Point::ZERO)
    }

    /// Iterate over the recorded points in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.commands.iter().map(PathCommand::point)
    }

    /// Bounding box of the recorded points (stroke width not included).
    pub fn bounds(&self) -> Rect {
        let origin = self.origin();
        self.points()
            .fold(Rect::from_points(origin, origin), |rect, p| rect.union_pt(p))
    }

    /// Path representation for rendering.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => path.move_to(p),
                PathCommand::LineTo(p) => path.line_to(p),
            }
        }
        path
    }

    /// SVG path data, e.g. `M 10 10 L 10 20`.
    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            let (op, p) = match *command {
                PathCommand::MoveTo(p) => ('M', p),
                PathCommand::LineTo(p) => ('L', p),
            };
            let _ = write!(out, "{op} {} {}", p.x, p.y);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stroke_is_point() {
        let stroke = Stroke::new(Point::new(3.0, 4.0), SerializableColor::black());
        assert_eq!(stroke.len(), 1);
        assert!(stroke.is_point());
        assert_eq!(stroke.commands()[0], PathCommand::MoveTo(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_from_points() {
        let stroke = Stroke::from_points(
            &[Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)],
            SerializableColor::black(),
        )
        .unwrap();

        assert_eq!(stroke.len(), 3);
        assert!(matches!(stroke.commands()[0], PathCommand::MoveTo(_)));
        assert!(stroke.commands()[1..].iter().all(|c| matches!(c, PathCommand::LineTo(_))));
        assert_eq!(stroke.last_point(), Point::new(5.0, 5.0));
        assert!(Stroke::from_points(&[], SerializableColor::black()).is_none());
    }

    #[test]
    fn test_bounds() {
        let stroke = Stroke::from_points(
            &[Point::new(0.0, 0.0), Point::new(100.0, 50.0), Point::new(50.0, 100.0)],
            SerializableColor::black(),
        )
        .unwrap();

        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_svg_path() {
        let stroke = Stroke::from_points(
            &[Point::new(10.0, 10.0), Point::new(10.0, 20.5)],
            SerializableColor::black(),
        )
        .unwrap();
        assert_eq!(stroke.to_svg_path(), "M 10 10 L 10 20.5");
        assert_eq!(stroke.to_path().elements().len(), 2);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(SerializableColor::from_hex("#000"), Some(SerializableColor::black()));
        assert_eq!(
            SerializableColor::from_hex("#ff8000"),
            Some(SerializableColor::new(255, 128, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#11223380"),
            Some(SerializableColor::new(0x11, 0x22, 0x33, 0x80))
        );
        assert_eq!(SerializableColor::from_hex("black"), None);
        assert_eq!(SerializableColor::from_hex("#12"), None);
        assert_eq!(SerializableColor::new(255, 128, 0, 255).to_hex(), "#ff8000");
    }

    #[test]
    fn test_deserialize_keeps_valid_stroke() {
        let stroke = Stroke::from_points(
            &[Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            SerializableColor::new(10, 20, 30, 255),
        )
        .unwrap();
        let json = serde_json::to_string(&stroke).unwrap();
        let parsed: Stroke = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stroke);
    }

    #[test]
    fn test_deserialize_rejects_malformed_commands() {
        let id = Uuid::new_v4();
        let color = r#"{"r":0,"g":0,"b":0,"a":255}"#;

        let empty = format!(r#"{{"id":"{id}","commands":[],"color":{color}}}"#);
        assert!(serde_json::from_str::<Stroke>(&empty).is_err());

        let line_first = format!(
            r#"{{"id":"{id}","commands":[{{"line_to":{{"x":5.0,"y":5.0}}}}],"color":{color}}}"#
        );
        assert!(serde_json::from_str::<Stroke>(&line_first).is_err());

        let two_moves = format!(
            r#"{{"id":"{id}","commands":[{{"move_to":{{"x":0.0,"y":0.0}}}},{{"move_to":{{"x":1.0,"y":1.0}}}}],"color":{color}}}"#
        );
        assert!(serde_json::from_str::<Stroke>(&two_moves).is_err());
    }
}
