//! Draw events: the self-describing unit that is painted, sent and replayed.

use crate::color::RgbHex;
use crate::tools::{ShapeKind, ToolKind};
use kurbo::{BezPath, Ellipse, Line, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Flattening tolerance used when converting curves to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// How newly painted pixels combine with the existing raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Paint over existing pixels.
    #[default]
    Normal,
    /// Remove existing alpha where the stroke covers.
    Erase,
}

/// One short line contributed by a continuous tool between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub tool: ToolKind,
    pub color: RgbHex,
    /// Effective stroke width (already multiplied for the eraser).
    pub size: NonZeroU32,
    pub eraser: bool,
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn composite_mode(&self) -> CompositeMode {
        if self.eraser {
            CompositeMode::Erase
        } else {
            CompositeMode::Normal
        }
    }

    pub fn outline(&self) -> BezPath {
        Line::new(self.from, self.to).to_path(PATH_TOLERANCE)
    }
}

/// One drag-defined primitive, committed once per gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeEvent {
    pub kind: ShapeKind,
    pub color: RgbHex,
    pub size: NonZeroU32,
    pub from: Point,
    pub to: Point,
}

impl ShapeEvent {
    /// Outline of the primitive spanned by the two drag points.
    ///
    /// Rectangles accept corners in any order; ellipses are centered on the
    /// midpoint with radii of half the absolute deltas.
    pub fn outline(&self) -> BezPath {
        match self.kind {
            ShapeKind::Line => Line::new(self.from, self.to).to_path(PATH_TOLERANCE),
            ShapeKind::Rect => Rect::from_points(self.from, self.to).to_path(PATH_TOLERANCE),
            ShapeKind::Circle => {
                let center = self.from.midpoint(self.to);
                let radii = (
                    (self.to.x - self.from.x).abs() / 2.0,
                    (self.to.y - self.from.y).abs() / 2.0,
                );
                Ellipse::new(center, radii, 0.0).to_path(PATH_TOLERANCE)
            }
        }
    }
}

/// A mark on the committed surface, as sent over the wire and stored in history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireDraw", into = "WireDraw")]
pub enum DrawEvent {
    Segment(Segment),
    Shape(ShapeEvent),
}

impl DrawEvent {
    pub fn composite_mode(&self) -> CompositeMode {
        match self {
            DrawEvent::Segment(segment) => segment.composite_mode(),
            DrawEvent::Shape(_) => CompositeMode::Normal,
        }
    }

    pub fn color(&self) -> RgbHex {
        match self {
            DrawEvent::Segment(segment) => segment.color,
            DrawEvent::Shape(shape) => shape.color,
        }
    }

    pub fn size(&self) -> NonZeroU32 {
        match self {
            DrawEvent::Segment(segment) => segment.size,
            DrawEvent::Shape(shape) => shape.size,
        }
    }

    pub fn outline(&self) -> BezPath {
        match self {
            DrawEvent::Segment(segment) => segment.outline(),
            DrawEvent::Shape(shape) => shape.outline(),
        }
    }
}

/// Flat `draw` payload: `{tool, color, size, fromX, fromY, toX, toY, eraser?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDraw {
    tool: ToolKind,
    color: RgbHex,
    size: NonZeroU32,
    from_x: f64,
    from_y: f64,
    to_x: f64,
    to_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eraser: Option<bool>,
}

impl From<WireDraw> for DrawEvent {
    fn from(wire: WireDraw) -> Self {
        let from = Point::new(wire.from_x, wire.from_y);
        let to = Point::new(wire.to_x, wire.to_y);
        match wire.tool.shape_kind() {
            Some(kind) => DrawEvent::Shape(ShapeEvent {
                kind,
                color: wire.color,
                size: wire.size,
                from,
                to,
            }),
            None => DrawEvent::Segment(Segment {
                tool: wire.tool,
                color: wire.color,
                size: wire.size,
                eraser: wire.eraser.unwrap_or(false),
                from,
                to,
            }),
        }
    }
}

impl From<DrawEvent> for WireDraw {
    fn from(event: DrawEvent) -> Self {
        match event {
            DrawEvent::Segment(s) => WireDraw {
                tool: s.tool,
                color: s.color,
                size: s.size,
                from_x: s.from.x,
                from_y: s.from.y,
                to_x: s.to.x,
                to_y: s.to.y,
                eraser: Some(s.eraser),
            },
            DrawEvent::Shape(s) => WireDraw {
                tool: s.kind.into(),
                color: s.color,
                size: s.size,
                from_x: s.from.x,
                from_y: s.from.y,
                to_x: s.to.x,
                to_y: s.to.y,
                eraser: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn shape(kind: ShapeKind, from: Point, to: Point) -> ShapeEvent {
        ShapeEvent {
            kind,
            color: RgbHex::BLACK,
            size: NonZeroU32::new(2).unwrap(),
            from,
            to,
        }
    }

    #[test]
    fn test_rect_outline_accepts_reversed_corners() {
        let forward = shape(ShapeKind::Rect, Point::new(10.0, 10.0), Point::new(50.0, 30.0));
        let reversed = shape(ShapeKind::Rect, Point::new(50.0, 30.0), Point::new(10.0, 10.0));
        assert_eq!(forward.outline().bounding_box(), reversed.outline().bounding_box());
        assert_eq!(forward.outline().bounding_box(), Rect::new(10.0, 10.0, 50.0, 30.0));
    }

    #[test]
    fn test_circle_outline_uses_midpoint_and_half_deltas() {
        let circle = shape(ShapeKind::Circle, Point::new(100.0, 0.0), Point::new(0.0, 40.0));
        let bounds = circle.outline().bounding_box();
        assert!((bounds.x0 - 0.0).abs() < 0.5);
        assert!((bounds.x1 - 100.0).abs() < 0.5);
        assert!((bounds.y0 - 0.0).abs() < 0.5);
        assert!((bounds.y1 - 40.0).abs() < 0.5);
    }

    #[test]
    fn test_line_outline_is_endpoint_to_endpoint() {
        let line = shape(ShapeKind::Line, Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        let elements: Vec<PathEl> = line.outline().elements().to_vec();
        assert_eq!(
            elements,
            vec![PathEl::MoveTo(Point::new(1.0, 2.0)), PathEl::LineTo(Point::new(3.0, 4.0))]
        );
    }

    #[test]
    fn test_only_eraser_segments_erase() {
        let mut segment = Segment {
            tool: ToolKind::Eraser,
            color: RgbHex::WHITE,
            size: NonZeroU32::new(16).unwrap(),
            eraser: true,
            from: Point::ZERO,
            to: Point::new(5.0, 5.0),
        };
        assert_eq!(DrawEvent::Segment(segment).composite_mode(), CompositeMode::Erase);
        segment.eraser = false;
        assert_eq!(DrawEvent::Segment(segment).composite_mode(), CompositeMode::Normal);

        let rect = shape(ShapeKind::Rect, Point::ZERO, Point::new(5.0, 5.0));
        assert_eq!(DrawEvent::Shape(rect).composite_mode(), CompositeMode::Normal);
    }
}
