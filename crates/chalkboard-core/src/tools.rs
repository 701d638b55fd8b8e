//! Tool selection and brush settings.

use crate::color::RgbHex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Width multiplier applied to the brush while erasing.
pub const ERASER_WIDTH_FACTOR: NonZeroU32 = match NonZeroU32::new(4) {
    Some(factor) => factor,
    None => unreachable!(),
};

/// Brush width used until the user picks another one.
pub const DEFAULT_STROKE_WIDTH: NonZeroU32 = match NonZeroU32::new(4) {
    Some(width) => width,
    None => unreachable!(),
};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Line,
    Rect,
    Circle,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Line,
        ToolKind::Rect,
        ToolKind::Circle,
    ];

    /// Continuous tools emit one segment per pointer sample.
    pub fn is_continuous(self) -> bool {
        matches!(self, ToolKind::Pencil | ToolKind::Eraser)
    }

    /// The primitive a drag-to-commit tool produces.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Rect => Some(ShapeKind::Rect),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Pencil | ToolKind::Eraser => None,
        }
    }

    /// Single-key shortcut (`p`, `e`, `l`, `r`, `c`), case-insensitive.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'p' => Some(ToolKind::Pencil),
            'e' => Some(ToolKind::Eraser),
            'l' => Some(ToolKind::Line),
            'r' => Some(ToolKind::Rect),
            'c' => Some(ToolKind::Circle),
            _ => None,
        }
    }

    /// Wire/display name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
            ToolKind::Line => "line",
            ToolKind::Rect => "rect",
            ToolKind::Circle => "circle",
        }
    }

    /// Parse a wire/display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

/// Drag-to-commit primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rect,
    Circle,
}

impl From<ShapeKind> for ToolKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Line => ToolKind::Line,
            ShapeKind::Rect => ToolKind::Rect,
            ShapeKind::Circle => ToolKind::Circle,
        }
    }
}

/// Current tool, color and brush width chosen by the user.
///
/// Selection has no drawing side effects; gestures read a copy of this at
/// pointer-down and keep it until the gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolState {
    active_tool: ToolKind,
    color: RgbHex,
    stroke_width: NonZeroU32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active_tool: ToolKind::default(),
            color: RgbHex::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl ToolState {
    /// Create tool state with the defaults (pencil, black, width 4).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn color(&self) -> RgbHex {
        self.color
    }

    pub fn stroke_width(&self) -> NonZeroU32 {
        self.stroke_width
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
    }

    /// Set the brush color. Picking a color while erasing switches back to the pencil.
    pub fn set_color(&mut self, color: RgbHex) {
        self.color = color;
        if self.active_tool == ToolKind::Eraser {
            self.active_tool = ToolKind::Pencil;
        }
    }

    pub fn set_stroke_width(&mut self, width: NonZeroU32) {
        self.stroke_width = width;
    }

    /// Width actually painted and sent: the brush width, times 4 for the eraser.
    pub fn effective_width(&self) -> NonZeroU32 {
        if self.active_tool == ToolKind::Eraser {
            self.stroke_width.saturating_mul(ERASER_WIDTH_FACTOR)
        } else {
            self.stroke_width
        }
    }

    /// Color actually sent. The eraser ignores the brush color.
    pub fn effective_color(&self) -> RgbHex {
        if self.active_tool == ToolKind::Eraser {
            RgbHex::WHITE
        } else {
            self.color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tools = ToolState::new();
        assert_eq!(tools.active_tool(), ToolKind::Pencil);
        assert_eq!(tools.color(), RgbHex::BLACK);
        assert_eq!(tools.stroke_width().get(), 4);
    }

    #[test]
    fn test_color_pick_leaves_eraser() {
        let mut tools = ToolState::new();
        tools.set_tool(ToolKind::Eraser);
        tools.set_color(RgbHex::new(255, 0, 0));
        assert_eq!(tools.active_tool(), ToolKind::Pencil);
        assert_eq!(tools.color(), RgbHex::new(255, 0, 0));
    }

    #[test]
    fn test_color_pick_keeps_shape_tool() {
        let mut tools = ToolState::new();
        tools.set_tool(ToolKind::Rect);
        tools.set_color(RgbHex::new(0, 0, 255));
        assert_eq!(tools.active_tool(), ToolKind::Rect);
    }

    #[test]
    fn test_eraser_width_and_color() {
        let mut tools = ToolState::new();
        tools.set_stroke_width(NonZeroU32::new(6).unwrap());
        assert_eq!(tools.effective_width().get(), 6);

        tools.set_tool(ToolKind::Eraser);
        assert_eq!(tools.effective_width().get(), 24);
        assert_eq!(tools.effective_color(), RgbHex::WHITE);
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(ToolKind::from_shortcut('p'), Some(ToolKind::Pencil));
        assert_eq!(ToolKind::from_shortcut('E'), Some(ToolKind::Eraser));
        assert_eq!(ToolKind::from_shortcut('l'), Some(ToolKind::Line));
        assert_eq!(ToolKind::from_shortcut('r'), Some(ToolKind::Rect));
        assert_eq!(ToolKind::from_shortcut('c'), Some(ToolKind::Circle));
        assert_eq!(ToolKind::from_shortcut('x'), None);
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
            let json = serde_json::to_string(&tool).unwrap();
            assert_eq!(json, format!("\"{}\"", tool.name()));
        }
    }
}
