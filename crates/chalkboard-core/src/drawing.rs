//! Gesture state machine: pointer samples in, committed marks and draw events out.

use crate::color::RgbHex;
use crate::event::{DrawEvent, Segment, ShapeEvent};
use crate::input::PointerSample;
use crate::surface::DrawSurface;
use crate::tools::{ShapeKind, ToolKind, ToolState};
use std::num::NonZeroU32;

/// State of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// A continuous tool is down; every move commits a segment.
    Stroking {
        tool: ToolKind,
        color: RgbHex,
        size: NonZeroU32,
        eraser: bool,
        /// Previous sample; the next segment starts here.
        last: PointerSample,
    },
    /// A shape tool is being dragged; only the preview changes until release.
    Dragging {
        kind: ShapeKind,
        color: RgbHex,
        size: NonZeroU32,
        start: PointerSample,
        current: PointerSample,
    },
}

/// Drives one gesture at a time against a [`DrawSurface`].
///
/// Tool, color and width are latched at pointer-down, so changing the tool
/// state mid-gesture has no effect until the next gesture.
#[derive(Debug, Clone, Default)]
pub struct DrawingMachine {
    gesture: Gesture,
}

impl DrawingMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Start a gesture.
    ///
    /// Any gesture already in progress is abandoned without committing, and
    /// an abandoned drag's preview is wiped.
    pub fn pointer_down<S: DrawSurface + ?Sized>(
        &mut self,
        position: PointerSample,
        tools: &ToolState,
        surface: &mut S,
    ) {
        if matches!(self.gesture, Gesture::Dragging { .. }) {
            log::debug!("Abandoning unfinished shape drag");
            surface.clear_preview();
        }

        let tool = tools.active_tool();
        let color = tools.effective_color();
        let size = tools.effective_width();

        self.gesture = match tool.shape_kind() {
            Some(kind) => Gesture::Dragging {
                kind,
                color,
                size,
                start: position,
                current: position,
            },
            None => Gesture::Stroking {
                tool,
                color,
                size,
                eraser: tool == ToolKind::Eraser,
                last: position,
            },
        };
    }

    /// Advance the gesture to a new sample.
    ///
    /// Continuous tools paint and return the segment to send; shape tools only
    /// redraw the preview and return `None`.
    pub fn pointer_move<S: DrawSurface + ?Sized>(
        &mut self,
        position: PointerSample,
        surface: &mut S,
    ) -> Option<DrawEvent> {
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Stroking { tool, color, size, eraser, last } => {
                let event = DrawEvent::Segment(Segment {
                    tool: *tool,
                    color: *color,
                    size: *size,
                    eraser: *eraser,
                    from: *last,
                    to: position,
                });
                surface.apply_to_committed(&event);
                *last = position;
                Some(event)
            }
            Gesture::Dragging { kind, color, size, start, current } => {
                *current = position;
                surface.preview_shape(&ShapeEvent {
                    kind: *kind,
                    color: *color,
                    size: *size,
                    from: *start,
                    to: position,
                });
                None
            }
        }
    }

    /// Finish the gesture.
    ///
    /// Shape tools commit exactly once, at `position` or at the last known
    /// sample when the release carries none. Continuous tools have already
    /// committed every segment and return `None`.
    pub fn pointer_up<S: DrawSurface + ?Sized>(
        &mut self,
        position: Option<PointerSample>,
        surface: &mut S,
    ) -> Option<DrawEvent> {
        let event = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return None,
            Gesture::Stroking { .. } => None,
            Gesture::Dragging { kind, color, size, start, current } => {
                let shape = DrawEvent::Shape(ShapeEvent {
                    kind,
                    color,
                    size,
                    from: start,
                    to: position.unwrap_or(current),
                });
                surface.apply_to_committed(&shape);
                Some(shape)
            }
        };
        surface.clear_preview();
        event
    }

    /// The pointer left the surface without a release; commit at the last sample.
    pub fn pointer_leave<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) -> Option<DrawEvent> {
        self.pointer_up(None, surface)
    }

    /// The shape currently shown in the preview, if dragging.
    pub fn preview(&self) -> Option<ShapeEvent> {
        match self.gesture {
            Gesture::Dragging { kind, color, size, start, current } => Some(ShapeEvent {
                kind,
                color,
                size,
                from: start,
                to: current,
            }),
            _ => None,
        }
    }
}
