//! Pointer input normalization for mouse and touch events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A pointer position in surface-local coordinates.
pub type PointerSample = Point;

/// Raw pointer data as delivered by the host, in client (window) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerInput {
    /// Mouse position.
    Mouse { client: Point },
    /// Currently active touches; empty on touch end.
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    pub fn mouse(x: f64, y: f64) -> Self {
        PointerInput::Mouse { client: Point::new(x, y) }
    }

    pub fn touch(touches: impl IntoIterator<Item = Point>) -> Self {
        PointerInput::Touch { touches: touches.into_iter().collect() }
    }

    /// Client position of the mouse or of the first active touch.
    fn client_position(&self) -> Option<Point> {
        match self {
            PointerInput::Mouse { client } => Some(*client),
            PointerInput::Touch { touches } => touches.first().copied(),
        }
    }
}

/// Placement of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceOrigin {
    pub left: f64,
    pub top: f64,
}

impl SurfaceOrigin {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Convert host input to a surface-local sample.
    ///
    /// Returns `None` when the input carries no position (a touch end).
    pub fn sample(&self, input: &PointerInput) -> Option<PointerSample> {
        input
            .client_position()
            .map(|client| client - Vec2::new(self.left, self.top))
    }
}

/// Pointer event after normalization, as consumed by the drawing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: PointerSample },
    Move { position: PointerSample },
    /// Release; touches end without a position.
    Up { position: Option<PointerSample> },
    /// Pointer left the surface or the touch was cancelled.
    Leave,
}
