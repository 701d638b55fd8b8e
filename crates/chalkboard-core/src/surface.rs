//! Seam between the drawing logic and whatever owns the pixels.

use crate::event::{DrawEvent, ShapeEvent};

/// The two drawing layers: a persistent committed raster and a transient preview.
///
/// Implementations own the pixel data exclusively. Each call selects its own
/// compositing from the event (see [`DrawEvent::composite_mode`]); no mode
/// survives from one call to the next.
pub trait DrawSurface {
    /// Paint a draw event onto the committed layer.
    fn apply_to_committed(&mut self, event: &DrawEvent);

    /// Wipe the committed layer. The preview is untouched.
    fn clear(&mut self);

    /// Replace the preview with a rendering of the in-progress shape.
    fn preview_shape(&mut self, shape: &ShapeEvent);

    /// Wipe the preview layer.
    fn clear_preview(&mut self);
}
