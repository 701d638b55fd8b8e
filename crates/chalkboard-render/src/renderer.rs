//! CPU raster implementation of the committed and preview surfaces.

use chalkboard_core::event::{CompositeMode, DrawEvent, ShapeEvent};
use chalkboard_core::surface::DrawSurface;
use kurbo::{BezPath, PathEl};
use peniko::Color;
use thiserror::Error;
use tiny_skia::{
    BlendMode, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

fn blank(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })
}

/// Convert a kurbo path to a tiny-skia path.
fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Stroke `outline` onto `target` with an explicit compositing mode.
fn paint_stroke(target: &mut Pixmap, outline: &BezPath, color: Color, width: f32, mode: CompositeMode) {
    let Some(path) = to_skia_path(outline) else {
        log::trace!("Skipping degenerate path");
        return;
    };

    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.blend_mode = match mode {
        CompositeMode::Normal => BlendMode::SourceOver,
        CompositeMode::Erase => BlendMode::DestinationOut,
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    target.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Two stacked raster layers: finished marks below, the shape being dragged above.
///
/// Both layers start transparent. Nothing is filled; every mark is a stroke.
pub struct RasterEngine {
    committed: Pixmap,
    preview: Pixmap,
}

impl RasterEngine {
    /// Create blank surfaces. Zero width or height is an error.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            committed: blank(width, height)?,
            preview: blank(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.committed.width()
    }

    pub fn height(&self) -> u32 {
        self.committed.height()
    }

    pub fn committed(&self) -> &Pixmap {
        &self.committed
    }

    pub fn preview(&self) -> &Pixmap {
        &self.preview
    }

    /// Resize both layers.
    ///
    /// Committed content is copied back at the origin and clipped to the new
    /// bounds; the preview comes back blank.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let mut committed = blank(width, height)?;
        let paint = PixmapPaint {
            blend_mode: BlendMode::Source,
            ..Default::default()
        };
        committed.draw_pixmap(0, 0, self.committed.as_ref(), &paint, Transform::identity(), None);
        self.preview = blank(width, height)?;
        self.committed = committed;
        log::debug!("Surface resized to {}x{}", width, height);
        Ok(())
    }

    /// Alpha of a committed pixel, or `None` outside the surface.
    pub fn committed_alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.committed.pixel(x, y).map(|p| p.alpha())
    }

    /// Alpha of a preview pixel, or `None` outside the surface.
    pub fn preview_alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.preview.pixel(x, y).map(|p| p.alpha())
    }

    /// Straight (non-premultiplied) RGBA of a committed pixel.
    pub fn committed_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.committed.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Whether the preview layer has no visible pixels.
    pub fn preview_is_empty(&self) -> bool {
        self.preview.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Number of committed pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.committed.pixels().iter().filter(|p| p.alpha() > 0).count()
    }
}

impl DrawSurface for RasterEngine {
    fn apply_to_committed(&mut self, event: &DrawEvent) {
        paint_stroke(
            &mut self.committed,
            &event.outline(),
            event.color().to_color(),
            event.size().get() as f32,
            event.composite_mode(),
        );
    }

    fn clear(&mut self) {
        self.committed.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn preview_shape(&mut self, shape: &ShapeEvent) {
        self.preview.fill(tiny_skia::Color::TRANSPARENT);
        paint_stroke(
            &mut self.preview,
            &shape.outline(),
            shape.color.to_color(),
            shape.size.get() as f32,
            CompositeMode::Normal,
        );
    }

    fn clear_preview(&mut self) {
        self.preview.fill(tiny_skia::Color::TRANSPARENT);
    }
}
