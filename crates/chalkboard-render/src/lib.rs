//! Chalkboard Render Library
//!
//! CPU raster implementation of the drawing surfaces on `tiny-skia`, plus
//! PNG snapshots of the committed layer.

mod renderer;
pub mod snapshot;

pub use renderer::{RasterEngine, RenderResult, RendererError};
pub use snapshot::encode_png;
