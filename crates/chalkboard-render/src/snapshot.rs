//! PNG export of a raster layer.

use crate::renderer::RenderResult;
use tiny_skia::Pixmap;

/// Straight RGBA bytes of a layer, row-major.
pub fn to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Encode a layer as an 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgba = to_rgba(pixmap);
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba)?;
    }
    log::debug!(
        "Encoded {}x{} snapshot: {} bytes",
        pixmap.width(),
        pixmap.height(),
        png_data.len()
    );
    Ok(png_data)
}
