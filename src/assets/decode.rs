use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::store::PreparedImage,
    foundation::error::{FramecastError, FramecastResult},
    foundation::math::premultiply_rgba8_in_place,
    scene::model::FontData,
};

const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FramecastResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes and rasterize them at `height_px`, keeping the document's aspect ratio.
///
/// Output pixels are premultiplied RGBA8 (the `tiny_skia` native layout).
pub fn rasterize_svg(bytes: &[u8], height_px: u32) -> FramecastResult<PreparedImage> {
    if height_px == 0 {
        return Err(FramecastError::validation("svg raster height must be > 0"));
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    if !size.width().is_finite() || !size.height().is_finite() || size.height() <= 0.0 {
        return Err(FramecastError::validation("svg has invalid width/height"));
    }
    let scale = height_px as f32 / size.height();
    let width_px = ((size.width() * scale).ceil() as u32).max(1);
    if width_px > MAX_SVG_DIM || height_px > MAX_SVG_DIM {
        return Err(FramecastError::validation(format!(
            "svg raster size too large: {width_px}x{height_px} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width_px, height_px)
        .ok_or_else(|| FramecastError::validation("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    Ok(PreparedImage {
        width: width_px,
        height: height_px,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Load a logo from disk. `.svg` files are rasterized at `height_px`; anything else goes through
/// the `image` decoders at native size.
pub fn load_logo(path: &Path, height_px: u32) -> FramecastResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read logo '{}'", path.display()))?;
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        rasterize_svg(&bytes, height_px)
    } else {
        decode_image(&bytes)
    }
}

/// Read a font file into shareable [`FontData`].
pub fn load_font(path: &Path) -> FramecastResult<FontData> {
    let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    if bytes.is_empty() {
        return Err(FramecastError::validation(format!(
            "font file '{}' is empty",
            path.display()
        )));
    }
    Ok(FontData {
        bytes: Arc::new(bytes),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
