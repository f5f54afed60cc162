use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::color::Rgba8,
    foundation::error::{FramecastError, FramecastResult},
    scene::model::FontData,
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

#[derive(Clone)]
/// Shaped single-line text ready for rasterization.
pub struct PreparedText {
    /// Fully built text layout.
    pub layout: Arc<parley::Layout<Rgba8>>,
    /// Widest line advance in pixels.
    pub width: f32,
    /// Family name resolved from the font bytes.
    pub font_family: String,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .field("width", &self.width)
            .field("font_family", &self.font_family)
            .finish()
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Each [`FontData`] is registered with the font collection once; later layouts reuse the family
/// name resolved the first time.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    // Holding the bytes keeps the pointer key from being reused by another font.
    families: HashMap<usize, (Arc<Vec<u8>>, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Number of distinct fonts registered so far.
    pub fn registered_fonts(&self) -> usize {
        self.families.len()
    }

    fn family_for(&mut self, font: &FontData) -> FramecastResult<String> {
        let key = Arc::as_ptr(&font.bytes) as usize;
        if let Some((_, name)) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            FramecastError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FramecastError::validation("registered font family has no name"))?
            .to_string();

        self.families
            .insert(key, (font.bytes.clone(), family_name.clone()));
        Ok(family_name)
    }

    /// Shape `text` without wrapping, using `font` at `size_px`.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &FontData,
        size_px: f32,
        brush: Rgba8,
    ) -> FramecastResult<PreparedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FramecastError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);

        let width = layout
            .lines()
            .map(|line| line.metrics().advance)
            .fold(0.0f32, f32::max);

        Ok(PreparedText {
            layout: Arc::new(layout),
            width,
            font_family: family_name,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
