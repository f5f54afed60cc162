use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        color::Rgba8,
        store::{PreparedImage, PreparedText, TextLayoutEngine},
    },
    foundation::core::{Affine, Vec2},
    foundation::error::{FramecastError, FramecastResult},
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    scene::model::{FontData, ImageNode, NodeContent, NodeProps, Scene, SceneState, TextNode},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    font: usize,
    size_bits: u32,
    color: [u8; 4],
}

/// `vello_cpu` rasterizer with per-run caches for shaped text, fonts, and image paints.
pub struct CpuBackend {
    settings: RenderSettings,
    text_engine: TextLayoutEngine,
    text_cache: HashMap<TextKey, PreparedText>,
    font_cache: HashMap<usize, vello_cpu::peniko::FontData>,
    image_cache: HashMap<usize, vello_cpu::Image>,
}

impl CpuBackend {
    /// Create a backend with empty caches.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            text_engine: TextLayoutEngine::new(),
            text_cache: HashMap::new(),
            font_cache: HashMap::new(),
            image_cache: HashMap::new(),
        }
    }
}

impl RenderBackend for CpuBackend {
    fn render(&mut self, scene: &Scene, state: &SceneState) -> FramecastResult<FrameRGBA> {
        scene.canvas.validate()?;
        let width: u16 = scene
            .canvas
            .width
            .try_into()
            .map_err(|_| FramecastError::validation("canvas width exceeds u16"))?;
        let height: u16 = scene
            .canvas
            .height
            .try_into()
            .map_err(|_| FramecastError::validation("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        for node in scene.nodes() {
            let props = state.get(node.id).ok_or_else(|| {
                FramecastError::validation(format!(
                    "scene state has no entry for node '{}' ({:?})",
                    node.name, node.id
                ))
            })?;
            let opacity = props.draw_opacity();
            if opacity <= 0.0 {
                continue;
            }

            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            match &node.content {
                NodeContent::Text(t) => self.draw_text(&mut ctx, t, props)?,
                NodeContent::Image(i) => self.draw_image(&mut ctx, i, props)?,
            }
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: scene.canvas.width,
            height: scene.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuBackend {
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        node: &TextNode,
        props: &NodeProps,
    ) -> FramecastResult<()> {
        let prepared = self.text_for(node)?;
        let font = self.font_for(&node.font);

        // Center the shaped line inside the node's box.
        let offset_x = (node.box_width - f64::from(prepared.width)) * 0.5;
        let transform = props.translation() * Affine::translate(Vec2::new(offset_x, 0.0));
        ctx.set_transform(affine_to_cpu(transform));

        for line in prepared.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        node: &ImageNode,
        props: &NodeProps,
    ) -> FramecastResult<()> {
        let paint = self.image_paint_for(&node.image)?;
        let (w, h) = (
            f64::from(node.image.width),
            f64::from(node.image.height),
        );

        let scale = Affine::scale_non_uniform(node.width / w, node.height / h);
        ctx.set_transform(affine_to_cpu(props.translation() * scale));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        Ok(())
    }

    fn text_for(&mut self, node: &TextNode) -> FramecastResult<PreparedText> {
        let key = TextKey {
            text: node.text.clone(),
            font: font_key(&node.font),
            size_bits: node.size_px.to_bits(),
            color: rgba_key(node.color),
        };
        if let Some(prepared) = self.text_cache.get(&key) {
            return Ok(prepared.clone());
        }

        let prepared =
            self.text_engine
                .layout_line(&node.text, &node.font, node.size_px, node.color)?;
        tracing::debug!(
            text = %node.text,
            family = %prepared.font_family,
            width = prepared.width,
            "shaped text"
        );
        self.text_cache.insert(key, prepared.clone());
        Ok(prepared)
    }

    fn font_for(&mut self, font: &FontData) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(font_key(font))
            .or_insert_with(|| {
                let bytes = font.bytes.as_ref().clone();
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0)
            })
            .clone()
    }

    fn image_paint_for(&mut self, image: &Arc<PreparedImage>) -> FramecastResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

fn font_key(font: &FontData) -> usize {
    Arc::as_ptr(&font.bytes) as usize
}

fn rgba_key(c: Rgba8) -> [u8; 4] {
    [c.r, c.g, c.b, c.a]
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FramecastResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FramecastError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FramecastError::validation("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(FramecastError::validation("image has zero width or height"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FramecastError::validation(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
