//! The text-and-logo reveal rendered over the background video.
//!
//! Layers, bottom to top:
//!
//! - background: supplied by the source video, contributes no animation;
//! - text: a headline sliding in from the left, a subline sliding in from the right, and a brand
//!   line fading in;
//! - logo: an optional image fading in at the bottom-right corner.
//!
//! Only the scene *parameters* are configurable. Timings are fixed in seconds and converted to
//! frames with the configured rate.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    animation::{
        clip::Clip,
        timeline::{Animation, Timeline},
    },
    assets::{color::Rgba8, store::PreparedImage},
    foundation::core::{Canvas, Fps},
    foundation::error::{FramecastError, FramecastResult},
    scene::model::{FontData, ImageNode, NodeContent, NodeProps, Property, Scene, TextNode},
};

/// One line of intro text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpec {
    /// Text content.
    pub text: String,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Top of the text box in canvas pixels.
    pub y: f64,
    /// Use the bold font when one is available.
    #[serde(default)]
    pub bold: bool,
}

/// Logo placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogoSpec {
    /// Display height in pixels; width follows the image aspect ratio.
    pub height_px: u32,
    /// Gap between the logo and the right canvas edge.
    pub margin_right: f64,
    /// Gap between the logo and the bottom canvas edge.
    pub margin_bottom: f64,
}

impl Default for LogoSpec {
    fn default() -> Self {
        Self {
            height_px: 100,
            margin_right: 75.0,
            margin_bottom: 50.0,
        }
    }
}

/// Intro parameters, loadable from JSON. Missing fields take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntroConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate (frames per second).
    pub fps: u32,
    /// Line sliding in from the left.
    pub headline: TextSpec,
    /// Line sliding in from the right.
    pub subline: TextSpec,
    /// Line fading in.
    pub brand: TextSpec,
    /// Logo placement.
    pub logo: LogoSpec,
}

const INK: Rgba8 = Rgba8::rgb(0x1e, 0x37, 0x40);
const BRAND: Rgba8 = Rgba8::rgb(0x12, 0x9a, 0x74);

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            headline: TextSpec {
                text: "Hello".to_string(),
                size_px: 200.0,
                color: INK,
                y: 150.0,
                bold: true,
            },
            subline: TextSpec {
                text: "from".to_string(),
                size_px: 150.0,
                color: INK,
                y: 350.0,
                bold: false,
            },
            brand: TextSpec {
                text: "Konva".to_string(),
                size_px: 300.0,
                color: BRAND,
                y: 500.0,
                bold: true,
            },
            logo: LogoSpec::default(),
        }
    }
}

impl IntroConfig {
    /// Read a JSON config file.
    pub fn from_path(path: &Path) -> FramecastResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&bytes)
    }

    /// Parse a JSON config.
    pub fn from_json(bytes: &[u8]) -> FramecastResult<Self> {
        let cfg: Self = serde_json::from_slice(bytes)
            .map_err(|e| FramecastError::serde(format!("intro config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check dimensions, rate, and text sizes.
    pub fn validate(&self) -> FramecastResult<()> {
        self.canvas().validate()?;
        self.frame_rate()?;
        for (name, spec) in [
            ("headline", &self.headline),
            ("subline", &self.subline),
            ("brand", &self.brand),
        ] {
            if !spec.size_px.is_finite() || spec.size_px <= 0.0 {
                return Err(FramecastError::validation(format!(
                    "{name} size_px must be finite and > 0"
                )));
            }
        }
        if self.logo.height_px == 0 {
            return Err(FramecastError::validation("logo height_px must be > 0"));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> FramecastResult<Fps> {
        Fps::whole(self.fps)
    }
}

/// Fonts and images the intro draws with.
#[derive(Clone, Debug)]
pub struct IntroAssets {
    /// Font for regular lines.
    pub regular: FontData,
    /// Font for bold lines; falls back to `regular`.
    pub bold: Option<FontData>,
    /// Logo image; the logo layer is absent without it.
    pub logo: Option<Arc<PreparedImage>>,
}

/// A built intro: the scene to draw and the timeline that animates it.
#[derive(Clone, Debug)]
pub struct Intro {
    /// Static scene description.
    pub scene: Scene,
    /// Per-frame driver.
    pub timeline: Timeline,
    /// Frame rate the timeline was built for.
    pub fps: Fps,
}

/// Build the intro scene and its timeline.
pub fn build_intro(cfg: &IntroConfig, assets: &IntroAssets) -> FramecastResult<Intro> {
    cfg.validate()?;
    let fps = cfg.frame_rate()?;
    let mut scene = Scene::new(cfg.canvas());

    let background = background_layer();
    let text = text_layer(cfg, assets, &mut scene)?;
    let logo = match &assets.logo {
        Some(image) => Some(logo_layer(cfg, image.clone(), &mut scene)?),
        None => None,
    };

    let timeline = Timeline::combine([background, Some(text.into()), logo.map(Into::into)]);
    Ok(Intro {
        scene,
        timeline,
        fps,
    })
}

fn background_layer() -> Option<Animation> {
    None
}

/// Frames in `tenths / 10` seconds, rounded down.
///
/// At odd rates a half-second offset is active on the same frames a fractional start would give,
/// but sampled progress runs up to half a frame ahead: 2.5 s at 25 fps starts at frame 62, so a
/// 25-frame clip reaches 1.0 on its last frame where a start of 62.5 would stop at 0.98.
fn secs_to_frames(fps: u32, tenths: u32) -> u64 {
    u64::from(fps) * u64::from(tenths) / 10
}

fn text_layer(
    cfg: &IntroConfig,
    assets: &IntroAssets,
    scene: &mut Scene,
) -> FramecastResult<Timeline> {
    let width = f64::from(cfg.width);
    let font_for = |spec: &TextSpec| -> FontData {
        match (&assets.bold, spec.bold) {
            (Some(bold), true) => bold.clone(),
            _ => assets.regular.clone(),
        }
    };
    let text_node = |spec: &TextSpec| {
        NodeContent::Text(TextNode {
            text: spec.text.clone(),
            font: font_for(spec),
            size_px: spec.size_px,
            color: spec.color,
            box_width: width,
        })
    };

    let headline = scene.add_node(
        "headline",
        text_node(&cfg.headline),
        NodeProps {
            x: -width,
            y: cfg.headline.y,
            opacity: 1.0,
        },
    );
    let subline = scene.add_node(
        "subline",
        text_node(&cfg.subline),
        NodeProps {
            x: width,
            y: cfg.subline.y,
            opacity: 1.0,
        },
    );
    let brand = scene.add_node(
        "brand",
        text_node(&cfg.brand),
        NodeProps {
            x: 0.0,
            y: cfg.brand.y,
            opacity: 0.0,
        },
    );

    let fps = cfg.fps;
    Ok(Timeline::combine([
        Some(
            Clip::linear(
                headline,
                Property::X,
                -width,
                0.0,
                0,
                secs_to_frames(fps, 20),
            )?
            .into(),
        ),
        Some(
            Clip::linear(
                subline,
                Property::X,
                width,
                0.0,
                secs_to_frames(fps, 10),
                secs_to_frames(fps, 20),
            )?
            .into(),
        ),
        Some(
            Clip::linear(
                brand,
                Property::Opacity,
                0.0,
                1.0,
                secs_to_frames(fps, 25),
                secs_to_frames(fps, 10),
            )?
            .into(),
        ),
    ]))
}

fn logo_layer(
    cfg: &IntroConfig,
    image: Arc<PreparedImage>,
    scene: &mut Scene,
) -> FramecastResult<Clip> {
    let height = f64::from(cfg.logo.height_px);
    let width = image.aspect() * height;
    let logo = scene.add_node(
        "logo",
        NodeContent::Image(ImageNode {
            image,
            width,
            height,
        }),
        NodeProps {
            x: f64::from(cfg.width) - width - cfg.logo.margin_right,
            y: f64::from(cfg.height) - height - cfg.logo.margin_bottom,
            opacity: 0.0,
        },
    );

    Clip::linear(
        logo,
        Property::Opacity,
        0.0,
        1.0,
        secs_to_frames(cfg.fps, 30),
        secs_to_frames(cfg.fps, 10),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/scene/intro.rs"]
mod tests;
