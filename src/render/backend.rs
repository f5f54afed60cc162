use crate::{
    foundation::error::FramecastResult,
    scene::model::{Scene, SceneState},
};

/// A rendered frame as RGBA8 pixels.
///
/// Backends produce **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Rasterizer capability used by the render loop.
///
/// A backend reads the static [`Scene`] plus the current [`SceneState`] and returns the frame's
/// pixels. It never mutates scene state. Resources it holds are released when it is dropped.
pub trait RenderBackend {
    /// Rasterize one frame.
    fn render(&mut self, scene: &Scene, state: &SceneState) -> FramecastResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// If set, the frame is filled with this straight-alpha RGBA8 color before drawing nodes.
    /// Overlays keep this unset so the background video shows through.
    pub clear_rgba: Option<[u8; 4]>,
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> FramecastResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}
