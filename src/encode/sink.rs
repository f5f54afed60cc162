use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

impl SinkConfig {
    /// Config for frames of `canvas` at `fps`.
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            fps,
        }
    }

    /// Reject a frame whose dimensions or byte length disagree with this config.
    pub fn check_frame(&self, frame: &FrameRGBA) -> FramecastResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(FramecastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.width as usize * self.height as usize * 4 {
            return Err(FramecastError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered frames in render order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FramecastResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FramecastResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FramecastResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FramecastResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FramecastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FramecastError::validation("in-memory sink not started"))?;
        cfg.check_frame(frame)?;
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(FramecastError::validation(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FramecastResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
