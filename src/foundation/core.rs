use crate::foundation::error::{FramecastError, FramecastResult};

pub use kurbo::{Affine, Vec2};

/// Absolute 0-based frame index in render-run space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// One-based ordinal used by persisted frame file names.
    pub fn ordinal(self) -> u64 {
        self.0 + 1
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> FramecastResult<Self> {
        if den == 0 {
            return Err(FramecastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FramecastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate (`num/1`).
    pub fn whole(fps: u32) -> FramecastResult<Self> {
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to a frame count using ceiling semantics.
    ///
    /// Non-finite or negative inputs produce `0`.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * f64::from(self.num) / f64::from(self.den)).ceil() as u64
    }

    /// Number of whole seconds covered by the first `frames` frames.
    pub fn whole_secs_in(self, frames: u64) -> u64 {
        frames.saturating_mul(u64::from(self.den)) / u64::from(self.num)
    }

    /// `ffmpeg`-style rate string (`num/den`).
    pub fn to_ffmpeg_rate(self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Reject empty canvases and dimensions the CPU rasterizer cannot address.
    pub fn validate(self) -> FramecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FramecastError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(FramecastError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Number of bytes in a tightly packed RGBA8 frame of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
