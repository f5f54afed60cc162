use std::sync::Arc;

use crate::{
    foundation::core::FrameIndex,
    foundation::error::{FramecastError, FramecastResult},
    scene::model::{NodeId, Property, PropertyUpdate},
};

type Effect = Arc<dyn Fn(f64) -> PropertyUpdate + Send + Sync>;

/// A time-bounded animation unit.
///
/// A clip is active for frame `f` when `0 < f - start_frame <= duration`. While active it maps
/// the frame to a linear progress `(f - start_frame) / duration` in `(0, 1]` and hands that to
/// its effect, which turns progress into a [`PropertyUpdate`].
///
/// `f == start_frame` is *not* active: the "progress 0" state is never produced, so whatever value
/// the property held before persists for that frame. Visuals are tuned against this boundary.
#[derive(Clone)]
pub struct Clip {
    start_frame: u64,
    duration: u64,
    effect: Effect,
}

impl std::fmt::Debug for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clip")
            .field("start_frame", &self.start_frame)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl Clip {
    /// Create a clip from an arbitrary progress effect.
    pub fn new<F>(start_frame: u64, duration: u64, effect: F) -> FramecastResult<Self>
    where
        F: Fn(f64) -> PropertyUpdate + Send + Sync + 'static,
    {
        if duration == 0 {
            return Err(FramecastError::validation("clip duration must be > 0"));
        }
        Ok(Self {
            start_frame,
            duration,
            effect: Arc::new(effect),
        })
    }

    /// Clip that linearly moves `property` of `target` from `from` to `to`.
    pub fn linear(
        target: NodeId,
        property: Property,
        from: f64,
        to: f64,
        start_frame: u64,
        duration: u64,
    ) -> FramecastResult<Self> {
        Self::new(start_frame, duration, move |p| {
            PropertyUpdate::new(target, property, from + (to - from) * p)
        })
    }

    /// First frame boundary (exclusive).
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Number of frames over which progress advances to `1`.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Last frame at which the clip is active (progress `1`).
    pub fn end_frame(&self) -> u64 {
        self.start_frame.saturating_add(self.duration)
    }

    /// Progress for `frame`, or `None` outside the active window.
    pub fn progress_at(&self, frame: FrameIndex) -> Option<f64> {
        let local = i128::from(frame.0) - i128::from(self.start_frame);
        if local > 0 && local <= i128::from(self.duration) {
            Some(local as f64 / self.duration as f64)
        } else {
            None
        }
    }

    /// Run the effect for `frame` if the clip is active.
    pub fn update_at(&self, frame: FrameIndex) -> Option<PropertyUpdate> {
        self.progress_at(frame).map(|p| (self.effect)(p))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clip.rs"]
mod tests;
