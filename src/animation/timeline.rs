use crate::{
    animation::clip::Clip,
    foundation::core::FrameIndex,
    foundation::error::FramecastResult,
    scene::model::{PropertyUpdate, SceneState},
};

/// One entry of a [`Timeline`]: a single clip or a nested group.
#[derive(Clone, Debug)]
pub enum Animation {
    /// A single clip.
    Clip(Clip),
    /// A previously combined timeline, e.g. all clips of one layer.
    Group(Timeline),
}

impl From<Clip> for Animation {
    fn from(value: Clip) -> Self {
        Self::Clip(value)
    }
}

impl From<Timeline> for Animation {
    fn from(value: Timeline) -> Self {
        Self::Group(value)
    }
}

/// Ordered composition of animations driven once per frame.
///
/// Composition rule: **last write wins**. Updates are produced in entry order (depth-first
/// through groups); when two active clips touch the same property of the same node in one frame,
/// the one combined later takes effect.
///
/// A timeline holds no per-frame state. Everything it "remembers" lives in the [`SceneState`] it
/// drives.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<Animation>,
}

impl Timeline {
    /// Combine animations in order. `None` entries mark a deliberately absent animation and are
    /// skipped.
    pub fn combine<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Option<Animation>>,
    {
        Self {
            entries: entries.into_iter().flatten().collect(),
        }
    }

    /// Append one more animation after the existing entries.
    pub fn push(&mut self, entry: impl Into<Animation>) {
        self.entries.push(entry.into());
    }

    /// Top-level entries in combination order.
    pub fn entries(&self) -> &[Animation] {
        &self.entries
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing was combined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of clips, counting through nested groups.
    pub fn clip_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                Animation::Clip(_) => 1,
                Animation::Group(g) => g.clip_count(),
            })
            .sum()
    }

    /// Last frame at which any clip is still active, or `None` for an empty timeline.
    pub fn last_active_frame(&self) -> Option<u64> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Animation::Clip(c) => Some(c.end_frame()),
                Animation::Group(g) => g.last_active_frame(),
            })
            .max()
    }

    /// Append the updates of every clip active at `frame`, in composition order.
    pub fn updates_at(&self, frame: FrameIndex, out: &mut Vec<PropertyUpdate>) {
        for entry in &self.entries {
            match entry {
                Animation::Clip(clip) => {
                    if let Some(u) = clip.update_at(frame) {
                        out.push(u);
                    }
                }
                Animation::Group(group) => group.updates_at(frame, out),
            }
        }
    }

    /// Drive `state` to `frame`: collect this frame's updates and apply them in order.
    ///
    /// The first update that fails to apply aborts the frame.
    pub fn drive(&self, frame: FrameIndex, state: &mut SceneState) -> FramecastResult<()> {
        let mut updates = Vec::new();
        self.updates_at(frame, &mut updates);
        state.apply_all(&updates)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
