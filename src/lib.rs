//! framecast renders a short animated overlay over a background video.
//!
//! A run goes through four steps:
//!
//! - probe the background video to decide how many frames to render
//! - drive a [`Timeline`] of [`Clip`]s frame by frame, applying the resulting property updates to
//!   an owned [`SceneState`]
//! - rasterize each frame with a [`RenderBackend`] and write it as a numbered PNG
//! - hand the finished sequence to a [`VideoAssembler`] that composites it onto the background
//!
//! [`OverlayRun`] ties the steps together; [`build_intro`] builds the stock text-and-logo intro.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Clips and timelines.
pub mod animation;
/// Fonts, logos, colors, and text layout.
pub mod assets;
/// Frame sinks and video assembly.
pub mod encode;
/// Media duration probing.
pub mod media;
/// Rendering backends.
pub mod render;
/// Scene model and the intro composition.
pub mod scene;
/// End-to-end overlay runs.
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Vec2};
pub use crate::foundation::error::{FramecastError, FramecastResult, ProbeError};

pub use crate::animation::clip::Clip;
pub use crate::animation::timeline::{Animation, Timeline};
pub use crate::assets::color::Rgba8;
pub use crate::encode::ffmpeg::{AssembleJob, FfmpegAssembler, VideoAssembler, is_ffmpeg_on_path};
pub use crate::encode::frames::{FramePattern, PngSequenceSink, clear_stale_frames, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::probe::{
    DEFAULT_DURATION_SECS, DurationProbe, FfprobeDuration, frame_count_from_probe,
};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::scene::intro::{Intro, IntroAssets, IntroConfig, build_intro};
pub use crate::scene::model::{NodeId, Property, PropertyUpdate, Scene, SceneState};
pub use crate::session::run::{OverlayRun, RunOpts, RunReport, RunState};
