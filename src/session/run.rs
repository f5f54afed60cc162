use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::{
    animation::timeline::Timeline,
    encode::{
        ffmpeg::{AssembleJob, VideoAssembler},
        frames::{FramePattern, PngSequenceSink, clear_stale_frames},
        sink::{FrameSink, SinkConfig},
    },
    foundation::core::{Fps, FrameIndex},
    foundation::error::{FramecastError, FramecastResult},
    media::probe::{DurationProbe, frame_count_from_probe},
    render::backend::RenderBackend,
    scene::{intro::Intro, model::Scene},
};

/// Where an [`OverlayRun`] currently is.
///
/// `Initializing -> Rendering -> Assembling -> Done`; `Failed` is reachable from every
/// non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Preparing the frame directory and counting frames.
    Initializing,
    /// Producing frame `frame` (0-based).
    Rendering {
        /// Frame being driven, rasterized, or written.
        frame: u64,
    },
    /// Handing the finished sequence to the assembler.
    Assembling,
    /// The output video was written.
    Done,
    /// The run stopped with an error.
    Failed,
}

/// Paths and switches of one run.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Directory receiving the numbered frames. Created when missing.
    pub frame_dir: PathBuf,
    /// Background video; probed for the frame count and used by the assembler.
    pub background: PathBuf,
    /// Final video path.
    pub output: PathBuf,
    /// Overwrite `output` when it exists.
    pub overwrite: bool,
    /// Frame file naming.
    pub pattern: FramePattern,
}

impl RunOpts {
    /// Options with the default frame naming that overwrite existing output.
    pub fn new(
        frame_dir: impl Into<PathBuf>,
        background: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            frame_dir: frame_dir.into(),
            background: background.into(),
            output: output.into(),
            overwrite: true,
            pattern: FramePattern::default(),
        }
    }
}

/// Summary of a successful run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    /// Frames rendered and written.
    pub frames: u64,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    /// Background duration, `None` when the probe failed and the fallback was used.
    pub probed_duration_secs: Option<f64>,
}

impl RunReport {
    /// Average frames per second over the whole run.
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives a scene's timeline frame by frame, writes every frame, and assembles the video.
///
/// The run owns the only mutable [`SceneState`](crate::scene::model::SceneState); the backend only
/// reads it.
pub struct OverlayRun {
    scene: Scene,
    timeline: Timeline,
    fps: Fps,
    opts: RunOpts,
    state: RunState,
}

impl OverlayRun {
    /// Prepare a run of `timeline` over `scene` at `fps`.
    pub fn new(scene: Scene, timeline: Timeline, fps: Fps, opts: RunOpts) -> Self {
        Self {
            scene,
            timeline,
            fps,
            opts,
            state: RunState::Initializing,
        }
    }

    /// Prepare a run of a built intro.
    pub fn from_intro(intro: Intro, opts: RunOpts) -> Self {
        Self::new(intro.scene, intro.timeline, intro.fps, opts)
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run options.
    pub fn opts(&self) -> &RunOpts {
        &self.opts
    }

    /// Execute the whole run.
    ///
    /// The backend is released once rendering stops, before assembly starts and on every error
    /// path. Frames already written stay on disk when a later stage fails.
    #[tracing::instrument(
        name = "overlay_run",
        skip_all,
        fields(background = %self.opts.background.display(), output = %self.opts.output.display())
    )]
    pub fn run(
        &mut self,
        probe: &dyn DurationProbe,
        backend: Box<dyn RenderBackend>,
        assembler: &dyn VideoAssembler,
    ) -> FramecastResult<RunReport> {
        let result = self.run_stages(probe, backend, assembler);
        match &result {
            Ok(report) => {
                self.state = RunState::Done;
                tracing::info!(
                    frames = report.frames,
                    ms = report.elapsed.as_millis() as u64,
                    fps = report.frames_per_second(),
                    "done"
                );
            }
            Err(err) => {
                self.state = RunState::Failed;
                tracing::error!(error = %err, "overlay run failed");
            }
        }
        result
    }

    fn run_stages(
        &mut self,
        probe: &dyn DurationProbe,
        backend: Box<dyn RenderBackend>,
        assembler: &dyn VideoAssembler,
    ) -> FramecastResult<RunReport> {
        let started = Instant::now();
        self.state = RunState::Initializing;

        // The encoder rejects odd sizes; fail before any frame is written.
        let job = AssembleJob {
            fps: self.fps,
            canvas: self.scene.canvas,
            frame_dir: self.opts.frame_dir.clone(),
            pattern: self.opts.pattern.clone(),
            background: self.opts.background.clone(),
            output: self.opts.output.clone(),
            overwrite: self.opts.overwrite,
        };
        job.validate()?;

        let frame_dir = &self.opts.frame_dir;
        std::fs::create_dir_all(frame_dir)
            .with_context(|| format!("create frame directory '{}'", frame_dir.display()))?;
        let removed = clear_stale_frames(frame_dir, &self.opts.pattern)?;
        if removed > 0 {
            tracing::info!(removed, dir = %frame_dir.display(), "cleared stale frames");
        }

        let probed = probe.probe_duration(&self.opts.background);
        let probed_duration_secs = probed.as_ref().ok().copied();
        let frames = frame_count_from_probe(probed, self.fps);
        tracing::info!(
            frames,
            fps = %self.fps.to_ffmpeg_rate(),
            secs = self.fps.frames_to_secs(frames),
            "rendering overlay"
        );

        let mut sink =
            PngSequenceSink::with_pattern(self.opts.frame_dir.clone(), self.opts.pattern.clone());
        self.render_frames(backend, &mut sink, frames)?;

        self.state = RunState::Assembling;
        tracing::info!(output = %job.output.display(), "assembling video");
        assembler.assemble(&job)?;

        Ok(RunReport {
            frames,
            elapsed: started.elapsed(),
            probed_duration_secs,
        })
    }

    /// Render frames `0..frame_count` in order into `sink`.
    ///
    /// Each failure is reported with the frame it happened on. `backend` is dropped when this
    /// returns.
    pub fn render_frames(
        &mut self,
        mut backend: Box<dyn RenderBackend>,
        sink: &mut dyn FrameSink,
        frame_count: u64,
    ) -> FramecastResult<()> {
        sink.begin(SinkConfig::new(self.scene.canvas, self.fps))?;

        let mut scene_state = self.scene.initial_state();
        for f in 0..frame_count {
            self.state = RunState::Rendering { frame: f };
            let idx = FrameIndex(f);

            self.timeline
                .drive(idx, &mut scene_state)
                .map_err(|e| FramecastError::render(f, e))?;
            let frame = backend
                .render(&self.scene, &scene_state)
                .map_err(|e| FramecastError::render(f, e))?;
            sink.push_frame(idx, &frame)
                .map_err(|e| FramecastError::render(f, e))?;

            let done_secs = self.fps.whole_secs_in(f + 1);
            if done_secs > self.fps.whole_secs_in(f) {
                tracing::info!(
                    seconds = done_secs,
                    frame = f + 1,
                    total = frame_count,
                    "rendered"
                );
            }
        }

        drop(backend);
        sink.end()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/run.rs"]
mod tests;
