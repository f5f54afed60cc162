use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::encode::frames::FramePattern;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{FramecastError, FramecastResult};

/// Everything the assembly step needs to turn a frame sequence into the final video.
#[derive(Clone, Debug)]
pub struct AssembleJob {
    /// Rate the frame sequence was rendered at.
    pub fps: Fps,
    /// Output size; the background is scaled and cropped to fill it.
    pub canvas: Canvas,
    /// Directory holding the numbered frames.
    pub frame_dir: PathBuf,
    /// Naming scheme of the frames.
    pub pattern: FramePattern,
    /// Background video the overlay is composited onto. Its audio is carried over when present.
    pub background: PathBuf,
    /// Final video path.
    pub output: PathBuf,
    /// Overwrite `output` if it already exists.
    pub overwrite: bool,
}

impl AssembleJob {
    /// Reject settings the encoder cannot honor.
    pub fn validate(&self) -> FramecastResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FramecastError::validation(
                "assembly width/height must be non-zero",
            ));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(FramecastError::validation(
                "assembly width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(FramecastError::validation("fps must be non-zero"));
        }
        Ok(())
    }

    /// Input path pattern passed to ffmpeg for the frame sequence.
    pub fn frame_input(&self) -> PathBuf {
        self.frame_dir.join(self.pattern.ffmpeg_pattern())
    }
}

/// Consumes a written frame sequence and produces the final video.
pub trait VideoAssembler {
    /// Run the assembly for `job`.
    fn assemble(&self, job: &AssembleJob) -> FramecastResult<()>;
}

/// Filter graph that fills the canvas with the background and lays the overlay on top.
pub fn overlay_filter(canvas: Canvas) -> String {
    let (w, h) = (canvas.width, canvas.height);
    format!(
        "[0:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1[v0];\
         [v0][1:v]overlay=0:0"
    )
}

/// Command-line arguments (without the program name) for assembling `job`.
pub fn assemble_args(job: &AssembleJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.push(if job.overwrite { "-y" } else { "-n" }.into());
    args.extend(["-loglevel", "error", "-i"].map(OsString::from));
    args.push(job.background.clone().into_os_string());
    args.push("-framerate".into());
    args.push(job.fps.to_ffmpeg_rate().into());
    args.push("-i".into());
    args.push(job.frame_input().into_os_string());
    args.push("-filter_complex".into());
    args.push(overlay_filter(job.canvas).into());
    args.extend(
        [
            "-map", "0:a?", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac", "-shortest",
        ]
        .map(OsString::from),
    );
    args.push(job.output.clone().into_os_string());
    args
}

/// [`VideoAssembler`] that runs the system `ffmpeg`.
#[derive(Clone, Debug)]
pub struct FfmpegAssembler {
    program: String,
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegAssembler {
    /// Use a specific executable instead of `ffmpeg` from `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VideoAssembler for FfmpegAssembler {
    fn assemble(&self, job: &AssembleJob) -> FramecastResult<()> {
        job.validate()?;
        ensure_parent_dir(&job.output)?;
        if !job.overwrite && job.output.exists() {
            return Err(FramecastError::validation(format!(
                "output file '{}' already exists",
                job.output.display()
            )));
        }
        if !program_on_path(&self.program) {
            return Err(FramecastError::assembly(format!(
                "{} is required for video assembly, but was not found on PATH",
                self.program
            )));
        }

        let args = assemble_args(job);
        tracing::debug!(program = %self.program, ?args, "running assembler");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FramecastError::assembly(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.program
                ))
            })?;

        let mut stderr = child.stderr.take().ok_or_else(|| {
            FramecastError::assembly("failed to open ffmpeg stderr (unexpected)")
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let status = child.wait().map_err(|e| {
            FramecastError::assembly(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| FramecastError::assembly("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| FramecastError::assembly(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(FramecastError::assembly(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FramecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    program_on_path("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    program_on_path("ffprobe")
}

fn program_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
