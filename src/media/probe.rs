use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::foundation::{core::Fps, error::ProbeError};

/// Duration assumed when the background cannot be probed.
pub const DEFAULT_DURATION_SECS: f64 = 5.0;

/// Measures how long a media asset plays.
pub trait DurationProbe {
    /// Duration of `path` in seconds. Implementations return only finite positive values.
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// [`DurationProbe`] backed by the system `ffprobe`.
#[derive(Clone, Debug)]
pub struct FfprobeDuration {
    tool: String,
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self {
            tool: "ffprobe".to_string(),
        }
    }
}

impl FfprobeDuration {
    /// Use a specific executable instead of `ffprobe` from `PATH`.
    pub fn with_tool(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl DurationProbe for FfprobeDuration {
    fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let out = Command::new(&self.tool)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(ProbeError::Failed {
                tool: self.tool.clone(),
                path: path.to_path_buf(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        parse_duration_output(&String::from_utf8_lossy(&out.stdout), path)
    }
}

/// Parse ffprobe's bare `format=duration` output.
pub fn parse_duration_output(raw: &str, path: &Path) -> Result<f64, ProbeError> {
    let invalid = || ProbeError::InvalidDuration {
        path: path.to_path_buf(),
        raw: raw.trim().to_string(),
    };
    let secs: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid());
    }
    Ok(secs)
}

/// Number of frames to render for a probe outcome.
///
/// A successful probe yields `max(1, ceil(secs * fps))`. A failed one is logged and replaced by
/// [`DEFAULT_DURATION_SECS`].
pub fn frame_count_from_probe(probed: Result<f64, ProbeError>, fps: Fps) -> u64 {
    let secs = match probed {
        Ok(secs) => secs,
        Err(err) => {
            tracing::warn!(
                error = %err,
                fallback_secs = DEFAULT_DURATION_SECS,
                "could not probe background duration, using fallback"
            );
            DEFAULT_DURATION_SECS
        }
    };
    fps.secs_to_frames_ceil(secs).max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
