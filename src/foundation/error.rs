use std::path::PathBuf;

/// Convenience result type used across framecast.
pub type FramecastResult<T> = Result<T, FramecastError>;

/// Top-level error taxonomy used by the render run.
#[derive(thiserror::Error, Debug)]
pub enum FramecastError {
    /// Invalid user-provided configuration or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A property update could not be applied to the scene state.
    #[error("animation error: {0}")]
    Animation(String),

    /// Failure while driving, rasterizing, or persisting one frame.
    #[error("render error at frame {frame}: {source}")]
    Render {
        /// 0-based frame index that failed.
        frame: u64,
        /// Underlying failure.
        #[source]
        source: Box<FramecastError>,
    },

    /// The external encoder failed to produce the final video.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramecastError {
    /// Build a [`FramecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramecastError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Wrap `source` with the frame it happened on.
    pub fn render(frame: u64, source: FramecastError) -> Self {
        Self::Render {
            frame,
            source: Box::new(source),
        }
    }

    /// Build a [`FramecastError::Assembly`] value.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// Build a [`FramecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Frame index carried by a [`FramecastError::Render`], if any.
    pub fn frame(&self) -> Option<u64> {
        match self {
            Self::Render { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}

/// Recoverable failure to measure a media asset's duration.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    /// The probe tool could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Executable name.
        tool: String,
        /// Spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The probe tool exited unsuccessfully.
    #[error("{tool} failed for '{}' with status {status}: {stderr}", path.display())]
    Failed {
        /// Executable name.
        tool: String,
        /// Probed asset.
        path: PathBuf,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed stderr output.
        stderr: String,
    },

    /// The reported duration is not a finite positive number.
    #[error("unable to determine duration for '{}' (got \"{raw}\")", path.display())]
    InvalidDuration {
        /// Probed asset.
        path: PathBuf,
        /// Raw tool output.
        raw: String,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
