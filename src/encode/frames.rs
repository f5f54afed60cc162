use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramecastError, FramecastResult};
use crate::foundation::math::unpremultiply_rgba8;
use crate::render::backend::FrameRGBA;

/// File naming scheme of a frame sequence: `<prefix><ordinal padded to digits>.<extension>`.
///
/// Ordinals are one-based, so frame 0 is written as `frame-000001.png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePattern {
    /// Leading text of every file name.
    pub prefix: String,
    /// Zero-padded width of the ordinal.
    pub digits: usize,
    /// File extension without the dot.
    pub extension: String,
}

impl Default for FramePattern {
    fn default() -> Self {
        Self {
            prefix: "frame-".to_string(),
            digits: 6,
            extension: "png".to_string(),
        }
    }
}

impl FramePattern {
    /// File name of frame `idx`.
    pub fn file_name(&self, idx: FrameIndex) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            idx.ordinal(),
            self.extension,
            width = self.digits
        )
    }

    /// `printf`-style input pattern understood by ffmpeg's image2 demuxer.
    pub fn ffmpeg_pattern(&self) -> String {
        format!("{}%0{}d.{}", self.prefix, self.digits, self.extension)
    }

    /// Whether `file_name` looks like a member of this sequence.
    ///
    /// Only the prefix and extension are compared, so leftovers from longer runs or other padding
    /// widths also match.
    pub fn matches(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.extension);
        file_name.len() >= self.prefix.len() + suffix.len()
            && file_name.starts_with(&self.prefix)
            && file_name.ends_with(&suffix)
    }
}

/// Remove every file in `dir` matching `pattern` and return how many were removed.
///
/// Other files and subdirectories are left alone. A missing directory counts as empty.
pub fn clear_stale_frames(dir: &Path, pattern: &FramePattern) -> FramecastResult<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("read frame directory '{}'", dir.display()))
                .into());
        }
    };

    let mut removed = 0usize;
    for entry in entries {
        let entry = entry.with_context(|| format!("read frame directory '{}'", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat '{}'", entry.path().display()))?;
        if !file_type.is_file() {
            continue;
        }
        std::fs::remove_file(entry.path())
            .with_context(|| format!("remove stale frame '{}'", entry.path().display()))?;
        tracing::debug!(file = %name, "removed stale frame");
        removed += 1;
    }
    Ok(removed)
}

/// Write `frame` as an RGBA PNG, converting premultiplied data to straight alpha.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> FramecastResult<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(FramecastError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let straight;
    let data = if frame.premultiplied {
        let mut buf = vec![0u8; expected];
        unpremultiply_rgba8(&mut buf, &frame.data);
        straight = buf;
        &straight
    } else {
        &frame.data
    };
    save_png(path, data, frame.width, frame.height)
}

fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> FramecastResult<()> {
    image::save_buffer_with_format(
        path,
        data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// [`FrameSink`] that writes each frame as a numbered PNG into a flat directory.
///
/// Existing files with the same name are overwritten.
pub struct PngSequenceSink {
    dir: PathBuf,
    pattern: FramePattern,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    scratch: Vec<u8>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing `frame-%06d.png` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_pattern(dir, FramePattern::default())
    }

    /// Sink using a custom naming pattern.
    pub fn with_pattern(dir: impl Into<PathBuf>, pattern: FramePattern) -> Self {
        Self {
            dir: dir.into(),
            pattern,
            cfg: None,
            last_idx: None,
            scratch: Vec::new(),
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Naming pattern.
    pub fn pattern(&self) -> &FramePattern {
        &self.pattern
    }

    /// Path frame `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(self.pattern.file_name(idx))
    }

    /// Frames written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> FramecastResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FramecastError::validation(
                "png sequence width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frame directory '{}'", self.dir.display()))?;

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FramecastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FramecastError::validation("png sequence sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(FramecastError::validation(format!(
                "png sequence sink received frame {} after frame {}",
                idx.0, last.0
            )));
        }
        cfg.check_frame(frame)?;
        self.last_idx = Some(idx);

        let path = self.frame_path(idx);
        if frame.premultiplied {
            unpremultiply_rgba8(&mut self.scratch, &frame.data);
            save_png(&path, &self.scratch, frame.width, frame.height)?;
        } else {
            save_png(&path, &frame.data, frame.width, frame.height)?;
        }
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FramecastResult<()> {
        if self.cfg.take().is_none() {
            return Err(FramecastError::validation("png sequence sink not started"));
        }
        tracing::debug!(
            dir = %self.dir.display(),
            frames = self.written,
            "frame sequence complete"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
