/// Final video assembly through the system `ffmpeg`.
pub mod ffmpeg;
/// Numbered PNG frame sequences on disk.
pub mod frames;
/// Sink contract for rendered frames.
pub mod sink;
