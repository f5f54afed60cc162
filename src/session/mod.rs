/// Probe, render, persist, and assemble one overlay video.
pub mod run;
