/// Backend trait, settings, and frame type.
pub mod backend;
/// CPU rasterizer built on `vello_cpu`.
pub mod cpu;
