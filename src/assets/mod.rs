/// Straight-alpha colors used by scene configuration.
pub mod color;
/// Image, SVG, and font loading.
pub mod decode;
/// Prepared raster images and text layouts.
pub mod store;
