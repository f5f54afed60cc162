/// Time-bounded animation units.
pub mod clip;
/// Composition of clips into a per-frame driver.
pub mod timeline;
