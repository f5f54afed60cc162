/// The text-and-logo intro composition.
pub mod intro;
/// Scene nodes, property updates, and per-run scene state.
pub mod model;
