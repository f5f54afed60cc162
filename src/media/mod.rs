/// Background duration probing and frame-count derivation.
pub mod probe;
