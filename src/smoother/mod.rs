//! Smoothing counterparts of the filtering algorithms. Smoothers run backwards over the output
//! of a completed filter pass and refine every estimate with the observations that follow it.

pub mod rts;

pub use rts::{smooth, RtsSmoother, SmootherOutput};
