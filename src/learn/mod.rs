//! Parameter learning built on top of the filter and the smoother.

pub mod em;

pub use em::{learn, maximize, Learner};
