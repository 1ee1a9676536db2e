pub mod filter_traits;
pub mod kalman;
pub(in crate) mod kalman_common;

pub use filter_traits::*;
pub use kalman::{filter, Correction, Estimate, FilterOutput, ScalarKalmanFilter};
