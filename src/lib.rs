#![crate_name = "scalar_kalman"]
//! The `scalar_kalman` crate contains implementations of filtering, smoothing and parameter
//! learning algorithms for scalar linear-Gaussian state-space models, where a hidden scalar
//! state evolves as `x[t] = a * x[t-1] + N(0, q)` and is observed as `y[t] = c * x[t] + N(0, r)`.
//!
//! ## Algorithms
//! - [`filter()`]: Kalman filter, the forward recursion producing predicted and filtered
//!   estimates of the state.
//! - [`smooth()`]: Rauch-Tung-Striebel smoother, the backward recursion refining the filtered
//!   estimates with the complete observation sequence, together with the lag-one moments
//!   needed for parameter learning.
//! - [`learn()`]: Expectation-Maximization, an unbounded lazy sequence of parameter estimates
//!   alternating one filter and smoother pass with a closed-form re-estimation of the
//!   parameters.
//!
//! All routines are generic over the [`RealScalar`] element type (`f32` and `f64`) and take
//! their inputs as `ndarray` one-dimensional arrays or views. Degenerate arithmetic is
//! reported as an error or passed on as infinities and NaNs depending on the configured
//! [`NumericPolicy`].
//!
//! ```
//! use ndarray::arr1;
//! use scalar_kalman::{learn, ModelParameters};
//!
//! let y = arr1(&[0.9, 1.2, 1.1, 0.7, 1.0, 1.3]);
//! let initial = ModelParameters::new(0.0, 1.0, 0.9, 1.0, 0.1, 0.5);
//! let estimates = learn(&y, y.len(), initial).unwrap();
//! let tenth = estimates.take(10).last().unwrap().unwrap();
//! assert!(tenth.is_finite());
//! ```
pub mod config;
pub mod error;
pub mod filter;
pub mod learn;
pub mod simulate;
pub mod smoother;
pub mod types;

pub use config::NumericPolicy;
pub use error::{KalmanError, Result};
pub use filter::{filter, Filter, FilterOutput, ScalarKalmanFilter};
pub use learn::{learn, maximize, Learner};
pub use simulate::{simulate, Simulation};
pub use smoother::{smooth, RtsSmoother, SmootherOutput};
pub use types::{ModelParameters, RealScalar};
