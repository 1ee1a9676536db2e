//! Error type shared by the filter, the smoother and the learner.

use thiserror::Error;

/// Errors produced by the estimation routines.
///
/// `InvalidArgument` is raised for precondition violations and does not depend on the
/// configured [`NumericPolicy`](crate::NumericPolicy). The two numeric variants are only
/// raised under [`NumericPolicy::Strict`](crate::NumericPolicy::Strict).
///
/// `index` is the time step the failing quantity belongs to. Quantities aggregated over the
/// whole sequence, such as the sums and estimates of the M-step, report index 0.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KalmanError {
    /// Input does not satisfy the preconditions of the operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A denominator evaluated to exactly zero
    #[error("zero denominator in {quantity} at index {index}")]
    ZeroDenominator { quantity: &'static str, index: usize },

    /// A computed quantity is NaN or infinite
    #[error("non-finite result: {quantity} at index {index}")]
    NonFinite { quantity: &'static str, index: usize },
}

/// Result type alias
pub type Result<T, E = KalmanError> = std::result::Result<T, E>;
