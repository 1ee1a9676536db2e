//! Checks shared by the filter, the smoother and the M-step.

use crate::config::NumericPolicy;
use crate::error::{KalmanError, Result};
use crate::types::RealScalar;

/// Fails when fewer than `num` entries are available in a sequence named `name`.
pub(in crate) fn check_length(name: &str, len: usize, num: usize) -> Result<()> {
    if len < num {
        return Err(KalmanError::InvalidArgument(format!(
            "{} has {} entries, expected at least {}",
            name, len, num
        )));
    }
    Ok(())
}

/// Fails when `num` is below the minimal sequence length `min` of an operation.
pub(in crate) fn check_minimum_length(operation: &str, num: usize, min: usize) -> Result<()> {
    if num < min {
        return Err(KalmanError::InvalidArgument(format!(
            "{} needs num >= {}, got {}",
            operation, min, num
        )));
    }
    Ok(())
}

/// Fails on an exactly zero `denominator` under the strict policy.
pub(in crate) fn check_denominator<T: RealScalar>(
    denominator: T,
    policy: NumericPolicy,
    quantity: &'static str,
    index: usize,
) -> Result<()> {
    if policy.is_strict() && denominator == T::zero() {
        return Err(KalmanError::ZeroDenominator { quantity, index });
    }
    Ok(())
}

/// Division which reports an exactly zero denominator under the strict policy.
pub(in crate) fn divide<T: RealScalar>(
    numerator: T,
    denominator: T,
    policy: NumericPolicy,
    quantity: &'static str,
    index: usize,
) -> Result<T> {
    check_denominator(denominator, policy, quantity, index)?;
    Ok(numerator / denominator)
}

/// Passes `value` through, unless it is NaN or infinite under the strict policy.
pub(in crate) fn ensure_finite<T: RealScalar>(
    value: T,
    policy: NumericPolicy,
    quantity: &'static str,
    index: usize,
) -> Result<T> {
    if policy.is_strict() && !value.is_finite_real() {
        return Err(KalmanError::NonFinite { quantity, index });
    }
    Ok(value)
}
