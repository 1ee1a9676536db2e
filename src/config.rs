//! Configuration of how the recursions treat degenerate arithmetic.

/// Treatment of zero denominators and non-finite intermediate results.
///
/// The recursions themselves are identical under both policies; the policy only decides
/// whether the result of a degenerate step is reported as an error or handed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Fail with [`KalmanError::ZeroDenominator`](crate::KalmanError::ZeroDenominator) or
    /// [`KalmanError::NonFinite`](crate::KalmanError::NonFinite) at the first degenerate step.
    Strict,
    /// Let infinities and NaNs propagate through the remaining computation.
    Permissive,
}

impl NumericPolicy {
    pub fn is_strict(self) -> bool {
        self == NumericPolicy::Strict
    }
}

impl Default for NumericPolicy {
    fn default() -> Self {
        NumericPolicy::Strict
    }
}
