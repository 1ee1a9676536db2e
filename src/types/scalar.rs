use cauchy::Scalar;

/// Real-valued scalar on which the scalar state-space recursions operate.
///
/// Arithmetic, `zero` and `one` come from [`cauchy::Scalar`]. The remaining methods are the
/// real-only operations the recursions need and which a complex scalar cannot provide.
pub trait RealScalar: Scalar + PartialOrd {
    /// `ln(2 * pi)`, used by the Gaussian log-likelihood
    const LN_2PI: Self;

    /// Returns `false` for NaN and for positive or negative infinity
    fn is_finite_real(self) -> bool;

    /// Natural logarithm
    fn ln_real(self) -> Self;

    /// Sequence length as a scalar
    fn from_len(len: usize) -> Self;
}

impl RealScalar for f32 {
    const LN_2PI: f32 = 1.837_877_1;

    fn is_finite_real(self) -> bool {
        f32::is_finite(self)
    }

    fn ln_real(self) -> f32 {
        f32::ln(self)
    }

    fn from_len(len: usize) -> f32 {
        len as f32
    }
}

impl RealScalar for f64 {
    const LN_2PI: f64 = 1.837_877_066_409_345_3;

    fn is_finite_real(self) -> bool {
        f64::is_finite(self)
    }

    fn ln_real(self) -> f64 {
        f64::ln(self)
    }

    fn from_len(len: usize) -> f64 {
        len as f64
    }
}
