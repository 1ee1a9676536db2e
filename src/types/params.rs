use super::RealScalar;

/// Parameters of the scalar linear-Gaussian state-space model
///
/// State:
/// `x[t] = a * x[t-1] + w`, `w ~ N(0, q)`
///
/// Observation:
/// `y[t] = c * x[t] + e`, `e ~ N(0, r)`
///
/// Prior of the state preceding the first observation:
/// `x[-1] ~ N(x0, v0)`
///
/// The learner consumes one value of this type per iteration and produces the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters<T: RealScalar> {
    /// Prior mean of the initial state
    pub x0: T,
    /// Prior variance of the initial state
    pub v0: T,
    /// State transition coefficient
    pub a: T,
    /// Observation coefficient
    pub c: T,
    /// Process-noise variance
    pub q: T,
    /// Observation-noise variance
    pub r: T,
}

impl<T: RealScalar> ModelParameters<T> {
    pub fn new(x0: T, v0: T, a: T, c: T, q: T, r: T) -> Self {
        ModelParameters { x0, v0, a, c, q, r }
    }

    /// Parameters in the order `(x0, v0, a, c, q, r)`
    pub fn as_tuple(&self) -> (T, T, T, T, T, T) {
        (self.x0, self.v0, self.a, self.c, self.q, self.r)
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite_real()
            && self.v0.is_finite_real()
            && self.a.is_finite_real()
            && self.c.is_finite_real()
            && self.q.is_finite_real()
            && self.r.is_finite_real()
    }
}

impl<T: RealScalar> From<(T, T, T, T, T, T)> for ModelParameters<T> {
    fn from((x0, v0, a, c, q, r): (T, T, T, T, T, T)) -> Self {
        ModelParameters::new(x0, v0, a, c, q, r)
    }
}
