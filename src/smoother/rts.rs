//! Rauch-Tung-Striebel fixed-interval smoother for the scalar model.
use crate::config::NumericPolicy;
use crate::error::Result;
use crate::filter::kalman_common::*;
use crate::filter::FilterOutput;
use crate::types::{ModelParameters, RealScalar};
use log::debug;
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Output of a backward pass.
///
/// `smoothed_means`, `smoothed_variances` and `second_moments` have one entry per time step.
/// `gains`, `lag_one_covariances` and `lag_one_second_moments` relate consecutive time steps
/// and have one entry less; entry `i` links time step `i` to time step `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherOutput<T: RealScalar> {
    /// Smoothed means `x_s`
    pub smoothed_means: Array1<T>,
    /// Smoothed variances `v_s`
    pub smoothed_variances: Array1<T>,
    /// Smoother gains `J`
    pub gains: Array1<T>,
    /// Second moments `P[t] = v_s[t] + x_s[t]^2`
    pub second_moments: Array1<T>,
    /// Lag-one covariances `vv[i] = Cov(x[i + 1], x[i] | y)`
    pub lag_one_covariances: Array1<T>,
    /// Lag-one second moments `PP[i] = vv[i] + x_s[i + 1] * x_s[i]`
    pub lag_one_second_moments: Array1<T>,
}

impl<T: RealScalar> SmootherOutput<T> {
    /// Number of smoothed time steps
    pub fn len(&self) -> usize {
        self.smoothed_means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smoothed_means.is_empty()
    }
}

/// Rauch-Tung-Striebel smoother
///
/// The smoother only depends on the state transition coefficient; everything else it needs is
/// part of the filter output it is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtsSmoother<T: RealScalar> {
    transition: T,
    policy: NumericPolicy,
}

impl<T: RealScalar> RtsSmoother<T> {
    /// Creates new smoother for the state transition coefficient `transition`, with the strict
    /// numeric policy
    pub fn new(transition: T) -> Self {
        RtsSmoother {
            transition,
            policy: NumericPolicy::default(),
        }
    }

    pub fn from_parameters(params: &ModelParameters<T>) -> Self {
        RtsSmoother::new(params.a)
    }

    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    /// Smooths a complete filter pass. `lag_one_seed` is usually obtained from
    /// [`FilterOutput::lag_one_seed`].
    pub fn smooth(&self, filtered: &FilterOutput<T>, lag_one_seed: T) -> Result<SmootherOutput<T>> {
        self.smooth_sequences(
            filtered.len(),
            &filtered.filtered_means,
            &filtered.filtered_variances,
            &filtered.predicted_means,
            &filtered.predicted_variances,
            lag_one_seed,
        )
    }

    /// Runs the backward recursions over the first `num` entries of the filtered and predicted
    /// sequences.
    ///
    /// The terminal smoothed estimate is a copy of the terminal filtered one. `lag_one_seed`
    /// is the lag-one covariance of the last two time steps, from which the lag-one
    /// recursion proceeds backwards.
    ///
    /// Fails with [`KalmanError::InvalidArgument`](crate::KalmanError::InvalidArgument) if
    /// `num < 2` or any sequence has fewer than `num` entries.
    pub fn smooth_sequences<A, B, C, D>(
        &self,
        num: usize,
        filtered_means: &ArrayBase<A, Ix1>,
        filtered_variances: &ArrayBase<B, Ix1>,
        predicted_means: &ArrayBase<C, Ix1>,
        predicted_variances: &ArrayBase<D, Ix1>,
        lag_one_seed: T,
    ) -> Result<SmootherOutput<T>>
    where
        A: Data<Elem = T>,
        B: Data<Elem = T>,
        C: Data<Elem = T>,
        D: Data<Elem = T>,
    {
        check_minimum_length("RTS smoother", num, 2)?;
        check_length("filtered means", filtered_means.len(), num)?;
        check_length("filtered variances", filtered_variances.len(), num)?;
        check_length("predicted means", predicted_means.len(), num)?;
        check_length("predicted variances", predicted_variances.len(), num)?;

        let a = self.transition;
        let policy = self.policy;
        let (x_f, v_f) = (filtered_means, filtered_variances);
        let (x_p, v_p) = (predicted_means, predicted_variances);

        let mut x_s = Array1::zeros(num);
        let mut v_s = Array1::zeros(num);
        let mut gains = Array1::zeros(num - 1);
        let mut second_moments = Array1::zeros(num);

        let last = num - 1;
        x_s[last] = x_f[last];
        v_s[last] = v_f[last];
        second_moments[last] = ensure_finite(
            v_s[last] + x_s[last] * x_s[last],
            policy,
            "second moment",
            last,
        )?;

        for t in (1..num).rev() {
            let j = divide(v_f[t - 1] * a, v_p[t], policy, "predicted variance", t)?;
            gains[t - 1] = j;
            x_s[t - 1] = ensure_finite(
                x_f[t - 1] + j * (x_s[t] - x_p[t]),
                policy,
                "smoothed mean",
                t - 1,
            )?;
            v_s[t - 1] = ensure_finite(
                v_f[t - 1] + j * (v_s[t] - v_p[t]) * j,
                policy,
                "smoothed variance",
                t - 1,
            )?;
            second_moments[t - 1] = ensure_finite(
                v_s[t - 1] + x_s[t - 1] * x_s[t - 1],
                policy,
                "second moment",
                t - 1,
            )?;
        }

        let mut vv = Array1::zeros(num - 1);
        let mut pp = Array1::zeros(num - 1);
        vv[num - 2] = ensure_finite(lag_one_seed, policy, "lag-one covariance", num - 2)?;
        pp[num - 2] = ensure_finite(
            vv[num - 2] + x_s[num - 1] * x_s[num - 2],
            policy,
            "lag-one second moment",
            num - 2,
        )?;

        for t in (2..num).rev() {
            let carried = gains[t - 1] * (vv[t - 1] - a * v_f[t - 1]) * gains[t - 2];
            vv[t - 2] = ensure_finite(
                v_f[t - 1] * gains[t - 2] + carried,
                policy,
                "lag-one covariance",
                t - 2,
            )?;
            pp[t - 2] = ensure_finite(
                vv[t - 2] + x_s[t - 1] * x_s[t - 2],
                policy,
                "lag-one second moment",
                t - 2,
            )?;
        }

        debug!(
            "RTS smoother pass over {} time steps, initial smoothed mean {:?}",
            num, x_s[0]
        );

        Ok(SmootherOutput {
            smoothed_means: x_s,
            smoothed_variances: v_s,
            gains,
            second_moments,
            lag_one_covariances: vv,
            lag_one_second_moments: pp,
        })
    }
}

/// Runs the RTS smoother with the strict numeric policy.
///
/// `x_f`, `v_f`, `x_p` and `v_p` are the filtered and predicted sequences of a filter pass
/// over `num` observations, `a` the state transition coefficient and `vv_t` the lag-one
/// covariance of the last two time steps.
pub fn smooth<T, A, B, C, D>(
    num: usize,
    x_f: &ArrayBase<A, Ix1>,
    v_f: &ArrayBase<B, Ix1>,
    x_p: &ArrayBase<C, Ix1>,
    v_p: &ArrayBase<D, Ix1>,
    a: T,
    vv_t: T,
) -> Result<SmootherOutput<T>>
where
    T: RealScalar,
    A: Data<Elem = T>,
    B: Data<Elem = T>,
    C: Data<Elem = T>,
    D: Data<Elem = T>,
{
    RtsSmoother::new(a).smooth_sequences(num, x_f, v_f, x_p, v_p, vv_t)
}
