//! Expectation-Maximization estimation of the scalar model parameters.
//!
//! Each iteration runs one filter and smoother pass under the current parameters (E-step) and
//! re-estimates the parameters in closed form from the smoothed moments (M-step). The
//! process-noise variance `q` is treated as known: it is carried through every iteration
//! unchanged.
use crate::config::NumericPolicy;
use crate::error::Result;
use crate::filter::kalman_common::*;
use crate::filter::ScalarKalmanFilter;
use crate::smoother::{RtsSmoother, SmootherOutput};
use crate::types::{ModelParameters, RealScalar};
use log::{debug, warn};
use ndarray::{s, Array1, ArrayBase, Data, Ix1};

/// Closed-form M-step.
///
/// Re-estimates the parameters from the observations `y` and the smoothed moments of an
/// E-step pass:
///
/// ```text
/// c  = sum(y[t] * x_s[t]) / sum(P[t])
/// r  = sum(y[t]^2 - c * x_s[t] * y[t]) / num
/// a  = sum(PP[t], t < num - 1) / sum(P[t], t < num - 1)
/// x0 = x_s[0]
/// v0 = P[0] - x_s[0]^2
/// ```
///
/// `r` is computed from the re-estimated `c`, not from the one the E-step ran with. `q` is
/// returned as given. Only the first `num` entries of `second_moments` and the first
/// `num - 1` entries of `lag_one_second_moments` are read, `num` being the number of smoothed
/// means.
///
/// Every estimate aggregates over the whole sequence, so errors raised here report index 0,
/// except for `v0`, which depends on time step 0 alone.
pub fn maximize<T, S>(
    y: &ArrayBase<S, Ix1>,
    smoothed: &SmootherOutput<T>,
    q: T,
    policy: NumericPolicy,
) -> Result<ModelParameters<T>>
where
    T: RealScalar,
    S: Data<Elem = T>,
{
    let num = smoothed.len();
    check_minimum_length("M-step", num, 2)?;
    check_length("observations", y.len(), num)?;
    check_length("lag-one second moments", smoothed.lag_one_second_moments.len(), num - 1)?;
    check_length("second moments", smoothed.second_moments.len(), num)?;

    let y = y.slice(s![..num]);
    let x_s = &smoothed.smoothed_means;
    let p = smoothed.second_moments.slice(s![..num]);
    let pp = smoothed.lag_one_second_moments.slice(s![..num - 1]);

    let cross = y
        .iter()
        .zip(x_s.iter())
        .fold(T::zero(), |acc, (&y_t, &x_t)| acc + y_t * x_t);
    let total = ensure_finite(p.sum(), policy, "sum of second moments", 0)?;
    let c = divide(cross, total, policy, "sum of second moments", 0)?;
    let c = ensure_finite(c, policy, "observation coefficient", 0)?;

    let residual = y
        .iter()
        .zip(x_s.iter())
        .fold(T::zero(), |acc, (&y_t, &x_t)| acc + (y_t * y_t - c * x_t * y_t));
    let r = divide(residual, T::from_len(num), policy, "number of observations", 0)?;
    let r = ensure_finite(r, policy, "observation variance", 0)?;

    let lagged = ensure_finite(pp.sum(), policy, "sum of lag-one second moments", 0)?;
    let leading = ensure_finite(
        p.slice(s![..num - 1]).sum(),
        policy,
        "sum of leading second moments",
        0,
    )?;
    let a = divide(lagged, leading, policy, "sum of leading second moments", 0)?;
    let a = ensure_finite(a, policy, "transition coefficient", 0)?;

    let x0 = x_s[0];
    let v0 = ensure_finite(p[0] - x0 * x0, policy, "initial variance", 0)?;

    Ok(ModelParameters { x0, v0, a, c, q, r })
}

/// Infinite sequence of EM parameter estimates.
///
/// Obtained from [`learn`]. Every call to [`Learner::step`], or to `next` of the
/// [`Iterator`] implementation, performs exactly one filter pass, one smoother pass and one
/// M-step, and nothing is computed ahead of the caller's request. The sequence never ends on
/// its own; deciding when to stop is up to the caller.
///
/// Learners do not share state: two learners created with the same observations and initial
/// parameters produce the same sequence regardless of how far either has been advanced.
#[derive(Debug, Clone)]
pub struct Learner<T: RealScalar> {
    observations: Array1<T>,
    current: ModelParameters<T>,
    policy: NumericPolicy,
    iteration: usize,
    last_log_likelihood: Option<T>,
    failed: bool,
}

impl<T: RealScalar> Learner<T> {
    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    /// Parameters the next iteration starts from
    pub fn current(&self) -> &ModelParameters<T> {
        &self.current
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Log-likelihood of the observations under the parameters the last completed iteration
    /// started from; `None` before the first iteration.
    pub fn last_log_likelihood(&self) -> Option<T> {
        self.last_log_likelihood
    }

    /// Runs one EM iteration and returns the re-estimated parameters.
    ///
    /// On error the current parameters are left untouched.
    pub fn step(&mut self) -> Result<ModelParameters<T>> {
        let params = self.current;
        let num = self.observations.len();

        let filtered = ScalarKalmanFilter::from_parameters(&params)
            .with_policy(self.policy)
            .filter(&self.observations, num, params.x0, params.v0)?;
        let seed = filtered.lag_one_seed(params.c, params.a)?;
        let smoothed = RtsSmoother::from_parameters(&params)
            .with_policy(self.policy)
            .smooth(&filtered, seed)?;
        let next = maximize(&self.observations, &smoothed, params.q, self.policy)?;

        self.iteration += 1;
        self.last_log_likelihood = Some(filtered.log_likelihood);
        self.current = next;
        debug!(
            "EM iteration {}: log-likelihood {:?}, parameters {:?}",
            self.iteration, filtered.log_likelihood, next
        );
        Ok(next)
    }
}

impl<T: RealScalar> Iterator for Learner<T> {
    type Item = Result<ModelParameters<T>>;

    /// Yields the next parameter estimate. After an iteration fails its error is yielded once
    /// and the iterator is exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(params) => Some(Ok(params)),
            Err(err) => {
                warn!("EM iteration {} failed: {}", self.iteration + 1, err);
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Starts EM learning on the first `num` entries of `y` from the parameters `initial`.
///
/// The returned learner uses the strict numeric policy. No computation happens until the
/// first estimate is requested.
///
/// Fails with [`KalmanError::InvalidArgument`](crate::KalmanError::InvalidArgument) if
/// `num < 2` or `y` has fewer than `num` entries.
pub fn learn<T, S>(
    y: &ArrayBase<S, Ix1>,
    num: usize,
    initial: ModelParameters<T>,
) -> Result<Learner<T>>
where
    T: RealScalar,
    S: Data<Elem = T>,
{
    check_minimum_length("EM learner", num, 2)?;
    check_length("observations", y.len(), num)?;
    Ok(Learner {
        observations: y.slice(s![..num]).to_owned(),
        current: initial,
        policy: NumericPolicy::default(),
        iteration: 0,
        last_log_likelihood: None,
        failed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KalmanError;
    use crate::simulate::simulate;
    use ndarray::arr1;

    fn close(lhs: f64, rhs: f64, tolerance: f64) -> bool {
        (lhs - rhs).abs() <= tolerance * rhs.abs().max(1.0)
    }

    fn smoothed_fixture() -> SmootherOutput<f64> {
        SmootherOutput {
            smoothed_means: arr1(&[1.0, 1.0]),
            smoothed_variances: arr1(&[1.0, 1.0]),
            gains: arr1(&[0.5]),
            second_moments: arr1(&[2.0, 2.0]),
            lag_one_covariances: arr1(&[0.5]),
            lag_one_second_moments: arr1(&[1.5]),
        }
    }

    #[test]
    fn observation_variance_uses_reestimated_coefficient() {
        let y = arr1(&[1.0, 2.0]);
        let previous_c = 5.0;
        let params = maximize(&y, &smoothed_fixture(), 0.25, NumericPolicy::Strict).unwrap();

        // c = (1 * 1 + 2 * 1) / (2 + 2)
        assert_eq!(params.c, 0.75);
        // ((1 - 0.75 * 1 * 1) + (4 - 0.75 * 1 * 2)) / 2
        assert!(close(params.r, 1.375, 1e-12));
        let with_previous_c = ((1.0 - previous_c * 1.0) + (4.0 - previous_c * 2.0)) / 2.0;
        assert!(!close(params.r, with_previous_c, 1e-3));
    }

    #[test]
    fn remaining_estimates_of_m_step() {
        let y = arr1(&[1.0, 2.0]);
        let params = maximize(&y, &smoothed_fixture(), 0.25, NumericPolicy::Strict).unwrap();
        assert_eq!(params.a, 1.5 / 2.0);
        assert_eq!(params.x0, 1.0);
        assert_eq!(params.v0, 1.0);
        assert_eq!(params.q, 0.25);
    }

    #[test]
    fn zero_second_moments_fail_when_strict() {
        let mut smoothed = smoothed_fixture();
        smoothed.second_moments = arr1(&[0.0, 0.0]);
        let y = arr1(&[1.0, 2.0]);
        assert_eq!(
            maximize(&y, &smoothed, 0.25, NumericPolicy::Strict),
            Err(KalmanError::ZeroDenominator {
                quantity: "sum of second moments",
                index: 0
            })
        );
        let permissive = maximize(&y, &smoothed, 0.25, NumericPolicy::Permissive).unwrap();
        assert!(permissive.c.is_infinite());
    }

    #[test]
    fn zero_leading_second_moments_fail_when_strict() {
        let mut smoothed = smoothed_fixture();
        smoothed.second_moments = arr1(&[0.0, 2.0]);
        let y = arr1(&[1.0, 2.0]);
        assert_eq!(
            maximize(&y, &smoothed, 0.25, NumericPolicy::Strict),
            Err(KalmanError::ZeroDenominator {
                quantity: "sum of leading second moments",
                index: 0
            })
        );
        let permissive = maximize(&y, &smoothed, 0.25, NumericPolicy::Permissive).unwrap();
        assert!(permissive.a.is_infinite());
        assert_eq!(permissive.c, 1.5);
    }

    #[test]
    fn overflowing_observation_variance_fails_when_strict() {
        // y^2 overflows, so the residual sum is inf - inf.
        let y = arr1(&[1e200, 1e200]);
        assert_eq!(
            maximize(&y, &smoothed_fixture(), 0.25, NumericPolicy::Strict),
            Err(KalmanError::NonFinite {
                quantity: "observation variance",
                index: 0
            })
        );
        let permissive =
            maximize(&y, &smoothed_fixture(), 0.25, NumericPolicy::Permissive).unwrap();
        assert!(permissive.r.is_nan());
        assert!(permissive.c.is_finite());
    }

    #[test]
    fn infinite_second_moment_is_not_divided_away_when_strict() {
        let x = arr1(&[0.0f64, 1e200]);
        let unit = arr1(&[1.0, 1.0]);
        let smoothed = RtsSmoother::new(1.0)
            .with_policy(NumericPolicy::Permissive)
            .smooth_sequences(2, &x, &unit, &x, &unit, 0.0)
            .unwrap();
        let y = arr1(&[0.0, 1.0]);
        assert_eq!(
            maximize(&y, &smoothed, 0.1, NumericPolicy::Strict),
            Err(KalmanError::NonFinite {
                quantity: "sum of second moments",
                index: 0
            })
        );
        let permissive = maximize(&y, &smoothed, 0.1, NumericPolicy::Permissive).unwrap();
        assert_eq!(permissive.c, 0.0);
    }

    #[test]
    fn entries_beyond_num_are_ignored() {
        let y = arr1(&[1.0, 2.0]);
        let expected = maximize(&y, &smoothed_fixture(), 0.25, NumericPolicy::Strict).unwrap();

        let mut padded = smoothed_fixture();
        padded.second_moments = arr1(&[2.0, 2.0, 100.0]);
        padded.lag_one_second_moments = arr1(&[1.5, 40.0]);
        let params = maximize(&y, &padded, 0.25, NumericPolicy::Strict).unwrap();
        assert_eq!(params, expected);
        assert_eq!(params.c, 0.75);
    }

    #[test]
    fn learner_needs_two_observations() {
        let params = ModelParameters::new(0.0, 1.0, 1.0, 1.0, 0.1, 1.0);
        assert!(matches!(
            learn(&arr1(&[1.0]), 1, params),
            Err(KalmanError::InvalidArgument(_))
        ));
        assert!(matches!(
            learn(&arr1(&[1.0, 2.0]), 3, params),
            Err(KalmanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn first_estimate_is_one_filter_smoother_and_m_step() {
        let y = arr1(&[0.4, 1.1, 0.7, 1.6, 1.2]);
        let initial = ModelParameters::new(0.0, 1.0, 0.8, 1.2, 0.5, 0.9);
        let mut learner = learn(&y, 5, initial).unwrap();
        assert_eq!(learner.iteration(), 0);
        assert_eq!(learner.last_log_likelihood(), None);

        let filtered = crate::filter::filter(&y, 5, &initial).unwrap();
        let seed = filtered.lag_one_seed(initial.c, initial.a).unwrap();
        let smoothed = RtsSmoother::new(initial.a).smooth(&filtered, seed).unwrap();
        let expected = maximize(&y, &smoothed, initial.q, NumericPolicy::Strict).unwrap();

        assert_eq!(learner.next(), Some(Ok(expected)));
        assert_eq!(learner.iteration(), 1);
        assert_eq!(learner.current(), &expected);
        assert_eq!(learner.last_log_likelihood(), Some(filtered.log_likelihood));
    }

    #[test]
    fn process_noise_variance_is_never_reestimated() {
        let y = arr1(&[0.4, 1.1, 0.7, 1.6, 1.2, 0.9]);
        let initial = ModelParameters::new(0.0, 1.0, 0.8, 1.2, 0.37, 0.9);
        let learner = learn(&y, 6, initial).unwrap();
        for params in learner.take(10) {
            assert_eq!(params.unwrap().q, 0.37);
        }
    }

    #[test]
    fn independent_learners_are_deterministic() {
        let y = arr1(&[0.3, -0.1, 0.8, 1.4, 0.9, 0.2, -0.4]);
        let initial = ModelParameters::new(0.0, 1.0, 0.5, 1.0, 0.2, 0.6);
        let mut first = learn(&y, 7, initial).unwrap();
        let second = learn(&y, 7, initial).unwrap();

        let advanced: Vec<_> = first.by_ref().take(5).collect();
        let fresh: Vec<_> = second.take(5).collect();
        assert_eq!(advanced, fresh);

        let third = learn(&y, 7, initial).unwrap();
        assert_eq!(third.clone().next(), fresh.first().cloned());
        assert_eq!(first.iteration(), 5);
    }

    #[test]
    fn estimates_stabilize_on_synthetic_data() {
        let truth = ModelParameters::new(0.0, 1.0, 0.8, 1.0, 0.5, 0.3);
        let simulation = simulate(&truth, 400, 7).unwrap();
        let initial = ModelParameters::new(0.0, 1.0, 0.5, 0.7, truth.q, 1.0);
        let mut learner = learn(&simulation.observations, 400, initial).unwrap();

        let mut estimates = Vec::new();
        for _ in 0..50 {
            let params = learner.step().unwrap();
            assert!(params.is_finite(), "diverged: {:?}", params);
            estimates.push(params);
        }

        let last = estimates[49];
        assert!(last.a.abs() < 1.5, "a = {}", last.a);
        assert!(last.c.abs() < 5.0, "c = {}", last.c);
        assert!(last.r > 0.0 && last.r < 5.0, "r = {}", last.r);
        assert!(last.v0 >= 0.0);

        let previous = estimates[48];
        assert!((last.a - previous.a).abs() < 0.05);
        assert!((last.c - previous.c).abs() < 0.05);
        assert!((last.r - previous.r).abs() < 0.05);
    }

    #[test]
    fn failing_iteration_ends_the_sequence() {
        // A zero observation variance together with a zero prior variance leaves nothing to
        // divide by in the first gain.
        let y = arr1(&[1.0, 1.0, 1.0]);
        let initial = ModelParameters::new(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        let mut learner = learn(&y, 3, initial).unwrap();
        assert!(matches!(
            learner.next(),
            Some(Err(KalmanError::ZeroDenominator { .. }))
        ));
        assert_eq!(learner.next(), None);
        assert_eq!(learner.current(), &initial);
        assert_eq!(learner.iteration(), 0);
    }

    #[test]
    fn permissive_learner_keeps_yielding() {
        let y = arr1(&[1.0, 1.0, 1.0]);
        let initial = ModelParameters::new(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        let learner = learn(&y, 3, initial)
            .unwrap()
            .with_policy(NumericPolicy::Permissive);
        let estimates: Vec<_> = learner.take(3).collect();
        assert_eq!(estimates.len(), 3);
        assert!(estimates.iter().all(|e| e.is_ok()));
        assert!(!estimates[0].as_ref().unwrap().is_finite());
    }
}
