//! This module contains the implementation of the scalar Kalman filter, the forward recursion
//! of the crate.
use super::filter_traits::Filter;
use super::kalman_common::*;
use crate::config::NumericPolicy;
use crate::error::Result;
use crate::types::{ModelParameters, RealScalar};
use log::debug;
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Mean and variance of the state at a single time step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate<T: RealScalar> {
    pub mean: T,
    pub variance: T,
}

/// Result of correcting a prediction with one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction<T: RealScalar> {
    /// Filtered (posterior) estimate
    pub estimate: Estimate<T>,
    /// Kalman gain used for the correction
    pub gain: T,
    /// Measurement minus the predicted measurement
    pub innovation: T,
    /// Variance of the innovation, `c * v_p * c + r`
    pub innovation_variance: T,
}

/// Output of a forward pass over an observation sequence.
///
/// All sequences have one entry per observation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput<T: RealScalar> {
    /// One-step-ahead predicted means `x_p`
    pub predicted_means: Array1<T>,
    /// One-step-ahead predicted variances `v_p`
    pub predicted_variances: Array1<T>,
    /// Filtered means `x_f`
    pub filtered_means: Array1<T>,
    /// Filtered variances `v_f`
    pub filtered_variances: Array1<T>,
    /// Kalman gain of the last time step, `K_T`.
    ///
    /// Gains of earlier steps are not retained: the only consumer of the gain is the seed of
    /// the smoother's lag-one recursion, which needs the final one.
    pub final_gain: T,
    /// Gaussian log-likelihood of the observations, accumulated from the innovations
    pub log_likelihood: T,
}

impl<T: RealScalar> FilterOutput<T> {
    /// Number of filtered time steps
    pub fn len(&self) -> usize {
        self.filtered_means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_means.is_empty()
    }

    /// Lag-one covariance of the last two time steps, `(1 - K_T * c) * a * v_f[num - 2]`.
    ///
    /// This is the seed of the smoother's lag-one recursion. It needs at least two filtered
    /// time steps.
    pub fn lag_one_seed(&self, observation: T, transition: T) -> Result<T> {
        let num = self.len();
        check_minimum_length("lag-one seed", num, 2)?;
        Ok((T::one() - self.final_gain * observation)
            * transition
            * self.filtered_variances[num - 2])
    }
}

/// Scalar linear Kalman filtering algorithm
///
/// This type encapsulates the scalar Kalman filter. It depends on four numbers, the state
/// transition coefficient, the observation coefficient and the variances of the process and
/// observation noise. The prior of the state preceding the first observation is supplied per
/// call to [`ScalarKalmanFilter::filter`].
///
/// Degenerate arithmetic is treated according to the configured [`NumericPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKalmanFilter<T: RealScalar> {
    transition: T,
    observation: T,
    transition_variance: T,
    observation_variance: T,
    policy: NumericPolicy,
}

/// Implementation of filtering methods for the scalar Kalman filter
impl<T: RealScalar> Filter<T> for ScalarKalmanFilter<T> {
    type Prediction = Estimate<T>;
    type Update = Correction<T>;

    fn predict(&self, mean: T, variance: T) -> Estimate<T> {
        let a = self.transition;
        Estimate {
            mean: a * mean,
            variance: a * variance * a + self.transition_variance,
        }
    }

    fn update(&self, prediction: &Estimate<T>, measurement: T) -> Correction<T> {
        let c = self.observation;
        let innovation_variance = c * prediction.variance * c + self.observation_variance;
        let gain = prediction.variance * c / innovation_variance;
        let innovation = measurement - c * prediction.mean;
        Correction {
            estimate: Estimate {
                mean: prediction.mean + gain * innovation,
                variance: prediction.variance - gain * c * prediction.variance,
            },
            gain,
            innovation,
            innovation_variance,
        }
    }
}

impl<T: RealScalar> ScalarKalmanFilter<T> {
    /// Creates new scalar Kalman filter with the strict numeric policy
    ///
    /// * `transition` - state transition coefficient `a`
    /// * `observation` - observation coefficient `c`
    /// * `transition_variance` - process-noise variance `q`
    /// * `observation_variance` - observation-noise variance `r`
    pub fn new(
        transition: T,
        observation: T,
        transition_variance: T,
        observation_variance: T,
    ) -> Self {
        ScalarKalmanFilter {
            transition,
            observation,
            transition_variance,
            observation_variance,
            policy: NumericPolicy::default(),
        }
    }

    /// Creates a filter from the `a`, `c`, `q` and `r` entries of `params`
    pub fn from_parameters(params: &ModelParameters<T>) -> Self {
        ScalarKalmanFilter::new(params.a, params.c, params.q, params.r)
    }

    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    /// Runs the forward recursion over the first `num` entries of `observations`.
    ///
    /// `prior_mean` and `prior_variance` describe the state preceding the first observation.
    /// The recursion is applied to this prior for the first time step and to the previous
    /// filtered estimate for every later one.
    ///
    /// Fails with [`KalmanError::InvalidArgument`](crate::KalmanError::InvalidArgument) if
    /// `num` is zero or exceeds the number of observations.
    pub fn filter<S: Data<Elem = T>>(
        &self,
        observations: &ArrayBase<S, Ix1>,
        num: usize,
        prior_mean: T,
        prior_variance: T,
    ) -> Result<FilterOutput<T>> {
        check_minimum_length("Kalman filter", num, 1)?;
        check_length("observations", observations.len(), num)?;

        let mut predicted_means = Array1::zeros(num);
        let mut predicted_variances = Array1::zeros(num);
        let mut filtered_means = Array1::zeros(num);
        let mut filtered_variances = Array1::zeros(num);

        let half = T::one() / (T::one() + T::one());
        let mut mean = prior_mean;
        let mut variance = prior_variance;
        let mut final_gain = T::zero();
        let mut log_likelihood = T::zero();

        for (t, &measurement) in observations.iter().take(num).enumerate() {
            let prediction = self.predict(mean, variance);
            let correction = self.update(&prediction, measurement);
            let s = correction.innovation_variance;
            check_denominator(s, self.policy, "innovation variance", t)?;

            predicted_means[t] = ensure_finite(prediction.mean, self.policy, "predicted mean", t)?;
            predicted_variances[t] =
                ensure_finite(prediction.variance, self.policy, "predicted variance", t)?;
            mean = ensure_finite(correction.estimate.mean, self.policy, "filtered mean", t)?;
            variance = ensure_finite(
                correction.estimate.variance,
                self.policy,
                "filtered variance",
                t,
            )?;
            filtered_means[t] = mean;
            filtered_variances[t] = variance;

            final_gain = correction.gain;
            let innovation = correction.innovation;
            log_likelihood -= half * (T::LN_2PI + s.ln_real() + innovation * innovation / s);
        }

        debug!(
            "Kalman filter pass over {} observations, final gain {:?}, log-likelihood {:?}",
            num, final_gain, log_likelihood
        );

        Ok(FilterOutput {
            predicted_means,
            predicted_variances,
            filtered_means,
            filtered_variances,
            final_gain,
            log_likelihood,
        })
    }
}

/// Runs the scalar Kalman filter with the strict numeric policy.
///
/// Filters the first `num` entries of `y` under the model described by `params`, starting
/// from the prior `(params.x0, params.v0)`.
pub fn filter<T, S>(
    y: &ArrayBase<S, Ix1>,
    num: usize,
    params: &ModelParameters<T>,
) -> Result<FilterOutput<T>>
where
    T: RealScalar,
    S: Data<Elem = T>,
{
    ScalarKalmanFilter::from_parameters(params).filter(y, num, params.x0, params.v0)
}
