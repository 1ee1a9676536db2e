//! Simulation of the scalar state-space model.
//!
//! Draws a latent trajectory and the corresponding observations:
//! - `x[-1] ~ N(x0, v0)`
//! - `x[t] = a * x[t-1] + w`, `w ~ N(0, q)`
//! - `y[t] = c * x[t] + e`, `e ~ N(0, r)`

use crate::error::{KalmanError, Result};
use crate::types::ModelParameters;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Simulated trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    /// Latent states `x`
    pub states: Array1<f64>,
    /// Observations `y`
    pub observations: Array1<f64>,
}

fn normal(mean: f64, variance: f64, name: &str) -> Result<Normal<f64>> {
    if !variance.is_finite() || variance < 0.0 {
        return Err(KalmanError::InvalidArgument(format!(
            "{} must be finite and >= 0, got {}",
            name, variance
        )));
    }
    Normal::new(mean, variance.sqrt())
        .map_err(|e| KalmanError::InvalidArgument(format!("{}: {}", name, e)))
}

/// Simulates `num` steps of the model `params`, seeded with `seed`.
///
/// The same seed always yields the same trajectory.
pub fn simulate(params: &ModelParameters<f64>, num: usize, seed: u64) -> Result<Simulation> {
    if num == 0 {
        return Err(KalmanError::InvalidArgument("num must be > 0".to_string()));
    }
    if !params.is_finite() {
        return Err(KalmanError::InvalidArgument(
            "model parameters must be finite".to_string(),
        ));
    }

    let prior = normal(params.x0, params.v0, "v0")?;
    let process_noise = normal(0.0, params.q, "q")?;
    let observation_noise = normal(0.0, params.r, "r")?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut states = Array1::zeros(num);
    let mut observations = Array1::zeros(num);
    let mut x = prior.sample(&mut rng);
    for t in 0..num {
        x = params.a * x + process_noise.sample(&mut rng);
        states[t] = x;
        observations[t] = params.c * x + observation_noise.sample(&mut rng);
    }

    Ok(Simulation {
        states,
        observations,
    })
}
