//! Traits representing the filtering algorithms

use crate::types::RealScalar;

/// Filtering algorithm trait
///
/// This trait indicates that implementor is a representation of a filtering algorithm, and
/// that it performs filtering operations on scalar states of type `T: RealScalar`.
/// Filtering algorithms are split into prediction and update steps, which the sequence
/// drivers alternate once per observation.
pub trait Filter<T: RealScalar> {
    /// Result of prediction operation executed on a state estimate
    type Prediction;
    /// Result of update operation executed on a prediction
    type Update;

    /// Prediction operation executed by filtering algorithm.
    ///
    /// Propagates the estimate of the previous time step, given by its `mean` and `variance`,
    /// one step forward through the state dynamics.
    fn predict(&self, mean: T, variance: T) -> Self::Prediction;

    /// Update operation executed by filtering algorithm.
    ///
    /// Corrects a prediction with the `measurement` taken at the predicted time step.
    fn update(&self, prediction: &Self::Prediction, measurement: T) -> Self::Update;
}
