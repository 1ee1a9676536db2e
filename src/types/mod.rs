//! Element type and parameter types shared by all algorithms of the crate.

mod params;
mod scalar;

pub use params::ModelParameters;
pub use scalar::RealScalar;
