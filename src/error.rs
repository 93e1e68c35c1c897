//! Errors.

use thiserror::Error;

/// An error that stopped a simulation from starting or completing.
///
/// None of these are transient: a failed run yields no statistics.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum SimulationError {
    /// The simulation was configured with invalid parameters.
    ///
    /// Raised before the run starts.
    #[error("Invalid simulation configuration")]
    Configuration(#[from] ConfigurationError),

    /// A rate or threshold computation was asked to work outside its domain.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The Naor threshold search gave up before bracketing `mu * c`.
    #[error("No Naor threshold found within {iterations} iterations")]
    ThresholdNotFound {
        /// The number of candidate thresholds examined.
        iterations: usize,
    },

    /// Tried to take a customer from an empty queue.
    ///
    /// Unrecoverable.
    #[error("Tried to take a customer from an empty queue")]
    EmptyQueue,

    /// Tried to start service while the server was occupied.
    ///
    /// Unrecoverable.
    #[error("Tried to start service while the server is busy")]
    ServerBusy,

    /// Tried to complete service while the server was free.
    ///
    /// Unrecoverable.
    #[error("Tried to complete service while the server is idle")]
    ServerIdle,

    /// A replication task panicked or was cancelled.
    #[error("Replication failed: {0}")]
    Replication(String),
}

/// A simulation parameter was out of range.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A rate, horizon, cost or interval must be finite and strictly positive.
    #[error("{parameter} must be finite and greater than zero, got {value}")]
    NotPositive {
        /// The name of the parameter.
        parameter: &'static str,
        /// The value given.
        value: f64,
    },

    /// The proportion of selfish customers must lie in `[0, 1]`.
    #[error("selfish proportion must be within [0, 1], got {0}")]
    ProportionOutOfRange(f64),

    /// The warm-up period must be finite and non-negative.
    #[error("warm-up must be finite and non-negative, got {0}")]
    InvalidWarmup(f64),

    /// At least one replication must be requested.
    #[error("at least one replication is required")]
    NoReplications,
}

/// A computation was asked to evaluate outside of its domain.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DomainError {
    /// A rate or cost must be finite and strictly positive.
    #[error("{parameter} must be finite and greater than zero, got {value}")]
    NotPositive {
        /// The name of the parameter.
        parameter: &'static str,
        /// The value given.
        value: f64,
    },

    /// The discounted wait function could not be evaluated.
    #[error("the discounted wait function is undefined at n = {n} for rho = {rho}")]
    Undefined {
        /// The candidate threshold.
        n: usize,
        /// The traffic intensity.
        rho: f64,
    },
}

/// Result type for simulation operations.
pub type SimulationResult<T> = std::result::Result<T, SimulationError>;

/// Check a value is finite and strictly positive.
pub(crate) fn ensure_positive(parameter: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DomainError::NotPositive { parameter, value })
    }
}
