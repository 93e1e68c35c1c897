//! Naor's socially optimal balking threshold for an M/M/1 queue.
//!
//! From Naor (1969), _The Regulation of Queue Size by Levying Tolls_. With traffic intensity
//! `rho = lambda / mu`, the threshold is the `n` for which
//!
//! ```text
//! f(n) <= mu * c < f(n + 1)
//! f(n)  = (n (1 - rho) - rho (1 - rho^n)) / (1 - rho)^2
//! ```
//!
//! where `c` is the value of service expressed in time units. `f` is strictly increasing in `n`
//! and `f(0) = 0`, so for any positive `c` the search terminates unless `mu * c` is enormous.

use crate::error::{DomainError, SimulationError, SimulationResult, ensure_positive};

/// Candidate thresholds examined before giving up.
pub const MAX_THRESHOLD_SEARCH: usize = 10_000;

/// Below this distance from critical load the closed form is replaced by its limit.
const CRITICAL_LOAD_TOLERANCE: f64 = 1e-6;

/// The expected discounted wait function `f(n)` for traffic intensity `rho`.
///
/// At `rho = 1` the closed form divides by zero. There we use its limit, `n (n + 1) / 2`.
pub fn discounted_wait(n: usize, rho: f64) -> f64 {
    let n_f = n as f64;
    let one_minus_rho = 1.0 - rho;

    if one_minus_rho.abs() < CRITICAL_LOAD_TOLERANCE {
        return n_f * (n_f + 1.0) / 2.0;
    }

    (n_f * one_minus_rho - rho * (1.0 - rho.powf(n_f))) / one_minus_rho.powi(2)
}

/// Compute the Naor threshold for arrival rate `lambda`, service rate `mu` and balking cost `c`.
///
/// Socially optimal customers join if and only if fewer than this many customers are in the
/// system.
pub fn naor_threshold(lambda: f64, mu: f64, balking_cost: f64) -> SimulationResult<usize> {
    let lambda = ensure_positive("arrival rate", lambda)?;
    let mu = ensure_positive("service rate", mu)?;
    let balking_cost = ensure_positive("balking cost", balking_cost)?;

    let centre = mu * balking_cost;
    let rho = lambda / mu;

    let mut lower = discounted_wait(0, rho);
    for n in 0..MAX_THRESHOLD_SEARCH {
        let upper = discounted_wait(n + 1, rho);
        if upper.is_nan() {
            return Err(DomainError::Undefined { n: n + 1, rho }.into());
        }

        if lower <= centre && centre < upper {
            return Ok(n);
        }
        lower = upper;
    }

    Err(SimulationError::ThresholdNotFound {
        iterations: MAX_THRESHOLD_SEARCH,
    })
}
