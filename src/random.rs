//! Exponential sampling for inter-arrival and service times.

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Exp};

use crate::error::{DomainError, ensure_positive};

/// Source of randomness for one simulation run.
///
/// Inter-arrival and service times are independent draws from exponential distributions, so
/// arrivals form a Poisson process. Owns its generator, so two processes built from the same seed
/// produce the same sequence.
#[derive(Debug, Clone)]
pub struct RandomProcess {
    seed: u64,
    rng: StdRng,
}

impl RandomProcess {
    /// Create a new random process.
    ///
    /// # Arguments
    /// * `seed` - Optional seed for reproducibility. When absent one is drawn from the OS and can
    ///   be read back with [`RandomProcess::seed()`].
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| StdRng::from_os_rng().random());
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this process was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample the time until the next arrival, given arrival rate `lambda`.
    pub fn sample_inter_arrival(&mut self, lambda: f64) -> Result<f64, DomainError> {
        self.sample_exp("arrival rate", lambda)
    }

    /// Sample a service duration, given service rate `mu`.
    pub fn sample_service(&mut self, mu: f64) -> Result<f64, DomainError> {
        self.sample_exp("service rate", mu)
    }

    /// Sample uniformly from `[0, 1)`.
    pub fn sample_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn sample_exp(&mut self, parameter: &'static str, rate: f64) -> Result<f64, DomainError> {
        let rate = ensure_positive(parameter, rate)?;
        let dist = Exp::new(rate).map_err(|_| DomainError::NotPositive {
            parameter,
            value: rate,
        })?;
        Ok(dist.sample(&mut self.rng))
    }
}
