//! Simulation configuration.

use std::fmt::{self, Display};

use bon::bon;

use crate::{error::ConfigurationError, policy::OccupancyBasis};

/// Which policies newly generated customers follow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CustomerMix {
    /// Every customer joins. No balking cost applies.
    #[default]
    Unconditional,

    /// Every customer is selfish, with the given value of service.
    Selfish {
        /// The value of service, in time units.
        balking_cost: f64,
    },

    /// Each customer is independently selfish with probability `selfish_proportion`, and
    /// socially optimal otherwise.
    Mixed {
        /// The value of service, in time units.
        balking_cost: f64,
        /// Probability that a customer is selfish.
        selfish_proportion: f64,
    },
}

impl CustomerMix {
    /// Build a mix from an optional balking cost and an optional selfish proportion.
    ///
    /// No cost means every customer joins. A cost alone makes every customer selfish. A cost
    /// with a proportion mixes selfish and socially optimal customers.
    pub fn from_parts(balking_cost: Option<f64>, selfish_proportion: Option<f64>) -> Self {
        match (balking_cost, selfish_proportion) {
            (None, _) => Self::Unconditional,
            (Some(balking_cost), None) => Self::Selfish { balking_cost },
            (Some(balking_cost), Some(selfish_proportion)) => Self::Mixed {
                balking_cost,
                selfish_proportion,
            },
        }
    }

    /// The value of service, if customers may balk.
    pub fn balking_cost(&self) -> Option<f64> {
        match self {
            Self::Unconditional => None,
            Self::Selfish { balking_cost } | Self::Mixed { balking_cost, .. } => {
                Some(*balking_cost)
            }
        }
    }

    /// Does this mix contain both selfish and socially optimal customers?
    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Mixed { .. })
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(cost) = self.balking_cost() {
            positive("balking cost", cost)?;
        }
        if let Self::Mixed {
            selfish_proportion, ..
        } = self
        {
            if !(0.0..=1.0).contains(selfish_proportion) {
                return Err(ConfigurationError::ProportionOutOfRange(*selfish_proportion));
            }
        }
        Ok(())
    }
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct SimulationConfig {
    /// Mean arrivals per unit time (lambda).
    pub arrival_rate: f64,
    /// Mean services per unit time (mu).
    pub service_rate: f64,
    /// Arrivals stop at this instant.
    pub horizon: f64,
    /// Which policies customers follow.
    pub mix: CustomerMix,
    /// What selfish customers count ahead of themselves.
    pub selfish_basis: OccupancyBasis,
    /// Time between samples of the queue.
    pub sample_interval: f64,
    /// Seed for reproducibility. Drawn from the OS when absent.
    pub seed: Option<u64>,
}

#[bon]
impl SimulationConfig {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Mean arrivals per unit time (lambda).
        arrival_rate: f64,
        /// Mean services per unit time (mu).
        service_rate: f64,
        /// Arrivals stop at this instant.
        horizon: f64,
        /// Which policies customers follow.
        #[builder(default)]
        mix: CustomerMix,
        /// What selfish customers count ahead of themselves.
        #[builder(default)]
        selfish_basis: OccupancyBasis,
        /// Time between samples of the queue.
        #[builder(default = 1.0)]
        sample_interval: f64,
        /// Seed for reproducibility.
        seed: Option<u64>,
    ) -> Self {
        Self {
            arrival_rate,
            service_rate,
            horizon,
            mix,
            selfish_basis,
            sample_interval,
            seed,
        }
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("arrival rate", self.arrival_rate)?;
        positive("service rate", self.service_rate)?;
        positive("horizon", self.horizon)?;
        positive("sample interval", self.sample_interval)?;
        self.mix.validate()
    }

    /// Traffic intensity, `lambda / mu`.
    pub fn traffic_intensity(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NotPositive { parameter, value })
    }
}

impl Display for CustomerMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerMix::Unconditional => write!(f, "Unconditional"),
            CustomerMix::Selfish { balking_cost } => write!(f, "Selfish(cost: {})", balking_cost),
            CustomerMix::Mixed {
                balking_cost,
                selfish_proportion,
            } => write!(
                f,
                "Mixed(cost: {}, selfish: {:.0}%)",
                balking_cost,
                selfish_proportion * 100.0
            ),
        }
    }
}

impl Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lambda: {}, mu: {}, horizon: {}, mix: {}",
            self.arrival_rate, self.service_rate, self.horizon, self.mix
        )
    }
}
