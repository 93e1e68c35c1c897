//! Independent replications of a simulation, run in parallel.
//!
//! Each replication owns its own engine and random process, seeded `base_seed + index`, and runs
//! on Tokio's blocking pool. Their summaries are reduced into a [`ReplicationReport`].

use tokio::task::JoinSet;
use tracing::{info, span, Level, Span};

use crate::{
    config::SimulationConfig,
    engine::Simulation,
    error::{ConfigurationError, SimulationError, SimulationResult},
    random::RandomProcess,
    stats::{validate_warmup, PolicySummary, Summary},
};

/// The spread of one metric across replications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Mean across replications.
    pub mean: f64,
    /// Sample standard deviation. `None` with fewer than two replications.
    pub std_dev: Option<f64>,
    /// Replications that produced a value.
    pub samples: usize,
}

impl Estimate {
    /// Estimate from per-replication values, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = (values.len() > 1).then(|| {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        });

        Some(Self {
            mean,
            std_dev,
            samples: values.len(),
        })
    }
}

/// Summaries from a batch of replications.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationReport {
    base_seed: u64,
    summaries: Vec<Summary>,
}

impl ReplicationReport {
    /// The seed of the first replication. Replication `i` used `base_seed + i`.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Per-replication summaries, in replication order.
    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    /// Estimate any metric from the per-replication summaries.
    ///
    /// Replications where the metric is undefined are skipped.
    pub fn estimate(&self, metric: impl Fn(&Summary) -> Option<f64>) -> Option<Estimate> {
        let values: Vec<f64> = self.summaries.iter().filter_map(metric).collect();
        Estimate::from_values(&values)
    }

    fn overall(&self, metric: impl Fn(&PolicySummary) -> Option<f64>) -> Option<Estimate> {
        self.estimate(|s| metric(&s.overall))
    }

    /// Mean queue length across replications.
    pub fn mean_queue_length(&self) -> Option<Estimate> {
        self.overall(|s| s.mean_queue_length)
    }

    /// Mean system occupancy across replications.
    pub fn mean_system_occupancy(&self) -> Option<Estimate> {
        self.overall(|s| s.mean_system_occupancy)
    }

    /// Mean waiting time across replications.
    pub fn mean_waiting_time(&self) -> Option<Estimate> {
        self.overall(|s| s.mean_waiting_time)
    }

    /// Balk probability across replications.
    pub fn balk_probability(&self) -> Option<Estimate> {
        self.overall(|s| s.balk_probability)
    }

    /// Mean cost per customer across replications.
    pub fn mean_cost(&self) -> Option<Estimate> {
        self.overall(|s| s.mean_cost)
    }

    /// Server utilization across replications.
    pub fn utilization(&self) -> Option<Estimate> {
        self.estimate(|s| s.utilization)
    }
}

/// Run `replications` independent copies of a simulation and summarise each after `warmup`.
///
/// When the configuration has no seed, a base seed is drawn from the OS. Any failing replication
/// fails the whole batch.
pub async fn run_replications(
    config: SimulationConfig,
    replications: usize,
    warmup: f64,
) -> SimulationResult<ReplicationReport> {
    if replications == 0 {
        return Err(ConfigurationError::NoReplications.into());
    }
    config.validate()?;
    validate_warmup(warmup)?;

    let base_seed = config
        .seed
        .unwrap_or_else(|| RandomProcess::new(None).seed());

    let parent = Span::current();
    let mut tasks = JoinSet::new();
    for index in 0..replications {
        let config = SimulationConfig {
            seed: Some(base_seed.wrapping_add(index as u64)),
            ..config.clone()
        };
        let parent = parent.clone();

        tasks.spawn_blocking(move || {
            let span = span!(
                parent: &parent,
                Level::INFO,
                "replication",
                replication.index = index as u64
            );
            let _enter = span.enter();

            let outcome = Simulation::new(config)?.run()?;
            Ok::<_, SimulationError>((index, outcome.summary(warmup)?))
        });
    }

    let mut summaries = Vec::with_capacity(replications);
    while let Some(joined) = tasks.join_next().await {
        let (index, summary) =
            joined.map_err(|e| SimulationError::Replication(e.to_string()))??;
        summaries.push((index, summary));
    }
    summaries.sort_by_key(|(index, _)| *index);

    info!(replications, base_seed, "Replications finished");

    Ok(ReplicationReport {
        base_seed,
        summaries: summaries.into_iter().map(|(_, summary)| summary).collect(),
    })
}
