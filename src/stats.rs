//! Statistics collection and analysis

use std::collections::BTreeMap;

use crate::{
    customer::Customer,
    error::ConfigurationError,
    policy::PolicyKind,
    queue::{Queue, Server},
};

/// One value per policy kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerPolicy<T> {
    /// For unconditional customers.
    pub unconditional: T,
    /// For selfish customers.
    pub selfish: T,
    /// For socially optimal customers.
    pub socially_optimal: T,
}

impl<T> PerPolicy<T> {
    /// The value for the given kind.
    pub fn get(&self, kind: PolicyKind) -> &T {
        match kind {
            PolicyKind::Unconditional => &self.unconditional,
            PolicyKind::Selfish => &self.selfish,
            PolicyKind::SociallyOptimal => &self.socially_optimal,
        }
    }

    fn from_fn(mut f: impl FnMut(PolicyKind) -> T) -> Self {
        Self {
            unconditional: f(PolicyKind::Unconditional),
            selfish: f(PolicyKind::Selfish),
            socially_optimal: f(PolicyKind::SociallyOptimal),
        }
    }
}

/// The state of the queue and server at an instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// When the sample was taken.
    pub time: f64,
    /// Customers waiting.
    pub queue_length: usize,
    /// Customers waiting or in service.
    pub system_occupancy: usize,
    /// Customers waiting, by policy.
    pub queue_by_policy: PerPolicy<usize>,
    /// Customers waiting or in service, by policy.
    pub system_by_policy: PerPolicy<usize>,
}

impl Sample {
    /// Observe the queue and server at `time`.
    pub fn observe(time: f64, queue: &Queue, server: &Server) -> Self {
        let queue_by_policy = PerPolicy::from_fn(|kind| queue.count(kind));
        let system_by_policy =
            PerPolicy::from_fn(|kind| queue_by_policy.get(kind) + server.count(kind));

        Self {
            time,
            queue_length: queue.len(),
            system_occupancy: queue.len() + server.in_service(),
            queue_by_policy,
            system_by_policy,
        }
    }
}

/// One served customer, flattened for export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerRow {
    /// Position in order of service completion, starting from one.
    pub index: usize,
    /// Arrival instant.
    pub arrival_time: f64,
    /// Time spent waiting.
    pub waiting_time: f64,
    /// When service started.
    pub service_start_time: f64,
    /// How long service took.
    pub service_time: f64,
    /// When service ended.
    pub service_end_time: f64,
}

/// Statistics for a group of customers, after the warm-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySummary {
    /// Mean number waiting across samples.
    pub mean_queue_length: Option<f64>,
    /// Mean number in the system across samples.
    pub mean_system_occupancy: Option<f64>,
    /// Mean time served customers waited.
    pub mean_waiting_time: Option<f64>,
    /// Median time served customers waited.
    pub median_waiting_time: Option<f64>,
    /// 99th percentile of the time served customers waited.
    pub p99_waiting_time: Option<f64>,
    /// Mean service time of served customers.
    pub mean_service_time: Option<f64>,
    /// Mean time served customers spent in the system.
    pub mean_system_time: Option<f64>,
    /// Fraction of arrivals that balked.
    pub balk_probability: Option<f64>,
    /// Mean cost per arrival, in time units. A balk costs the balking cost, a service costs its
    /// time in the system.
    pub mean_cost: Option<f64>,
    /// Customers served to completion.
    pub served: usize,
    /// Customers who balked.
    pub balked: usize,
}

/// Summary statistics for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Samples and customers arriving before this instant were excluded.
    pub warmup: f64,
    /// Statistics over every customer.
    pub overall: PolicySummary,
    /// Statistics per policy. Only populated when selfish and socially optimal customers mix.
    pub by_policy: BTreeMap<PolicyKind, PolicySummary>,
    /// Fraction of the elapsed time the server was busy.
    pub utilization: Option<f64>,
}

impl Summary {
    /// Statistics for customers following the given policy, when partitioned.
    pub fn policy(&self, kind: PolicyKind) -> Option<&PolicySummary> {
        self.by_policy.get(&kind)
    }
}

/// Collects samples and finished customers during a simulation.
#[derive(Debug)]
pub struct StatisticsCollector {
    partitioned: bool,
    balking_cost: Option<f64>,
    samples: Vec<Sample>,
    completed: Vec<Customer>,
    balked: Vec<Customer>,
    elapsed: f64,
}

impl StatisticsCollector {
    /// Create a collector.
    ///
    /// # Arguments
    /// * `partitioned` - Whether summaries should also be broken down per policy
    /// * `balking_cost` - The cost charged to each balking customer, if any
    pub fn new(partitioned: bool, balking_cost: Option<f64>) -> Self {
        Self {
            partitioned,
            balking_cost,
            samples: Vec::new(),
            completed: Vec::new(),
            balked: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Record a sample of the queue.
    pub fn record(&mut self, sample: Sample) {
        debug_assert!(
            self.samples.last().is_none_or(|last| last.time <= sample.time),
            "samples should be recorded in time order"
        );
        self.samples.push(sample);
    }

    /// Record a customer that has finished service.
    pub fn record_completed(&mut self, customer: Customer) {
        debug_assert!(customer.is_served());
        self.completed.push(customer);
    }

    /// Record a customer that balked.
    pub fn record_balked(&mut self, customer: Customer) {
        debug_assert!(customer.is_balked());
        self.balked.push(customer);
    }

    /// Mark the end of the run.
    pub fn finish(&mut self, end_time: f64) {
        self.elapsed = end_time;
    }

    /// All recorded samples, in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Customers served to completion, in order of completion.
    pub fn completed(&self) -> &[Customer] {
        &self.completed
    }

    /// Customers who balked, in order of arrival.
    pub fn balked(&self) -> &[Customer] {
        &self.balked
    }

    /// Simulated time from zero to the end of the run.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Queue length over time.
    pub fn queue_length_series(&self) -> Vec<(f64, usize)> {
        self.samples
            .iter()
            .map(|s| (s.time, s.queue_length))
            .collect()
    }

    /// System occupancy over time.
    pub fn system_occupancy_series(&self) -> Vec<(f64, usize)> {
        self.samples
            .iter()
            .map(|s| (s.time, s.system_occupancy))
            .collect()
    }

    /// Served customers as export rows.
    pub fn customer_rows(&self) -> Vec<CustomerRow> {
        self.completed
            .iter()
            .filter_map(|c| {
                Some((
                    c,
                    c.waiting_time()?,
                    c.service_start_time()?,
                    c.service_end_time()?,
                ))
            })
            .enumerate()
            .map(|(i, (c, waiting_time, service_start_time, service_end_time))| CustomerRow {
                index: i + 1,
                arrival_time: c.arrival_time(),
                waiting_time,
                service_start_time,
                service_time: c.service_time(),
                service_end_time,
            })
            .collect()
    }

    /// Summarise the run, excluding samples and customers before `warmup`.
    pub fn summary(&self, warmup: f64) -> Result<Summary, ConfigurationError> {
        validate_warmup(warmup)?;

        let overall = self.policy_summary(warmup, None);

        let by_policy = if self.partitioned {
            [PolicyKind::Selfish, PolicyKind::SociallyOptimal]
                .into_iter()
                .map(|kind| (kind, self.policy_summary(warmup, Some(kind))))
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(Summary {
            warmup,
            overall,
            by_policy,
            utilization: self.utilization(warmup),
        })
    }

    fn utilization(&self, warmup: f64) -> Option<f64> {
        let window = self.elapsed - warmup;
        if window <= 0.0 {
            return None;
        }

        let busy: f64 = self
            .completed
            .iter()
            .filter(|c| c.arrival_time() >= warmup)
            .map(Customer::service_time)
            .fold(0.0, |total, service| total + service);

        // Rounding can push a saturated server's total just past the window.
        Some((busy / window).min(1.0))
    }

    fn policy_summary(&self, warmup: f64, kind: Option<PolicyKind>) -> PolicySummary {
        let in_group = |c: &&Customer| {
            c.arrival_time() >= warmup && kind.is_none_or(|k| c.policy_kind() == k)
        };

        let samples: Vec<&Sample> = self.samples.iter().filter(|s| s.time >= warmup).collect();
        let queue_lengths: Vec<f64> = samples
            .iter()
            .map(|s| {
                let n = match kind {
                    Some(k) => *s.queue_by_policy.get(k),
                    None => s.queue_length,
                };
                n as f64
            })
            .collect();
        let system_occupancies: Vec<f64> = samples
            .iter()
            .map(|s| {
                let n = match kind {
                    Some(k) => *s.system_by_policy.get(k),
                    None => s.system_occupancy,
                };
                n as f64
            })
            .collect();

        let served: Vec<&Customer> = self.completed.iter().filter(in_group).collect();
        let balked = self.balked.iter().filter(in_group).count();

        let mut waits: Vec<f64> = served.iter().filter_map(|c| c.waiting_time()).collect();
        waits.sort_by(f64::total_cmp);
        let system_times: Vec<f64> = served.iter().filter_map(|c| c.system_time()).collect();
        let service_times: Vec<f64> = served.iter().map(|c| c.service_time()).collect();

        let arrivals = served.len() + balked;
        let (balk_probability, mean_cost) = if arrivals == 0 {
            (None, None)
        } else {
            let balk_cost = balked as f64 * self.balking_cost.unwrap_or(0.0);
            let service_cost = system_times.iter().fold(0.0, |total, t| total + t);
            (
                Some(balked as f64 / arrivals as f64),
                Some((balk_cost + service_cost) / arrivals as f64),
            )
        };

        PolicySummary {
            mean_queue_length: mean(&queue_lengths),
            mean_system_occupancy: mean(&system_occupancies),
            mean_waiting_time: mean(&waits),
            median_waiting_time: percentile(&waits, 0.5),
            p99_waiting_time: percentile(&waits, 0.99),
            mean_service_time: mean(&service_times),
            mean_system_time: mean(&system_times),
            balk_probability,
            mean_cost,
            served: served.len(),
            balked,
        }
    }
}

pub(crate) fn validate_warmup(warmup: f64) -> Result<(), ConfigurationError> {
    if warmup.is_finite() && warmup >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidWarmup(warmup))
    }
}

/// Mean of a collection, or `None` when empty.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().fold(0.0, |total, v| total + v) / values.len() as f64)
}

/// Calculate percentile from sorted data, interpolating between ranks.
fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    match sorted_data {
        [] => None,
        [only] => Some(*only),
        _ => {
            let rank = p * (sorted_data.len() - 1) as f64;
            let lower_idx = rank.floor() as usize;
            let upper_idx = rank.ceil() as usize;
            let weight = rank - lower_idx as f64;

            Some(sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight)
        }
    }
}

/// Running mean of a series: element `k` is the mean of the first `k + 1` values.
pub fn cumulative_mean(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .enumerate()
        .map(|(i, total)| total / (i + 1) as f64)
        .collect()
}
