//! The discrete-event simulation engine.
//!
//! The clock jumps from one scheduled event to the next. Three kinds of event drive a run:
//!
//! - the pending customer arriving, which applies its policy and either joins or balks
//! - the customer in service departing, which pulls the head of the queue into service
//! - an observation, which samples the queue every `sample_interval`
//!
//! Arrivals stop at the horizon. Customers already admitted are then served to completion.

use tracing::{debug, info, span, trace, Level};

use crate::{
    config::{CustomerMix, SimulationConfig},
    customer::Customer,
    error::SimulationResult,
    policy::{BalkingPolicy, Decision, Occupancy},
    queue::{Queue, Server},
    random::RandomProcess,
    report::SummaryReport,
    scheduler::{Event, EventQueue, SimulationClock},
    stats::{Sample, StatisticsCollector, Summary},
    threshold::naor_threshold,
};

/// How policies are handed out to newly generated customers.
#[derive(Debug, Clone, Copy)]
enum Assignment {
    Every(BalkingPolicy),
    Mixed {
        selfish: BalkingPolicy,
        optimal: BalkingPolicy,
        selfish_proportion: f64,
    },
}

/// A single simulation run.
///
/// Owns the queue, the server, the pending customer and its own random process, so independent
/// runs share nothing.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    random: RandomProcess,
    clock: SimulationClock,
    events: EventQueue,
    queue: Queue,
    server: Server,
    pending: Option<Customer>,
    next_id: usize,
    threshold: Option<usize>,
    assignment: Assignment,
    stats: StatisticsCollector,
}

impl Simulation {
    /// Set up a run.
    ///
    /// Fails if the configuration is invalid, or if the customers are mixed and no Naor threshold
    /// can be computed for it. Nothing is simulated until [`Simulation::run()`].
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let selfish = |balking_cost| BalkingPolicy::Selfish {
            balking_cost,
            service_rate: config.service_rate,
            basis: config.selfish_basis,
        };

        let (threshold, assignment) = match config.mix {
            CustomerMix::Unconditional => (None, Assignment::Every(BalkingPolicy::Unconditional)),
            CustomerMix::Selfish { balking_cost } => {
                (None, Assignment::Every(selfish(balking_cost)))
            }
            CustomerMix::Mixed {
                balking_cost,
                selfish_proportion,
            } => {
                let threshold =
                    naor_threshold(config.arrival_rate, config.service_rate, balking_cost)?;
                (
                    Some(threshold),
                    Assignment::Mixed {
                        selfish: selfish(balking_cost),
                        optimal: BalkingPolicy::SociallyOptimal { threshold },
                        selfish_proportion,
                    },
                )
            }
        };

        Ok(Self {
            random: RandomProcess::new(config.seed),
            clock: SimulationClock::default(),
            events: EventQueue::default(),
            queue: Queue::new(),
            server: Server::new(),
            pending: None,
            next_id: 0,
            threshold,
            assignment,
            stats: StatisticsCollector::new(config.mix.is_mixed(), config.mix.balking_cost()),
            config,
        })
    }

    /// The seed driving this run, whether configured or drawn from the OS.
    pub fn seed(&self) -> u64 {
        self.random.seed()
    }

    /// The Naor threshold applied to socially optimal customers, when there are any.
    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    /// Run to completion.
    pub fn run(mut self) -> SimulationResult<SimulationOutcome> {
        let span = span!(
            Level::INFO,
            "simulation run",
            seed = self.random.seed(),
            arrival_rate = self.config.arrival_rate,
            service_rate = self.config.service_rate,
            horizon = self.config.horizon,
            mix = %self.config.mix,
        );
        let _enter = span.enter();

        self.schedule_arrival(0.0)?;
        self.schedule_observation();

        while let Some((at, event)) = self.events.pop() {
            self.clock.advance_to(at);
            match event {
                Event::Departure => self.depart(at)?,
                Event::Arrival => self.arrive(at)?,
                Event::Observation => self.observe(at),
            }
        }

        debug_assert!(self.queue.is_empty() && self.server.free() && self.pending.is_none());

        let elapsed = self.clock.now().max(self.config.horizon);
        self.clock.advance_to(elapsed);
        self.stats.finish(elapsed);

        info!(
            served = self.stats.completed().len() as u64,
            balked = self.stats.balked().len() as u64,
            elapsed,
            "Simulation finished"
        );

        Ok(SimulationOutcome {
            seed: self.random.seed(),
            threshold: self.threshold,
            clock: self.clock,
            statistics: self.stats,
            config: self.config,
        })
    }

    /// Generate the next customer, arriving after `from`, unless it would arrive at or after the
    /// horizon.
    fn schedule_arrival(&mut self, from: f64) -> SimulationResult<()> {
        let at = from + self.random.sample_inter_arrival(self.config.arrival_rate)?;
        if at >= self.config.horizon {
            return Ok(());
        }

        let service_time = self.random.sample_service(self.config.service_rate)?;
        let policy = self.assign_policy();
        let customer = Customer::new(self.next_id, at, service_time, policy);
        self.next_id += 1;

        trace!(customer.id = customer.id(), at, "Scheduled arrival");
        self.pending = Some(customer);
        self.events.schedule(at, Event::Arrival);
        Ok(())
    }

    fn assign_policy(&mut self) -> BalkingPolicy {
        match self.assignment {
            Assignment::Every(policy) => policy,
            Assignment::Mixed {
                selfish,
                optimal,
                selfish_proportion,
            } => {
                if self.random.sample_unit() < selfish_proportion {
                    selfish
                } else {
                    optimal
                }
            }
        }
    }

    /// Schedule the next sample, if it falls within the horizon.
    fn schedule_observation(&mut self) {
        let k = self.stats.samples().len() + 1;
        let at = k as f64 * self.config.sample_interval;
        if at <= self.config.horizon {
            self.events.schedule(at, Event::Observation);
        }
    }

    fn arrive(&mut self, at: f64) -> SimulationResult<()> {
        let Some(mut customer) = self.pending.take() else {
            return Ok(());
        };
        debug_assert_eq!(customer.arrival_time(), at);

        customer.arrive();
        let occupancy = Occupancy {
            queue_length: self.queue.len(),
            in_service: self.server.in_service(),
        };

        match customer.decide(occupancy) {
            Decision::Join => {
                customer.enter_queue(at);
                if self.server.free() {
                    debug_assert!(self.queue.is_empty());
                    trace!(customer.id = customer.id(), at, "Customer went straight into service");
                    let end = self.server.start(customer, at)?;
                    self.events.schedule(end, Event::Departure);
                } else {
                    trace!(customer.id = customer.id(), at, "Customer joined the queue");
                    self.queue.join(customer);
                }
            }
            Decision::Balk => {
                customer.balk();
                debug!(
                    customer.id = customer.id(),
                    policy = %customer.policy_kind(),
                    occupancy = occupancy.system() as u64,
                    at,
                    "Customer balked"
                );
                self.stats.record_balked(customer);
            }
        }

        self.schedule_arrival(at)
    }

    fn depart(&mut self, at: f64) -> SimulationResult<()> {
        let customer = self.server.complete()?;
        trace!(customer.id = customer.id(), at, "Customer departed");
        self.stats.record_completed(customer);

        if !self.queue.is_empty() {
            let next = self.queue.pop_front()?;
            trace!(customer.id = next.id(), at, "Customer left the queue for service");
            let end = self.server.start(next, at)?;
            self.events.schedule(end, Event::Departure);
        }
        Ok(())
    }

    fn observe(&mut self, at: f64) {
        self.stats
            .record(Sample::observe(at, &self.queue, &self.server));
        self.schedule_observation();
    }
}

/// The result of a completed run.
#[derive(Debug)]
pub struct SimulationOutcome {
    config: SimulationConfig,
    seed: u64,
    threshold: Option<usize>,
    clock: SimulationClock,
    statistics: StatisticsCollector,
}

impl SimulationOutcome {
    /// The configuration the run used.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The seed the run used. Configure it to replay the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The Naor threshold, when socially optimal customers took part.
    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    /// The clock as the run ended: at the horizon, or at the last departure if that was later.
    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    /// Everything recorded during the run.
    pub fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }

    /// Summarise the run, excluding the first `warmup` time units.
    pub fn summary(&self, warmup: f64) -> SimulationResult<Summary> {
        Ok(self.statistics.summary(warmup)?)
    }

    /// A printable report of the run.
    pub fn report(&self, warmup: f64) -> SimulationResult<SummaryReport> {
        Ok(SummaryReport::new(
            self.config.clone(),
            self.seed,
            self.threshold,
            self.summary(warmup)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{
        error::{ConfigurationError, SimulationError},
        policy::PolicyKind,
    };

    fn config(arrival_rate: f64, mix: CustomerMix) -> SimulationConfig {
        SimulationConfig::builder()
            .arrival_rate(arrival_rate)
            .service_rate(1.0)
            .horizon(200.0)
            .mix(mix)
            .seed(17)
            .build()
    }

    fn run(config: SimulationConfig) -> SimulationOutcome {
        Simulation::new(config).unwrap().run().unwrap()
    }

    #[test]
    fn unconditional_customers_never_balk() {
        let outcome = run(config(2.0, CustomerMix::Unconditional));

        assert_eq!(outcome.threshold(), None);
        assert!(outcome.statistics().balked().is_empty());
        assert!(!outcome.statistics().completed().is_empty());
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let result = Simulation::new(config(-1.0, CustomerMix::Unconditional));
        assert_matches!(
            result,
            Err(SimulationError::Configuration(
                ConfigurationError::NotPositive { .. }
            ))
        );
    }

    #[test]
    fn threshold_only_computed_for_mixed_customers() {
        let selfish = Simulation::new(config(2.0, CustomerMix::Selfish { balking_cost: 7.0 }));
        assert_eq!(selfish.unwrap().threshold(), None);

        let mixed = Simulation::new(config(
            2.0,
            CustomerMix::Mixed {
                balking_cost: 7.0,
                selfish_proportion: 0.5,
            },
        ));
        assert_eq!(mixed.unwrap().threshold(), Some(2));
    }

    #[test]
    fn unreachable_threshold_fails_before_running() {
        let result = Simulation::new(config(
            0.1,
            CustomerMix::Mixed {
                balking_cost: 1e9,
                selfish_proportion: 0.5,
            },
        ));
        assert_matches!(result, Err(SimulationError::ThresholdNotFound { .. }));
    }

    #[test]
    fn socially_optimal_customers_respect_threshold() {
        let outcome = run(config(
            2.0,
            CustomerMix::Mixed {
                balking_cost: 7.0,
                selfish_proportion: 0.0,
            },
        ));
        let threshold = outcome.threshold().unwrap();

        let stats = outcome.statistics();
        assert!(!stats.balked().is_empty());
        assert!(stats
            .samples()
            .iter()
            .all(|s| s.system_occupancy <= threshold));
        assert!(stats
            .balked()
            .iter()
            .all(|c| c.policy_kind() == PolicyKind::SociallyOptimal));
    }

    #[test]
    fn selfish_customers_balk_when_the_wait_is_too_long() {
        // Joins only while (occupancy + 1) / 1 < 7, so at most 6 in the system.
        let outcome = run(config(2.0, CustomerMix::Selfish { balking_cost: 7.0 }));

        let stats = outcome.statistics();
        assert!(!stats.balked().is_empty());
        assert!(stats.samples().iter().all(|s| s.system_occupancy <= 6));
    }

    #[test]
    fn every_customer_is_served_or_balks() {
        let outcome = run(config(
            1.5,
            CustomerMix::Mixed {
                balking_cost: 4.0,
                selfish_proportion: 0.5,
            },
        ));
        let stats = outcome.statistics();

        let mut ids: Vec<usize> = stats
            .completed()
            .iter()
            .chain(stats.balked())
            .map(Customer::id)
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, (0..ids.len()).collect::<Vec<_>>());
        assert!(stats.completed().iter().all(Customer::is_served));
        assert!(stats.balked().iter().all(Customer::is_balked));
    }

    #[test]
    fn samples_every_interval_up_to_horizon() {
        let config = SimulationConfig::builder()
            .arrival_rate(0.5)
            .service_rate(1.0)
            .horizon(10.0)
            .sample_interval(2.5)
            .seed(3)
            .build();
        let outcome = run(config);

        let times: Vec<f64> = outcome
            .statistics()
            .samples()
            .iter()
            .map(|s| s.time)
            .collect();
        assert_eq!(times, vec![2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn arrivals_stop_at_horizon_and_server_drains() {
        let outcome = run(config(2.0, CustomerMix::Unconditional));
        let stats = outcome.statistics();

        assert!(stats.completed().iter().all(|c| c.arrival_time() < 200.0));

        let last_departure = stats
            .completed()
            .iter()
            .filter_map(Customer::service_end_time)
            .fold(0.0, f64::max);
        // Overloaded, so the backlog runs past the horizon.
        assert!(last_departure > 200.0);
        assert_eq!(stats.elapsed(), last_departure);
        assert_eq!(outcome.clock().now(), last_departure);
    }

    #[test]
    fn clock_ends_at_horizon_when_the_server_is_idle() {
        let config = SimulationConfig::builder()
            .arrival_rate(0.5)
            .service_rate(1.0)
            .horizon(0.3)
            .seed(8)
            .build();
        let outcome = run(config);

        let last_departure = outcome
            .statistics()
            .completed()
            .iter()
            .filter_map(Customer::service_end_time)
            .fold(0.0, f64::max);
        assert_eq!(outcome.clock().now(), last_departure.max(0.3));
        assert_eq!(outcome.clock().now(), outcome.statistics().elapsed());

        let utilization = outcome.summary(0.0).unwrap().utilization.unwrap();
        assert!(utilization.is_sign_positive());
    }

    #[test]
    fn unseeded_run_reports_its_seed() {
        let config = SimulationConfig::builder()
            .arrival_rate(0.5)
            .service_rate(1.0)
            .horizon(50.0)
            .build();

        let simulation = Simulation::new(config.clone()).unwrap();
        let seed = simulation.seed();
        let outcome = simulation.run().unwrap();
        assert_eq!(outcome.seed(), seed);

        let replay = run(SimulationConfig {
            seed: Some(seed),
            ..config
        });
        assert_eq!(
            replay.statistics().customer_rows(),
            outcome.statistics().customer_rows()
        );
    }
}
