//! Simulate a single-server queue where customers may balk.
//!
//! Customers arrive as a Poisson process and are served one at a time, first come first served,
//! with exponentially distributed service times: an M/M/1 queue. On arrival each customer looks
//! at the system and decides whether to join, following one of three policies:
//!
//! - _unconditional_ customers always join
//! - _selfish_ customers join when their own expected time in the system is worth less than the
//!   value they place on service
//! - _socially optimal_ customers join only while the system holds fewer customers than the Naor
//!   threshold, which accounts for the delay each joiner imposes on everyone behind them
//!
//! The engine is event driven: the clock jumps straight to the next arrival, departure or sample.
//! Runs are reproducible given a seed, and many independent replications can be run in parallel.
//!
//! See the README for an example.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

mod config;
mod customer;
mod engine;
pub mod error;
mod policy;
mod queue;
mod random;
mod replication;
mod report;
mod scheduler;
pub mod stats;
pub mod threshold;

pub use config::{CustomerMix, SimulationConfig};
pub use customer::{Customer, CustomerState};
pub use engine::{Simulation, SimulationOutcome};
pub use error::{ConfigurationError, DomainError, SimulationError, SimulationResult};
pub use policy::{BalkingPolicy, Decision, Occupancy, OccupancyBasis, PolicyKind};
pub use queue::{Queue, Server};
pub use random::RandomProcess;
pub use replication::{run_replications, Estimate, ReplicationReport};
pub use report::SummaryReport;
pub use scheduler::SimulationClock;
pub use stats::{CustomerRow, PolicySummary, Sample, StatisticsCollector, Summary};
pub use threshold::naor_threshold;
