//! Balking policies that decide whether an arriving customer joins.
//!
//! - [`Unconditional`](BalkingPolicy::Unconditional): always joins
//! - [`Selfish`](BalkingPolicy::Selfish): joins when its own expected time in system is worth it
//! - [`SociallyOptimal`](BalkingPolicy::SociallyOptimal): joins below the Naor threshold

use std::fmt::{self, Display};

/// The kind of decision rule a customer follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyKind {
    /// Always joins.
    Unconditional,
    /// Joins only when it is in the customer's own interest.
    Selfish,
    /// Joins only below the socially optimal threshold.
    SociallyOptimal,
}

/// What a selfish customer counts ahead of itself when estimating its time in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OccupancyBasis {
    /// Everyone in the system: the queue plus the customer in service.
    #[default]
    SystemOccupancy,
    /// Only those waiting in the queue, ignoring the customer in service.
    QueueLength,
}

/// The state of the system seen by an arriving customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Customers waiting in the queue.
    pub queue_length: usize,
    /// Customers in service: zero or one.
    pub in_service: usize,
}

impl Occupancy {
    /// Total customers in the system.
    pub fn system(&self) -> usize {
        self.queue_length + self.in_service
    }
}

/// The outcome of a balking decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Join the queue (or go straight into service).
    Join,
    /// Leave without joining.
    Balk,
}

/// A decision rule evaluated once per customer, at arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum BalkingPolicy {
    /// Always join.
    Unconditional,

    /// Join if and only if `(occupancy + 1) / service_rate < balking_cost`.
    ///
    /// Compares the customer's own expected time in the system with the value it places on
    /// service. Myopic: ignores the delay the customer imposes on those arriving later.
    Selfish {
        /// The value of service, in time units.
        balking_cost: f64,
        /// The server's service rate.
        service_rate: f64,
        /// Which occupancy the customer counts ahead of itself.
        basis: OccupancyBasis,
    },

    /// Join if and only if the system holds fewer than `threshold` customers.
    ///
    /// Generally stricter than [`Selfish`](BalkingPolicy::Selfish) because the threshold accounts
    /// for the congestion a joining customer inflicts on others.
    SociallyOptimal {
        /// The Naor threshold for this run.
        threshold: usize,
    },
}

impl BalkingPolicy {
    /// The kind of this policy.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Unconditional => PolicyKind::Unconditional,
            Self::Selfish { .. } => PolicyKind::Selfish,
            Self::SociallyOptimal { .. } => PolicyKind::SociallyOptimal,
        }
    }

    /// Decide whether to join, given what the customer sees on arrival.
    pub fn decide(&self, occupancy: Occupancy) -> Decision {
        let join = match self {
            Self::Unconditional => true,
            Self::Selfish {
                balking_cost,
                service_rate,
                basis,
            } => {
                let ahead = match basis {
                    OccupancyBasis::SystemOccupancy => occupancy.system(),
                    OccupancyBasis::QueueLength => occupancy.queue_length,
                };
                (ahead as f64 + 1.0) / service_rate < *balking_cost
            }
            Self::SociallyOptimal { threshold } => occupancy.system() < *threshold,
        };

        if join { Decision::Join } else { Decision::Balk }
    }
}

impl Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::Unconditional => "Unconditional",
            PolicyKind::Selfish => "Selfish",
            PolicyKind::SociallyOptimal => "Socially optimal",
        })
    }
}

impl Display for OccupancyBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OccupancyBasis::SystemOccupancy => "system occupancy",
            OccupancyBasis::QueueLength => "queue length",
        })
    }
}
