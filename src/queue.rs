//! The waiting line and the single server.

use std::collections::{VecDeque, vec_deque};

use crate::{
    customer::{Customer, CustomerState},
    error::{SimulationError, SimulationResult},
    policy::PolicyKind,
};

/// A first-in, first-out line of customers waiting for service.
///
/// No priorities, and no reneging once joined.
#[derive(Debug, Default)]
pub struct Queue {
    customers: VecDeque<Customer>,
}

impl Queue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a customer to the tail.
    pub fn join(&mut self, customer: Customer) {
        debug_assert_eq!(
            customer.state(),
            CustomerState::Queued,
            "only queued customers should be in the queue"
        );
        self.customers.push_back(customer);
    }

    /// Remove and return the customer at the head.
    pub fn pop_front(&mut self) -> SimulationResult<Customer> {
        self.customers
            .pop_front()
            .ok_or(SimulationError::EmptyQueue)
    }

    /// Number of customers waiting.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Is nobody waiting?
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Number of waiting customers following the given kind of policy.
    pub fn count(&self, kind: PolicyKind) -> usize {
        self.customers
            .iter()
            .filter(|c| c.policy_kind() == kind)
            .count()
    }

    /// Waiting customers, head first.
    pub fn iter(&self) -> vec_deque::Iter<'_, Customer> {
        self.customers.iter()
    }
}

/// A single server: holds zero or one customer.
#[derive(Debug, Default)]
pub struct Server {
    occupant: Option<Customer>,
}

impl Server {
    /// Create an idle server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start serving `customer` at `at`, returning the instant service ends.
    pub fn start(&mut self, mut customer: Customer, at: f64) -> SimulationResult<f64> {
        if self.occupant.is_some() {
            return Err(SimulationError::ServerBusy);
        }

        let end = customer.start_service(at);
        self.occupant = Some(customer);
        Ok(end)
    }

    /// Is the server idle?
    pub fn free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Finish service, evicting the occupant.
    pub fn complete(&mut self) -> SimulationResult<Customer> {
        let mut customer = self.occupant.take().ok_or(SimulationError::ServerIdle)?;
        customer.complete();
        Ok(customer)
    }

    /// The customer in service, if any.
    pub fn occupant(&self) -> Option<&Customer> {
        self.occupant.as_ref()
    }

    /// When the current service ends, if the server is busy.
    pub fn service_end_time(&self) -> Option<f64> {
        self.occupant.as_ref().and_then(Customer::service_end_time)
    }

    /// Customers in service: zero or one.
    pub fn in_service(&self) -> usize {
        usize::from(self.occupant.is_some())
    }

    /// Is the customer in service following the given kind of policy?
    pub fn count(&self, kind: PolicyKind) -> usize {
        usize::from(self.occupant().is_some_and(|c| c.policy_kind() == kind))
    }
}
