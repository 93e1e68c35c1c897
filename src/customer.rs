//! Customers and their timelines.

use crate::policy::{BalkingPolicy, Decision, Occupancy, PolicyKind};

/// Where a customer is in its lifecycle.
///
/// `Pending -> Arrived -> { Queued -> InService -> Completed | Balked }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerState {
    /// Generated, waiting for its arrival instant.
    Pending,
    /// Arrived, decision not yet applied.
    Arrived,
    /// Waiting in the queue.
    Queued,
    /// Being served.
    InService,
    /// Service finished. Terminal.
    Completed,
    /// Left without joining. Terminal.
    Balked,
}

/// One customer: its scheduled arrival, its service requirement and what happened to it.
///
/// Customers are moved between containers (pending, queue, server, completed or balked), never
/// shared. Once terminal they are no longer mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: usize,
    policy: BalkingPolicy,
    arrival_time: f64,
    service_time: f64,
    queue_entry_time: Option<f64>,
    service_start_time: Option<f64>,
    service_end_time: Option<f64>,
    state: CustomerState,
}

impl Customer {
    pub(crate) fn new(
        id: usize,
        arrival_time: f64,
        service_time: f64,
        policy: BalkingPolicy,
    ) -> Self {
        Self {
            id,
            policy,
            arrival_time,
            service_time,
            queue_entry_time: None,
            service_start_time: None,
            service_end_time: None,
            state: CustomerState::Pending,
        }
    }

    /// Order of generation, starting from zero.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The decision rule this customer follows.
    pub fn policy(&self) -> &BalkingPolicy {
        &self.policy
    }

    /// The kind of decision rule this customer follows.
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// The instant this customer arrives (or is scheduled to).
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    /// How long service takes, sampled once at generation.
    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// When the customer joined the queue, if it did.
    pub fn queue_entry_time(&self) -> Option<f64> {
        self.queue_entry_time
    }

    /// When service started. Also the instant the customer left the queue.
    pub fn service_start_time(&self) -> Option<f64> {
        self.service_start_time
    }

    /// When service ends: `service_start_time + service_time`.
    pub fn service_end_time(&self) -> Option<f64> {
        self.service_end_time
    }

    /// Time spent waiting before service.
    pub fn waiting_time(&self) -> Option<f64> {
        self.service_start_time.map(|start| start - self.arrival_time)
    }

    /// Time spent in the system: waiting plus service.
    pub fn system_time(&self) -> Option<f64> {
        self.waiting_time().map(|wait| wait + self.service_time)
    }

    /// The current lifecycle state.
    pub fn state(&self) -> CustomerState {
        self.state
    }

    /// Has this customer been served to completion?
    pub fn is_served(&self) -> bool {
        self.state == CustomerState::Completed
    }

    /// Did this customer balk?
    pub fn is_balked(&self) -> bool {
        self.state == CustomerState::Balked
    }

    /// Apply this customer's policy to what it sees on arrival.
    pub fn decide(&self, occupancy: Occupancy) -> Decision {
        self.policy.decide(occupancy)
    }

    pub(crate) fn arrive(&mut self) {
        debug_assert_eq!(self.state, CustomerState::Pending);
        self.state = CustomerState::Arrived;
    }

    pub(crate) fn balk(&mut self) {
        debug_assert_eq!(self.state, CustomerState::Arrived);
        self.state = CustomerState::Balked;
    }

    pub(crate) fn enter_queue(&mut self, at: f64) {
        debug_assert_eq!(self.state, CustomerState::Arrived);
        self.queue_entry_time = Some(at);
        self.state = CustomerState::Queued;
    }

    /// Start service at `at`, returning the instant service will end.
    pub(crate) fn start_service(&mut self, at: f64) -> f64 {
        debug_assert_eq!(self.state, CustomerState::Queued);
        let end = at + self.service_time;
        self.service_start_time = Some(at);
        self.service_end_time = Some(end);
        self.state = CustomerState::InService;
        end
    }

    pub(crate) fn complete(&mut self) {
        debug_assert_eq!(self.state, CustomerState::InService);
        self.state = CustomerState::Completed;
    }
}
