//! The simulation clock and the queue of upcoming events.

use std::{cmp::Ordering, collections::BinaryHeap};

/// Something that happens at an instant.
///
/// Variants are declared in the order they are handled when they share an instant: a service
/// completing frees the server before an arrival looks at it, and samples see the result of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Event {
    /// The customer in service finishes.
    Departure,
    /// The pending customer arrives.
    Arrival,
    /// Sample the queue and system occupancy.
    Observation,
}

#[derive(Debug)]
struct Scheduled {
    at: f64,
    event: Event,
    seq: u64,
}

impl Scheduled {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.at
            .total_cmp(&other.at)
            .then(self.event.cmp(&other.event))
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the earliest event first.
        other.key_cmp(self)
    }
}

/// Events ordered by instant, then by kind, then by the order they were scheduled.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub(crate) fn schedule(&mut self, at: f64, event: Event) {
        debug_assert!(at.is_finite(), "events must be scheduled at finite instants");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Scheduled { at, event, seq });
    }

    /// Remove the earliest event, if there is one.
    pub(crate) fn pop(&mut self) -> Option<(f64, Event)> {
        self.events.pop().map(|s| (s.at, s.event))
    }
}

/// Simulated time. Only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    now: f64,
}

impl SimulationClock {
    /// The current instant.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub(crate) fn advance_to(&mut self, at: f64) {
        debug_assert!(at >= self.now, "the clock should never run backwards");
        self.now = self.now.max(at);
    }
}
