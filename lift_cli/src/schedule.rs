//! Deadlines for the host's tick source and the timer's deferred advance.
//!
//! Pure bookkeeping: every method takes the current instant, the caller does
//! the sleeping. Entering a new step restarts the tick period, so each step
//! gets a full period before its first tick.

use lift_core::PendingAdvance;
use std::time::{Duration, Instant};

/// What the driver should do next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Due {
    Tick(Instant),
    Advance { ticket: u64, at: Instant },
}

#[derive(Debug)]
pub struct Schedule {
    period: Duration,
    next_tick: Instant,
    advance: Option<(u64, Instant)>,
}

impl Schedule {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_tick: now + period,
            advance: None,
        }
    }

    /// A zero period means simulated time: nothing waits
    pub fn is_simulated(&self) -> bool {
        self.period.is_zero()
    }

    /// Earliest pending deadline. An advance wins ties, and always wins in
    /// simulated time.
    pub fn next(&self) -> Due {
        match self.advance {
            Some((ticket, at)) if self.is_simulated() || at <= self.next_tick => {
                Due::Advance { ticket, at }
            }
            _ => Due::Tick(self.next_tick),
        }
    }

    /// A tick was delivered
    pub fn ticked(&mut self) {
        self.next_tick += self.period;
    }

    /// Record the timer's pending advance, if not already tracked
    pub fn track(&mut self, pending: Option<PendingAdvance>, now: Instant) {
        if self.advance.is_none() {
            self.advance = pending.map(|p| (p.ticket, now + p.delay));
        }
    }

    /// The session moved to another step (advance, skip, previous)
    pub fn restart(&mut self, now: Instant) {
        self.advance = None;
        self.next_tick = now + self.period;
    }
}
