//! Single-occupant request slot
//!
//! Models the "at most one search in flight" rule. Claiming the slot aborts
//! the previous occupant and invalidates its ticket, so a response that
//! slips past the abort is still recognized as stale.

use tokio::task::AbortHandle;

/// Proof of having claimed the slot at a given generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSlot {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, cancelling whatever request held it
    pub fn claim(&mut self) -> Ticket {
        self.generation += 1;
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        Ticket(self.generation)
    }

    /// Register the task serving `ticket`
    ///
    /// A task whose ticket has already been superseded is aborted at once.
    pub fn attach(&mut self, ticket: Ticket, task: AbortHandle) {
        if self.is_current(ticket) {
            self.in_flight = Some(task);
        } else {
            task.abort();
        }
    }

    /// Whether `ticket` is still the latest claim
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.0
    }

    /// Drop the abort handle once the request served by `ticket` settled
    pub fn release(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.in_flight = None;
        }
    }

    /// Whether a request is currently registered
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}
