//! Search generations: only the most recent search may publish its result.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing tickets, one per search.
#[derive(Debug, Default)]
pub struct SearchGenerations {
    latest: AtomicU64,
}

/// Proof that a search was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

impl SearchGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every earlier ticket.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer search has been issued since `ticket`.
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

impl SearchTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}
