//! Non-blocking tick admission
//!
//! The sync contract is "at most one tick in flight, extras dropped": a tick
//! that finds another one running is skipped entirely, never queued. The
//! next scheduled tick resubmits the current position, so skipped ticks lose
//! nothing.
//!
//! Modeled as an explicit flag with an RAII permit rather than a try-lock on
//! shared data, so the admission decision is observable and testable on its
//! own.

use std::sync::atomic::{AtomicBool, Ordering};

/// Admission gate for sync ticks.
#[derive(Debug, Default)]
pub struct TickGate {
    in_flight: AtomicBool,
}

impl TickGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a tick. Returns a permit while no other tick runs, or
    /// `None` when the caller should skip.
    pub fn try_begin(&self) -> Option<TickPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(TickPermit { gate: self })
    }

    /// Whether a tick currently holds the gate.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the duration of one tick; reopens the gate on drop, including
/// when the tick is cancelled mid-await.
#[derive(Debug)]
pub struct TickPermit<'a> {
    gate: &'a TickGate,
}

impl Drop for TickPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
