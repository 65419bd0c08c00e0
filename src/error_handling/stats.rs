//! Probe statistics tracking.
//!
//! Thread-safe counters for the events recorded while probing candidates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ProbeEvent;

/// Thread-safe probe statistics tracker.
///
/// Uses atomic counters so every worker can record events without locking.
/// All event types are initialized to zero on creation.
pub struct ProbeStats {
    events: HashMap<ProbeEvent, AtomicUsize>,
}

impl ProbeStats {
    /// All counters at zero.
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in ProbeEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        ProbeStats { events }
    }

    /// Increment an event counter.
    pub fn increment(&self, event: ProbeEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProbeStats initialization.",
                event
            );
        }
    }

    /// Get the count for an event type.
    pub fn get(&self, event: ProbeEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum of all failure event counters.
    pub fn total_failures(&self) -> usize {
        ProbeEvent::iter()
            .filter(ProbeEvent::is_failure)
            .map(|e| self.get(e))
            .sum()
    }

    /// Non-zero counters, in declaration order.
    pub fn non_zero(&self) -> Vec<(ProbeEvent, usize)> {
        ProbeEvent::iter()
            .map(|e| (e, self.get(e)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for ProbeStats {
    fn default() -> Self {
        Self::new()
    }
}
