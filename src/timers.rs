//! Cooperative timer queue for the single-threaded game loop.
//!
//! Every timer is stamped with the round generation it was scheduled for.
//! Timers fire in deadline order, ties in scheduling order. The owner checks
//! the stamp against its current generation and drops stale timers.

use std::collections::BTreeMap;

/// Milliseconds on the caller's monotonic clock.
pub type Millis = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    pub due: Millis,
    pub generation: u64,
    pub payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Millis, u64), Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Millis, generation: u64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            (due, seq),
            Scheduled {
                due,
                generation,
                payload,
            },
        );
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Scheduled<T>> {
        let (&(due, _), _) = self.entries.first_key_value()?;
        if due > now {
            return None;
        }
        self.entries.pop_first().map(|(_, timer)| timer)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel everything still pending.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
