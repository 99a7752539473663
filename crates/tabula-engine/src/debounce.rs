//! Keyed debounce timers
//!
//! One pending commit per key. Scheduling again for the same key replaces the
//! pending value and restarts its timer, so timers never stack. Time is passed
//! in explicitly, which keeps the debouncer deterministic under test and lets
//! the host drive it from whatever clock its event loop uses.

use std::hash::Hash;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    delay: Duration,
    pending: IndexMap<K, Pending<V>>,
}

impl<K: Eq + Hash + Clone, V> Debouncer<K, V> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: IndexMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value` for `key`, cancelling any earlier pending value
    pub fn schedule(&mut self, key: K, value: V, now: Instant) {
        let deadline = now + self.delay;
        self.pending.insert(key, Pending { value, deadline });
    }

    /// Cancel the pending value for `key`, returning it
    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.shift_remove(key).map(|p| p.value)
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Take every value whose deadline has passed, in scheduling order
    pub fn poll(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.into_iter()
            .filter_map(|key| {
                let pending = self.pending.shift_remove(&key)?;
                Some((key, pending.value))
            })
            .collect()
    }

    /// Take every pending value immediately
    pub fn flush(&mut self) -> Vec<(K, V)> {
        self.pending.drain(..).map(|(k, p)| (k, p.value)).collect()
    }

    /// Earliest pending deadline, for hosts that arm a single timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule("q", "ac", t0);

        assert!(debouncer.poll(t0 + Duration::from_millis(299)).is_empty());
        assert_eq!(debouncer.poll(t0 + DELAY), vec![("q", "ac")]);
        assert!(!debouncer.is_pending(&"q"));
    }

    #[test]
    fn test_reschedule_restarts_timer_without_stacking() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule("q", "a", t0);
        debouncer.schedule("q", "ac", t0 + Duration::from_millis(200));
        debouncer.schedule("q", "acm", t0 + Duration::from_millis(400));

        assert_eq!(debouncer.pending_count(), 1);
        assert!(debouncer.poll(t0 + Duration::from_millis(600)).is_empty());
        assert_eq!(
            debouncer.next_deadline(),
            Some(t0 + Duration::from_millis(700))
        );
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(700)),
            vec![("q", "acm")]
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule("name", 1, t0);
        debouncer.schedule("email", 2, t0 + Duration::from_millis(100));

        assert_eq!(debouncer.poll(t0 + DELAY), vec![("name", 1)]);
        assert!(debouncer.is_pending(&"email"));
        assert_eq!(debouncer.cancel(&"email"), Some(2));
        assert_eq!(debouncer.next_deadline(), None);
    }

    #[test]
    fn test_cancel_all_and_flush() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule("a", 1, t0);
        debouncer.schedule("b", 2, t0);
        assert_eq!(debouncer.flush(), vec![("a", 1), ("b", 2)]);

        debouncer.schedule("a", 3, t0);
        assert_eq!(debouncer.cancel_all(), 1);
        assert!(debouncer.poll(t0 + DELAY).is_empty());
    }
}
