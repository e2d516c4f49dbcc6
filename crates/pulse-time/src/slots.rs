//! Owned timer handles
//!
//! A component keeps every timer it arms in a `TimerSlots` table keyed by
//! what the timer is for. Arming a new timer under a key cancels the one it
//! supersedes (last writer wins), and teardown releases the whole table.

use std::collections::HashMap;
use std::hash::Hash;

use pulse_core::TimerId;

use crate::Scheduler;

/// Per-component table of owned timer handles
#[derive(Debug)]
pub struct TimerSlots<K> {
    slots: HashMap<K, TimerId>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> TimerSlots<K> {
    pub fn new() -> Self {
        TimerSlots {
            slots: HashMap::new(),
        }
    }

    /// Install `id` under `key`, cancelling the timer it supersedes.
    /// Returns the superseded handle if one was still armed.
    pub fn replace<E: Clone>(
        &mut self,
        key: K,
        id: TimerId,
        scheduler: &mut Scheduler<E>,
    ) -> Option<TimerId> {
        let previous = self.slots.insert(key, id)?;
        if previous != id && scheduler.cancel(previous) {
            tracing::trace!(?key, ?previous, "superseded timer cancelled");
            Some(previous)
        } else {
            None
        }
    }

    /// Cancel and drop the timer under `key`
    pub fn release<E: Clone>(&mut self, key: K, scheduler: &mut Scheduler<E>) -> bool {
        match self.slots.remove(&key) {
            Some(id) => scheduler.cancel(id),
            None => false,
        }
    }

    /// Cancel every owned timer. Returns how many were still armed.
    pub fn release_all<E: Clone>(&mut self, scheduler: &mut Scheduler<E>) -> usize {
        self.slots
            .drain()
            .filter(|(_, id)| scheduler.cancel(*id))
            .count()
    }

    /// Drop the handle under `key` without cancelling, if it is `id`.
    /// Used once a one-shot timer has fired.
    pub fn forget(&mut self, key: K, id: TimerId) -> bool {
        if self.slots.get(&key) == Some(&id) {
            self.slots.remove(&key);
            true
        } else {
            false
        }
    }

    pub fn get(&self, key: K) -> Option<TimerId> {
        self.slots.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Default for TimerSlots<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pulse_core::SceneTime;

    use super::*;

    #[test]
    fn test_replace_cancels_superseded() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        let mut slots = TimerSlots::new();

        let first = sched.every(Duration::from_millis(100), 1);
        assert_eq!(slots.replace("burst", first, &mut sched), None);

        let second = sched.every(Duration::from_millis(100), 2);
        assert_eq!(slots.replace("burst", second, &mut sched), Some(first));

        assert!(!sched.is_pending(first));
        assert!(sched.is_pending(second));
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_release_all_leaves_nothing_armed() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        let mut slots = TimerSlots::new();

        for key in 0..4u8 {
            let id = sched.after(Duration::from_millis(50), key);
            slots.replace(key, id, &mut sched);
        }

        assert_eq!(slots.release_all(&mut sched), 4);
        assert!(slots.is_empty());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_forget_only_matching_handle() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        let mut slots = TimerSlots::new();

        let id = sched.after(Duration::from_millis(10), 0);
        slots.replace('k', id, &mut sched);
        let fired = sched.pop_due(SceneTime::from_millis(10));
        assert!(fired.is_some());

        assert!(!slots.forget('k', TimerId::new(999)));
        assert!(slots.forget('k', id));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_release_fired_timer_reports_false() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        let mut slots = TimerSlots::new();

        let id = sched.after(Duration::from_millis(10), 0);
        slots.replace('k', id, &mut sched);
        let _ = sched.pop_due(SceneTime::from_millis(10));

        assert!(!slots.release('k', &mut sched));
    }
}
