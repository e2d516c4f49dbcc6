//! Deterministic timer scheduler
//!
//! Timers fire in deadline order; timers sharing a deadline fire in the
//! order they were (re)armed. Periodic timers keep their id across
//! firings, so a single handle cancels the whole series.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use pulse_core::{SceneTime, TimerId};

use crate::SceneClock;

/// Shortest accepted period. A zero period would re-arm at the same
/// instant forever.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// How a timer re-arms after firing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Fire once, then the handle is released
    Once,
    /// Fire every period until cancelled
    Every(Duration),
}

#[derive(Debug)]
struct Entry<E> {
    id: TimerId,
    cadence: Cadence,
    event: E,
}

/// A timer that came due
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    /// Deadline the timer was armed for
    pub at: SceneTime,
    pub event: E,
    /// True if the timer re-armed itself
    pub periodic: bool,
}

/// Timer scheduler on the scene clock
#[derive(Debug)]
pub struct Scheduler<E> {
    clock: SceneClock,
    /// Keyed by (deadline, arm sequence)
    queue: BTreeMap<(SceneTime, u64), Entry<E>>,
    /// Where each live timer sits in `queue`
    index: HashMap<TimerId, (SceneTime, u64)>,
    next_id: u64,
    next_seq: u64,
}

impl<E: Clone> Scheduler<E> {
    /// Create an empty scheduler at scene time zero
    pub fn new() -> Self {
        Scheduler {
            clock: SceneClock::new(),
            queue: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Current scene time
    pub fn now(&self) -> SceneTime {
        self.clock.now()
    }

    /// Fire `event` once after `delay`
    pub fn after(&mut self, delay: Duration, event: E) -> TimerId {
        let at = self.now() + delay;
        self.arm(at, Cadence::Once, event)
    }

    /// Fire `event` every `period`, first firing one period from now
    pub fn every(&mut self, period: Duration, event: E) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.every_from(period, period, event)
    }

    /// Fire `event` after `first`, then every `period`
    pub fn every_from(&mut self, first: Duration, period: Duration, event: E) -> TimerId {
        let at = self.now() + first;
        self.arm(at, Cadence::Every(period.max(MIN_PERIOD)), event)
    }

    fn arm(&mut self, at: SceneTime, cadence: Cadence, event: E) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        self.insert(id, at, cadence, event);
        id
    }

    fn insert(&mut self, id: TimerId, at: SceneTime, cadence: Cadence, event: E) {
        let key = (at, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key, Entry { id, cadence, event });
        self.index.insert(id, key);
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Is this timer still armed?
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Earliest armed deadline
    pub fn next_deadline(&self) -> Option<SceneTime> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Periodic timers are re-armed one period later.
    pub fn pop_due(&mut self, until: SceneTime) -> Option<Fired<E>> {
        let key = *self.queue.keys().next()?;
        if key.0 > until {
            return None;
        }

        let entry = self.queue.remove(&key)?;
        self.clock.advance_to(key.0);

        match entry.cadence {
            Cadence::Once => {
                self.index.remove(&entry.id);
                Some(Fired {
                    id: entry.id,
                    at: key.0,
                    event: entry.event,
                    periodic: false,
                })
            }
            Cadence::Every(period) => {
                let fired = Fired {
                    id: entry.id,
                    at: key.0,
                    event: entry.event.clone(),
                    periodic: true,
                };
                self.insert(entry.id, key.0 + period, entry.cadence, entry.event);
                Some(fired)
            }
        }
    }

    /// Move the clock forward without firing anything. Callers drain
    /// [`Scheduler::pop_due`] first.
    pub fn advance_to(&mut self, target: SceneTime) -> SceneTime {
        self.clock.advance_to(target)
    }

    /// Cancel everything. Returns how many timers were armed.
    pub fn clear(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.index.clear();
        count
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drain(s: &mut Scheduler<&'static str>, until: SceneTime) -> Vec<(u64, &'static str)> {
        let mut out = Vec::new();
        while let Some(fired) = s.pop_due(until) {
            out.push((fired.at.as_millis(), fired.event));
        }
        s.advance_to(until);
        out
    }

    #[test]
    fn test_once_fires_and_releases() {
        let mut s = Scheduler::new();
        let id = s.after(Duration::from_millis(100), "a");

        assert!(drain(&mut s, SceneTime::from_millis(99)).is_empty());
        assert_eq!(drain(&mut s, SceneTime::from_millis(100)), vec![(100, "a")]);
        assert!(!s.is_pending(id));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_every_keeps_handle() {
        let mut s = Scheduler::new();
        let id = s.every(Duration::from_millis(500), "tick");

        let fired = drain(&mut s, SceneTime::from_millis(1600));
        assert_eq!(fired, vec![(500, "tick"), (1000, "tick"), (1500, "tick")]);
        assert!(s.is_pending(id));

        assert!(s.cancel(id));
        assert!(drain(&mut s, SceneTime::from_millis(5000)).is_empty());
    }

    #[test]
    fn test_deadline_order_across_timers() {
        let mut s = Scheduler::new();
        s.every(Duration::from_millis(500), "left");
        s.every(Duration::from_millis(450), "right");

        let fired = drain(&mut s, SceneTime::from_millis(1000));
        assert_eq!(
            fired,
            vec![(450, "right"), (500, "left"), (900, "right"), (1000, "left")]
        );
    }

    #[test]
    fn test_equal_deadlines_fire_in_arm_order() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(10), "first");
        s.after(Duration::from_millis(10), "second");

        let fired = drain(&mut s, SceneTime::from_millis(10));
        assert_eq!(fired, vec![(10, "first"), (10, "second")]);
    }

    #[test]
    fn test_cancel_twice() {
        let mut s = Scheduler::new();
        let id = s.after(Duration::from_millis(10), "x");

        assert!(s.cancel(id));
        assert!(!s.cancel(id));
    }

    #[test]
    fn test_clock_moves_to_each_deadline() {
        let mut s = Scheduler::new();
        s.after(Duration::from_millis(30), "x");

        let fired = s.pop_due(SceneTime::from_millis(100));
        assert!(fired.is_some());
        assert_eq!(s.now(), SceneTime::from_millis(30));

        s.advance_to(SceneTime::from_millis(100));
        assert_eq!(s.now(), SceneTime::from_millis(100));
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut s = Scheduler::new();
        s.every(Duration::ZERO, "spin");

        let fired = drain(&mut s, SceneTime::from_millis(3));
        assert_eq!(fired.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_periodic_count_matches_elapsed(period_ms in 1u64..1000, elapsed_ms in 0u64..5_000) {
            let mut s = Scheduler::new();
            s.every(Duration::from_millis(period_ms), "p");
            let fired = drain(&mut s, SceneTime::from_millis(elapsed_ms));
            prop_assert_eq!(fired.len() as u64, elapsed_ms / period_ms);
        }
    }
}
