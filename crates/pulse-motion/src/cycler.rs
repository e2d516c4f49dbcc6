//! Pose cycling
//!
//! Each actor walks its pose list on its own period. The two actors start
//! at different indices so they are visibly out of phase.

use std::time::Duration;

use pulse_core::{Actor, PulseError, PulseResult};

/// Cyclic index into an actor's pose list
/// INVARIANT: `index < len`, and `len > 0`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoseCycler {
    actor: Actor,
    index: usize,
    len: usize,
    period: Duration,
}

impl PoseCycler {
    /// Create a cycler over `len` poses starting at `start` (wrapped)
    pub fn new(actor: Actor, len: usize, start: usize, period: Duration) -> PulseResult<Self> {
        if len == 0 {
            return Err(PulseError::EmptyPoseList(actor));
        }
        Ok(PoseCycler {
            actor,
            index: start % len,
            len,
            period,
        })
    }

    /// Step to the next pose, wrapping at the end of the list
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.len;
        self.index
    }

    /// Put the cycler back on `start`
    pub fn reset(&mut self, start: usize) {
        self.index = start % self.len;
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_list_rejected() {
        let err = PoseCycler::new(Actor::Left, 0, 0, Duration::from_millis(500));
        assert!(matches!(err, Err(PulseError::EmptyPoseList(Actor::Left))));
    }

    #[test]
    fn test_wraps_at_end() {
        let mut cycler = PoseCycler::new(Actor::Right, 7, 3, Duration::from_millis(450)).unwrap();
        let seen: Vec<usize> = (0..6).map(|_| cycler.advance()).collect();

        assert_eq!(seen, vec![4, 5, 6, 0, 1, 2]);
    }

    #[test]
    fn test_start_is_wrapped() {
        let cycler = PoseCycler::new(Actor::Left, 7, 10, Duration::from_millis(500)).unwrap();
        assert_eq!(cycler.index(), 3);
    }

    proptest! {
        #[test]
        fn prop_index_after_k_steps(len in 1usize..32, start in 0usize..64, k in 0usize..500) {
            let mut cycler = PoseCycler::new(Actor::Left, len, start, Duration::from_millis(100)).unwrap();
            for _ in 0..k {
                cycler.advance();
                prop_assert!(cycler.index() < len);
            }
            prop_assert_eq!(cycler.index(), (start + k) % len);
        }
    }
}
