//! Entrance timelines
//!
//! A timeline positions one-shot gestures on named targets at fixed
//! offsets. Targets hold their first cue's pinned starting value until that
//! cue begins, so nothing flashes in at its final state.

use std::time::Duration;

use pulse_core::Property;

use crate::{Gesture, Repeat};

/// A gesture scheduled on a target
#[derive(Clone, Debug)]
pub struct Cue {
    pub target: &'static str,
    pub at: Duration,
    pub gesture: Gesture,
}

/// One-shot sequence of cues
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    cues: Vec<Cue>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `gesture` on `target` at offset `at`
    pub fn at(mut self, target: &'static str, at: Duration, gesture: Gesture) -> Self {
        self.cues.push(Cue { target, at, gesture });
        self
    }

    /// Schedule `gesture` on each target in turn, `every` apart
    pub fn stagger(
        mut self,
        targets: &[&'static str],
        at: Duration,
        every: Duration,
        gesture: Gesture,
    ) -> Self {
        for (i, target) in targets.iter().enumerate() {
            self.cues.push(Cue {
                target: *target,
                at: at + every * i as u32,
                gesture: gesture.clone(),
            });
        }
        self
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Time at which the last cue ends
    pub fn duration(&self) -> Duration {
        self.cues
            .iter()
            .map(|c| c.at + c.gesture.duration())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration()
    }

    /// Value of `property` on `target` at `elapsed`, or `None` if no cue
    /// animates it
    pub fn sample(&self, target: &str, property: Property, elapsed: Duration) -> Option<f32> {
        let mut matching = self.cues.iter().filter_map(|cue| {
            if cue.target != target {
                return None;
            }
            cue.gesture
                .tracks
                .iter()
                .find(|t| t.property == property)
                .map(|track| (cue.at, track))
        });

        let (first_at, first_track) = matching.next()?;
        let mut current = (first_at, first_track);
        for (at, track) in matching {
            if at <= elapsed && at >= current.0 {
                current = (at, track);
            }
        }

        let (at, track) = current;
        let origin = track.from.unwrap_or_else(|| property.rest_value());
        if elapsed < at {
            return Some(origin);
        }
        Some(track.sample(origin, elapsed - at, Repeat::Once).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Easing, Step};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn fade_in() -> Gesture {
        Gesture::once("fade").track_from(Property::Opacity, 0.0, [Step::to(1.0, 800, Easing::Linear)])
    }

    #[test]
    fn test_target_holds_pinned_value_before_cue() {
        let tl = Timeline::new().at("title", ms(600), fade_in());

        assert_eq!(tl.sample("title", Property::Opacity, ms(0)), Some(0.0));
        assert_eq!(tl.sample("title", Property::Opacity, ms(599)), Some(0.0));
        assert!((tl.sample("title", Property::Opacity, ms(1000)).unwrap_or(0.0) - 0.5).abs() < 1e-4);
        assert_eq!(tl.sample("title", Property::Opacity, ms(1400)), Some(1.0));
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let tl = Timeline::new().stagger(&["a", "b", "c"], ms(600), ms(200), fade_in());

        assert_eq!(tl.cues()[2].at, ms(1000));
        assert_eq!(tl.duration(), ms(1800));
        assert_eq!(tl.sample("c", Property::Opacity, ms(900)), Some(0.0));
        assert!(tl.sample("a", Property::Opacity, ms(900)).unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn test_unknown_target_or_property() {
        let tl = Timeline::new().at("title", ms(0), fade_in());

        assert_eq!(tl.sample("button", Property::Opacity, ms(0)), None);
        assert_eq!(tl.sample("title", Property::Scale, ms(0)), None);
    }

    #[test]
    fn test_finished_after_last_cue() {
        let tl = Timeline::new().at("a", ms(100), fade_in());

        assert!(!tl.is_finished(ms(899)));
        assert!(tl.is_finished(ms(900)));
    }
}
