//! Gesture DSL
//!
//! A gesture is a set of property tracks. Each track is a sequence of
//! steps `(target value, duration, easing)` played from the property's
//! value at the moment the gesture starts, unless the track pins an
//! explicit starting value.

use std::time::Duration;

use pulse_core::Property;

use crate::Easing;

/// One keyframe step: move to `target` over `duration`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub target: f32,
    pub duration: Duration,
    pub easing: Easing,
}

impl Step {
    /// Step with an explicit easing
    pub fn to(target: f32, millis: u64, easing: Easing) -> Self {
        Step {
            target,
            duration: Duration::from_millis(millis),
            easing,
        }
    }

    /// Step with the default easing
    pub fn ease(target: f32, millis: u64) -> Self {
        Self::to(target, millis, Easing::default())
    }
}

/// How a gesture repeats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play once and hold the last value
    Once,
    /// Restart every track from its origin when it ends
    Loop,
    /// Play each track forward, then backward, forever
    Alternate,
}

/// Keyframes for one property
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub property: Property,
    /// Pinned starting value; `None` starts from the live value
    pub from: Option<f32>,
    /// Hold at the origin before the first step
    pub delay: Duration,
    pub steps: Vec<Step>,
}

impl Track {
    /// Length of one pass through the steps
    pub fn cycle(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Value of this track `elapsed` after the gesture started, played from
    /// `origin`. The flag is true once a `Once` track has ended.
    pub fn sample(&self, origin: f32, elapsed: Duration, repeat: Repeat) -> (f32, bool) {
        let origin = self.from.unwrap_or(origin);
        let Some(last) = self.steps.last() else {
            return (origin, true);
        };
        if elapsed < self.delay {
            return (origin, false);
        }

        let cycle = self.cycle();
        let t = elapsed - self.delay;
        if cycle.is_zero() {
            return (last.target, repeat == Repeat::Once);
        }

        let local = match repeat {
            Repeat::Once => {
                if t >= cycle {
                    return (last.target, true);
                }
                t
            }
            Repeat::Loop => Duration::from_nanos((t.as_nanos() % cycle.as_nanos()) as u64),
            Repeat::Alternate => {
                let pass = t.as_nanos() / cycle.as_nanos();
                let into = Duration::from_nanos((t.as_nanos() % cycle.as_nanos()) as u64);
                if pass % 2 == 0 {
                    into
                } else {
                    cycle - into
                }
            }
        };

        (self.value_at(origin, local), false)
    }

    fn value_at(&self, origin: f32, mut local: Duration) -> f32 {
        let mut start = origin;
        for step in &self.steps {
            if local < step.duration {
                let t = local.as_secs_f32() / step.duration.as_secs_f32();
                return step.easing.lerp(start, step.target, t);
            }
            local -= step.duration;
            start = step.target;
        }
        start
    }
}

/// Scripted multi-property transform sequence
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    pub name: &'static str,
    pub repeat: Repeat,
    pub tracks: Vec<Track>,
}

impl Gesture {
    /// Gesture that plays once
    pub fn once(name: &'static str) -> Self {
        Self::new(name, Repeat::Once)
    }

    /// Gesture whose tracks restart until stopped
    pub fn looping(name: &'static str) -> Self {
        Self::new(name, Repeat::Loop)
    }

    /// Gesture whose tracks ping-pong until stopped
    pub fn alternating(name: &'static str) -> Self {
        Self::new(name, Repeat::Alternate)
    }

    fn new(name: &'static str, repeat: Repeat) -> Self {
        Gesture {
            name,
            repeat,
            tracks: Vec::new(),
        }
    }

    /// Add a track starting from the live value
    pub fn track(mut self, property: Property, steps: impl IntoIterator<Item = Step>) -> Self {
        self.tracks.push(Track {
            property,
            from: None,
            delay: Duration::ZERO,
            steps: steps.into_iter().collect(),
        });
        self
    }

    /// Add a track with a pinned starting value
    pub fn track_from(
        mut self,
        property: Property,
        from: f32,
        steps: impl IntoIterator<Item = Step>,
    ) -> Self {
        self.tracks.push(Track {
            property,
            from: Some(from),
            delay: Duration::ZERO,
            steps: steps.into_iter().collect(),
        });
        self
    }

    /// Delay every track
    pub fn delayed(mut self, delay: Duration) -> Self {
        for track in &mut self.tracks {
            track.delay = delay;
        }
        self
    }

    pub fn is_looping(&self) -> bool {
        self.repeat != Repeat::Once
    }

    /// Length of a single play (longest delay + track cycle)
    pub fn duration(&self) -> Duration {
        self.tracks
            .iter()
            .map(|t| t.delay + t.cycle())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Properties this gesture drives
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.tracks.iter().map(|t| t.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump() -> Gesture {
        Gesture::once("jump").track(
            Property::TranslateY,
            [
                Step::to(-60.0, 400, Easing::Linear),
                Step::to(0.0, 200, Easing::Linear),
            ],
        )
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_once_track_walks_steps() {
        let track = &jump().tracks[0];

        assert_eq!(track.sample(0.0, ms(0), Repeat::Once), (0.0, false));
        assert!((track.sample(0.0, ms(200), Repeat::Once).0 + 30.0).abs() < 1e-3);
        assert!((track.sample(0.0, ms(400), Repeat::Once).0 + 60.0).abs() < 1e-3);
        assert!((track.sample(0.0, ms(500), Repeat::Once).0 + 30.0).abs() < 1e-3);
        assert_eq!(track.sample(0.0, ms(600), Repeat::Once), (0.0, true));
    }

    #[test]
    fn test_loop_restarts_from_origin() {
        let track = &jump().tracks[0];
        let first = track.sample(5.0, ms(100), Repeat::Loop);
        let again = track.sample(5.0, ms(700), Repeat::Loop);

        assert!((first.0 - again.0).abs() < 1e-3);
        assert!(!again.1);
    }

    #[test]
    fn test_alternate_plays_backwards() {
        let g = Gesture::alternating("breathe").track_from(
            Property::ScaleY,
            1.0,
            [Step::to(1.02, 2000, Easing::Linear)],
        );
        let track = &g.tracks[0];

        let forward = track.sample(1.0, ms(1500), Repeat::Alternate).0;
        let backward = track.sample(1.0, ms(2500), Repeat::Alternate).0;
        assert!((forward - backward).abs() < 1e-4);
        assert!((track.sample(1.0, ms(4000), Repeat::Alternate).0 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_delay_holds_origin() {
        let g = jump().delayed(ms(300));
        let track = &g.tracks[0];

        assert_eq!(track.sample(2.0, ms(299), Repeat::Once), (2.0, false));
        assert_eq!(g.duration(), ms(900));
    }

    #[test]
    fn test_pinned_origin_wins() {
        let g = Gesture::once("draw").track_from(
            Property::DashOffset,
            60.0,
            [Step::to(0.0, 800, Easing::Linear)],
        );
        assert_eq!(g.tracks[0].sample(0.0, ms(0), Repeat::Once).0, 60.0);
    }

    #[test]
    fn test_empty_track_is_finished() {
        let g = Gesture::once("noop").track(Property::Scale, []);
        assert_eq!(g.tracks[0].sample(1.0, ms(10), Repeat::Once), (1.0, true));
        assert_eq!(g.duration(), Duration::ZERO);
    }
}
