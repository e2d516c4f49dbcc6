//! Per-actor animation channels

use pulse_core::{SceneTime, Transform};

use crate::Gesture;

/// Animation channel, in composition order (later channels win)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Ambient breathing
    Idle,
    /// Hover loop and the return to rest
    Hover,
    /// One-shot click celebration
    Click,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Idle, Channel::Hover, Channel::Click];

    fn slot(self) -> usize {
        match self {
            Channel::Idle => 0,
            Channel::Hover => 1,
            Channel::Click => 2,
        }
    }
}

/// A gesture being played on a channel
#[derive(Clone, Debug)]
pub struct Playback {
    gesture: Gesture,
    started_at: SceneTime,
    /// Transform at the moment the gesture started
    origin: Transform,
}

impl Playback {
    pub fn new(gesture: Gesture, started_at: SceneTime, origin: Transform) -> Self {
        Playback {
            gesture,
            started_at,
            origin,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn started_at(&self) -> SceneTime {
        self.started_at
    }

    /// Write the properties this gesture drives into `out`
    pub fn sample_into(&self, now: SceneTime, out: &mut Transform) {
        let elapsed = now.since(self.started_at);
        for track in &self.gesture.tracks {
            let origin = self.origin.get(track.property);
            let (value, _) = track.sample(origin, elapsed, self.gesture.repeat);
            out.set(track.property, value);
        }
    }

    /// A one-shot gesture that has played out. Loops never finish.
    pub fn is_finished(&self, now: SceneTime) -> bool {
        !self.gesture.is_looping() && now.since(self.started_at) >= self.gesture.duration()
    }
}

/// Animation state of one actor
#[derive(Clone, Debug, Default)]
pub struct Animator {
    channels: [Option<Playback>; 3],
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `gesture` on `channel`, superseding whatever the channel was
    /// playing. The new gesture starts from the current composed transform.
    /// Returns the name of the superseded gesture, if any.
    pub fn play(&mut self, channel: Channel, gesture: Gesture, now: SceneTime) -> Option<&'static str> {
        let origin = self.sample(now);
        let previous = self.channels[channel.slot()].replace(Playback::new(gesture, now, origin));
        previous.map(|p| p.gesture.name)
    }

    /// Stop a channel, leaving the properties it drove to lower channels
    pub fn stop(&mut self, channel: Channel) -> Option<Playback> {
        self.channels[channel.slot()].take()
    }

    pub fn playback(&self, channel: Channel) -> Option<&Playback> {
        self.channels[channel.slot()].as_ref()
    }

    /// Is `channel` playing something that has not finished?
    pub fn is_live(&self, channel: Channel, now: SceneTime) -> bool {
        self.playback(channel).is_some_and(|p| !p.is_finished(now))
    }

    /// Composed transform. Finished one-shots no longer contribute; their
    /// final values are the resting values underneath them.
    pub fn sample(&self, now: SceneTime) -> Transform {
        let mut out = Transform::IDENTITY;
        for playback in self.channels.iter().flatten() {
            if !playback.is_finished(now) {
                playback.sample_into(now, &mut out);
            }
        }
        out
    }

    /// Number of looping gestures currently installed
    pub fn live_loops(&self) -> usize {
        self.channels
            .iter()
            .flatten()
            .filter(|p| p.gesture.is_looping())
            .count()
    }

    /// Drop finished one-shots. Returns how many were dropped.
    pub fn retire(&mut self, now: SceneTime) -> usize {
        let mut retired = 0;
        for slot in &mut self.channels {
            if slot.as_ref().is_some_and(|p| p.is_finished(now)) {
                *slot = None;
                retired += 1;
            }
        }
        retired
    }

    /// Stop every channel
    pub fn clear(&mut self) {
        self.channels = Default::default();
    }

    pub fn is_idle(&self) -> bool {
        self.channels.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pulse_core::Property;

    use super::*;
    use crate::{Easing, Step};

    fn hop() -> Gesture {
        Gesture::once("hop").track(Property::TranslateY, [Step::to(-20.0, 200, Easing::Linear)])
    }

    fn sway() -> Gesture {
        Gesture::looping("sway").track(
            Property::Rotate,
            [
                Step::to(-8.0, 300, Easing::Linear),
                Step::to(8.0, 200, Easing::Linear),
            ],
        )
    }

    fn at(ms: u64) -> SceneTime {
        SceneTime::from_millis(ms)
    }

    #[test]
    fn test_play_supersedes_same_channel() {
        let mut animator = Animator::new();
        assert_eq!(animator.play(Channel::Hover, sway(), at(0)), None);
        assert_eq!(animator.play(Channel::Hover, sway(), at(100)), Some("sway"));

        assert_eq!(animator.live_loops(), 1);
        assert_eq!(animator.playback(Channel::Hover).map(|p| p.started_at()), Some(at(100)));
    }

    #[test]
    fn test_channels_compose() {
        let mut animator = Animator::new();
        animator.play(Channel::Hover, sway(), at(0));
        animator.play(Channel::Click, hop(), at(0));

        let t = animator.sample(at(100));
        assert!(t.offset_y < 0.0);
        assert!(t.rotation < 0.0);
    }

    #[test]
    fn test_new_gesture_starts_from_live_value() {
        let mut animator = Animator::new();
        animator.play(Channel::Hover, sway(), at(0));
        let live = animator.sample(at(300)).rotation;

        let settle = Gesture::once("settle").track(Property::Rotate, [Step::to(0.0, 500, Easing::Linear)]);
        animator.play(Channel::Hover, settle, at(300));

        assert!((animator.sample(at(300)).rotation - live).abs() < 1e-4);
        assert_eq!(animator.sample(at(800)).rotation, 0.0);
    }

    #[test]
    fn test_finished_one_shot_releases_properties() {
        let mut animator = Animator::new();
        animator.play(Channel::Click, hop(), at(0));

        assert!(animator.is_live(Channel::Click, at(150)));
        assert!(!animator.is_live(Channel::Click, at(200)));
        assert_eq!(animator.sample(at(250)), Transform::IDENTITY);

        assert_eq!(animator.retire(at(250)), 1);
        assert!(animator.is_idle());
    }

    #[test]
    fn test_stop_and_clear() {
        let mut animator = Animator::new();
        animator.play(Channel::Idle, sway(), at(0));
        animator.play(Channel::Hover, sway(), at(0));

        assert!(animator.stop(Channel::Hover).is_some());
        assert_eq!(animator.live_loops(), 1);

        animator.clear();
        assert!(animator.is_idle());
        assert_eq!(animator.sample(at(1) + Duration::from_millis(5)), Transform::IDENTITY);
    }
}
