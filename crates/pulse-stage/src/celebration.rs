//! Success celebration
//!
//! Two things happen once the waitlist submission lands: an entrance
//! timeline (circle scales in, checkmark draws, text slides in staggered)
//! and a bounded particle stream from both sides of the screen that thins
//! out as it nears its end.

use std::time::Duration;

use rand::Rng;

use pulse_core::{Origin, Property, SceneTime};
use pulse_motion::{Easing, Gesture, Step, Timeline};

use crate::{BurstStyle, CelebrationConfig};

/// Text items revealed in order
pub const SUCCESS_ITEMS: [&str; 3] = ["title", "message", "close"];

/// Stroke length of the checkmark path
pub const CHECK_DASH: f32 = 60.0;

/// Entrance timeline of the success view
pub fn success_timeline() -> Timeline {
    let circle = Gesture::once("circle-in")
        .track_from(Property::Scale, 0.0, [Step::to(1.0, 600, Easing::BackOut(1.7))])
        .track_from(Property::Opacity, 0.0, [Step::to(1.0, 600, Easing::BackOut(1.7))]);
    let check = Gesture::once("check-draw").track_from(
        Property::DashOffset,
        CHECK_DASH,
        [Step::to(0.0, 800, Easing::OutCubic)],
    );
    let item = Gesture::once("item-in")
        .track_from(Property::TranslateY, 20.0, [Step::to(0.0, 800, Easing::OutQuart)])
        .track_from(Property::Opacity, 0.0, [Step::to(1.0, 800, Easing::OutQuart)]);

    Timeline::new()
        .at("circle", Duration::ZERO, circle)
        .at("check", Duration::from_millis(300), check)
        .stagger(
            &SUCCESS_ITEMS,
            Duration::from_millis(600),
            Duration::from_millis(200),
            item,
        )
}

/// Slide-in state of one text item
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemFrame {
    pub offset_y: f32,
    pub opacity: f32,
}

/// Entrance values at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceFrame {
    pub circle_scale: f32,
    pub circle_opacity: f32,
    pub check_dash_offset: f32,
    pub items: [ItemFrame; 3],
}

/// A running success celebration
#[derive(Clone, Debug)]
pub struct SuccessCelebration {
    config: CelebrationConfig,
    started_at: SceneTime,
    timeline: Timeline,
    ticks: u32,
}

impl SuccessCelebration {
    pub fn start(config: CelebrationConfig, now: SceneTime) -> Self {
        SuccessCelebration {
            config,
            started_at: now,
            timeline: success_timeline(),
            ticks: 0,
        }
    }

    pub fn started_at(&self) -> SceneTime {
        self.started_at
    }

    /// Time left in the particle stream
    pub fn remaining(&self, now: SceneTime) -> Duration {
        self.config.duration.saturating_sub(now.since(self.started_at))
    }

    pub fn is_streaming(&self, now: SceneTime) -> bool {
        !self.remaining(now).is_zero()
    }

    /// Particles per burst, shrinking linearly to zero
    pub fn particles_at(&self, now: SceneTime) -> u32 {
        let total = self.config.duration.as_secs_f32();
        if total <= 0.0 {
            return 0;
        }
        let share = self.remaining(now).as_secs_f32() / total;
        (self.config.peak_particles as f32 * share).floor() as u32
    }

    /// Origins and style of the paired bursts for one stream tick, or
    /// `None` once the stream has run out
    pub fn tick<R: Rng>(&mut self, now: SceneTime, rng: &mut R) -> Option<[(Origin, BurstStyle); 2]> {
        if !self.is_streaming(now) {
            return None;
        }
        self.ticks += 1;

        let style = BurstStyle {
            particles: self.particles_at(now),
            ..self.config.style
        };
        let mut origin = |(lo, hi): (f32, f32)| Origin {
            x: if hi > lo { rng.gen_range(lo..hi) } else { lo },
            y: rng.gen::<f32>() - 0.2,
        };
        Some([
            (origin(self.config.left_origin), style),
            (origin(self.config.right_origin), style),
        ])
    }

    /// Stream ticks fired so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Entrance animation values at `now`
    pub fn entrance(&self, now: SceneTime) -> EntranceFrame {
        let elapsed = now.since(self.started_at);
        let sample = |target: &str, property: Property, rest: f32| {
            self.timeline.sample(target, property, elapsed).unwrap_or(rest)
        };
        let item = |target: &str| ItemFrame {
            offset_y: sample(target, Property::TranslateY, 0.0),
            opacity: sample(target, Property::Opacity, 1.0),
        };

        EntranceFrame {
            circle_scale: sample("circle", Property::Scale, 1.0),
            circle_opacity: sample("circle", Property::Opacity, 1.0),
            check_dash_offset: sample("check", Property::DashOffset, 0.0),
            items: SUCCESS_ITEMS.map(item),
        }
    }

    pub fn entrance_finished(&self, now: SceneTime) -> bool {
        self.timeline.is_finished(now.since(self.started_at))
    }
}
