//! Hover and click choreography
//!
//! Each actor owns an [`Animator`]. Hover and click live on separate
//! channels: a click plays its one-shot jump over whatever the hover
//! channel is doing, and leaving only resets the hover channel.

use pulse_core::{Actor, SceneTime, Transform};
use pulse_motion::{Animator, Channel};

use crate::{gestures, MotionConfig};

/// What an actor is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorState {
    Resting,
    Hovering,
    /// Click jump in progress
    Celebrating,
}

#[derive(Clone, Debug, Default)]
struct ActorMotion {
    animator: Animator,
    hovering: bool,
}

/// Transform choreography for both actors
#[derive(Clone, Debug)]
pub struct Choreographer {
    config: MotionConfig,
    actors: [ActorMotion; 2],
}

impl Choreographer {
    pub fn new(config: MotionConfig) -> Self {
        Choreographer {
            config,
            actors: Default::default(),
        }
    }

    /// Start idle breathing on both actors
    pub fn start_idle(&mut self, now: SceneTime) {
        if !self.config.breathing {
            return;
        }
        for actor in Actor::ALL {
            self.actors[actor.index()]
                .animator
                .play(Channel::Idle, gestures::breathe(actor), now);
        }
    }

    /// Pointer entered `actor`. Returns true if a running hover loop was
    /// superseded.
    pub fn enter(&mut self, actor: Actor, now: SceneTime) -> bool {
        let motion = &mut self.actors[actor.index()];
        let was_hovering = std::mem::replace(&mut motion.hovering, true);
        motion
            .animator
            .play(Channel::Hover, gestures::hover_loop(actor), now);
        was_hovering
    }

    /// Pointer left `actor`: replace the hover loop with the return to rest
    pub fn leave(&mut self, actor: Actor, now: SceneTime) {
        let motion = &mut self.actors[actor.index()];
        motion.hovering = false;
        motion
            .animator
            .play(Channel::Hover, gestures::rest(self.config.rest_transition), now);
    }

    /// Click on `actor`: one-shot celebration jump, whatever the hover
    /// state
    pub fn activate(&mut self, actor: Actor, now: SceneTime) {
        self.actors[actor.index()]
            .animator
            .play(Channel::Click, gestures::celebrate(actor), now);
    }

    pub fn state(&self, actor: Actor, now: SceneTime) -> ActorState {
        let motion = &self.actors[actor.index()];
        if motion.animator.is_live(Channel::Click, now) {
            ActorState::Celebrating
        } else if motion.hovering {
            ActorState::Hovering
        } else {
            ActorState::Resting
        }
    }

    pub fn is_hovering(&self, actor: Actor) -> bool {
        self.actors[actor.index()].hovering
    }

    pub fn transform(&self, actor: Actor, now: SceneTime) -> Transform {
        self.actors[actor.index()].animator.sample(now)
    }

    /// Looping hover sequences installed on `actor` (0 or 1)
    pub fn hover_loops(&self, actor: Actor) -> usize {
        self.actors[actor.index()]
            .animator
            .playback(Channel::Hover)
            .filter(|p| p.gesture().is_looping())
            .map_or(0, |_| 1)
    }

    /// Animation handles held across both actors
    pub fn live_animations(&self) -> usize {
        self.actors
            .iter()
            .map(|m| {
                Channel::ALL
                    .iter()
                    .filter(|c| m.animator.playback(**c).is_some())
                    .count()
            })
            .sum()
    }

    /// Drop finished one-shots
    pub fn retire(&mut self, now: SceneTime) -> usize {
        self.actors
            .iter_mut()
            .map(|m| m.animator.retire(now))
            .sum()
    }

    /// Stop everything
    pub fn clear(&mut self) {
        for motion in &mut self.actors {
            motion.animator.clear();
            motion.hovering = false;
        }
    }
}
