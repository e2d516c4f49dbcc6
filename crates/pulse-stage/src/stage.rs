//! Hero stage runtime
//!
//! The stage is the single owner of every timer, animation and piece of UI
//! state behind the hero. It is driven from outside:
//!
//! 1. Input methods (`pointer_enter`, `activate`, `open_modal`, ...) mutate
//!    state and arm timers
//! 2. [`Stage::advance`] moves the scene clock and dispatches every timer
//!    that came due, in deadline order
//! 3. The renderer drains [`Effect`]s with [`Stage::pop_effect`] and samples
//!    transforms with [`Stage::transform`]
//!
//! Every timer lives in one [`TimerSlots`] table, so unmounting releases
//! all of them and nothing mutates the stage afterwards.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use pulse_core::{Actor, Origin, PulseError, PulseResult, Rect, SceneTime, Transform, Viewport};
use pulse_motion::{PoseCycler, PoseLibrary};
use pulse_time::{Fired, Scheduler, TimerSlots};
use pulse_waitlist::{SubmissionState, SubmitResult, WaitlistForm, WaitlistRecord};

use crate::{
    ActorState, BubbleState, Burst, BurstLimiter, BurstSource, BurstStyle, Choreographer,
    CloseReason, EntranceFrame, ModalState, StageConfig, StageError, StageResult,
    SuccessCelebration,
};

/// Timer payloads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    AdvancePose(Actor),
    HoverBurst(Actor),
    /// Dismiss the bubble shown at this generation
    BubbleExpired { generation: u64 },
    /// Release one burst's hold on the limiter
    BurstExpired { burst: u64 },
    CelebrationTick,
    CelebrationEnd,
}

/// What each owned timer is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TimerKey {
    Pose(Actor),
    HoverBurst(Actor),
    Bubble,
    BurstExpiry(u64),
    CelebrationTick,
    CelebrationEnd,
}

/// Render effect for the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    PoseChanged { actor: Actor, index: usize },
    Burst(Burst),
    BubbleChanged(Option<Actor>),
    ModalChanged { open: bool },
    OptionalPanelChanged { shown: bool },
    SubmissionChanged(SubmissionState),
    CelebrationStarted,
    /// `completed` is false when the success view was closed early
    CelebrationFinished { completed: bool },
}

/// Matches a delivery outcome to the attempt that caused it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    session: u64,
    attempt: u32,
}

/// A validated submission ready for delivery
#[derive(Clone, Debug)]
pub struct Submission {
    pub ticket: SubmissionTicket,
    pub record: WaitlistRecord,
}

#[derive(Clone, Debug, Default)]
pub struct StageStats {
    pub timers_fired: u64,
    pub pose_changes: u64,
    pub bursts_fired: u64,
    pub bursts_refused: u64,
    pub effects_dropped: u64,
    pub submissions: u64,
    pub celebrations: u64,
}

/// The hero stage
#[derive(Debug)]
pub struct Stage {
    config: StageConfig,
    poses: Arc<PoseLibrary>,
    scheduler: Scheduler<StageEvent>,
    timers: TimerSlots<TimerKey>,
    mounted: bool,
    cyclers: [PoseCycler; 2],
    choreographer: Choreographer,
    bursts: BurstLimiter,
    bubble: BubbleState,
    modal: ModalState,
    celebration: Option<SuccessCelebration>,
    viewport: Viewport,
    anchors: [Rect; 2],
    rng: StdRng,
    effects: VecDeque<Effect>,
    stats: StageStats,
}

impl Stage {
    /// Create an unmounted stage. Fails if an actor has no poses.
    pub fn new(config: StageConfig, poses: Arc<PoseLibrary>) -> PulseResult<Self> {
        let cycler = |actor: Actor| {
            let cycle = config.cycler.for_actor(actor);
            PoseCycler::new(actor, poses.pose_count(actor), cycle.start, cycle.period)
        };
        let cyclers = [cycler(Actor::Left)?, cycler(Actor::Right)?];
        let rng = match config.celebration.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Stage {
            config,
            poses,
            scheduler: Scheduler::new(),
            timers: TimerSlots::new(),
            mounted: false,
            cyclers,
            choreographer: Choreographer::new(config.motion),
            bursts: BurstLimiter::new(config.burst.ceiling),
            bubble: BubbleState::new(),
            modal: ModalState::new(),
            celebration: None,
            viewport: Viewport::default(),
            anchors: [
                Rect::new(360.0, 320.0, 240.0, 420.0),
                Rect::new(840.0, 320.0, 240.0, 420.0),
            ],
            rng,
            effects: VecDeque::new(),
            stats: StageStats::default(),
        })
    }

    // Lifecycle

    /// Start pose cycling and idle breathing. The first pose of each actor
    /// is loaded and normalized before anything is armed.
    pub fn mount(&mut self) -> PulseResult<()> {
        if self.mounted {
            return Ok(());
        }
        for actor in Actor::ALL {
            let start = self.config.cycler.for_actor(actor).start;
            self.cyclers[actor.index()].reset(start);
            self.poses.get(actor, self.cyclers[actor.index()].index())?;
        }

        self.mounted = true;
        for actor in Actor::ALL {
            let cycler = &self.cyclers[actor.index()];
            let index = cycler.index();
            let id = self
                .scheduler
                .every(cycler.period(), StageEvent::AdvancePose(actor));
            self.timers
                .replace(TimerKey::Pose(actor), id, &mut self.scheduler);
            self.emit(Effect::PoseChanged { actor, index });
        }
        let now = self.now();
        self.choreographer.start_idle(now);

        tracing::info!(?now, "stage mounted");
        Ok(())
    }

    /// Release every timer, animation and piece of transient state.
    /// Returns how many timers were still armed.
    pub fn unmount(&mut self) -> usize {
        if !self.mounted {
            return 0;
        }

        let released = self.timers.release_all(&mut self.scheduler);
        let stray = self.scheduler.clear();
        if stray > 0 {
            tracing::warn!(stray, "unowned timers cancelled at unmount");
        }
        self.choreographer.clear();
        self.bursts.release_all();
        self.bubble.clear();
        if self.modal.close() {
            tracing::debug!(reason = ?CloseReason::Unmount, "waitlist modal closed");
        }
        self.celebration = None;
        self.mounted = false;

        tracing::info!(released, "stage unmounted");
        released
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn ensure_mounted(&self) -> PulseResult<()> {
        if self.mounted {
            Ok(())
        } else {
            Err(PulseError::NotMounted)
        }
    }

    // Clock

    pub fn now(&self) -> SceneTime {
        self.scheduler.now()
    }

    /// Advance the scene clock by `dt`, dispatching every timer that comes
    /// due on the way. Returns how many timers fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let target = self.now() + dt;
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(target) {
            fired += 1;
            self.dispatch(timer);
        }
        self.scheduler.advance_to(target);
        self.choreographer.retire(target);
        self.stats.timers_fired += fired as u64;
        fired
    }

    fn dispatch(&mut self, fired: Fired<StageEvent>) {
        match fired.event {
            StageEvent::AdvancePose(actor) => {
                let index = self.cyclers[actor.index()].advance();
                self.stats.pose_changes += 1;
                self.emit(Effect::PoseChanged { actor, index });
            }
            StageEvent::HoverBurst(actor) => {
                self.fire_hover_burst(actor);
            }
            StageEvent::BubbleExpired { generation } => {
                self.timers.forget(TimerKey::Bubble, fired.id);
                if self.bubble.expire(generation) {
                    tracing::debug!(generation, "speech bubble dismissed");
                    self.emit(Effect::BubbleChanged(None));
                }
            }
            StageEvent::BurstExpired { burst } => {
                self.timers.forget(TimerKey::BurstExpiry(burst), fired.id);
                self.bursts.on_expired();
            }
            StageEvent::CelebrationTick => self.celebration_tick(),
            StageEvent::CelebrationEnd => {
                self.timers.forget(TimerKey::CelebrationEnd, fired.id);
                self.finish_celebration(true);
            }
        }
    }

    // Pointer input

    /// Pointer entered `actor`: hover loop plus a burst now and every hover
    /// period. Re-entering supersedes the running loop and burst timer.
    pub fn pointer_enter(&mut self, actor: Actor) -> PulseResult<()> {
        self.ensure_mounted()?;
        let now = self.now();
        let superseded = self.choreographer.enter(actor, now);
        self.fire_hover_burst(actor);
        let id = self
            .scheduler
            .every(self.config.burst.hover_period, StageEvent::HoverBurst(actor));
        self.timers
            .replace(TimerKey::HoverBurst(actor), id, &mut self.scheduler);

        tracing::debug!(%actor, superseded, "hover started");
        Ok(())
    }

    /// Pointer left `actor`: stop the loop and bursts, ease back to rest
    pub fn pointer_leave(&mut self, actor: Actor) -> PulseResult<()> {
        self.ensure_mounted()?;
        self.timers
            .release(TimerKey::HoverBurst(actor), &mut self.scheduler);
        let now = self.now();
        self.choreographer.leave(actor, now);

        tracing::debug!(%actor, "hover ended");
        Ok(())
    }

    /// Click on `actor`: celebration jump and bubble toggle. Returns the
    /// bubble now showing.
    pub fn activate(&mut self, actor: Actor) -> PulseResult<Option<Actor>> {
        self.ensure_mounted()?;
        let now = self.now();
        self.choreographer.activate(actor, now);

        let generation = self.bubble.toggle(actor);
        let active = self.bubble.active();
        if active.is_some() {
            let id = self.scheduler.after(
                self.config.bubble.dismiss_after,
                StageEvent::BubbleExpired { generation },
            );
            self.timers.replace(TimerKey::Bubble, id, &mut self.scheduler);
        } else {
            self.timers.release(TimerKey::Bubble, &mut self.scheduler);
        }

        tracing::debug!(%actor, ?active, generation, "speech bubble toggled");
        self.emit(Effect::BubbleChanged(active));
        Ok(active)
    }

    /// Update where the actors sit on screen
    pub fn set_layout(&mut self, viewport: Viewport, anchors: [Rect; 2]) {
        self.viewport = viewport;
        self.anchors = anchors;
    }

    pub fn set_anchor(&mut self, actor: Actor, anchor: Rect) {
        self.anchors[actor.index()] = anchor;
    }

    // Bursts

    fn fire_hover_burst(&mut self, actor: Actor) -> Option<u64> {
        let origin = self.viewport.origin_of(&self.anchors[actor.index()]);
        let style = self.config.burst.hover;
        self.fire_burst(BurstSource::Hover(actor), origin, style)
    }

    fn fire_burst(
        &mut self,
        source: BurstSource,
        origin: Origin,
        style: BurstStyle,
    ) -> Option<u64> {
        let Some(id) = self.bursts.try_fire() else {
            self.stats.bursts_refused += 1;
            return None;
        };

        let timer = self
            .scheduler
            .after(self.config.burst.expiry, StageEvent::BurstExpired { burst: id });
        self.timers
            .replace(TimerKey::BurstExpiry(id), timer, &mut self.scheduler);
        self.stats.bursts_fired += 1;
        self.emit(Effect::Burst(Burst {
            id,
            source,
            origin,
            style,
        }));
        Some(id)
    }

    // Modal and waitlist

    /// Open the waitlist modal with a blank form
    pub fn open_modal(&mut self) -> PulseResult<bool> {
        self.ensure_mounted()?;
        if !self.modal.open() {
            return Ok(false);
        }
        tracing::info!(session = self.modal.session(), "waitlist modal opened");
        self.emit(Effect::ModalChanged { open: true });
        Ok(true)
    }

    /// Close the modal, discarding the form, the flow and any running
    /// celebration
    pub fn close_modal(&mut self, reason: CloseReason) -> PulseResult<bool> {
        self.ensure_mounted()?;
        if !self.modal.close() {
            return Ok(false);
        }
        self.finish_celebration(false);
        tracing::info!(?reason, "waitlist modal closed");
        self.emit(Effect::ModalChanged { open: false });
        Ok(true)
    }

    /// Expand or collapse the optional fields panel
    pub fn toggle_optional(&mut self) -> StageResult<bool> {
        self.ensure_mounted()?;
        let flow = self.modal.flow_mut().ok_or(StageError::ModalClosed)?;
        let shown = flow.toggle_optional();
        self.emit(Effect::OptionalPanelChanged { shown });
        Ok(shown)
    }

    /// Validate `form` and enter `Submitting`. The caller delivers the
    /// record and reports back with [`Stage::complete_submit`].
    pub fn begin_submit(&mut self, form: &WaitlistForm) -> StageResult<Submission> {
        self.ensure_mounted()?;
        let session = self.modal.session();
        let flow = self.modal.flow_mut().ok_or(StageError::ModalClosed)?;
        let record = flow.begin_submit(form)?;
        let ticket = SubmissionTicket {
            session,
            attempt: flow.attempts(),
        };
        let state = flow.state().clone();

        self.stats.submissions += 1;
        self.emit(Effect::SubmissionChanged(state));
        Ok(Submission { ticket, record })
    }

    /// Feed back a delivery outcome. Outcomes for a closed or reopened
    /// modal, or for a superseded attempt, are dropped. Returns true if the
    /// submission just succeeded; the celebration starts then.
    pub fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmitResult<()>,
    ) -> StageResult<bool> {
        self.ensure_mounted()?;
        let session = self.modal.session();
        let Some(flow) = self.modal.flow_mut() else {
            tracing::debug!(?ticket, "outcome for a closed modal dropped");
            return Ok(false);
        };
        if ticket.session != session || ticket.attempt != flow.attempts() {
            tracing::debug!(?ticket, "stale submission outcome dropped");
            return Ok(false);
        }

        let before = flow.state().clone();
        let delivered = flow.complete(outcome);
        let state = flow.state().clone();
        if state != before {
            self.emit(Effect::SubmissionChanged(state));
        }
        if delivered {
            self.start_celebration();
        }
        Ok(delivered)
    }

    // Celebration

    fn start_celebration(&mut self) {
        let config = self.config.celebration;
        let now = self.now();
        self.celebration = Some(SuccessCelebration::start(config, now));

        let tick = self.scheduler.every(config.tick, StageEvent::CelebrationTick);
        self.timers
            .replace(TimerKey::CelebrationTick, tick, &mut self.scheduler);
        let end = self.scheduler.after(config.duration, StageEvent::CelebrationEnd);
        self.timers
            .replace(TimerKey::CelebrationEnd, end, &mut self.scheduler);

        self.stats.celebrations += 1;
        tracing::info!("success celebration started");
        self.emit(Effect::CelebrationStarted);
    }

    fn celebration_tick(&mut self) {
        let now = self.now();
        let Some(celebration) = self.celebration.as_mut() else {
            return;
        };
        let Some(pair) = celebration.tick(now, &mut self.rng) else {
            return;
        };
        for (origin, style) in pair {
            self.fire_burst(BurstSource::Celebration, origin, style);
        }
    }

    fn finish_celebration(&mut self, completed: bool) {
        if self.celebration.take().is_none() {
            return;
        }
        self.timers
            .release(TimerKey::CelebrationTick, &mut self.scheduler);
        self.timers
            .release(TimerKey::CelebrationEnd, &mut self.scheduler);

        tracing::debug!(completed, "success celebration finished");
        self.emit(Effect::CelebrationFinished { completed });
    }

    // Effects

    fn emit(&mut self, effect: Effect) {
        if self.effects.len() >= self.config.max_pending_effects {
            self.stats.effects_dropped += 1;
            tracing::debug!(?effect, "effect queue full, dropping");
            return;
        }
        self.effects.push_back(effect);
    }

    /// Next render effect, oldest first
    pub fn pop_effect(&mut self) -> Option<Effect> {
        self.effects.pop_front()
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.effects.drain(..).collect()
    }

    // Queries

    /// Composed transform of `actor` right now
    pub fn transform(&self, actor: Actor) -> Transform {
        self.choreographer.transform(actor, self.now())
    }

    pub fn pose_index(&self, actor: Actor) -> usize {
        self.cyclers[actor.index()].index()
    }

    /// Normalized payload of `actor`'s current pose
    pub fn pose(&self, actor: Actor) -> PulseResult<Arc<Value>> {
        self.poses.get(actor, self.pose_index(actor))
    }

    pub fn actor_state(&self, actor: Actor) -> ActorState {
        self.choreographer.state(actor, self.now())
    }

    /// Looping hover sequences installed on `actor`
    pub fn hover_loops(&self, actor: Actor) -> usize {
        self.choreographer.hover_loops(actor)
    }

    /// Animation handles held across both actors
    pub fn live_animations(&self) -> usize {
        self.choreographer.live_animations()
    }

    pub fn active_bubble(&self) -> Option<Actor> {
        self.bubble.active()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_open()
    }

    pub fn submission_state(&self) -> Option<&SubmissionState> {
        self.modal.flow().map(|flow| flow.state())
    }

    pub fn shows_optional(&self) -> bool {
        self.modal.flow().is_some_and(|flow| flow.shows_optional())
    }

    pub fn bursts_in_flight(&self) -> usize {
        self.bursts.in_flight()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_some()
    }

    /// Success view entrance values, while the success view is up
    pub fn entrance_frame(&self) -> Option<EntranceFrame> {
        self.celebration.as_ref().map(|c| c.entrance(self.now()))
    }

    /// Timers still armed
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn stats(&self) -> &StageStats {
        &self.stats
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }
}
