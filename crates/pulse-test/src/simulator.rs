//! Stage Simulator - Fake-clock harness for choreography testing
//!
//! Simulates:
//! - Frame ticks, optionally jittered like a real render loop
//! - A scripted visitor (hover, click, modal, form submission)
//! - Waitlist delivery with configurable latency and outcome
//!
//! Everything runs on the stage's virtual clock, so a ten minute visit
//! simulates in microseconds and is fully reproducible.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pulse_core::{Actor, PulseResult, SceneTime};
use pulse_motion::PoseLibrary;
use pulse_stage::{
    CloseReason, Effect, Stage, StageConfig, StageError, StageInput, SubmissionTicket,
};
use pulse_waitlist::SubmitError;

/// How simulated waitlist deliveries end
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    /// Succeed after the latency
    Succeed,
    /// Fail after the latency
    Fail(SubmitError),
    /// Never answer
    Hang,
}

/// Frame pacing model
#[derive(Clone, Debug)]
pub struct FrameModel {
    /// Nominal frame interval
    pub interval: Duration,
    /// Random extra delay per frame, up to this much
    pub jitter: Duration,
}

impl FrameModel {
    /// Steady 60 fps
    pub fn steady() -> Self {
        FrameModel {
            interval: Duration::from_millis(16),
            jitter: Duration::ZERO,
        }
    }

    /// Busy page: frames late by up to 40 ms
    pub fn janky() -> Self {
        FrameModel {
            interval: Duration::from_millis(16),
            jitter: Duration::from_millis(40),
        }
    }

    fn next(&self, rng: &mut StdRng) -> Duration {
        let jitter = self.jitter.as_micros() as u64;
        let extra = if jitter > 0 { rng.gen_range(0..=jitter) } else { 0 };
        self.interval + Duration::from_micros(extra)
    }
}

/// Simulated visit
pub struct StageSimulator {
    stage: Stage,
    frames: FrameModel,
    rng: StdRng,
    script: BTreeMap<(SceneTime, u64), StageInput>,
    script_seq: u64,
    delivery: Delivery,
    latency: Duration,
    pending_deliveries: Vec<(SceneTime, SubmissionTicket)>,
    log: Vec<(SceneTime, Effect)>,
    rejected: Vec<(SceneTime, String)>,
}

impl StageSimulator {
    /// Mounted stage over `poses`, steady frames, instant successful
    /// deliveries
    pub fn new(config: StageConfig, poses: Arc<PoseLibrary>) -> PulseResult<Self> {
        let seed = config.celebration.seed.unwrap_or(0);
        let mut stage = Stage::new(config, poses)?;
        stage.mount()?;

        Ok(StageSimulator {
            stage,
            frames: FrameModel::steady(),
            rng: StdRng::seed_from_u64(seed),
            script: BTreeMap::new(),
            script_seq: 0,
            delivery: Delivery::Succeed,
            latency: Duration::ZERO,
            pending_deliveries: Vec::new(),
            log: Vec::new(),
            rejected: Vec::new(),
        })
    }

    pub fn with_frames(mut self, frames: FrameModel) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery, latency: Duration) -> Self {
        self.delivery = delivery;
        self.latency = latency;
        self
    }

    /// Queue `input` for scene time `at` (from mount)
    pub fn at(&mut self, at: Duration, input: StageInput) -> &mut Self {
        let key = (SceneTime::ZERO + at, self.script_seq);
        self.script_seq += 1;
        self.script.insert(key, input);
        self
    }

    /// Run for `duration` of scene time
    pub fn run(&mut self, duration: Duration) -> SimulationResult {
        let mut result = SimulationResult::new();
        let end = self.stage.now() + duration;
        self.collect(&mut result);

        while self.stage.now() < end {
            let frame = self.frames.next(&mut self.rng);
            let target = (self.stage.now() + frame).min(end);
            self.tick(target, &mut result);
        }

        result
    }

    fn tick(&mut self, target: SceneTime, result: &mut SimulationResult) {
        // Inputs and delivery outcomes land at their exact times
        loop {
            let next_input = self.script.keys().next().map(|(at, _)| *at);
            let next_delivery = self.pending_deliveries.iter().map(|(at, _)| *at).min();
            let next = match (next_input, next_delivery) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => break,
            };
            if next > target {
                break;
            }

            let now = self.stage.now();
            if next > now {
                self.stage.advance(next - now);
                self.collect(result);
            }
            self.land_deliveries(next);
            self.apply_inputs(next);
            self.collect(result);
        }

        let now = self.stage.now();
        self.stage.advance(target - now);
        self.collect(result);
        result.total_ticks += 1;
    }

    fn apply_inputs(&mut self, at: SceneTime) {
        let due: Vec<_> = self
            .script
            .keys()
            .take_while(|(t, _)| *t <= at)
            .copied()
            .collect();
        for key in due {
            let Some(input) = self.script.remove(&key) else {
                continue;
            };
            if let Err(err) = self.apply(input) {
                tracing::debug!(%err, "scripted input rejected");
                self.rejected.push((at, err.to_string()));
            }
        }
    }

    fn apply(&mut self, input: StageInput) -> Result<(), StageError> {
        match input {
            StageInput::PointerEnter(actor) => self.stage.pointer_enter(actor)?,
            StageInput::PointerLeave(actor) => self.stage.pointer_leave(actor)?,
            StageInput::Activate(actor) => {
                self.stage.activate(actor)?;
            }
            StageInput::OpenModal => {
                self.stage.open_modal()?;
            }
            StageInput::CloseModal(reason) => {
                self.stage.close_modal(reason)?;
            }
            StageInput::ToggleOptional => {
                self.stage.toggle_optional()?;
            }
            StageInput::Submit(form) => {
                let submission = self.stage.begin_submit(&form)?;
                if self.delivery != Delivery::Hang {
                    let lands = self.stage.now() + self.latency;
                    self.pending_deliveries.push((lands, submission.ticket));
                }
            }
            StageInput::Layout { viewport, anchors } => self.stage.set_layout(viewport, anchors),
            StageInput::Unmount => {
                self.stage.unmount();
                self.pending_deliveries.clear();
            }
        }
        Ok(())
    }

    fn land_deliveries(&mut self, at: SceneTime) {
        let (due, later): (Vec<_>, Vec<_>) = self
            .pending_deliveries
            .drain(..)
            .partition(|(lands, _)| *lands <= at);
        self.pending_deliveries = later;

        for (_, ticket) in due {
            let outcome = match &self.delivery {
                Delivery::Fail(err) => Err(err.clone()),
                _ => Ok(()),
            };
            if let Err(err) = self.stage.complete_submit(ticket, outcome) {
                self.rejected.push((at, err.to_string()));
            }
        }
    }

    fn collect(&mut self, result: &mut SimulationResult) {
        let now = self.stage.now();
        while let Some(effect) = self.stage.pop_effect() {
            result.record(&effect);
            self.log.push((now, effect));
        }
        result.max_bursts_in_flight = result.max_bursts_in_flight.max(self.stage.bursts_in_flight());
        result.max_pending_timers = result.max_pending_timers.max(self.stage.pending_timers());
        for actor in Actor::ALL {
            result.max_hover_loops = result.max_hover_loops.max(self.stage.hover_loops(actor));
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Every effect seen so far, with the scene time it was collected at
    pub fn log(&self) -> &[(SceneTime, Effect)] {
        &self.log
    }

    /// Scripted inputs the stage refused
    pub fn rejected(&self) -> &[(SceneTime, String)] {
        &self.rejected
    }

    /// Effects matching `pred`, in order
    pub fn effects_where(&self, pred: impl Fn(&Effect) -> bool) -> Vec<&Effect> {
        self.log.iter().map(|(_, e)| e).filter(|e| pred(e)).collect()
    }
}

/// Effect categories counted by a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Pose,
    Burst,
    Bubble,
    Modal,
    OptionalPanel,
    Submission,
    CelebrationStarted,
    CelebrationFinished,
}

impl From<&Effect> for EffectKind {
    fn from(effect: &Effect) -> Self {
        match effect {
            Effect::PoseChanged { .. } => EffectKind::Pose,
            Effect::Burst(_) => EffectKind::Burst,
            Effect::BubbleChanged(_) => EffectKind::Bubble,
            Effect::ModalChanged { .. } => EffectKind::Modal,
            Effect::OptionalPanelChanged { .. } => EffectKind::OptionalPanel,
            Effect::SubmissionChanged(_) => EffectKind::Submission,
            Effect::CelebrationStarted => EffectKind::CelebrationStarted,
            Effect::CelebrationFinished { .. } => EffectKind::CelebrationFinished,
        }
    }
}

/// Simulation result and statistics
#[derive(Debug, Default)]
pub struct SimulationResult {
    /// Frames simulated
    pub total_ticks: u64,
    pub max_bursts_in_flight: usize,
    pub max_pending_timers: usize,
    /// Most hover loops seen on one actor at once
    pub max_hover_loops: usize,
    counts: HashMap<EffectKind, u64>,
}

impl SimulationResult {
    pub fn new() -> Self {
        SimulationResult::default()
    }

    fn record(&mut self, effect: &Effect) {
        *self.counts.entry(EffectKind::from(effect)).or_insert(0) += 1;
    }

    pub fn count(&self, kind: EffectKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Predefined visits
pub mod scenarios {
    use super::*;
    use pulse_waitlist::WaitlistForm;

    use crate::synthetic_library;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// A visitor who just watches
    pub fn idle_visit() -> PulseResult<StageSimulator> {
        StageSimulator::new(StageConfig::seeded(1), synthetic_library(7))
    }

    /// A visitor who keeps poking both actors
    pub fn restless_visit() -> PulseResult<StageSimulator> {
        let mut sim = idle_visit()?;
        for round in 0..20u64 {
            let t = round * 700;
            let actor = if round % 2 == 0 { Actor::Left } else { Actor::Right };
            sim.at(ms(t), StageInput::PointerEnter(actor))
                .at(ms(t + 150), StageInput::PointerEnter(actor))
                .at(ms(t + 300), StageInput::Activate(actor))
                .at(ms(t + 650), StageInput::PointerLeave(actor));
        }
        Ok(sim)
    }

    /// A visitor who signs up for the waitlist
    pub fn signup_visit(delivery: Delivery) -> PulseResult<StageSimulator> {
        let mut sim = idle_visit()?.with_delivery(delivery, ms(400));
        sim.at(ms(500), StageInput::OpenModal)
            .at(ms(900), StageInput::ToggleOptional)
            .at(
                ms(2_000),
                StageInput::Submit(WaitlistForm::new(
                    "Ada Obi",
                    "ada@ui.edu.ng",
                    "University of Ibadan",
                )),
            );
        Ok(sim)
    }

    /// Signup, then the visitor closes the success view early
    pub fn impatient_signup() -> PulseResult<StageSimulator> {
        let mut sim = signup_visit(Delivery::Succeed)?;
        sim.at(ms(3_400), StageInput::CloseModal(CloseReason::SuccessClose));
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_covers_requested_time() {
        let mut sim = scenarios::idle_visit().unwrap().with_frames(FrameModel::janky());
        let result = sim.run(Duration::from_secs(5));

        assert_eq!(sim.stage().now(), SceneTime::from_millis(5_000));
        assert!(result.total_ticks > 5_000 / 56);
        assert_eq!(result.count(EffectKind::Pose), 2 + 10 + 11);
    }

    #[test]
    fn test_scripted_input_lands_at_exact_time() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(Duration::from_millis(1_234), StageInput::Activate(Actor::Left));
        sim.run(Duration::from_secs(2));

        let (at, _) = sim
            .log()
            .iter()
            .find(|(_, e)| matches!(e, Effect::BubbleChanged(Some(Actor::Left))))
            .unwrap();
        assert_eq!(*at, SceneTime::from_millis(1_234));
    }

    #[test]
    fn test_rejected_inputs_recorded() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(Duration::from_millis(10), StageInput::ToggleOptional);
        sim.run(Duration::from_millis(100));

        assert_eq!(sim.rejected().len(), 1);
        assert!(sim.rejected()[0].1.contains("closed"));
    }

    #[test]
    fn test_hanging_delivery_stays_submitting() {
        let mut sim = scenarios::signup_visit(Delivery::Hang).unwrap();
        sim.run(Duration::from_secs(10));
        assert_eq!(
            sim.stage().submission_state(),
            Some(&pulse_waitlist::SubmissionState::Submitting)
        );
    }
}
