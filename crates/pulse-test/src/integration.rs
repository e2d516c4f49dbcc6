//! End-to-end Visit Test Suite
//!
//! Drives whole visits through a mounted stage and checks the behaviour a
//! visitor can observe:
//! - Hover loops never pile up on one actor
//! - Decorative bursts stay under their ceiling and always drain
//! - Poses cycle in order for both actors
//! - The speech bubble never outlives its dismissal window
//! - A successful signup celebrates exactly once
//! - Unmount leaves nothing behind

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pulse_core::{Actor, PulseResult, SceneTime};
use pulse_stage::{CloseReason, Effect, StageConfig, StageInput};
use pulse_waitlist::WaitlistForm;

use crate::simulator::{Delivery, EffectKind, FrameModel, SimulationResult, StageSimulator};
use crate::synthetic_library;

// ============================================================================
// VISIT CONFIGURATION
// ============================================================================

/// Configuration for a randomized visit
#[derive(Debug, Clone)]
pub struct VisitConfig {
    /// Scene time the visit lasts
    pub duration: Duration,

    /// Random pointer actions spread over the visit
    pub actions: usize,

    /// Seed for actions, frame jitter and celebration origins
    pub seed: u64,

    /// Poses per actor
    pub poses: usize,

    /// Frame pacing
    pub frames: FrameModel,

    /// Sign up halfway through, with this delivery behaviour
    pub signup: Option<Delivery>,

    /// Unmount when the visit ends and keep the clock running a while
    pub unmount_at_end: bool,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(20),
            actions: 40,
            seed: 7,
            poses: 7,
            frames: FrameModel::steady(),
            signup: None,
            unmount_at_end: true,
        }
    }
}

impl VisitConfig {
    /// Short visit, few actions
    pub fn minimal() -> Self {
        Self {
            duration: Duration::from_secs(5),
            actions: 8,
            ..Self::default()
        }
    }

    /// Standard visit
    pub fn standard() -> Self {
        Self::default()
    }

    /// Long visit, frantic pointer, janky frames, signup
    pub fn stress() -> Self {
        Self {
            duration: Duration::from_secs(120),
            actions: 600,
            frames: FrameModel::janky(),
            signup: Some(Delivery::Succeed),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_signup(mut self, delivery: Delivery) -> Self {
        self.signup = Some(delivery);
        self
    }
}

/// Result of a visit
#[derive(Debug)]
pub struct VisitResult {
    /// Raw simulation statistics
    pub simulation: SimulationResult,

    /// Celebrations started during the visit
    pub celebrations: u64,

    /// Timers still armed after unmount (if unmounted)
    pub leftover_timers: usize,

    /// Animations still alive after unmount (if unmounted)
    pub leftover_animations: usize,

    /// Effects emitted after unmount
    pub effects_after_unmount: usize,

    /// Specific violations
    pub violations: Vec<String>,
}

impl VisitResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

// ============================================================================
// VISIT HARNESS
// ============================================================================

/// Runs randomized visits and checks invariants over the effect log
pub struct VisitHarness {
    config: VisitConfig,
    stage_config: StageConfig,
    sim: StageSimulator,
}

impl VisitHarness {
    pub fn new(config: VisitConfig) -> PulseResult<Self> {
        let stage_config = StageConfig::seeded(config.seed);
        let mut sim = StageSimulator::new(stage_config, synthetic_library(config.poses))?
            .with_frames(config.frames.clone());
        if let Some(delivery) = config.signup.clone() {
            sim = sim.with_delivery(delivery, Duration::from_millis(350));
        }

        let mut harness = Self {
            config,
            stage_config,
            sim,
        };
        harness.script();
        Ok(harness)
    }

    fn script(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.config.seed ^ 0x5eed);
        let span = self.config.duration.as_millis().max(1) as u64;

        for _ in 0..self.config.actions {
            let at = Duration::from_millis(rng.gen_range(0..span));
            let actor = if rng.gen_bool(0.5) { Actor::Left } else { Actor::Right };
            let input = match rng.gen_range(0..3) {
                0 => StageInput::PointerEnter(actor),
                1 => StageInput::PointerLeave(actor),
                _ => StageInput::Activate(actor),
            };
            self.sim.at(at, input);
        }

        if self.config.signup.is_some() {
            let half = self.config.duration / 2;
            self.sim
                .at(half, StageInput::OpenModal)
                .at(
                    half + Duration::from_millis(800),
                    StageInput::Submit(WaitlistForm::new(
                        "Tunde Bakare",
                        "tunde@unilag.edu.ng",
                        "University of Lagos",
                    )),
                );
        }
    }

    /// Run the visit and check every invariant
    pub fn run(&mut self) -> VisitResult {
        let simulation = self.sim.run(self.config.duration);
        let mut violations = Vec::new();

        let ceiling = self.stage_config.burst.ceiling;
        if simulation.max_bursts_in_flight > ceiling {
            violations.push(format!(
                "burst ceiling exceeded: {} in flight, ceiling {}",
                simulation.max_bursts_in_flight, ceiling
            ));
        }
        if simulation.max_hover_loops > 1 {
            violations.push(format!(
                "hover loops piled up: {} on one actor",
                simulation.max_hover_loops
            ));
        }
        violations.extend(self.check_pose_order());
        violations.extend(self.check_bubble_window());

        let celebrations = simulation.count(EffectKind::CelebrationStarted);
        if celebrations > 1 {
            violations.push(format!("celebrated {} times for one signup", celebrations));
        }

        let mut result = VisitResult {
            simulation,
            celebrations,
            leftover_timers: 0,
            leftover_animations: 0,
            effects_after_unmount: 0,
            violations,
        };

        if self.config.unmount_at_end {
            self.unmount_and_idle(&mut result);
        }

        result
    }

    fn unmount_and_idle(&mut self, result: &mut VisitResult) {
        let logged = self.sim.log().len();
        self.sim.stage_mut().unmount();
        self.sim.run(Duration::from_secs(10));

        let stage = self.sim.stage();
        result.leftover_timers = stage.pending_timers();
        result.leftover_animations = stage.live_animations();
        result.effects_after_unmount = self.sim.log().len() - logged;

        if result.leftover_timers > 0 {
            result
                .violations
                .push(format!("{} timers armed after unmount", result.leftover_timers));
        }
        if result.leftover_animations > 0 {
            result.violations.push(format!(
                "{} animations alive after unmount",
                result.leftover_animations
            ));
        }
        if stage.bursts_in_flight() > 0 {
            result.violations.push(format!(
                "{} bursts held after unmount",
                stage.bursts_in_flight()
            ));
        }
        if result.effects_after_unmount > 0 {
            result.violations.push(format!(
                "{} effects emitted after unmount",
                result.effects_after_unmount
            ));
        }
    }

    /// Each actor's pose changes must step by one, wrapping at the end
    fn check_pose_order(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut last: [Option<usize>; 2] = [None; 2];

        for (at, effect) in self.sim.log() {
            let Effect::PoseChanged { actor, index } = effect else {
                continue;
            };
            let slot = &mut last[actor.index()];
            if let Some(prev) = *slot {
                let expected = (prev + 1) % self.config.poses;
                if *index != expected {
                    violations.push(format!(
                        "{} pose jumped from {} to {} at {:?}",
                        actor, prev, index, at
                    ));
                }
            }
            *slot = Some(*index);
        }
        violations
    }

    /// No bubble may stay up longer than its dismissal delay (plus one frame
    /// of collection slack)
    fn check_bubble_window(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let limit = self.stage_config.bubble.dismiss_after
            + self.config.frames.interval
            + self.config.frames.jitter;
        let mut shown_at: Option<SceneTime> = None;

        for (at, effect) in self.sim.log() {
            if let Effect::BubbleChanged(active) = effect {
                if let Some(since) = shown_at {
                    if *at - since > limit {
                        violations.push(format!("bubble stayed up from {:?} to {:?}", since, at));
                    }
                }
                shown_at = active.map(|_| *at);
            }
        }
        if let Some(since) = shown_at {
            if self.sim.stage().now() - since > limit {
                violations.push(format!("bubble shown at {:?} never dismissed", since));
            }
        }
        violations
    }

    pub fn simulator(&self) -> &StageSimulator {
        &self.sim
    }
}

// ============================================================================
// VISITS
// ============================================================================

/// A short visit with a handful of pointer actions
pub fn run_minimal_visit() -> PulseResult<VisitResult> {
    Ok(VisitHarness::new(VisitConfig::minimal())?.run())
}

/// A standard visit that ends in a successful signup
pub fn run_signup_visit() -> PulseResult<VisitResult> {
    Ok(VisitHarness::new(VisitConfig::standard().with_signup(Delivery::Succeed))?.run())
}

/// A long, frantic visit on a janky page
pub fn run_stress_visit() -> PulseResult<VisitResult> {
    Ok(VisitHarness::new(VisitConfig::stress())?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::scenarios;
    use pulse_motion::normalize_pose;
    use pulse_stage::ActorState;
    use pulse_waitlist::SubmissionState;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_minimal_visit_passes() {
        let result = run_minimal_visit().unwrap();
        assert!(result.passed(), "{:?}", result.violations);
    }

    #[test]
    fn test_signup_visit_celebrates_once() {
        let result = run_signup_visit().unwrap();
        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.celebrations, 1);
        assert_eq!(result.simulation.count(EffectKind::CelebrationFinished), 1);
    }

    #[test]
    fn test_stress_visit_passes() {
        let result = run_stress_visit().unwrap();
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.simulation.max_bursts_in_flight > 0);
    }

    #[test]
    fn test_many_seeds_pass() {
        for seed in 0..16 {
            let mut harness = VisitHarness::new(VisitConfig::standard().with_seed(seed)).unwrap();
            let result = harness.run();
            assert!(result.passed(), "seed {}: {:?}", seed, result.violations);
        }
    }

    #[test]
    fn test_double_enter_keeps_one_loop() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(ms(100), StageInput::PointerEnter(Actor::Left))
            .at(ms(180), StageInput::PointerEnter(Actor::Left));
        let result = sim.run(ms(3_000));

        assert_eq!(result.max_hover_loops, 1);
        assert_eq!(sim.stage().hover_loops(Actor::Left), 1);
        assert_eq!(sim.stage().actor_state(Actor::Left), ActorState::Hovering);
    }

    #[test]
    fn test_leave_restores_rest_after_any_loop_count() {
        for held in [90u64, 1_000, 1_337, 7_777] {
            let mut sim = scenarios::idle_visit().unwrap();
            sim.at(ms(10), StageInput::PointerEnter(Actor::Right))
                .at(ms(10 + held), StageInput::PointerLeave(Actor::Right));
            sim.run(ms(10 + held + 500));

            assert!(
                sim.stage().transform(Actor::Right).is_resting(1e-4),
                "held {} ms",
                held
            );
        }
    }

    #[test]
    fn test_restless_visitor_bursts_drain() {
        let mut sim = scenarios::restless_visit().unwrap();
        let result = sim.run(ms(14_000));
        assert!(result.max_bursts_in_flight <= sim.stage().config().burst.ceiling);

        // Pointer is gone; every burst expires within the window
        sim.run(sim.stage().config().burst.expiry + ms(20));
        assert_eq!(sim.stage().bursts_in_flight(), 0);
    }

    #[test]
    fn test_bubble_handoff_ignores_stale_timer() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(ms(100), StageInput::Activate(Actor::Left))
            .at(ms(1_600), StageInput::Activate(Actor::Right));
        sim.run(ms(2_700));

        // Left's dismissal would have fired at 2600
        assert_eq!(sim.stage().active_bubble(), Some(Actor::Right));

        sim.run(ms(1_500));
        assert_eq!(sim.stage().active_bubble(), None);
    }

    #[test]
    fn test_double_toggle_clears_bubble() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(ms(100), StageInput::Activate(Actor::Left))
            .at(ms(101), StageInput::Activate(Actor::Left));
        sim.run(ms(200));
        assert_eq!(sim.stage().active_bubble(), None);
        assert_eq!(
            sim.effects_where(|e| matches!(e, Effect::BubbleChanged(_))).len(),
            2
        );
    }

    #[test]
    fn test_pose_index_after_whole_periods() {
        let mut sim = scenarios::idle_visit().unwrap();
        let config = *sim.stage().config();

        for k in 1..=20u32 {
            let target = config.cycler.left.period * k;
            let now = sim.stage().now() - SceneTime::ZERO;
            sim.run(target - now);
            let expected = (config.cycler.left.start + k as usize) % 7;
            assert_eq!(sim.stage().pose_index(Actor::Left), expected, "k = {}", k);
        }
    }

    #[test]
    fn test_normalization_idempotent_on_library_poses() {
        let library = synthetic_library(7);
        for actor in Actor::ALL {
            for index in 0..7 {
                let pose = library.get(actor, index).unwrap();
                assert_eq!(normalize_pose(&pose), *pose);
            }
        }
    }

    #[test]
    fn test_signup_walks_editing_submitting_submitted() {
        let mut sim = scenarios::signup_visit(Delivery::Succeed).unwrap();
        sim.run(ms(6_000));

        let states: Vec<_> = sim
            .effects_where(|e| matches!(e, Effect::SubmissionChanged(_)))
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(
            states,
            vec![
                Effect::SubmissionChanged(SubmissionState::Submitting),
                Effect::SubmissionChanged(SubmissionState::Submitted),
            ]
        );
        assert_eq!(
            sim.effects_where(|e| *e == Effect::CelebrationStarted).len(),
            1
        );
        assert!(!sim.stage().is_celebrating());
    }

    #[test]
    fn test_incomplete_form_never_leaves_editing() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(ms(100), StageInput::OpenModal).at(
            ms(200),
            StageInput::Submit(WaitlistForm::new("Ada Obi", "", "University of Ibadan")),
        );
        sim.run(ms(1_000));

        assert_eq!(sim.rejected().len(), 1);
        assert!(sim
            .stage()
            .submission_state()
            .is_some_and(|s| s.is_editing()));
        assert!(sim
            .effects_where(|e| matches!(e, Effect::SubmissionChanged(_)))
            .is_empty());
    }

    #[test]
    fn test_failed_delivery_allows_retry() {
        let mut sim = scenarios::signup_visit(Delivery::Fail(
            pulse_waitlist::SubmitError::Rejected(503),
        ))
        .unwrap();
        sim.run(ms(3_000));
        assert!(sim.stage().submission_state().is_some_and(|s| s.is_editing()));
        assert_eq!(sim.effects_where(|e| *e == Effect::CelebrationStarted).len(), 0);
    }

    #[test]
    fn test_impatient_close_stops_celebration() {
        let mut sim = scenarios::impatient_signup().unwrap();
        sim.run(ms(8_000));

        assert_eq!(
            sim.effects_where(|e| *e == Effect::CelebrationFinished { completed: false }).len(),
            1
        );
        assert!(!sim.stage().is_modal_open());
        assert!(!sim.stage().is_celebrating());
    }

    #[test]
    fn test_unmount_mid_everything_leaves_nothing() {
        let mut sim = scenarios::signup_visit(Delivery::Succeed).unwrap();
        sim.at(ms(2_500), StageInput::PointerEnter(Actor::Left))
            .at(ms(2_550), StageInput::Activate(Actor::Right))
            .at(ms(2_600), StageInput::Unmount);
        sim.run(ms(2_610));

        assert!(!sim.stage().is_mounted());
        assert_eq!(sim.stage().pending_timers(), 0);
        assert_eq!(sim.stage().live_animations(), 0);
        assert_eq!(sim.stage().bursts_in_flight(), 0);

        let logged = sim.log().len();
        sim.run(ms(10_000));
        assert_eq!(sim.log().len(), logged);
    }

    #[test]
    fn test_close_modal_after_unmount_is_rejected() {
        let mut sim = scenarios::idle_visit().unwrap();
        sim.at(ms(10), StageInput::Unmount)
            .at(ms(20), StageInput::CloseModal(CloseReason::Backdrop));
        sim.run(ms(100));
        assert_eq!(sim.rejected().len(), 1);
    }
}
