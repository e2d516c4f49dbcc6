//! Real-time stage driver
//!
//! Runs a [`Stage`] on tokio: a frame interval advances the scene clock by
//! the measured elapsed time (clamped, so a stalled process does not replay
//! a burst of timers), inputs arrive over a channel, and waitlist
//! deliveries run as tasks whose outcomes are fed back when they land.
//! The stage itself never awaits anything.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

use pulse_core::{Actor, PulseError, Rect, Viewport};
use pulse_time::clamp_frame_step;
use pulse_waitlist::{SubmitError, SubmitResult, WaitlistBackend, WaitlistForm};

use crate::{CloseReason, Effect, Stage, StageResult, Submission, SubmissionTicket};

/// Default frame interval
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Input from the presentation layer
#[derive(Clone, Debug)]
pub enum StageInput {
    PointerEnter(Actor),
    PointerLeave(Actor),
    Activate(Actor),
    OpenModal,
    CloseModal(CloseReason),
    ToggleOptional,
    Submit(WaitlistForm),
    Layout { viewport: Viewport, anchors: [Rect; 2] },
    Unmount,
}

type Delivery = (SubmissionTicket, SubmitResult<()>);

/// Drives a stage in real time
pub struct StageDriver {
    stage: Stage,
    backend: Arc<dyn WaitlistBackend>,
    inflight: JoinSet<Delivery>,
    last_ticket: Option<SubmissionTicket>,
    frame: Duration,
    effects: Option<mpsc::Sender<Effect>>,
}

impl StageDriver {
    pub fn new(stage: Stage, backend: Arc<dyn WaitlistBackend>) -> Self {
        StageDriver {
            stage,
            backend,
            inflight: JoinSet::new(),
            last_ticket: None,
            frame: DEFAULT_FRAME,
            effects: None,
        }
    }

    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame.max(Duration::from_millis(1));
        self
    }

    /// Forward render effects to `sender` instead of leaving them queued on
    /// the stage
    pub fn with_effects(mut self, sender: mpsc::Sender<Effect>) -> Self {
        self.effects = Some(sender);
        self
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn into_stage(self) -> Stage {
        self.stage
    }

    /// Deliveries still running
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Validate `form` and start delivering it in the background. Must be
    /// called from within a tokio runtime.
    pub fn submit(&mut self, form: &WaitlistForm) -> StageResult<SubmissionTicket> {
        let Submission { ticket, record } = self.stage.begin_submit(form)?;
        let backend = Arc::clone(&self.backend);
        self.last_ticket = Some(ticket);
        self.inflight.spawn(async move {
            let outcome = backend.submit(&record).await;
            (ticket, outcome)
        });
        Ok(ticket)
    }

    /// Wait for every running delivery and apply its outcome. Returns how
    /// many were applied.
    pub async fn settle(&mut self) -> usize {
        let mut settled = 0;
        while let Some(joined) = self.inflight.join_next().await {
            self.finish(joined);
            settled += 1;
        }
        self.flush().await;
        settled
    }

    /// Run the stage for `duration` of wall time, applying inputs and
    /// delivery outcomes as they arrive. Returns early on
    /// [`StageInput::Unmount`].
    pub async fn run_for(
        &mut self,
        duration: Duration,
        inputs: &mut mpsc::Receiver<StageInput>,
    ) -> StageResult<()> {
        if !self.stage.is_mounted() {
            return Err(PulseError::NotMounted.into());
        }

        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);
        let mut frames = tokio::time::interval(self.frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        let mut inputs_open = true;

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = frames.tick() => {
                    let now = Instant::now();
                    self.stage.advance(clamp_frame_step(now - last));
                    last = now;
                }
                input = inputs.recv(), if inputs_open => match input {
                    Some(StageInput::Unmount) => {
                        self.apply(StageInput::Unmount)?;
                        self.flush().await;
                        return Ok(());
                    }
                    Some(input) => {
                        if let Err(err) = self.apply(input) {
                            tracing::warn!(%err, "stage input rejected");
                        }
                    }
                    None => inputs_open = false,
                },
                Some(joined) = self.inflight.join_next(), if !self.inflight.is_empty() => {
                    self.finish(joined);
                }
            }
            self.flush().await;
        }

        let now = Instant::now();
        self.stage.advance(clamp_frame_step(now - last));
        self.flush().await;
        Ok(())
    }

    fn apply(&mut self, input: StageInput) -> StageResult<()> {
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
                self.submit(&form)?;
            }
            StageInput::Layout { viewport, anchors } => self.stage.set_layout(viewport, anchors),
            StageInput::Unmount => {
                self.inflight.abort_all();
                self.stage.unmount();
            }
        }
        Ok(())
    }

    fn finish(&mut self, joined: Result<Delivery, JoinError>) {
        let (ticket, outcome) = match joined {
            Ok(delivery) => delivery,
            Err(err) if err.is_cancelled() => return,
            Err(err) => {
                tracing::error!(%err, "waitlist delivery task failed");
                let Some(ticket) = self.last_ticket else {
                    return;
                };
                (ticket, Err(SubmitError::Transport(err.to_string())))
            }
        };

        if let Err(err) = self.stage.complete_submit(ticket, outcome) {
            tracing::warn!(%err, "waitlist outcome not applied");
        }
    }

    async fn flush(&mut self) {
        let Some(sender) = self.effects.clone() else {
            return;
        };
        while let Some(effect) = self.stage.pop_effect() {
            if sender.send(effect).await.is_err() {
                tracing::debug!("effect receiver dropped");
                self.effects = None;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::StageConfig;
    use pulse_motion::{PoseLibrary, SharedPoses};
    use pulse_waitlist::{RecordingBackend, SubmissionState};

    fn stage() -> Stage {
        let payloads = (0..7).map(|i| json!({ "nm": i })).collect();
        let library = Arc::new(PoseLibrary::new(SharedPoses::new(payloads)));
        let mut stage = Stage::new(StageConfig::seeded(3), library).unwrap();
        stage.mount().unwrap();
        stage
    }

    fn form() -> WaitlistForm {
        WaitlistForm::new("Ada Obi", "ada@ui.edu.ng", "University of Ibadan")
    }

    #[tokio::test]
    async fn test_submit_and_settle() {
        let backend = Arc::new(RecordingBackend::new());
        let mut driver = StageDriver::new(stage(), backend.clone());
        driver.stage_mut().open_modal().unwrap();

        driver.submit(&form()).unwrap();
        assert_eq!(driver.in_flight(), 1);
        assert_eq!(driver.stage().submission_state(), Some(&SubmissionState::Submitting));

        assert_eq!(driver.settle().await, 1);
        assert_eq!(driver.stage().submission_state(), Some(&SubmissionState::Submitted));
        assert!(driver.stage().is_celebrating());
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_back_to_editing() {
        let backend = Arc::new(RecordingBackend::failing(1, SubmitError::Rejected(500)));
        let mut driver = StageDriver::new(stage(), backend);
        driver.stage_mut().open_modal().unwrap();

        driver.submit(&form()).unwrap();
        driver.settle().await;
        assert!(driver
            .stage()
            .submission_state()
            .is_some_and(|s| matches!(s, SubmissionState::Editing { last_error: Some(_) })));
        assert!(!driver.stage().is_celebrating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_for_advances_scene_clock() {
        let mut driver = StageDriver::new(stage(), Arc::new(RecordingBackend::new()));
        let (_tx, mut rx) = mpsc::channel(8);

        driver.run_for(Duration::from_secs(1), &mut rx).await.unwrap();
        assert!(driver.stage().now().as_millis() >= 990);
        assert!(driver.stage().stats().pose_changes >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inputs_and_effects_flow_through() {
        let backend = Arc::new(RecordingBackend::new());
        let (effects_tx, mut effects_rx) = mpsc::channel(4096);
        let mut driver = StageDriver::new(stage(), backend.clone()).with_effects(effects_tx);
        let (tx, mut rx) = mpsc::channel(8);

        tx.send(StageInput::PointerEnter(Actor::Left)).await.unwrap();
        tx.send(StageInput::OpenModal).await.unwrap();
        tx.send(StageInput::Submit(form())).await.unwrap();
        drop(tx);

        driver.run_for(Duration::from_secs(4), &mut rx).await.unwrap();

        let mut effects = Vec::new();
        while let Ok(effect) = effects_rx.try_recv() {
            effects.push(effect);
        }
        assert!(effects.contains(&Effect::CelebrationStarted));
        assert!(effects.contains(&Effect::CelebrationFinished { completed: true }));
        assert!(effects.iter().any(|e| matches!(e, Effect::Burst(_))));
        assert_eq!(backend.len(), 1);
        assert!(!driver.stage().is_celebrating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_input_ends_run() {
        let mut driver = StageDriver::new(stage(), Arc::new(RecordingBackend::new()));
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(StageInput::PointerEnter(Actor::Right)).await.unwrap();
        tx.send(StageInput::Unmount).await.unwrap();

        driver.run_for(Duration::from_secs(60), &mut rx).await.unwrap();
        assert!(!driver.stage().is_mounted());
        assert_eq!(driver.stage().pending_timers(), 0);
        assert!(driver.run_for(Duration::from_secs(1), &mut rx).await.is_err());
    }
}
