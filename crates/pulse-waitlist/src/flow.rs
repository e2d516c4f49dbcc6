//! Waitlist submission flow
//!
//! `Editing -> Submitting -> Submitted`. A failed delivery goes back to
//! `Editing` with the reason attached. Closing the modal drops the whole
//! flow, so reopening always starts from a blank form.

use crate::{SubmitError, SubmitResult, WaitlistForm, WaitlistRecord};

/// Where the submission stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    /// Form is editable; `last_error` is the previous attempt's failure
    Editing { last_error: Option<String> },
    /// One request in flight, form disabled
    Submitting,
    /// Delivered; the success view replaces the form
    Submitted,
}

impl SubmissionState {
    pub fn is_editing(&self) -> bool {
        matches!(self, SubmissionState::Editing { .. })
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Editing { last_error: None }
    }
}

/// State of one open waitlist modal
#[derive(Clone, Debug, Default)]
pub struct WaitlistFlow {
    state: SubmissionState,
    show_optional: bool,
    attempts: u32,
}

impl WaitlistFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Is the "more info" panel expanded?
    pub fn shows_optional(&self) -> bool {
        self.show_optional
    }

    /// Expand or collapse the "more info" panel. Independent of the
    /// submission state.
    pub fn toggle_optional(&mut self) -> bool {
        self.show_optional = !self.show_optional;
        self.show_optional
    }

    /// Delivery attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Validate `form` and move to `Submitting`. On a validation error the
    /// flow stays in `Editing` untouched.
    pub fn begin_submit(&mut self, form: &WaitlistForm) -> SubmitResult<WaitlistRecord> {
        match self.state {
            SubmissionState::Editing { .. } => {}
            SubmissionState::Submitting => return Err(SubmitError::AlreadySubmitting),
            SubmissionState::Submitted => return Err(SubmitError::AlreadySubmitted),
        }

        let record = form.to_record(self.show_optional)?;
        self.state = SubmissionState::Submitting;
        self.attempts += 1;
        tracing::info!(attempt = self.attempts, "waitlist submission started");
        Ok(record)
    }

    /// Feed back the delivery outcome. Returns true if the flow just entered
    /// `Submitted`. Outcomes arriving outside `Submitting` are ignored.
    pub fn complete(&mut self, outcome: SubmitResult<()>) -> bool {
        if self.state != SubmissionState::Submitting {
            tracing::debug!(?outcome, "stale submission outcome ignored");
            return false;
        }

        match outcome {
            Ok(()) => {
                tracing::info!(attempt = self.attempts, "waitlist submission delivered");
                self.state = SubmissionState::Submitted;
                true
            }
            Err(err) => {
                tracing::error!(%err, attempt = self.attempts, "waitlist submission failed");
                self.state = SubmissionState::Editing {
                    last_error: Some(err.to_string()),
                };
                false
            }
        }
    }
}
