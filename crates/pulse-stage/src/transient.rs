//! Speech bubble and modal state

use pulse_core::Actor;
use pulse_waitlist::WaitlistFlow;

/// Which actor's speech bubble is showing.
///
/// Every toggle bumps the generation. A dismissal timer carries the
/// generation it was armed for and only clears that exact state, so a stale
/// timer can never clear a bubble opened after it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BubbleState {
    active: Option<Actor>,
    generation: u64,
}

impl BubbleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<Actor> {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Show `actor`'s bubble, or hide it if it is already showing.
    /// Returns the new generation.
    pub fn toggle(&mut self, actor: Actor) -> u64 {
        self.active = if self.active == Some(actor) {
            None
        } else {
            Some(actor)
        };
        self.generation += 1;
        self.generation
    }

    /// Dismissal for `generation` came due. Returns true if it cleared the
    /// bubble.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.active.is_none() {
            return false;
        }
        self.active = None;
        self.generation += 1;
        true
    }

    pub fn clear(&mut self) {
        if self.active.take().is_some() {
            self.generation += 1;
        }
    }
}

/// How the modal was closed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    Backdrop,
    Dismiss,
    /// Close button of the success view
    SuccessClose,
    Unmount,
}

/// Waitlist modal. The submission flow only exists while the modal is
/// open; closing drops it, so reopening starts from a blank form.
#[derive(Clone, Debug, Default)]
pub struct ModalState {
    flow: Option<WaitlistFlow>,
    /// Bumped on every open
    session: u64,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.flow.is_some()
    }

    /// Modal session, used to match late submission outcomes
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Open with a fresh flow. Returns false if already open.
    pub fn open(&mut self) -> bool {
        if self.flow.is_some() {
            return false;
        }
        self.session += 1;
        self.flow = Some(WaitlistFlow::new());
        true
    }

    /// Close and discard the flow. Returns false if already closed.
    pub fn close(&mut self) -> bool {
        self.flow.take().is_some()
    }

    pub fn flow(&self) -> Option<&WaitlistFlow> {
        self.flow.as_ref()
    }

    pub fn flow_mut(&mut self) -> Option<&mut WaitlistFlow> {
        self.flow.as_mut()
    }
}
