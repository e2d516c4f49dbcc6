//! Decorative particle bursts and their admission gate
//!
//! The limiter is a soft gate, not a precise count: every admitted burst
//! holds one unit until its own expiry timer fires, independently of the
//! others and of when the particles actually fade. At the ceiling, a burst
//! request is a silent no-op.

use pulse_core::{Actor, Origin};

use crate::BurstStyle;

/// What asked for a burst
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstSource {
    /// Periodic puff while an actor is hovered
    Hover(Actor),
    /// Success celebration stream
    Celebration,
}

/// A burst the renderer should emit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    /// Admission ticket; its expiry timer is keyed on it
    pub id: u64,
    pub source: BurstSource,
    /// Normalized screen-space origin
    pub origin: Origin,
    pub style: BurstStyle,
}

/// Bounded count of in-flight bursts
#[derive(Clone, Debug)]
pub struct BurstLimiter {
    ceiling: usize,
    in_flight: usize,
    next_id: u64,
    admitted: u64,
    refused: u64,
}

impl BurstLimiter {
    pub fn new(ceiling: usize) -> Self {
        BurstLimiter {
            ceiling,
            in_flight: 0,
            next_id: 1,
            admitted: 0,
            refused: 0,
        }
    }

    /// Admit one burst. Returns its ticket, or `None` at the ceiling.
    pub fn try_fire(&mut self) -> Option<u64> {
        if self.in_flight >= self.ceiling {
            self.refused += 1;
            tracing::trace!(in_flight = self.in_flight, "burst refused at ceiling");
            return None;
        }

        self.in_flight += 1;
        self.admitted += 1;
        let id = self.next_id;
        self.next_id += 1;
        Some(id)
    }

    /// One admitted burst's expiry came due
    pub fn on_expired(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Forget every in-flight burst
    pub fn release_all(&mut self) -> usize {
        std::mem::take(&mut self.in_flight)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn admitted(&self) -> u64 {
        self.admitted
    }

    pub fn refused(&self) -> u64 {
        self.refused
    }
}
