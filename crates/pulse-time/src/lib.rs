//! CampusPulse Time - Scene clock and timer ownership
//!
//! Everything on the stage runs on one cooperative loop:
//! - SceneClock: monotonic virtual time, never moves backwards
//! - Scheduler: one-shot and periodic timers fired in deadline order
//! - TimerSlots: per-component table of owned timer handles, where
//!   installing a timer under a key cancels the one it supersedes

pub mod clock;
pub mod scheduler;
pub mod slots;

pub use clock::*;
pub use scheduler::*;
pub use slots::*;
