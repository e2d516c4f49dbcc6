//! CampusPulse Test Harness - Fake-clock simulation and visit validation
//!
//! This crate provides:
//! - Synthetic pose payloads, including damaged ones
//! - A stage simulator with scripted visitors and simulated delivery
//! - Randomized end-to-end visits with invariant checks

pub mod integration;
pub mod poses;
pub mod simulator;

pub use integration::*;
pub use poses::*;
pub use simulator::*;
