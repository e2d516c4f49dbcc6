//! CampusPulse Stage
//!
//! The hero section runtime. One [`Stage`] owns:
//! - Pose cycling for both actors
//! - Hover and click choreography on per-actor animation channels
//! - The burst limiter shared by hover puffs and the success celebration
//! - Speech bubble and waitlist modal state
//! - The waitlist submission flow and its success celebration
//!
//! Everything is single-threaded and timer driven. [`StageDriver`] runs a
//! stage on tokio in real time; tests drive it directly on a virtual clock.

pub mod burst;
pub mod celebration;
pub mod choreographer;
pub mod config;
pub mod driver;
pub mod error;
pub mod gestures;
pub mod stage;
pub mod transient;

pub use burst::*;
pub use celebration::*;
pub use choreographer::*;
pub use config::*;
pub use driver::*;
pub use error::*;
pub use stage::*;
pub use transient::*;
