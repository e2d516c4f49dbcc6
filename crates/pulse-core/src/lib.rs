//! CampusPulse Core - Fundamental types for the hero stage
//!
//! This crate defines the types shared by every other crate:
//! - Identifiers (Actor, TimerId)
//! - Scene time on the virtual clock
//! - Geometry (Rect, Viewport, Origin, Transform, Property)
//! - Error type and result alias

pub mod error;
pub mod geometry;
pub mod id;
pub mod time;

pub use error::*;
pub use geometry::*;
pub use id::*;
pub use time::*;
