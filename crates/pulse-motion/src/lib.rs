//! CampusPulse Motion
//!
//! Motion as data, not as library calls. A gesture is a set of tracks, each
//! a list of `(target, duration, easing)` steps for one property. Any
//! rendering backend can interpret the sampled values.
//!
//! # Channels
//!
//! Each actor has an [`Animator`] with three independent channels, composed
//! bottom to top:
//!
//! - Idle: breathing loop, always running while mounted
//! - Hover: hover loop, replaced by the return-to-rest transition on leave
//! - Click: one-shot celebration jump
//!
//! Starting a gesture on a channel supersedes whatever that channel was
//! playing. Channels never cancel each other.
//!
//! # Poses
//!
//! [`PoseCycler`] walks the pose list of an actor, and [`PoseLibrary`] hands
//! out pose payloads normalized once per process by [`normalize_pose`].

pub mod animator;
pub mod cycler;
pub mod easing;
pub mod gesture;
pub mod library;
pub mod payload;
pub mod timeline;

pub use animator::*;
pub use cycler::*;
pub use easing::*;
pub use gesture::*;
pub use library::*;
pub use payload::*;
pub use timeline::*;
