//! Identity types for the hero stage

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two animated foreground characters
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Left,
    Right,
}

impl Actor {
    /// Both actors, left first
    pub const ALL: [Actor; 2] = [Actor::Left, Actor::Right];

    /// Dense index for per-actor tables
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Actor::Left => 0,
            Actor::Right => 1,
        }
    }

    /// Rotation sign. Gestures are authored for the left actor and
    /// mirrored for the right one.
    #[inline]
    pub fn sway(self) -> f32 {
        match self {
            Actor::Left => 1.0,
            Actor::Right => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Actor::Left => "left",
            Actor::Right => "right",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle of a scheduled timer on the scene clock
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimerId(pub u64);

impl TimerId {
    #[inline]
    pub fn new(id: u64) -> Self {
        TimerId(id)
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}
