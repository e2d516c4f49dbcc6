//! Scene time
//!
//! All choreography runs against a virtual, monotonic scene clock.
//! Wall-clock time only enters through whoever drives the clock.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Scene time - monotonic, microseconds since stage mount
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SceneTime(pub u64);

impl SceneTime {
    pub const ZERO: SceneTime = SceneTime(0);
    pub const MAX: SceneTime = SceneTime(u64::MAX);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        SceneTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        SceneTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        SceneTime(self.0.saturating_add(micros))
    }

    /// Time elapsed since an earlier instant, zero if `earlier` is later
    #[inline]
    pub fn since(self, earlier: SceneTime) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for SceneTime {
    type Output = SceneTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<SceneTime> for SceneTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SceneTime) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for SceneTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}
