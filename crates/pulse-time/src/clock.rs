//! Scene clock

use std::time::Duration;

use pulse_core::SceneTime;

/// Largest wall-clock step a real-time driver should feed the scene in one
/// frame. A driver that stalls (tab in background, system sleep) must not
/// fast-forward every pending animation at once.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Scene clock - monotonic, advanced explicitly by the driver
/// INVARIANT: the value NEVER decreases
#[derive(Debug, Default)]
pub struct SceneClock {
    value: SceneTime,
}

impl SceneClock {
    /// Create a clock at scene time zero
    pub fn new() -> Self {
        SceneClock {
            value: SceneTime::ZERO,
        }
    }

    /// Advance by `dt`
    pub fn advance(&mut self, dt: Duration) -> SceneTime {
        self.value = self.value.saturating_add(dt);
        self.value
    }

    /// Move to `target` if it is in the future; earlier targets are ignored
    pub fn advance_to(&mut self, target: SceneTime) -> SceneTime {
        if target > self.value {
            self.value = target;
        }
        self.value
    }

    /// Current scene time
    pub fn now(&self) -> SceneTime {
        self.value
    }
}

/// Clamp a measured wall-clock frame delta to [`MAX_FRAME_STEP`]
#[inline]
pub fn clamp_frame_step(elapsed: Duration) -> Duration {
    elapsed.min(MAX_FRAME_STEP)
}
