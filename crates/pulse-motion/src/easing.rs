//! Easing curves
//!
//! Every curve maps progress `t` in [0, 1] to eased progress with
//! `f(0) = 0` and `f(1) = 1`. Back-out overshoots in between.

use std::f32::consts::PI;

/// Easing curve of a step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    OutQuart,
    InOutSine,
    /// Overshoots the target by the given factor before settling
    BackOut(f32),
}

impl Easing {
    /// Apply the curve. Input is clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::BackOut(overshoot) => {
                let u = t - 1.0;
                u * u * ((overshoot + 1.0) * u + overshoot) + 1.0
            }
        }
    }

    /// Interpolate between `from` and `to`
    #[inline]
    pub fn lerp(self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.apply(t)
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::InOutSine
    }
}
