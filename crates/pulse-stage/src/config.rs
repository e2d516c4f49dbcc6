//! Stage configuration

use std::time::Duration;

use pulse_core::Actor;

/// Pose cycling of one actor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorCycle {
    /// Time between pose changes
    pub period: Duration,
    /// Pose shown at mount
    pub start: usize,
}

/// Pose cycling of both actors. The periods and start offsets differ so
/// the actors drift visibly out of phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CyclerConfig {
    pub left: ActorCycle,
    pub right: ActorCycle,
}

impl CyclerConfig {
    pub fn for_actor(&self, actor: Actor) -> ActorCycle {
        match actor {
            Actor::Left => self.left,
            Actor::Right => self.right,
        }
    }
}

impl Default for CyclerConfig {
    fn default() -> Self {
        CyclerConfig {
            left: ActorCycle {
                period: Duration::from_millis(500),
                start: 0,
            },
            right: ActorCycle {
                period: Duration::from_millis(450),
                start: 3,
            },
        }
    }
}

/// Physical parameters of one particle burst
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstStyle {
    pub particles: u32,
    /// Cone angle in degrees
    pub spread: f32,
    /// Launch speed; `None` leaves the renderer's default
    pub start_velocity: Option<f32>,
    /// Frames before a particle fades out
    pub ticks: u32,
    pub gravity: f32,
    /// Particle size multiplier
    pub scalar: f32,
    /// Empty means the renderer's default palette
    pub colors: &'static [&'static str],
}

/// Palette of the hover bursts
pub const HOVER_PALETTE: &[&str] = &["#6418BD", "#E3B0FF", "#A855F7", "#C084FC"];

impl BurstStyle {
    /// Small purple puff fired at a hovered actor
    pub fn hover() -> Self {
        BurstStyle {
            particles: 10,
            spread: 50.0,
            start_velocity: None,
            ticks: 80,
            gravity: 1.3,
            scalar: 0.6,
            colors: HOVER_PALETTE,
        }
    }

    /// Full-circle stream fired on submission success. `particles` is
    /// filled in per tick.
    pub fn celebration() -> Self {
        BurstStyle {
            particles: 0,
            spread: 360.0,
            start_velocity: Some(30.0),
            ticks: 60,
            gravity: 1.0,
            scalar: 1.0,
            colors: &[],
        }
    }
}

/// Burst admission control
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstConfig {
    /// Bursts allowed in flight at once
    pub ceiling: usize,
    /// How long an admitted burst counts against the ceiling
    pub expiry: Duration,
    /// Hover burst repeat period
    pub hover_period: Duration,
    pub hover: BurstStyle,
}

impl Default for BurstConfig {
    fn default() -> Self {
        BurstConfig {
            ceiling: 50,
            expiry: Duration::from_millis(2000),
            hover_period: Duration::from_millis(1500),
            hover: BurstStyle::hover(),
        }
    }
}

/// Speech bubble
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleConfig {
    /// Auto-dismiss delay
    pub dismiss_after: Duration,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        BubbleConfig {
            dismiss_after: Duration::from_millis(2500),
        }
    }
}

/// Success celebration particle stream
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelebrationConfig {
    /// Total length of the particle stream
    pub duration: Duration,
    /// Time between paired bursts
    pub tick: Duration,
    /// Particles per burst at the very start; scales down linearly
    pub peak_particles: u32,
    /// Horizontal origin range of the left stream
    pub left_origin: (f32, f32),
    /// Horizontal origin range of the right stream
    pub right_origin: (f32, f32),
    pub style: BurstStyle,
    /// Fixed seed for the origin jitter; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        CelebrationConfig {
            duration: Duration::from_millis(3000),
            tick: Duration::from_millis(250),
            peak_particles: 50,
            left_origin: (0.1, 0.3),
            right_origin: (0.7, 0.9),
            style: BurstStyle::celebration(),
            seed: None,
        }
    }
}

/// Actor motion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Return-to-rest transition after hover
    pub rest_transition: Duration,
    /// Run the idle breathing loop while mounted
    pub breathing: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            rest_transition: Duration::from_millis(500),
            breathing: true,
        }
    }
}

/// Stage configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageConfig {
    pub cycler: CyclerConfig,
    pub burst: BurstConfig,
    pub bubble: BubbleConfig,
    pub celebration: CelebrationConfig,
    pub motion: MotionConfig,
    /// Maximum render effects held for the renderer
    pub max_pending_effects: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        StageConfig {
            cycler: CyclerConfig::default(),
            burst: BurstConfig::default(),
            bubble: BubbleConfig::default(),
            celebration: CelebrationConfig::default(),
            motion: MotionConfig::default(),
            max_pending_effects: 1024,
        }
    }
}

impl StageConfig {
    /// Default configuration with a fixed celebration seed
    pub fn seeded(seed: u64) -> Self {
        let mut config = StageConfig::default();
        config.celebration.seed = Some(seed);
        config
    }
}
