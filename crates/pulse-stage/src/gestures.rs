//! The hero's gesture library
//!
//! Gestures are authored for the left actor; rotations are mirrored for the
//! right actor through [`Actor::sway`].

use std::time::Duration;

use pulse_core::{Actor, Property};
use pulse_motion::{Easing, Gesture, Step};

/// Excited hover loop: bob up, pulse, sway, and flap the arms on a faster
/// cycle of its own
pub fn hover_loop(actor: Actor) -> Gesture {
    let sway = actor.sway();
    Gesture::looping("hover")
        .track(
            Property::TranslateY,
            [
                Step::to(-40.0, 300, Easing::OutCubic),
                Step::to(-30.0, 200, Easing::InOutQuad),
                Step::to(-40.0, 200, Easing::InOutQuad),
            ],
        )
        .track(
            Property::Scale,
            [Step::ease(1.15, 300), Step::ease(1.1, 200), Step::ease(1.15, 200)],
        )
        .track(
            Property::Rotate,
            [
                Step::ease(-8.0 * sway, 300),
                Step::ease(8.0 * sway, 200),
                Step::ease(-8.0 * sway, 200),
            ],
        )
        .track(
            Property::ScaleX,
            [
                Step::to(1.08, 250, Easing::InOutQuad),
                Step::to(0.95, 250, Easing::InOutQuad),
            ],
        )
}

/// Smooth return of every transform property to identity
pub fn rest(duration: Duration) -> Gesture {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    Property::TRANSFORM
        .iter()
        .fold(Gesture::once("rest"), |gesture, property| {
            gesture.track(
                *property,
                [Step::to(property.rest_value(), millis, Easing::OutQuad)],
            )
        })
}

/// Click celebration: crouch, jump, land, bounce, settle
pub fn celebrate(actor: Actor) -> Gesture {
    let sway = actor.sway();
    Gesture::once("celebrate")
        .track(
            Property::TranslateY,
            [
                Step::to(10.0, 100, Easing::InCubic),
                Step::to(-60.0, 400, Easing::OutCubic),
                Step::to(0.0, 300, Easing::InCubic),
                Step::to(-20.0, 200, Easing::OutQuad),
                Step::to(0.0, 200, Easing::InQuad),
            ],
        )
        .track(
            Property::Scale,
            [
                Step::to(0.9, 100, Easing::InOutQuad),
                Step::to(1.2, 400, Easing::InOutQuad),
                Step::to(0.95, 300, Easing::InOutQuad),
                Step::to(1.05, 200, Easing::InOutQuad),
                Step::to(1.0, 200, Easing::InOutQuad),
            ],
        )
        .track(
            Property::Rotate,
            [
                Step::to(0.0, 100, Easing::InOutQuad),
                Step::to(-15.0 * sway, 400, Easing::InOutQuad),
                Step::to(5.0 * sway, 300, Easing::InOutQuad),
                Step::to(0.0, 400, Easing::InOutQuad),
            ],
        )
        .track(
            Property::ScaleX,
            [
                Step::ease(1.1, 100),
                Step::ease(0.9, 200),
                Step::ease(1.15, 200),
                Step::ease(1.0, 300),
            ],
        )
}

/// Subtle idle breathing, ping-ponging forever. The right actor breathes
/// slower and a beat later.
pub fn breathe(actor: Actor) -> Gesture {
    let (step, chest, waist, delay) = match actor {
        Actor::Left => (2000, 1.02, 0.995, 0),
        Actor::Right => (2200, 1.025, 0.99, 300),
    };
    Gesture::alternating("breathe")
        .track_from(
            Property::ScaleY,
            1.0,
            [
                Step::to(1.0, step, Easing::InOutQuad),
                Step::to(chest, step, Easing::InOutQuad),
            ],
        )
        .track_from(
            Property::ScaleX,
            1.0,
            [
                Step::to(1.0, step, Easing::InOutQuad),
                Step::to(waist, step, Easing::InOutQuad),
            ],
        )
        .delayed(Duration::from_millis(delay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{SceneTime, Transform};
    use pulse_motion::{Animator, Channel};

    #[test]
    fn test_rotations_mirrored() {
        let left = hover_loop(Actor::Left);
        let right = hover_loop(Actor::Right);
        let first = |g: &Gesture| g.tracks[2].steps[0].target;

        assert_eq!(first(&left), -8.0);
        assert_eq!(first(&right), 8.0);
        assert_eq!(celebrate(Actor::Right).tracks[2].steps[1].target, 15.0);
    }

    #[test]
    fn test_celebrate_lasts_one_second_and_lands() {
        let g = celebrate(Actor::Left);
        assert_eq!(g.duration(), Duration::from_millis(1200));

        let mut animator = Animator::new();
        animator.play(Channel::Click, g, SceneTime::ZERO);
        let jump = animator.sample(SceneTime::from_millis(500));
        assert!((jump.offset_y + 60.0).abs() < 1e-3);

        let landed = animator.sample(SceneTime::from_millis(1200));
        assert!(landed.is_identity(1e-4));
    }

    #[test]
    fn test_rest_covers_every_transform_property() {
        let g = rest(Duration::from_millis(500));
        let properties: Vec<Property> = g.properties().collect();
        assert_eq!(properties, Property::TRANSFORM.to_vec());
        assert_eq!(g.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_rest_clamps_oversized_duration() {
        assert_eq!(rest(Duration::MAX).duration(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_breathing_stays_subtle() {
        let mut animator = Animator::new();
        animator.play(Channel::Idle, breathe(Actor::Right), SceneTime::ZERO);

        for ms in (0..20_000).step_by(137) {
            let t = animator.sample(SceneTime::from_millis(ms));
            assert!(t.is_resting(1e-6), "breathing must not move offset, scale or rotation");
            assert!((1.0..=1.025 + 1e-4).contains(&t.scale_y));
            assert!((0.99 - 1e-4..=1.0).contains(&t.scale_x));
        }
        assert_eq!(animator.sample(SceneTime::from_millis(200)), Transform::IDENTITY);
    }
}
