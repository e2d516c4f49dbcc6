//! Synthetic pose payloads
//!
//! Small Lottie-shaped documents with the features normalization cares
//! about: keyframed positions that bob, static positions, layers without a
//! position, and the odd malformed layer.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use pulse_motion::{PoseLibrary, SharedPoses};

/// A pose whose body layer bobs through `frames` keyframes
pub fn bobbing_pose(index: usize, frames: usize) -> Value {
    let keyframes: Vec<Value> = (0..frames.max(1))
        .map(|t| {
            let y = 360 + ((t * 7 + index * 3) % 32);
            json!({ "t": t * 6, "s": [640 + index, y, 0], "i": { "x": 0.4, "y": 1 }, "o": { "x": 0.6, "y": 0 } })
        })
        .collect();

    json!({
        "v": "5.7.4",
        "fr": 30,
        "ip": 0,
        "op": frames * 6,
        "w": 1280,
        "h": 720,
        "nm": format!("pose{}", index + 1),
        "layers": [
            { "ind": 1, "nm": "body", "ks": { "p": { "a": 1, "k": keyframes }, "o": { "a": 0, "k": 100 } } },
            { "ind": 2, "nm": "shadow", "ks": { "p": { "a": 0, "k": [640, 410, 0] } } },
            { "ind": 3, "nm": "label", "ks": { "o": { "a": 0, "k": 100 } } }
        ]
    })
}

/// Seven poses, the hero's usual set
pub fn hero_poses() -> Vec<Value> {
    (0..7).map(|i| bobbing_pose(i, 12)).collect()
}

/// A library over `count` synthetic poses shared by both actors
pub fn synthetic_library(count: usize) -> Arc<PoseLibrary> {
    let poses = (0..count).map(|i| bobbing_pose(i, 12)).collect();
    Arc::new(PoseLibrary::new(SharedPoses::new(poses)))
}

/// Payloads with random structural damage, for fail-soft checks
pub fn damaged_poses(count: usize, seed: u64) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let mut pose = bobbing_pose(i, 6);
            match rng.gen_range(0..5) {
                0 => pose["layers"] = json!({ "0": {} }),
                1 => {
                    if let Some(layers) = pose["layers"].as_array_mut() {
                        layers.push(Value::Null);
                    }
                }
                2 => pose["layers"][0]["ks"]["p"]["k"] = json!([null, 1]),
                3 => pose["layers"][0]["ks"]["p"]["k"][2] = Value::Null,
                _ => pose["layers"][0]["ks"]["p"]["k"] = json!("not keyframes"),
            }
            pose
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::Actor;
    use pulse_motion::normalize_pose;

    #[test]
    fn test_bobbing_pose_is_grounded_to_lowest_frame() {
        let pose = bobbing_pose(0, 12);
        let lowest = pose["layers"][0]["ks"]["p"]["k"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["s"][1].as_u64())
            .max()
            .unwrap();

        let grounded = normalize_pose(&pose);
        assert_eq!(grounded["layers"][0]["ks"]["p"]["k"], json!([640, lowest, 0]));
    }

    #[test]
    fn test_damaged_poses_never_panic() {
        for pose in damaged_poses(64, 9) {
            let out = normalize_pose(&pose);
            assert_eq!(normalize_pose(&out), out);
        }
    }

    #[test]
    fn test_null_keyframe_mid_track_left_as_authored() {
        let mut pose = bobbing_pose(2, 6);
        pose["layers"][0]["ks"]["p"]["k"][3] = Value::Null;
        assert_eq!(normalize_pose(&pose), pose);
    }

    #[test]
    fn test_synthetic_library_size() {
        let library = synthetic_library(7);
        assert_eq!(library.pose_count(Actor::Left), 7);
        assert_eq!(library.warm().unwrap(), 14);
    }
}
