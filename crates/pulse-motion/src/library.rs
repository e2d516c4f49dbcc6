//! Pose library
//!
//! Pose payloads come from an injected [`AssetSource`], so the choreography
//! never cares how assets are bundled. Each payload is normalized the first
//! time it is requested and the result is shared for the rest of the
//! process.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use pulse_core::{Actor, PulseError, PulseResult};

use crate::normalize_pose;

/// Supplies raw pose payloads per actor
pub trait AssetSource: Send + Sync {
    /// Number of poses available to `actor`
    fn pose_count(&self, actor: Actor) -> usize;

    /// Load the raw payload for `actor`'s pose `index`
    fn load(&self, actor: Actor, index: usize) -> PulseResult<Value>;
}

/// One pose list shared by both actors
#[derive(Clone, Debug, Default)]
pub struct SharedPoses {
    poses: Vec<Value>,
}

impl SharedPoses {
    pub fn new(poses: Vec<Value>) -> Self {
        SharedPoses { poses }
    }
}

impl AssetSource for SharedPoses {
    fn pose_count(&self, _actor: Actor) -> usize {
        self.poses.len()
    }

    fn load(&self, actor: Actor, index: usize) -> PulseResult<Value> {
        self.poses
            .get(index)
            .cloned()
            .ok_or(PulseError::UnknownPose { actor, index })
    }
}

/// Pose files in a directory, shared by both actors, in a fixed order
#[derive(Clone, Debug)]
pub struct JsonDirAssets {
    dir: PathBuf,
    files: Vec<String>,
}

impl JsonDirAssets {
    pub fn new(dir: impl Into<PathBuf>, files: Vec<String>) -> Self {
        JsonDirAssets {
            dir: dir.into(),
            files,
        }
    }
}

impl AssetSource for JsonDirAssets {
    fn pose_count(&self, _actor: Actor) -> usize {
        self.files.len()
    }

    fn load(&self, actor: Actor, index: usize) -> PulseResult<Value> {
        let file = self
            .files
            .get(index)
            .ok_or(PulseError::UnknownPose { actor, index })?;
        let path = self.dir.join(file);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| PulseError::AssetLoad(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| PulseError::AssetLoad(format!("{}: {}", path.display(), e)))
    }
}

/// Memoized, normalized pose payloads
pub struct PoseLibrary {
    source: Box<dyn AssetSource>,
    cache: RwLock<HashMap<(Actor, usize), Arc<Value>>>,
    normalized: AtomicUsize,
}

impl PoseLibrary {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        PoseLibrary {
            source: Box::new(source),
            cache: RwLock::new(HashMap::new()),
            normalized: AtomicUsize::new(0),
        }
    }

    pub fn pose_count(&self, actor: Actor) -> usize {
        self.source.pose_count(actor)
    }

    /// Normalized payload for `actor`'s pose `index`. The first request
    /// loads and normalizes it; later requests share that result.
    pub fn get(&self, actor: Actor, index: usize) -> PulseResult<Arc<Value>> {
        if let Some(hit) = self.cache.read().get(&(actor, index)) {
            return Ok(Arc::clone(hit));
        }

        let mut cache = self.cache.write();
        if let Some(hit) = cache.get(&(actor, index)) {
            return Ok(Arc::clone(hit));
        }

        let raw = self.source.load(actor, index)?;
        let pose = Arc::new(normalize_pose(&raw));
        self.normalized.fetch_add(1, Ordering::Relaxed);
        cache.insert((actor, index), Arc::clone(&pose));
        Ok(pose)
    }

    /// Normalize every pose of both actors up front
    pub fn warm(&self) -> PulseResult<usize> {
        let mut count = 0;
        for actor in Actor::ALL {
            for index in 0..self.pose_count(actor) {
                self.get(actor, index)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// How many normalization passes have run
    pub fn normalized_count(&self) -> usize {
        self.normalized.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for PoseLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseLibrary")
            .field("cached", &self.cache.read().len())
            .field("normalized", &self.normalized_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn poses(n: usize) -> SharedPoses {
        SharedPoses::new(
            (0..n)
                .map(|i| json!({ "nm": i, "layers": [ { "ks": { "p": { "a": 1, "k": [ { "s": [10, 20 + i, 0] } ] } } } ] }))
                .collect(),
        )
    }

    #[test]
    fn test_each_pose_normalized_once() {
        let library = PoseLibrary::new(poses(3));

        for _ in 0..5 {
            library.get(Actor::Left, 1).unwrap();
        }
        assert_eq!(library.normalized_count(), 1);

        let a = library.get(Actor::Left, 1).unwrap();
        let b = library.get(Actor::Left, 1).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_returns_normalized_payload() {
        let library = PoseLibrary::new(poses(2));
        let pose = library.get(Actor::Right, 1).unwrap();

        assert_eq!(pose["layers"][0]["ks"]["p"]["k"], json!([10, 21, 0]));
        assert_eq!(pose["layers"][0]["ks"]["p"]["a"], json!(0));
    }

    #[test]
    fn test_unknown_pose() {
        let library = PoseLibrary::new(poses(2));
        let err = library.get(Actor::Left, 9);

        assert!(matches!(err, Err(PulseError::UnknownPose { index: 9, .. })));
        assert_eq!(library.normalized_count(), 0);
    }

    #[test]
    fn test_warm_covers_both_actors() {
        let library = PoseLibrary::new(poses(7));

        assert_eq!(library.warm().unwrap(), 14);
        assert_eq!(library.normalized_count(), 14);
        library.warm().unwrap();
        assert_eq!(library.normalized_count(), 14);
    }

    #[test]
    fn test_missing_directory_reports_asset_error() {
        let assets = JsonDirAssets::new("/nonexistent/pulse", vec!["ss1.json".into()]);
        assert!(matches!(assets.load(Actor::Left, 0), Err(PulseError::AssetLoad(_))));
        assert!(matches!(
            assets.load(Actor::Left, 3),
            Err(PulseError::UnknownPose { index: 3, .. })
        ));
    }
}
