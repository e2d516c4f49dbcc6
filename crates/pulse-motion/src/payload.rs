//! Pose payload normalization
//!
//! Pose payloads are Lottie-style JSON documents. Some of them bob up and
//! down through their layer position keyframes; on stage that reads as the
//! actor floating off the floor. Normalization pins every animated layer
//! position to a single grounded point: the lowest vertical extent across
//! its keyframes (largest `y`, since `y` grows downwards) and the first
//! horizontal position.
//!
//! Normalization is pure, deterministic and idempotent. It fails soft: a
//! payload whose structure cannot be walked is returned untouched.

use serde_json::{json, Map, Value};

use pulse_core::{PulseError, PulseResult};

/// Ground line used when a layer position carries no usable `y`
pub const FALLBACK_GROUND_Y: u32 = 378;
/// Horizontal position used when a layer position carries no usable `x`
pub const FALLBACK_ORIGIN_X: u32 = 672;

/// Ground every layer position of `payload`. Never fails: on a structural
/// error the original payload is returned as is.
pub fn normalize_pose(payload: &Value) -> Value {
    let mut grounded = payload.clone();
    match ground_layers(&mut grounded) {
        Ok(count) => {
            tracing::trace!(layers = count, "pose payload grounded");
            grounded
        }
        Err(err) => {
            tracing::warn!(%err, "pose payload left as authored");
            payload.clone()
        }
    }
}

/// Ground layer positions in place. Returns how many layers were rewritten.
pub fn ground_layers(payload: &mut Value) -> PulseResult<usize> {
    let Some(layers) = payload.get_mut("layers") else {
        return Ok(0);
    };
    if !is_truthy(layers) {
        return Ok(0);
    }
    let layers = layers
        .as_array_mut()
        .ok_or_else(|| PulseError::MalformedPayload("`layers` is not an array".into()))?;

    let mut count = 0;
    for (i, layer) in layers.iter_mut().enumerate() {
        if layer.is_null() {
            return Err(PulseError::MalformedPayload(format!("layer {} is null", i)));
        }
        let Some(position) = animated_position(layer) else {
            continue;
        };
        let Some(keyframes) = position.get("k") else {
            continue;
        };
        let (x, y) = grounded_point(keyframes)
            .map_err(|reason| PulseError::MalformedPayload(format!("layer {}: {}", i, reason)))?;

        position.insert("a".into(), json!(0));
        position.insert("k".into(), json!([x, y, 0]));
        count += 1;
    }
    Ok(count)
}

/// `layer.ks.p` when it is an object with a truthy `k`
fn animated_position(layer: &mut Value) -> Option<&mut Map<String, Value>> {
    let transform = layer.get_mut("ks").filter(|ks| is_truthy(ks))?;
    let position = transform.get_mut("p").filter(|p| is_truthy(p))?;
    let position = position.as_object_mut()?;
    if position.get("k").is_some_and(is_truthy) {
        Some(position)
    } else {
        None
    }
}

fn grounded_point(k: &Value) -> Result<(Value, Value), &'static str> {
    let fallback = (json!(FALLBACK_ORIGIN_X), json!(FALLBACK_GROUND_Y));
    let Some(values) = k.as_array() else {
        return Ok(fallback);
    };

    // Keyframed position: [{ "s": [x, y, z], ... }, ...]
    if let Some(first) = values.first() {
        if first.is_null() {
            return Err("first position keyframe is null");
        }
        if first.get("s").is_some() {
            if values.iter().any(Value::is_null) {
                return Err("position keyframe is null");
            }
            let starts = values
                .iter()
                .filter_map(|frame| frame.get("s").and_then(Value::as_array));

            let lowest = starts
                .clone()
                .filter_map(|s| s.get(1).filter(|y| y.is_number()))
                .max_by(|a, b| {
                    let (a, b) = (a.as_f64().unwrap_or(f64::MIN), b.as_f64().unwrap_or(f64::MIN));
                    a.total_cmp(&b)
                })
                .cloned();
            let first_x = starts
                .filter_map(|s| s.first().filter(|x| x.is_number()))
                .next()
                .cloned();

            return Ok((
                first_x.unwrap_or(fallback.0),
                lowest.unwrap_or(fallback.1),
            ));
        }
    }

    // Static position: [x, y, z]
    if values.len() >= 2 && values[1].is_number() {
        return Ok((values[0].clone(), values[1].clone()));
    }

    Ok(fallback)
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
