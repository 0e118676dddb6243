use serde::Serialize;
use serde_json::Value;

use crate::error::{PredictError, PredictResult};
use crate::features::FeatureVector;

/// Decode a raw `/predict` body into a validated feature vector.
///
/// Two shapes are accepted: `{"features": [..6 numbers..]}` or the six named
/// fields at the top level. A body that is itself a JSON string is decoded
/// once more, as API gateways deliver it that way.
pub fn parse_predict_body(bytes: &[u8]) -> PredictResult<FeatureVector> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(missing_body());
    }
    let body: Value = serde_json::from_slice(bytes)
        .map_err(|e| PredictError::validation(format!("invalid JSON body: {e}")))?;
    features_from_value(body, true)
}

fn features_from_value(body: Value, allow_nested: bool) -> PredictResult<FeatureVector> {
    match body {
        Value::Null => Err(missing_body()),
        Value::String(inner) if allow_nested => {
            if inner.trim().is_empty() {
                return Err(missing_body());
            }
            let nested: Value = serde_json::from_str(&inner)
                .map_err(|e| PredictError::validation(format!("invalid JSON body: {e}")))?;
            features_from_value(nested, false)
        }
        Value::Object(map) => match map.get("features") {
            Some(features) => FeatureVector::validate(features),
            None => FeatureVector::from_named(&map),
        },
        _ => Err(PredictError::validation("request body must be a JSON object")),
    }
}

fn missing_body() -> PredictError {
    PredictError::validation("Missing body")
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub model_loaded: bool,
}
