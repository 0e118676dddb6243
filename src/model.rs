use serde::{Deserialize, Serialize};

use crate::error::{PredictError, PredictResult};
use crate::features::{FeatureVector, N_FEATURES};

pub const DECISION_THRESHOLD: f64 = 0.5;

/// Scaler statistics and logistic regression weights, in the on-disk schema
/// written by the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub feature_names: Vec<String>,
    #[serde(rename = "scaler_mean")]
    pub mean: Vec<f64>,
    #[serde(rename = "scaler_scale")]
    pub scale: Vec<f64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl ModelParameters {
    /// Check the length-6 invariant and that every value is finite.
    pub fn validate(&self) -> PredictResult<()> {
        let lens = [
            ("feature_names", self.feature_names.len()),
            ("scaler_mean", self.mean.len()),
            ("scaler_scale", self.scale.len()),
            ("coef", self.coef.len()),
        ];
        for (field, len) in lens {
            if len != N_FEATURES {
                return Err(PredictError::configuration(format!(
                    "model parameters: {field} has {len} entries, expected {N_FEATURES}"
                )));
            }
        }
        let all_finite = self
            .mean
            .iter()
            .chain(&self.scale)
            .chain(&self.coef)
            .chain(std::iter::once(&self.intercept))
            .all(|x| x.is_finite());
        if !all_finite {
            return Err(PredictError::configuration(
                "model parameters contain non-finite values",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "prediction")]
    pub label: u8,
    pub probability: f64,
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Score one feature vector. Pure; safe to call from any number of threads.
///
/// Each feature is z-scored against the training statistics; a zero scale
/// contributes `0.0` instead of dividing. The logit is accumulated in index
/// order so results are reproducible bit for bit.
pub fn predict(features: &FeatureVector, params: &ModelParameters) -> PredictResult<PredictionResult> {
    let x = features.as_slice();
    if params.mean.len() != x.len() || params.scale.len() != x.len() || params.coef.len() != x.len() {
        return Err(PredictError::internal(format!(
            "feature length mismatch: got {}, model expects {}",
            x.len(),
            params.coef.len()
        )));
    }

    let mut logit = params.intercept;
    for i in 0..x.len() {
        logit += params.coef[i] * standardize(x[i], params.mean[i], params.scale[i]);
    }

    let probability = sigmoid(logit);
    let label = u8::from(probability >= DECISION_THRESHOLD);
    Ok(PredictionResult { label, probability })
}

fn standardize(x: f64, mean: f64, scale: f64) -> f64 {
    if scale != 0.0 {
        (x - mean) / scale
    } else {
        0.0
    }
}
