//! Offline producer of the parameter file consumed by the inference service.
//!
//! Synthesizes a seeded cohort, splits it with stratification, fits the
//! scaler and a regularised logistic regression on the training split, and
//! reports held-out ROC-AUC before exporting.

pub mod data;
pub mod logistic;
pub mod metrics;
pub mod scaler;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};

use crate::config::TrainConfig;
use crate::features::FEATURE_NAMES;
use crate::model::ModelParameters;
use data::{stratified_split, synthesize};
use logistic::{FitOptions, LogisticRegression};
use metrics::roc_auc;
use scaler::StandardScaler;

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub positive_rate: f64,
    pub test_auc: f64,
    pub params: ModelParameters,
}

pub fn train(cfg: &TrainConfig) -> Result<TrainingReport> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let ds = synthesize(cfg.samples, &mut rng)?;
    let (train_set, test_set) = stratified_split(&ds, cfg.test_fraction, &mut rng)?;
    tracing::info!(
        "synthesized {} samples ({} positive); train={} test={}",
        ds.len(),
        ds.positives(),
        train_set.len(),
        test_set.len()
    );

    let scaler = StandardScaler::fit(&train_set.rows)?;
    let x_train = scaler.transform_all(&train_set.rows);
    let clf = LogisticRegression::fit(&x_train, &train_set.labels, FitOptions::default())?;

    let scores: Vec<f64> = scaler
        .transform_all(&test_set.rows)
        .iter()
        .map(|row| clf.predict_proba(row))
        .collect();
    let test_auc = roc_auc(&scores, &test_set.labels);
    tracing::info!("test AUC: {:.4}", test_auc);

    let params = ModelParameters {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        mean: scaler.mean.to_vec(),
        scale: scaler.scale.to_vec(),
        coef: clf.coef.to_vec(),
        intercept: clf.intercept,
    };
    params
        .validate()
        .map_err(|e| anyhow::anyhow!("trained parameters are invalid: {e}"))?;

    Ok(TrainingReport {
        train_samples: train_set.len(),
        test_samples: test_set.len(),
        positive_rate: ds.positives() as f64 / ds.len() as f64,
        test_auc,
        params,
    })
}

/// Write parameters in the serving schema, creating parent directories.
pub fn export(params: &ModelParameters, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(params).context("failed to serialize parameters")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn train_and_export(cfg: &TrainConfig) -> Result<TrainingReport> {
    let report = train(cfg)?;
    export(&report.params, Path::new(&cfg.out_path))?;
    tracing::info!("saved model parameters to {}", cfg.out_path);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg(out: &Path) -> TrainConfig {
        TrainConfig {
            samples: 3000,
            seed: 42,
            test_fraction: 0.2,
            out_path: out.to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn training_is_reproducible_and_discriminative() {
        let cfg = small_cfg(Path::new("unused.json"));
        let a = train(&cfg).unwrap();
        let b = train(&cfg).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(a.train_samples + a.test_samples, 3000);
        assert!(a.test_auc > 0.6, "auc {}", a.test_auc);
        assert!(a.params.scale.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn export_writes_serving_schema() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let path = tmp.path().join("model").join("model_params.json");
        let report = train_and_export(&small_cfg(&path)).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc["feature_names"][0], "age");
        assert_eq!(doc["scaler_mean"].as_array().unwrap().len(), 6);
        assert_eq!(doc["intercept"].as_f64().unwrap(), report.params.intercept);
    }
}
