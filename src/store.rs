use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use crate::error::{PredictError, PredictResult};
use crate::model::ModelParameters;

/// Source of serialized model parameters, addressed by bucket and key.
pub trait ParameterStore: Send + Sync {
    fn load(&self, bucket: &str, key: &str) -> PredictResult<ModelParameters>;
}

/// Parse a parameter document and enforce the model invariants.
pub fn parse_parameters(bytes: &[u8]) -> PredictResult<ModelParameters> {
    let params: ModelParameters = serde_json::from_slice(bytes).map_err(|e| {
        PredictError::configuration(format!("model parameters are malformed: {e}"))
    })?;
    params.validate()?;
    Ok(params)
}

/// Object storage backed by a local directory: the bucket names the root
/// directory, the key is a relative object path beneath it.
#[derive(Debug, Clone, Default)]
pub struct FsParameterStore;

impl FsParameterStore {
    pub fn resolve(bucket: &str, key: &str) -> PredictResult<PathBuf> {
        if bucket.trim().is_empty() {
            return Err(PredictError::configuration(
                "model configuration unavailable: storage location is not set",
            ));
        }
        let key_path = Path::new(key);
        let escapes = key_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(PredictError::configuration(
                "model configuration unavailable: invalid object key",
            ));
        }
        Ok(Path::new(bucket).join(key_path))
    }
}

impl ParameterStore for FsParameterStore {
    fn load(&self, bucket: &str, key: &str) -> PredictResult<ModelParameters> {
        let path = Self::resolve(bucket, key)?;
        let bytes = fs::read(&path).map_err(|e| {
            tracing::warn!("failed to read model parameters at {}: {}", path.display(), e);
            PredictError::configuration("model parameters could not be loaded")
        })?;
        parse_parameters(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "feature_names": ["age","time_in_hospital","num_lab_procedures","num_medications","number_diagnoses","insulin"],
        "scaler_mean": [50, 4, 35, 15, 4, 1],
        "scaler_scale": [15, 2, 20, 10, 2, 1],
        "coef": [0.03, 0.1, 0.01, 0.05, 0.3, 0.2],
        "intercept": -2.0
    }"#;

    #[test]
    fn parses_the_parameter_schema() {
        let p = parse_parameters(DOC.as_bytes()).unwrap();
        assert_eq!(p.mean, vec![50.0, 4.0, 35.0, 15.0, 4.0, 1.0]);
        assert_eq!(p.intercept, -2.0);
        assert_eq!(p.feature_names[5], "insulin");
    }

    #[test]
    fn missing_field_is_a_configuration_error() {
        let doc = DOC.replace("\"intercept\": -2.0", "\"bias\": -2.0");
        let err = parse_parameters(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, PredictError::Configuration(_)));
        assert!(err.to_string().contains("intercept"));
    }

    #[test]
    fn disagreeing_lengths_are_rejected() {
        let doc = DOC.replace("[0.03, 0.1, 0.01, 0.05, 0.3, 0.2]", "[0.03, 0.1]");
        assert!(matches!(
            parse_parameters(doc.as_bytes()),
            Err(PredictError::Configuration(_))
        ));
    }

    #[test]
    fn loads_from_bucket_directory() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let obj = tmp.path().join("model").join("model_params.json");
        fs::create_dir_all(obj.parent().unwrap()).unwrap();
        fs::write(&obj, DOC).unwrap();

        let bucket = tmp.path().to_str().unwrap();
        let p = FsParameterStore.load(bucket, "model/model_params.json").unwrap();
        assert_eq!(p.coef.len(), 6);
    }

    #[test]
    fn unreadable_object_hides_the_path() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let bucket = tmp.path().to_str().unwrap();
        let err = FsParameterStore.load(bucket, "nope.json").unwrap_err();
        assert!(matches!(err, PredictError::Configuration(_)));
        assert!(!err.to_string().contains(bucket));
    }

    #[test]
    fn keys_cannot_escape_the_bucket() {
        for key in ["../secrets.json", "/etc/passwd", "", "model/../../x.json"] {
            assert!(FsParameterStore::resolve("/srv/models", key).is_err(), "{key}");
        }
        assert!(FsParameterStore::resolve("", "model.json").is_err());
    }
}
