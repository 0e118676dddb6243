//! Readmission risk scoring with a pre-trained logistic regression.
//!
//! The serving path validates six features, standardizes them against the
//! training statistics and applies the logistic function. Parameters are
//! fetched once per process through [`cache::ModelCache`].

pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod server;
pub mod store;
pub mod training;
pub mod types;

pub use error::{PredictError, PredictResult};
pub use features::{FeatureVector, InsulinLevel, FEATURE_NAMES};
pub use model::{predict, ModelParameters, PredictionResult};
