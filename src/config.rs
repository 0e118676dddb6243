use std::{env, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_MODEL_KEY: &str = "model/model_params.json";

/// Service configuration, read once from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Storage location of the parameter file. Absence is only reported on
    /// the first request that needs the model.
    pub model_bucket: Option<String>,
    pub model_key: String,
    pub load_timeout: Duration,
    pub bind_host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_bucket: None,
            model_key: DEFAULT_MODEL_KEY.to_string(),
            load_timeout: Duration::from_millis(5000),
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let model_bucket = env::var("MODEL_BUCKET").ok().filter(|s| !s.trim().is_empty());
        let model_key = env::var("MODEL_KEY").unwrap_or(defaults.model_key);
        let load_timeout = match env::var("MODEL_LOAD_TIMEOUT_MS") {
            Ok(v) => Duration::from_millis(
                v.parse()
                    .with_context(|| format!("MODEL_LOAD_TIMEOUT_MS is not an integer: {v}"))?,
            ),
            Err(_) => defaults.load_timeout,
        };
        let port = match env::var("PORT") {
            Ok(v) => v.parse().with_context(|| format!("PORT is not a valid port: {v}"))?,
            Err(_) => defaults.port,
        };
        let bind_host = env::var("BIND_HOST").unwrap_or(defaults.bind_host);

        Ok(Self {
            model_bucket,
            model_key,
            load_timeout,
            bind_host,
            port,
        })
    }

    /// Host and port for the listener; the host may be a name or an address.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.bind_host.as_str(), self.port)
    }
}

/// Settings for the offline trainer binary.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub samples: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub out_path: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            samples: 5000,
            seed: 42,
            test_fraction: 0.2,
            out_path: DEFAULT_MODEL_KEY.to_string(),
        }
    }
}

impl TrainConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let samples = match env::var("TRAIN_SAMPLES") {
            Ok(v) => v.parse().with_context(|| format!("TRAIN_SAMPLES is not an integer: {v}"))?,
            Err(_) => defaults.samples,
        };
        let seed = match env::var("TRAIN_SEED") {
            Ok(v) => v.parse().with_context(|| format!("TRAIN_SEED is not an integer: {v}"))?,
            Err(_) => defaults.seed,
        };
        let test_fraction = match env::var("TRAIN_TEST_FRACTION") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("TRAIN_TEST_FRACTION is not a number: {v}"))?,
            Err(_) => defaults.test_fraction,
        };
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            anyhow::bail!("TRAIN_TEST_FRACTION must be in (0, 1), got {test_fraction}");
        }
        let out_path = env::var("TRAIN_OUT").unwrap_or(defaults.out_path);

        Ok(Self {
            samples,
            seed,
            test_fraction,
            out_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_target(), ("0.0.0.0", 8080));
        assert!(cfg.model_bucket.is_none());
        assert_eq!(cfg.model_key, "model/model_params.json");
    }

    #[tokio::test]
    async fn hostname_bind_host_resolves() {
        let cfg = AppConfig {
            bind_host: "localhost".into(),
            port: 0,
            ..AppConfig::default()
        };
        let listener = tokio::net::TcpListener::bind(cfg.bind_target()).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}
