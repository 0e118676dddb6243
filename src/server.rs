use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::cache::ModelCache;
use crate::config::AppConfig;
use crate::error::{PredictError, PredictResult};
use crate::model::{self, ModelParameters, PredictionResult};
use crate::store::ParameterStore;
use crate::types::{parse_predict_body, HealthOut};

const FORM_PAGE: &str = include_str!("../static/index.html");

type SharedLoad = Shared<BoxFuture<'static, PredictResult<Arc<ModelParameters>>>>;

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    cache: Arc<ModelCache>,
    store: Arc<dyn ParameterStore>,
    config: Arc<AppConfig>,
    // The single load currently running on the blocking pool, if any.
    in_flight: Arc<Mutex<Option<SharedLoad>>>,
    loads_started: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ParameterStore>) -> Self {
        Self::with_cache(config, store, Arc::new(ModelCache::new()))
    }

    pub fn with_cache(config: AppConfig, store: Arc<dyn ParameterStore>, cache: Arc<ModelCache>) -> Self {
        Self {
            cache,
            store,
            config: Arc::new(config),
            in_flight: Arc::new(Mutex::new(None)),
            loads_started: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Number of blocking load tasks spawned so far.
    pub fn loads_started(&self) -> usize {
        self.loads_started.load(Ordering::SeqCst)
    }

    /// Cached parameters, loading them on first use.
    ///
    /// The load runs on the blocking pool. Concurrent cold callers share one
    /// load and each waits under its own timeout; a load that outlives its
    /// callers still fills the cache when it finishes.
    pub async fn model(&self) -> PredictResult<Arc<ModelParameters>> {
        if let Some(params) = self.cache.get() {
            return Ok(params);
        }

        let load = self.shared_load();
        match tokio::time::timeout(self.config.load_timeout, load).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!(
                    "model load exceeded {} ms",
                    self.config.load_timeout.as_millis()
                );
                Err(PredictError::configuration("model parameters load timed out"))
            }
        }
    }

    fn shared_load(&self) -> SharedLoad {
        let mut slot = self.in_flight.lock();
        if let Some(load) = slot.as_ref() {
            // A finished load that failed is replaced so the next request retries.
            if load.peek().is_none() {
                return load.clone();
            }
        }

        let n = self.loads_started.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("starting model load #{}", n);
        let state = self.clone();
        let load = tokio::task::spawn_blocking(move || state.load_blocking())
            .map(|joined| {
                joined.unwrap_or_else(|e| Err(PredictError::internal(format!("model load task failed: {e}"))))
            })
            .boxed()
            .shared();
        *slot = Some(load.clone());
        load
    }

    fn load_blocking(&self) -> PredictResult<Arc<ModelParameters>> {
        self.cache.get_or_load(|| {
            let bucket = self.config.model_bucket.as_deref().ok_or_else(|| {
                PredictError::configuration("model configuration unavailable: MODEL_BUCKET is not set")
            })?;
            let start = Instant::now();
            let params = self.store.load(bucket, &self.config.model_key)?;
            tracing::info!(
                "loaded model parameters key={} features={:?} in {} ms",
                self.config.model_key,
                params.feature_names,
                start.elapsed().as_millis()
            );
            Ok(params)
        })
    }
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResult>, PredictError> {
    let body = body.map_err(|rejection| PredictError::validation(rejection.body_text()))?;
    // Reject malformed input before touching storage.
    let features = parse_predict_body(&body)?;
    let params = state.model().await?;
    let out = model::predict(&features, &params)?;
    tracing::debug!(
        "scored features={:?} probability={:.4} prediction={}",
        features.as_slice(),
        out.probability,
        out.label
    );
    Ok(Json(out))
}

async fn health(State(state): State<AppState>) -> Json<HealthOut> {
    Json(HealthOut {
        status: "ok",
        model_loaded: state.cache.is_loaded(),
    })
}

async fn form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}
