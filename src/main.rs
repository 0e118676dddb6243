use std::sync::Arc;

use anyhow::Context;
use readmit_predictor::{
    config::AppConfig,
    server::{router, AppState},
    store::FsParameterStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;
    if cfg.model_bucket.is_none() {
        tracing::warn!("MODEL_BUCKET not set; /predict will fail until it is configured");
    }
    tracing::info!("model key={} load timeout={:?}", cfg.model_key, cfg.load_timeout);

    let listener = tokio::net::TcpListener::bind(cfg.bind_target())
        .await
        .with_context(|| format!("failed to bind {}:{}", cfg.bind_host, cfg.port))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let state = AppState::new(cfg, Arc::new(FsParameterStore));
    let app = router(state);

    axum::serve(listener, app).await?;
    Ok(())
}
