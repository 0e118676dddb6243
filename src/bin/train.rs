use readmit_predictor::{config::TrainConfig, training};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = TrainConfig::from_env()?;
    tracing::info!(
        "training on {} samples (seed={}, test_fraction={})",
        cfg.samples,
        cfg.seed,
        cfg.test_fraction
    );

    let report = training::train_and_export(&cfg)?;
    println!("Test AUC: {:.4}", report.test_auc);
    println!(
        "train={} test={} positive_rate={:.3}",
        report.train_samples, report.test_samples, report.positive_rate
    );
    println!("Saved model parameters to {}", cfg.out_path);
    Ok(())
}
