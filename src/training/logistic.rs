use anyhow::{bail, Result};
use linfa::prelude::*;
use linfa_logistic::LogisticRegression as LinfaLogistic;
use ndarray::{Array1, Array2};

use super::data::Row;
use crate::features::N_FEATURES;
use crate::model::sigmoid;

#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// L2 penalty on the weights; the intercept is not penalised.
    pub alpha: f64,
    pub gradient_tolerance: f64,
    pub max_iterations: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gradient_tolerance: 1e-6,
            max_iterations: 200,
        }
    }
}

/// Fitted weights in serving order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    pub coef: [f64; N_FEATURES],
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn fit(x: &[Row], y: &[bool], opts: FitOptions) -> Result<Self> {
        if x.len() != y.len() || x.is_empty() {
            bail!("need matching, non-empty inputs (x={}, y={})", x.len(), y.len());
        }
        if opts.alpha.partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater) {
            bail!("regularisation alpha must be positive, got {}", opts.alpha);
        }

        let records = Array2::from_shape_vec((x.len(), N_FEATURES), x.iter().flatten().copied().collect())?;
        let targets: Array1<usize> = y.iter().map(|&l| usize::from(l)).collect();
        let ds = Dataset::new(records, targets);

        let model = LinfaLogistic::default()
            .alpha(opts.alpha)
            .gradient_tolerance(opts.gradient_tolerance)
            .max_iterations(opts.max_iterations)
            .with_intercept(true)
            .fit(&ds)?;

        // linfa picks which class is "positive"; weights must score class 1.
        let sign = if model.labels().pos.class == 1 { 1.0 } else { -1.0 };
        let mut coef = [0.0; N_FEATURES];
        for (c, w) in coef.iter_mut().zip(model.params().iter()) {
            *c = sign * w;
        }
        let intercept = sign * model.intercept();
        if !coef.iter().chain(std::iter::once(&intercept)).all(|v| v.is_finite()) {
            bail!("solver produced non-finite weights");
        }
        tracing::debug!("fitted coef={:?} intercept={:.4}", coef, intercept);

        Ok(Self { coef, intercept })
    }

    pub fn predict_proba(&self, row: &Row) -> f64 {
        let logit = self.intercept + self.coef.iter().zip(row).map(|(c, x)| c * x).sum::<f64>();
        sigmoid(logit)
    }
}
