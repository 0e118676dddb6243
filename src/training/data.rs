use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use rand_distr::{Distribution, Normal};

use crate::features::{InsulinLevel, N_FEATURES};
use crate::model::sigmoid;

pub type Row = [f64; N_FEATURES];

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub labels: Vec<bool>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y).count()
    }

    fn push(&mut self, row: Row, label: bool) {
        self.rows.push(row);
        self.labels.push(label);
    }
}

/// Outcome log-odds of the synthetic cohort. Lab procedures carry no signal.
fn true_logit(row: &Row) -> f64 {
    let [age, days, _labs, meds, diagnoses, insulin] = *row;
    -4.0 + 0.02 * age + 0.1 * days + 0.03 * (meds - 16.0) + 0.15 * diagnoses + 0.25 * insulin
}

/// Draw `n` synthetic admissions in serving feature order and sample each
/// readmission label from the logistic model above.
pub fn synthesize(n: usize, rng: &mut StdRng) -> Result<Dataset> {
    let labs = Normal::<f64>::new(43.0, 20.0)?;
    let meds = Normal::<f64>::new(16.0, 8.0)?;

    let mut ds = Dataset {
        rows: Vec::with_capacity(n),
        labels: Vec::with_capacity(n),
    };
    for _ in 0..n {
        let row: Row = [
            rng.gen_range(20..90) as f64,
            rng.gen_range(1..=14) as f64,
            labs.sample(rng).round().max(1.0),
            meds.sample(rng).round().max(1.0),
            rng.gen_range(1..=16) as f64,
            f64::from(InsulinLevel::ALL[rng.gen_range(0..InsulinLevel::ALL.len())].code()),
        ];
        let label = rng.gen::<f64>() < sigmoid(true_logit(&row));
        ds.push(row, label);
    }
    Ok(ds)
}

/// Split into (train, test), drawing `test_fraction` of each class for test.
pub fn stratified_split(ds: &Dataset, test_fraction: f64, rng: &mut StdRng) -> Result<(Dataset, Dataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        bail!("test fraction must be in (0, 1), got {test_fraction}");
    }

    let mut train = Dataset::default();
    let mut test = Dataset::default();
    for class in [false, true] {
        let mut idx: Vec<usize> = (0..ds.len()).filter(|&i| ds.labels[i] == class).collect();
        if idx.len() < 2 {
            bail!("class {} has {} samples; cannot stratify", u8::from(class), idx.len());
        }
        idx.shuffle(rng);
        let n_test = ((idx.len() as f64) * test_fraction).round().clamp(1.0, (idx.len() - 1) as f64) as usize;
        for (k, &i) in idx.iter().enumerate() {
            let dst = if k < n_test { &mut test } else { &mut train };
            dst.push(ds.rows[i], class);
        }
    }
    Ok((train, test))
}
