use anyhow::{bail, Result};

use super::data::Row;
use crate::features::N_FEATURES;

/// Per-column mean and population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: [f64; N_FEATURES],
    pub scale: [f64; N_FEATURES],
}

impl StandardScaler {
    /// Fit on the training rows. A constant column gets scale 1.0 so the
    /// exported parameters never carry a zero divisor.
    pub fn fit(rows: &[Row]) -> Result<Self> {
        if rows.is_empty() {
            bail!("cannot fit a scaler on zero rows");
        }
        let n = rows.len() as f64;

        let mut mean = [0.0; N_FEATURES];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = [0.0; N_FEATURES];
        for row in rows {
            for j in 0..N_FEATURES {
                let d = row[j] - mean[j];
                var[j] += d * d;
            }
        }
        let scale = var.map(|v| {
            let sd = (v / n).sqrt();
            if sd > 0.0 {
                sd
            } else {
                1.0
            }
        });

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, row: &Row) -> Row {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (row[j] - self.mean[j]) / self.scale[j];
        }
        out
    }

    pub fn transform_all(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_population_statistics() {
        let rows = vec![
            [1.0, 10.0, 5.0, 0.0, 2.0, 3.0],
            [3.0, 20.0, 5.0, 0.0, 4.0, 3.0],
        ];
        let s = StandardScaler::fit(&rows).unwrap();
        assert_eq!(s.mean, [2.0, 15.0, 5.0, 0.0, 3.0, 3.0]);
        assert_eq!(s.scale, [1.0, 5.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(s.transform(&rows[0]), [-1.0, -1.0, 0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn transformed_columns_are_centered() {
        let rows: Vec<Row> = (0..50)
            .map(|i| {
                let x = i as f64;
                [x, x * x, 100.0 - x, 7.0, x.sin(), (x / 3.0).floor()]
            })
            .collect();
        let s = StandardScaler::fit(&rows).unwrap();
        let t = s.transform_all(&rows);
        for j in 0..N_FEATURES {
            let m: f64 = t.iter().map(|r| r[j]).sum::<f64>() / t.len() as f64;
            assert!(m.abs() < 1e-9, "column {j} mean {m}");
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
