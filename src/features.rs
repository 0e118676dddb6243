use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

use crate::error::{PredictError, PredictResult};

pub const N_FEATURES: usize = 6;

/// Authoritative input order; named-field requests are mapped through this.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "time_in_hospital",
    "num_lab_procedures",
    "num_medications",
    "number_diagnoses",
    "insulin",
];

/// A validated, fixed-length model input. Values are not range checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Validate an untyped `features` value: a sequence of exactly six
    /// numeric elements.
    pub fn validate(input: &Value) -> PredictResult<Self> {
        let items = input
            .as_array()
            .ok_or_else(|| PredictError::validation("features must be a list"))?;
        if items.len() != N_FEATURES {
            return Err(PredictError::validation(format!(
                "wrong length: features must have length {} ({}), got {}",
                N_FEATURES,
                FEATURE_NAMES.join(", "),
                items.len()
            )));
        }

        let mut out = [0.0; N_FEATURES];
        for (i, item) in items.iter().enumerate() {
            out[i] = to_number(item).ok_or_else(|| {
                PredictError::validation(format!(
                    "non-numeric element at position {} ({})",
                    i, FEATURE_NAMES[i]
                ))
            })?;
        }
        Ok(Self(out))
    }

    /// Map the six named fields, in `FEATURE_NAMES` order, into a sequence and
    /// validate it. Presence of every field is checked before any conversion.
    pub fn from_named(body: &Map<String, Value>) -> PredictResult<Self> {
        if let Some(missing) = FEATURE_NAMES.iter().find(|name| !body.contains_key(**name)) {
            return Err(PredictError::validation(format!("Missing field '{missing}'")));
        }
        let ordered: Vec<Value> = FEATURE_NAMES.iter().map(|name| body[*name].clone()).collect();
        Self::validate(&Value::Array(ordered))
    }
}

// Numbers pass through; strings are accepted when they parse as a finite float.
fn to_number(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Categorical insulin status as collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsulinLevel {
    No,
    Up,
    Down,
    Steady,
}

impl InsulinLevel {
    pub const ALL: [InsulinLevel; 4] = [Self::No, Self::Up, Self::Down, Self::Steady];

    pub fn code(self) -> u8 {
        match self {
            Self::No => 0,
            Self::Up => 1,
            Self::Down => 2,
            Self::Steady => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Steady => "Steady",
        }
    }
}

impl fmt::Display for InsulinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InsulinLevel {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lvl| lvl.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PredictError::validation(format!("unknown insulin level '{s}'")))
    }
}
