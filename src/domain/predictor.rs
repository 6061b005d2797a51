//! Pre-trained price model.
//!
//! The artifact is a JSON dump of a fitted linear regression: one coefficient
//! per feature (in `FEATURE_ORDER`) plus the intercept. It is read once at
//! startup; a missing or malformed artifact is fatal.

use std::{fs, io, path::Path};

use serde::Deserialize;
use thiserror::Error;

use super::house::{FeatureVector, FEATURE_COUNT};

/// Feature names the model was fitted against, in column order.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = ["kt", "km", "grs", "lt", "lb"];

/// Anything that can turn a validated feature vector into a price.
pub trait PricePredictor {
    fn predict(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model expects {expected} coefficients, artifact has {found}")]
    CoefficientCount { expected: usize, found: usize },
    #[error("model feature order {found:?} does not match {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("model artifact contains a non-finite parameter")]
    NonFinite,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearRegression {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LinearRegression {
    pub fn new(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;

        if let Some(names) = artifact.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_ORDER) {
                return Err(ModelLoadError::FeatureOrder {
                    expected: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
                    found: names,
                });
            }
        }

        let found = artifact.coefficients.len();
        let coefficients: [f64; FEATURE_COUNT] = artifact
            .coefficients
            .try_into()
            .map_err(|_| ModelLoadError::CoefficientCount {
                expected: FEATURE_COUNT,
                found,
            })?;

        if !artifact.intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::NonFinite);
        }

        Ok(Self::new(coefficients, artifact.intercept))
    }

    /// Predicts one price per row. Rows must already be in `FEATURE_ORDER`.
    pub fn predict_rows(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.coefficients.iter())
                    .fold(self.intercept, |acc, (x, w)| acc + x * w)
            })
            .collect()
    }
}

impl PricePredictor for LinearRegression {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.predict_rows(&[features.as_row()])
            .first()
            .copied()
            .unwrap_or(self.intercept)
    }
}
