//! Numeric Transformer - fitted scaler for the continuous measurements
//!
//! Parameters come from the preprocessing step that ran at training time,
//! exported as JSON. Arithmetic follows scikit-learn's MinMaxScaler and
//! StandardScaler so scaled values match what the classifier saw.

use serde::{Deserialize, Serialize};

use crate::logic::features::layout::{validate_names, CONTINUOUS_COUNT, CONTINUOUS_FIELDS};
use super::artifacts::ArtifactLoadError;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalingError {
    #[error("scaler expects {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("scaler failed: {0}")]
    Failed(String),
}

// ============================================================================
// TRANSFORMER TRAIT
// ============================================================================

/// Fitted, stateless transform over the continuous columns in canonical order
pub trait NumericTransformer: Send + Sync {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError>;
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Serialized scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    MinMax {
        feature_names: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    Standard {
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl ScalerParams {
    pub fn feature_names(&self) -> &[String] {
        match self {
            ScalerParams::MinMax { feature_names, .. } => feature_names,
            ScalerParams::Standard { feature_names, .. } => feature_names,
        }
    }
}

// ============================================================================
// FITTED SCALER
// ============================================================================

/// Precomputed affine transform: `x * scale + offset` per column
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    kind: &'static str,
    scale: Vec<f64>,
    offset: Vec<f64>,
}

/// Near-zero widths count as 1, same cutoff as scikit-learn's `_handle_zeros_in_scale`
const ZERO_WIDTH_EPS: f64 = 10.0 * f64::EPSILON;

fn handle_zero(width: f64) -> f64 {
    if width < ZERO_WIDTH_EPS { 1.0 } else { width }
}

fn check_len(name: &str, values: &[f64]) -> Result<(), ArtifactLoadError> {
    if values.len() != CONTINUOUS_COUNT {
        return Err(ArtifactLoadError::InvalidScaler(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            CONTINUOUS_COUNT
        )));
    }
    Ok(())
}

impl FittedScaler {
    pub fn from_params(params: &ScalerParams) -> Result<Self, ArtifactLoadError> {
        validate_names(&CONTINUOUS_FIELDS, params.feature_names())?;

        match params {
            ScalerParams::MinMax { data_min, data_max, feature_range, .. } => {
                check_len("data_min", data_min)?;
                check_len("data_max", data_max)?;
                let (lo, hi) = *feature_range;
                if lo >= hi {
                    return Err(ArtifactLoadError::InvalidScaler(format!(
                        "feature_range ({}, {}) is empty",
                        lo, hi
                    )));
                }

                let scale: Vec<f64> = data_min
                    .iter()
                    .zip(data_max)
                    .map(|(min, max)| (hi - lo) / handle_zero(max - min))
                    .collect();
                let offset = data_min
                    .iter()
                    .zip(&scale)
                    .map(|(min, s)| lo - min * s)
                    .collect();

                Ok(Self { kind: "min_max", scale, offset })
            }
            ScalerParams::Standard { mean, scale, .. } => {
                check_len("mean", mean)?;
                check_len("scale", scale)?;

                let inv: Vec<f64> = scale.iter().map(|s| 1.0 / handle_zero(*s)).collect();
                let offset = mean.iter().zip(&inv).map(|(m, i)| -m * i).collect();

                Ok(Self { kind: "standard", scale: inv, offset })
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactLoadError> {
        let params: ScalerParams = serde_json::from_str(json)?;
        Self::from_params(&params)
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl NumericTransformer for FittedScaler {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        if values.len() != self.scale.len() {
            return Err(ScalingError::ShapeMismatch {
                expected: self.scale.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.scale.iter().zip(&self.offset))
            .map(|(x, (s, o))| x * s + o)
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
