//! Model Input - the final classifier vector
//!
//! **Versioned feature vector assembled by name**
//!
//! Uses the centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION, MODEL_INPUT_LAYOUT};
use super::record::FeatureRecord;

// ============================================================================
// VERSIONED MODEL INPUT
// ============================================================================

/// Classifier input with layout metadata.
///
/// Values are placed by walking `MODEL_INPUT_LAYOUT` and looking each name up
/// in the record, never by concatenating field groups positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by MODEL_INPUT_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature '{0}' is not part of the record")]
pub struct UnknownFeature(pub String);

impl ModelInput {
    /// Assemble the classifier vector in declared training order
    pub fn from_record(record: &FeatureRecord) -> Self {
        let mut values = [0.0f32; FEATURE_COUNT];

        // every layout name is a record field (checked in layout tests)
        for (slot, name) in values.iter_mut().zip(MODEL_INPUT_LAYOUT) {
            *slot = record.get(name).unwrap_or(f64::NAN) as f32;
        }

        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Assemble a vector for an arbitrary column order
    pub fn assemble(record: &FeatureRecord, layout: &[&str]) -> Result<Vec<f32>, UnknownFeature> {
        layout
            .iter()
            .map(|name| {
                record
                    .get(name)
                    .map(|v| v as f32)
                    .ok_or_else(|| UnknownFeature(name.to_string()))
            })
            .collect()
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).map(|i| self.values[i])
    }

    /// Named pairs in layout order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        MODEL_INPUT_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values.to_vec(),
            "named_values": self.named_values()
                .map(|(name, value)| (name.to_string(), value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
