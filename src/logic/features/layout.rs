//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! Two orders are declared here and nowhere else:
//! - [`CONTINUOUS_FIELDS`]: the 23 columns the scaler was fitted on.
//! - [`MODEL_INPUT_LAYOUT`]: the 25 columns the classifier was trained on.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Both artifacts must be refitted whenever FEATURE_VERSION moves.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Continuous lab measurements, in the order the scaler was fitted
pub const CONTINUOUS_FIELDS: [&str; CONTINUOUS_COUNT] = [
    // === Blood gas / electrolytes (0-7) ===
    "cBaseEcfc",
    "pCO2",
    "pH",
    "pHT",
    "pO2",
    "cCl",
    "cK",
    "cNa",

    // === White cells (8-12) ===
    "GRAN",
    "LYM",
    "LYM_A",
    "MON",
    "MON_A",

    // === Red cells / platelets (13-22) ===
    "Hb",
    "HCT",
    "MCH",
    "MCHC",
    "MCV",
    "MPV",
    "PLT",
    "RBC",
    "RDW",
    "WBC",
];

/// One-hot species indicator columns
pub const SPECIES_CAT_FIELD: &str = "species_is_cat";
pub const SPECIES_DOG_FIELD: &str = "species_is_dog";
pub const CATEGORICAL_FIELDS: [&str; CATEGORICAL_COUNT] = [SPECIES_CAT_FIELD, SPECIES_DOG_FIELD];

/// Classifier input columns in exact training order.
/// This is the SINGLE SOURCE OF TRUTH for the model vector.
pub const MODEL_INPUT_LAYOUT: [&str; FEATURE_COUNT] = [
    "cBaseEcfc", "pCO2", "pH", "pHT", "pO2", "cCl", "cK", "cNa",
    "GRAN", "LYM", "LYM_A", "MON", "MON_A",
    "Hb", "HCT", "MCH", "MCHC", "MCV", "MPV", "PLT", "RBC", "RDW", "WBC",
    SPECIES_CAT_FIELD,
    SPECIES_DOG_FIELD,
];

pub const CONTINUOUS_COUNT: usize = 23;
pub const CATEGORICAL_COUNT: usize = 2;

/// Total number of classifier features
pub const FEATURE_COUNT: usize = CONTINUOUS_COUNT + CATEGORICAL_COUNT;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and an ordered list of names
pub fn hash_layout(version: u8, names: &[&str]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the current classifier layout
pub fn layout_hash() -> u32 {
    hash_layout(FEATURE_VERSION, &MODEL_INPUT_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: MODEL_INPUT_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// An artifact was fitted on a different column order than declared here
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature layout mismatch: expected {expected:?}, artifact has {actual:?}")]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// Check that `actual` names exactly match `expected`, order included
pub fn validate_names(expected: &[&str], actual: &[String]) -> Result<(), LayoutMismatchError> {
    let same = expected.len() == actual.len()
        && expected.iter().zip(actual.iter()).all(|(e, a)| *e == a.as_str());

    if same {
        Ok(())
    } else {
        Err(LayoutMismatchError {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            actual: actual.to_vec(),
        })
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Index of a continuous field in scaler order
pub fn continuous_index(name: &str) -> Option<usize> {
    CONTINUOUS_FIELDS.iter().position(|&n| n == name)
}

/// Index of a feature in classifier order
pub fn feature_index(name: &str) -> Option<usize> {
    MODEL_INPUT_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
