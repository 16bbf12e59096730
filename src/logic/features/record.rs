//! Feature Record - validated per-request measurements
//!
//! `RawInput` is what the form hands over (every field may be blank).
//! `FeatureRecord` only exists once all 23 measurements are present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{
    continuous_index, CONTINUOUS_COUNT, CONTINUOUS_FIELDS, MODEL_INPUT_LAYOUT,
    SPECIES_CAT_FIELD, SPECIES_DOG_FIELD,
};
use super::species::{Species, SpeciesFlags};

// ============================================================================
// RAW INPUT
// ============================================================================

/// Field name → optional value, exactly as entered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: BTreeMap<String, Option<f64>>,
}

impl RawInput {
    /// Empty input: every field absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Input with all 23 measurements set from a canonical-order array
    pub fn from_values(values: [f64; CONTINUOUS_COUNT]) -> Self {
        let mut input = Self::new();
        for (name, value) in CONTINUOUS_FIELDS.iter().zip(values) {
            input.set(name, value);
        }
        input
    }

    pub fn set(&mut self, name: &str, value: f64) -> &mut Self {
        self.values.insert(name.to_string(), Some(value));
        self
    }

    /// Mark a field as blank
    pub fn clear(&mut self, name: &str) -> &mut Self {
        self.values.insert(name.to_string(), None);
        self
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    /// Present, non-NaN value for `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .get(name)
            .copied()
            .flatten()
            .filter(|v| !v.is_nan())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys that are not continuous measurement names
    pub fn unknown_fields(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|name| continuous_index(name).is_none())
    }
}

impl From<BTreeMap<String, Option<f64>>> for RawInput {
    fn from(values: BTreeMap<String, Option<f64>>) -> Self {
        Self { values }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Every blank measurement, in canonical order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing values: {}", .fields.join(", "))]
pub struct MissingFieldsError {
    pub fields: Vec<String>,
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// Complete measurements plus species. Flags are derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    continuous: [f64; CONTINUOUS_COUNT],
    species: Species,
}

impl FeatureRecord {
    pub fn new(continuous: [f64; CONTINUOUS_COUNT], species: Species) -> Self {
        Self { continuous, species }
    }

    /// Build a record from raw input, reporting every absent field.
    /// NaN counts as absent; keys outside the layout are ignored.
    pub fn validate(raw: &RawInput, species: Species) -> Result<Self, MissingFieldsError> {
        for name in raw.unknown_fields() {
            log::debug!("Ignoring unknown input field '{}'", name);
        }

        let mut continuous = [0.0f64; CONTINUOUS_COUNT];
        let mut missing = Vec::new();

        for (i, name) in CONTINUOUS_FIELDS.iter().enumerate() {
            match raw.get(name) {
                Some(value) => continuous[i] = value,
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(MissingFieldsError { fields: missing });
        }

        Ok(Self::new(continuous, species))
    }

    /// Measurements in `CONTINUOUS_FIELDS` order
    pub fn continuous(&self) -> &[f64; CONTINUOUS_COUNT] {
        &self.continuous
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn flags(&self) -> SpeciesFlags {
        self.species.one_hot()
    }

    /// Same species, new measurements
    pub fn with_continuous(&self, continuous: [f64; CONTINUOUS_COUNT]) -> Self {
        Self::new(continuous, self.species)
    }

    /// Value of any feature (measurement or flag) by name
    pub fn get(&self, name: &str) -> Option<f64> {
        if let Some(i) = continuous_index(name) {
            return Some(self.continuous[i]);
        }
        let flags = self.flags();
        match name {
            SPECIES_CAT_FIELD => Some(f64::from(flags.is_cat)),
            SPECIES_DOG_FIELD => Some(f64::from(flags.is_dog)),
            _ => None,
        }
    }

    /// Named values in classifier order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        MODEL_INPUT_LAYOUT
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
