//! Features Module - Feature Assembly
//!
//! Turns form values into a validated record and the ordered classifier vector.

pub mod layout;
pub mod species;
pub mod record;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, CONTINUOUS_COUNT, CONTINUOUS_FIELDS, MODEL_INPUT_LAYOUT};
pub use species::{Species, SpeciesFlags, UnknownSpecies};
pub use record::{FeatureRecord, MissingFieldsError, RawInput};
pub use vector::ModelInput;
