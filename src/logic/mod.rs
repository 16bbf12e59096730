//! Logic Module - Business Logic & Engines
//!
//! - `features/` - Feature layout, species encoding, record validation, model vector
//! - `model/` - Fitted artifacts (scaler, ONNX classifier) and the label table
//! - `pipeline/` - validate → scale → predict

pub mod config;

pub mod features;
pub mod model;
pub mod pipeline;
