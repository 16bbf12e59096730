//! Model Module - fitted artifacts and their contracts
//!
//! The scaler and classifier are opaque collaborators behind traits,
//! so the pipeline can be driven by ONNX in production and by stubs in tests.

pub mod artifacts;
pub mod classifier;
pub mod labels;
pub mod scaler;

// Re-export common types
pub use artifacts::{ArtifactLoadError, ArtifactMetadata, LoadedArtifacts};
pub use classifier::{Classifier, InferenceError, OnnxClassifier};
pub use labels::{DiseaseCategory, Locale};
pub use scaler::{FittedScaler, NumericTransformer, ScalerParams, ScalingError};
