//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change where artifacts are looked up, only edit this file.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Vet DX";

/// Folder name under the platform data directory
pub const APP_DIR_NAME: &str = "vet-dx";

/// Default scaler artifact file name
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";

/// Default classifier artifact file name
pub const DEFAULT_CLASSIFIER_FILE: &str = "classifier.onnx";

/// Extension of the optional checksum sidecar (`<artifact>.sha256`)
pub const CHECKSUM_EXTENSION: &str = "sha256";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default artifact directory: `<data_local_dir>/vet-dx/models`
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("models")
}

/// Get artifact directory from environment or use default
pub fn get_artifact_dir() -> PathBuf {
    std::env::var("VETDX_ARTIFACT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_artifact_dir())
}

/// Get scaler file name from environment or use default
pub fn get_scaler_file() -> String {
    std::env::var("VETDX_SCALER_FILE")
        .unwrap_or_else(|_| DEFAULT_SCALER_FILE.to_string())
}

/// Get classifier file name from environment or use default
pub fn get_classifier_file() -> String {
    std::env::var("VETDX_CLASSIFIER_FILE")
        .unwrap_or_else(|_| DEFAULT_CLASSIFIER_FILE.to_string())
}

/// Check if checksum sidecars are required (not just verified when present)
pub fn is_checksum_required() -> bool {
    std::env::var("VETDX_REQUIRE_CHECKSUM")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
