//! Configuration module

use std::path::PathBuf;

use crate::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding both fitted artifacts
    pub artifact_dir: PathBuf,

    /// Scaler artifact file name (inside `artifact_dir`)
    pub scaler_file: String,

    /// Classifier artifact file name (inside `artifact_dir`)
    pub classifier_file: String,

    /// Fail loading when a `.sha256` sidecar is missing
    pub require_checksum: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            artifact_dir: constants::get_artifact_dir(),
            scaler_file: constants::get_scaler_file(),
            classifier_file: constants::get_classifier_file(),
            require_checksum: constants::is_checksum_required(),
        }
    }

    /// Configuration rooted at an explicit directory, other fields default
    pub fn with_artifact_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.scaler_file)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.classifier_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: constants::default_artifact_dir(),
            scaler_file: constants::DEFAULT_SCALER_FILE.to_string(),
            classifier_file: constants::DEFAULT_CLASSIFIER_FILE.to_string(),
            require_checksum: false,
        }
    }
}
