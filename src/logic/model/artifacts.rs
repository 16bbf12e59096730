//! Artifact Loading - scaler + classifier, once per process
//!
//! Both artifacts must load before the pipeline accepts requests.
//! An optional `<artifact>.sha256` sidecar pins the exact bytes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::CHECKSUM_EXTENSION;
use crate::logic::config::AppConfig;
use crate::logic::features::layout::{layout_hash, LayoutMismatchError, FEATURE_VERSION};
use super::classifier::{Classifier, OnnxClassifier};
use super::scaler::{FittedScaler, NumericTransformer};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Startup failure. Fatal: no prediction is possible without both artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scaler: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scaler parameters: {0}")]
    InvalidScaler(String),
    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("checksum sidecar required but missing: {}", .0.display())]
    ChecksumMissing(PathBuf),
    #[error("onnx runtime: {0}")]
    Onnx(String),
}

// ============================================================================
// CHECKSUM
// ============================================================================

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(CHECKSUM_EXTENSION);
    PathBuf::from(name)
}

/// Read an artifact, verifying its `.sha256` sidecar when present (or required)
pub fn read_verified(path: &Path, require_checksum: bool) -> Result<Vec<u8>, ArtifactLoadError> {
    if !path.exists() {
        return Err(ArtifactLoadError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    let sidecar = sidecar_path(path);

    if sidecar.exists() {
        // `sha256sum` format: "<hex>  <file>"
        let content = fs::read_to_string(&sidecar)?;
        let expected = content
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let actual = sha256_hex(&bytes);

        if expected != actual {
            return Err(ArtifactLoadError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        log::debug!("Checksum verified for {}", path.display());
    } else if require_checksum {
        return Err(ArtifactLoadError::ChecksumMissing(sidecar));
    }

    Ok(bytes)
}

// ============================================================================
// LOADERS
// ============================================================================

pub fn load_scaler(path: &Path, require_checksum: bool) -> Result<FittedScaler, ArtifactLoadError> {
    log::info!("Loading scaler from: {}", path.display());

    let bytes = read_verified(path, require_checksum)?;
    let json = String::from_utf8(bytes)
        .map_err(|e| ArtifactLoadError::InvalidScaler(format!("not UTF-8: {}", e)))?;

    let scaler = FittedScaler::from_json(&json)?;
    log::info!("Scaler loaded ({})", scaler.kind());
    Ok(scaler)
}

pub fn load_classifier(path: &Path, require_checksum: bool) -> Result<OnnxClassifier, ArtifactLoadError> {
    let bytes = read_verified(path, require_checksum)?;
    OnnxClassifier::from_bytes(&bytes)
}

// ============================================================================
// LOADED ARTIFACTS
// ============================================================================

/// What was loaded, for status display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub scaler_path: String,
    pub scaler_kind: String,
    pub classifier_path: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Shared, read-only artifacts for the lifetime of the process
#[derive(Clone)]
pub struct LoadedArtifacts {
    pub scaler: Arc<dyn NumericTransformer>,
    pub classifier: Arc<dyn Classifier>,
    pub metadata: ArtifactMetadata,
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl LoadedArtifacts {
    /// Load both artifacts from the configured directory
    pub fn load(config: &AppConfig) -> Result<Self, ArtifactLoadError> {
        let scaler_path = config.scaler_path();
        let classifier_path = config.classifier_path();

        let scaler = load_scaler(&scaler_path, config.require_checksum)?;
        let classifier = load_classifier(&classifier_path, config.require_checksum)?;

        let metadata = ArtifactMetadata {
            scaler_path: scaler_path.display().to_string(),
            scaler_kind: scaler.kind().to_string(),
            classifier_path: classifier_path.display().to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            scaler: Arc::new(scaler),
            classifier: Arc::new(classifier),
            metadata,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{CONTINUOUS_COUNT, CONTINUOUS_FIELDS};
    use tempfile::tempdir;

    fn scaler_json() -> String {
        serde_json::json!({
            "kind": "min_max",
            "feature_names": CONTINUOUS_FIELDS,
            "data_min": vec![0.0; CONTINUOUS_COUNT],
            "data_max": vec![10.0; CONTINUOUS_COUNT],
        })
        .to_string()
    }

    #[test]
    fn test_load_scaler_without_sidecar() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, scaler_json()).unwrap();

        let scaler = load_scaler(&path, false).unwrap();
        assert_eq!(scaler.kind(), "min_max");
        assert_eq!(scaler.transform(&[5.0; CONTINUOUS_COUNT]).unwrap()[0], 0.5);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        let err = load_scaler(&dir.path().join("nope.json"), false).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::NotFound(_)));
    }

    #[test]
    fn test_checksum_sidecar_verified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let json = scaler_json();
        fs::write(&path, &json).unwrap();
        fs::write(
            dir.path().join("scaler.json.sha256"),
            format!("{}  scaler.json\n", sha256_hex(json.as_bytes()).to_uppercase()),
        )
        .unwrap();

        assert!(load_scaler(&path, true).is_ok());
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, scaler_json()).unwrap();
        fs::write(dir.path().join("scaler.json.sha256"), sha256_hex(b"other bytes")).unwrap();

        let err = load_scaler(&path, false).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_required_checksum_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, scaler_json()).unwrap();

        let err = load_scaler(&path, true).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::ChecksumMissing(_)));
    }

    #[test]
    fn test_malformed_scaler_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, "{\"kind\": \"min_max\"").unwrap();

        let err = load_scaler(&path, false).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Parse(_)));
    }

    #[test]
    fn test_load_all_fails_without_classifier() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("scaler.json"), scaler_json()).unwrap();

        let config = AppConfig::with_artifact_dir(dir.path());
        let err = LoadedArtifacts::load(&config).unwrap_err();
        match err {
            ArtifactLoadError::NotFound(path) => assert!(path.ends_with("classifier.onnx")),
            other => panic!("Expected NotFound, got {}", other),
        }
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
