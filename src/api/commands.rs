//! Commands - API for the form front end
//!
//! The UI hands over field values and the species choice; it gets back either
//! a category or a message it can show as-is. Every error kind is rendered
//! here, so nothing below this layer has to know about presentation.

use serde::{Deserialize, Serialize};

use crate::logic::features::layout::LayoutInfo;
use crate::logic::features::{RawInput, Species, UnknownSpecies};
use crate::logic::model::{DiseaseCategory, Locale};
use crate::logic::pipeline::{EngineStatus, Pipeline, PipelineError, PredictionReport};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Field name → value, `null` for blank fields
    pub values: RawInput,
    /// "cat" / "dog" (also "kedi" / "köpek")
    pub species: String,
    #[serde(default)]
    pub locale: Locale,
}

/// What the UI renders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    pub ok: bool,
    pub category: Option<DiseaseCategory>,
    pub label: Option<String>,
    pub code: Option<i64>,
    pub error_kind: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PredictionReport>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("malformed request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    InvalidSpecies(#[from] UnknownSpecies),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::InvalidRequest(_) => "invalid_request",
            CommandError::InvalidSpecies(_) => "invalid_species",
            CommandError::Pipeline(e) => e.kind(),
        }
    }

    /// Message safe to show to the user
    pub fn user_message(&self, locale: Locale) -> String {
        match (self, locale) {
            (CommandError::Pipeline(PipelineError::MissingFields(fields)), Locale::En) => {
                format!("Missing values: {}", fields.join(", "))
            }
            (CommandError::Pipeline(PipelineError::MissingFields(fields)), Locale::Tr) => {
                format!("Eksik değerler bulundu: {}", fields.join(", "))
            }
            // artifact problems: details go to the log, not the user
            (CommandError::Pipeline(_), Locale::En) => {
                "Prediction failed: the loaded model does not accept this input. Please report this to the administrator.".to_string()
            }
            (CommandError::Pipeline(_), Locale::Tr) => {
                "Tahmin yapılamadı: yüklü model bu girdiyi kabul etmiyor. Lütfen yöneticiye bildirin.".to_string()
            }
            (CommandError::InvalidSpecies(e), Locale::En) => {
                format!("Unknown species '{}'. Choose cat or dog.", e.0)
            }
            (CommandError::InvalidSpecies(e), Locale::Tr) => {
                format!("Bilinmeyen hayvan türü '{}'. Kedi veya köpek seçiniz.", e.0)
            }
            (CommandError::InvalidRequest(msg), Locale::En) => format!("Invalid request: {}", msg),
            (CommandError::InvalidRequest(msg), Locale::Tr) => format!("Geçersiz istek: {}", msg),
        }
    }

    pub fn into_response(self, locale: Locale) -> PredictResponse {
        let missing_fields = match &self {
            CommandError::Pipeline(PipelineError::MissingFields(fields)) => fields.clone(),
            _ => Vec::new(),
        };

        PredictResponse {
            ok: false,
            error_kind: Some(self.kind().to_string()),
            message: self.user_message(locale),
            missing_fields,
            ..Default::default()
        }
    }
}

impl PredictResponse {
    pub fn from_report(report: PredictionReport, locale: Locale) -> Self {
        let label = report.category.label(locale);
        let message = match locale {
            Locale::En => format!("Predicted result: {}", label),
            Locale::Tr => format!("Tahmini Sonuç: {}", label),
        };

        Self {
            ok: true,
            category: Some(report.category),
            label: Some(label.to_string()),
            code: Some(report.code),
            message,
            details: Some(report),
            ..Default::default()
        }
    }
}

// ============================================================================
// PREDICTION COMMANDS
// ============================================================================

/// Run one submission through the pipeline
pub fn predict_disease(
    pipeline: &Pipeline,
    request: &PredictRequest,
) -> Result<PredictionReport, CommandError> {
    let species: Species = request.species.parse()?;
    Ok(pipeline.run_detailed(&request.values, species)?)
}

/// Run one submission and render the outcome; never fails
pub fn handle_request(pipeline: &Pipeline, request: &PredictRequest) -> PredictResponse {
    match predict_disease(pipeline, request) {
        Ok(report) => PredictResponse::from_report(report, request.locale),
        Err(e) => e.into_response(request.locale),
    }
}

/// Parse a JSON request and handle it; malformed JSON becomes an error response
pub fn handle_json(pipeline: &Pipeline, json: &str) -> PredictResponse {
    match serde_json::from_str::<PredictRequest>(json) {
        Ok(request) => handle_request(pipeline, &request),
        Err(e) => {
            log::warn!("Rejected malformed request: {}", e);
            CommandError::InvalidRequest(e.to_string()).into_response(Locale::default())
        }
    }
}

/// Async variant for callers on a runtime: inference runs on the blocking pool
pub async fn predict_async(pipeline: Pipeline, json: String) -> Result<PredictResponse, String> {
    tokio::task::spawn_blocking(move || handle_json(&pipeline, &json))
        .await
        .map_err(|e| format!("Task failed: {}", e))
}

// ============================================================================
// STATUS COMMANDS
// ============================================================================

/// Counters and loaded-artifact info
pub fn get_engine_status(pipeline: &Pipeline) -> EngineStatus {
    pipeline.status()
}

/// Feature layout the loaded artifacts must match
pub fn get_feature_layout() -> LayoutInfo {
    LayoutInfo::current()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logic::features::layout::CONTINUOUS_FIELDS;
    use crate::logic::model::{Classifier, InferenceError, NumericTransformer, ScalingError};

    struct Identity;

    impl NumericTransformer for Identity {
        fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
            Ok(values.to_vec())
        }
    }

    struct Broken;

    impl NumericTransformer for Broken {
        fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
            Err(ScalingError::ShapeMismatch { expected: 25, actual: values.len() })
        }
    }

    struct Fixed(i64);

    impl Classifier for Fixed {
        fn predict(&self, _features: &[f32]) -> Result<i64, InferenceError> {
            Ok(self.0)
        }
    }

    fn pipeline(scaler: impl NumericTransformer + 'static, code: i64) -> Pipeline {
        Pipeline::new(Arc::new(scaler), Arc::new(Fixed(code)))
    }

    fn request_json(species: &str, skip: Option<&str>, locale: &str) -> String {
        let values: serde_json::Map<String, serde_json::Value> = CONTINUOUS_FIELDS
            .iter()
            .map(|&name| {
                let value = if Some(name) == skip { serde_json::Value::Null } else { 1.0.into() };
                (name.to_string(), value)
            })
            .collect();
        serde_json::json!({ "values": values, "species": species, "locale": locale }).to_string()
    }

    #[test]
    fn test_successful_prediction_response() {
        let response = handle_json(&pipeline(Identity, 2), &request_json("Köpek", None, "tr"));

        assert!(response.ok);
        assert_eq!(response.category, Some(DiseaseCategory::Healthy));
        assert_eq!(response.label.as_deref(), Some("Sağlıklı"));
        assert_eq!(response.message, "Tahmini Sonuç: Sağlıklı");
        assert_eq!(response.details.unwrap().species, Species::Dog);
    }

    #[test]
    fn test_missing_fields_response() {
        let response = handle_json(&pipeline(Identity, 0), &request_json("cat", Some("pH"), "en"));

        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("missing_fields"));
        assert_eq!(response.missing_fields, vec!["pH".to_string()]);
        assert_eq!(response.message, "Missing values: pH");
    }

    #[test]
    fn test_scaling_failure_is_generic_message() {
        let response = handle_json(&pipeline(Broken, 0), &request_json("cat", None, "en"));

        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("scaling_error"));
        assert!(response.message.starts_with("Prediction failed"));
        assert!(!response.message.contains("columns"));
    }

    #[test]
    fn test_invalid_species() {
        let response = handle_json(&pipeline(Identity, 0), &request_json("horse", None, "en"));
        assert_eq!(response.error_kind.as_deref(), Some("invalid_species"));
        assert!(response.message.contains("horse"));
    }

    #[test]
    fn test_malformed_json_does_not_panic() {
        let pipeline = pipeline(Identity, 0);
        for junk in ["", "{", "[]", "{\"values\": 3}", "null"] {
            let response = handle_json(&pipeline, junk);
            assert!(!response.ok);
            assert_eq!(response.error_kind.as_deref(), Some("invalid_request"));
        }
    }

    #[test]
    fn test_unknown_code_renders_unknown_label() {
        let response = handle_json(&pipeline(Identity, 7), &request_json("cat", None, "en"));
        assert!(response.ok);
        assert_eq!(response.category, Some(DiseaseCategory::Unknown));
        assert_eq!(response.code, Some(7));
        assert_eq!(response.message, "Predicted result: Unknown");
    }

    #[tokio::test]
    async fn test_predict_async() {
        let response = predict_async(pipeline(Identity, 1), request_json("dog", None, "en"))
            .await
            .unwrap();
        assert_eq!(response.category, Some(DiseaseCategory::Metabolic));
    }

    #[test]
    fn test_layout_command() {
        assert_eq!(get_feature_layout().feature_count, 25);
        assert_eq!(get_engine_status(&pipeline(Identity, 0)).predictions, 0);
    }
}
