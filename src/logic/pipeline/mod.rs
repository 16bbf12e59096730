//! Prediction Pipeline - validate → scale → predict
//!
//! Each request flows through a linear state machine:
//! `Collecting → Validating → Scaling → Inferring → Done`, and any failure
//! jumps straight to `Failed`. Nothing is retried, nothing is shared between
//! requests except the read-only artifacts.
//!
//! # Error kinds
//! - `MissingFields`: user input, recoverable by resubmitting.
//! - `Scaling` / `Inference`: artifact or schema mismatch, a deployment defect.

mod status;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::{
    layout::{layout_hash, CONTINUOUS_COUNT, FEATURE_VERSION},
    FeatureRecord, MissingFieldsError, ModelInput, RawInput, Species,
};
use crate::logic::model::{
    ArtifactMetadata, Classifier, DiseaseCategory, InferenceError, LoadedArtifacts,
    NumericTransformer, ScalingError,
};

pub use status::{EngineStatus, PipelineStats};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Per-request failure. Never terminates the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("missing values: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("scaling failed: {0}")]
    Scaling(#[from] ScalingError),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl From<MissingFieldsError> for PipelineError {
    fn from(err: MissingFieldsError) -> Self {
        PipelineError::MissingFields(err.fields)
    }
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingFields(_) => "missing_fields",
            PipelineError::Scaling(_) => "scaling_error",
            PipelineError::Inference(_) => "inference_error",
        }
    }

    /// Whether resubmitting different input can fix it
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, PipelineError::MissingFields(_))
    }
}

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineStage {
    Collecting,
    Validating,
    Scaling,
    Inferring,
    Done,
    Failed(String),
}

impl PipelineStage {
    fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed(_))
    }

    fn advance(&mut self, next: PipelineStage) {
        log::trace!("pipeline: {:?} -> {:?}", self, next);
        *self = next;
    }

    fn fail(&mut self, err: &PipelineError) {
        self.advance(PipelineStage::Failed(err.kind().to_string()));
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Check that every measurement is present and bind the species
pub fn validate(raw: &RawInput, species: Species) -> Result<FeatureRecord, PipelineError> {
    Ok(FeatureRecord::validate(raw, species)?)
}

/// Scale the 23 measurements in canonical order; species flags are untouched
pub fn scale(
    record: &FeatureRecord,
    scaler: &dyn NumericTransformer,
) -> Result<FeatureRecord, PipelineError> {
    let scaled = scaler.transform(record.continuous())?;

    let continuous: [f64; CONTINUOUS_COUNT] = scaled.try_into().map_err(|v: Vec<f64>| {
        ScalingError::ShapeMismatch {
            expected: CONTINUOUS_COUNT,
            actual: v.len(),
        }
    })?;

    Ok(record.with_continuous(continuous))
}

/// Raw class code for a scaled record, vector built in declared training order
pub fn predict_code(
    record: &FeatureRecord,
    classifier: &dyn Classifier,
) -> Result<i64, PipelineError> {
    let input = ModelInput::from_record(record);
    Ok(classifier.predict(input.as_slice())?)
}

/// Classify a scaled record
pub fn predict(
    record: &FeatureRecord,
    classifier: &dyn Classifier,
) -> Result<DiseaseCategory, PipelineError> {
    predict_code(record, classifier).map(DiseaseCategory::from_code)
}

/// Intermediate results of one successful run
struct StageOutput {
    raw: FeatureRecord,
    input: ModelInput,
    code: i64,
}

fn run_stages(
    raw: &RawInput,
    species: Species,
    scaler: &dyn NumericTransformer,
    classifier: &dyn Classifier,
    stage: &mut PipelineStage,
) -> Result<StageOutput, PipelineError> {
    stage.advance(PipelineStage::Validating);
    let record = validate(raw, species)?;

    stage.advance(PipelineStage::Scaling);
    let scaled = scale(&record, scaler)?;

    stage.advance(PipelineStage::Inferring);
    let input = ModelInput::from_record(&scaled);
    let code = classifier.predict(input.as_slice())?;

    Ok(StageOutput { raw: record, input, code })
}

fn execute(
    raw: &RawInput,
    species: Species,
    scaler: &dyn NumericTransformer,
    classifier: &dyn Classifier,
) -> Result<StageOutput, PipelineError> {
    let mut stage = PipelineStage::Collecting;
    let result = run_stages(raw, species, scaler, classifier, &mut stage);

    match &result {
        Ok(_) => stage.advance(PipelineStage::Done),
        Err(e) => stage.fail(e),
    }
    debug_assert!(stage.is_terminal());

    result
}

/// validate → scale → predict, stopping at the first failure
pub fn run_pipeline(
    raw: &RawInput,
    species: Species,
    scaler: &dyn NumericTransformer,
    classifier: &dyn Classifier,
) -> Result<DiseaseCategory, PipelineError> {
    execute(raw, species, scaler, classifier).map(|out| DiseaseCategory::from_code(out.code))
}

// ============================================================================
// REPORT
// ============================================================================

/// One row of the details table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub name: String,
    /// Value as entered (flags as 0/1)
    pub raw: f64,
    /// Value fed to the classifier
    pub model_value: f32,
}

/// Detailed outcome of a successful run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub request_id: Uuid,
    pub category: DiseaseCategory,
    pub code: i64,
    pub species: Species,
    pub features: Vec<FeatureRow>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub inference_time_us: u64,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Pipeline bound to loaded artifacts
#[derive(Clone)]
pub struct Pipeline {
    scaler: Arc<dyn NumericTransformer>,
    classifier: Arc<dyn Classifier>,
    metadata: Option<ArtifactMetadata>,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    pub fn new(scaler: Arc<dyn NumericTransformer>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            scaler,
            classifier,
            metadata: None,
            stats: Arc::new(PipelineStats::default()),
        }
    }

    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Self {
        Self {
            metadata: Some(artifacts.metadata),
            ..Self::new(artifacts.scaler, artifacts.classifier)
        }
    }

    pub fn run(&self, raw: &RawInput, species: Species) -> Result<DiseaseCategory, PipelineError> {
        self.run_detailed(raw, species).map(|report| report.category)
    }

    pub fn run_detailed(
        &self,
        raw: &RawInput,
        species: Species,
    ) -> Result<PredictionReport, PipelineError> {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let result = execute(raw, species, self.scaler.as_ref(), self.classifier.as_ref());
        let elapsed_us = start_time.elapsed().as_micros() as u64;

        match result {
            Ok(out) => {
                let category = DiseaseCategory::from_code(out.code);
                self.stats.record_success(category, elapsed_us);

                if category.is_known() {
                    log::info!("[{}] predicted {} ({}us)", request_id, category, elapsed_us);
                } else {
                    log::warn!("[{}] classifier returned unmapped code {}", request_id, out.code);
                }
                log::debug!("[{}] model input: {}", request_id, out.input.to_log_entry());

                let features = out
                    .input
                    .named_values()
                    .map(|(name, model_value)| FeatureRow {
                        name: name.to_string(),
                        raw: out.raw.get(name).unwrap_or(f64::NAN),
                        model_value,
                    })
                    .collect();

                Ok(PredictionReport {
                    request_id,
                    category,
                    code: out.code,
                    species,
                    features,
                    feature_version: FEATURE_VERSION,
                    layout_hash: layout_hash(),
                    inference_time_us: elapsed_us,
                })
            }
            Err(e) => {
                self.stats.record_failure(&e);
                match &e {
                    PipelineError::MissingFields(fields) => {
                        log::info!("[{}] rejected: {} missing field(s)", request_id, fields.len());
                    }
                    PipelineError::Scaling(_) | PipelineError::Inference(_) => {
                        log::error!("[{}] artifact/schema failure: {}", request_id, e);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.stats.snapshot(self.metadata.clone())
    }
}
