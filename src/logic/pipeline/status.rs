//! Engine Status - per-process counters for the status view

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::model::{ArtifactMetadata, DiseaseCategory};
use super::PipelineError;

/// Latency and outcome counters
#[derive(Debug, Default)]
pub struct PipelineStats {
    latency_sum_us: AtomicU64,
    predictions: AtomicU64,
    unknown_predictions: AtomicU64,
    missing_fields: AtomicU64,
    scaling_failures: AtomicU64,
    inference_failures: AtomicU64,
}

/// Engine Status for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub artifacts: Option<ArtifactMetadata>,
    pub predictions: u64,
    pub unknown_predictions: u64,
    pub missing_field_rejections: u64,
    pub scaling_failures: u64,
    pub inference_failures: u64,
    pub avg_latency_ms: f32,
}

impl PipelineStats {
    pub fn record_success(&self, category: DiseaseCategory, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if !category.is_known() {
            self.unknown_predictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self, err: &PipelineError) {
        let counter = match err {
            PipelineError::MissingFields(_) => &self.missing_fields,
            PipelineError::Scaling(_) => &self.scaling_failures,
            PipelineError::Inference(_) => &self.inference_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, artifacts: Option<ArtifactMetadata>) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.predictions.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            artifacts,
            predictions: count,
            unknown_predictions: self.unknown_predictions.load(Ordering::Relaxed),
            missing_field_rejections: self.missing_fields.load(Ordering::Relaxed),
            scaling_failures: self.scaling_failures.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}
