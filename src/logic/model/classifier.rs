//! Classifier - ONNX Runtime Integration
//!
//! Loads the exported gradient-boosted classifier and runs it on a single
//! feature row. The graph takes one float tensor of shape `[1, FEATURE_COUNT]`
//! and returns an int64 `label` tensor (plus, usually, class probabilities).

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::features::FEATURE_COUNT;
use super::artifacts::ArtifactLoadError;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("classifier expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Failed(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Fitted classifier: one feature row in, one class code out
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<i64, InferenceError>;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Output name emitted by skl2onnx / onnxmltools converters
const LABEL_OUTPUT: &str = "label";

pub struct OnnxClassifier {
    // run() needs &mut Session
    session: Mutex<Session>,
    output_name: String,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from bytes already read (and checksummed) by the caller
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        log::info!("Loading ONNX classifier from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ArtifactLoadError::Onnx(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactLoadError::Onnx(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ArtifactLoadError::Onnx(format!("Load from memory error: {}", e)))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, ArtifactLoadError> {
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == LABEL_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactLoadError::Onnx("No output defined".to_string()))?;

        log::info!("ONNX classifier ready (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

/// Index of the largest score
fn argmax(scores: &[f32]) -> Option<i64> {
    scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i as i64)
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<i64, InferenceError> {
        if features.len() != FEATURE_COUNT {
            return Err(InferenceError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| InferenceError::Failed(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Failed(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Failed(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::Failed("No output".to_string()))?;

        // int64 label first, float scores as fallback
        if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            return labels
                .first()
                .copied()
                .ok_or_else(|| InferenceError::Failed("Empty label tensor".to_string()));
        }

        let (_, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Failed(format!("Extract error: {}", e)))?;

        argmax(scores).ok_or_else(|| InferenceError::Failed("Empty score tensor".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_load_garbage_bytes_fails() {
        let err = OnnxClassifier::from_bytes(b"not an onnx graph").unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Onnx(_)));
    }

    // ------------------------------------------------------------------------
    // Minimal ONNX graphs, protobuf-encoded by hand
    // ------------------------------------------------------------------------

    const FLOAT: u64 = 1;
    const INT64: u64 = 7;

    fn put_varint(buf: &mut Vec<u8>, mut v: u64) {
        while v >= 0x80 {
            buf.push((v as u8) | 0x80);
            v >>= 7;
        }
        buf.push(v as u8);
    }

    fn put_int(buf: &mut Vec<u8>, field: u64, v: u64) {
        put_varint(buf, field << 3);
        put_varint(buf, v);
    }

    fn put_bytes(buf: &mut Vec<u8>, field: u64, bytes: &[u8]) {
        put_varint(buf, (field << 3) | 2);
        put_varint(buf, bytes.len() as u64);
        buf.extend_from_slice(bytes);
    }

    /// ValueInfoProto for a tensor of fixed shape
    fn tensor_info(name: &str, elem_type: u64, dims: &[u64]) -> Vec<u8> {
        let mut shape = Vec::new();
        for &d in dims {
            let mut dim = Vec::new();
            put_int(&mut dim, 1, d);
            put_bytes(&mut shape, 1, &dim);
        }
        let mut tensor = Vec::new();
        put_int(&mut tensor, 1, elem_type);
        put_bytes(&mut tensor, 2, &shape);
        let mut ty = Vec::new();
        put_bytes(&mut ty, 1, &tensor);

        let mut info = Vec::new();
        put_bytes(&mut info, 1, name.as_bytes());
        put_bytes(&mut info, 2, &ty);
        info
    }

    /// NodeProto with integer attributes
    fn node(op_type: &str, input: &str, output: &str, attrs: &[(&str, u64)]) -> Vec<u8> {
        let mut node = Vec::new();
        put_bytes(&mut node, 1, input.as_bytes());
        put_bytes(&mut node, 2, output.as_bytes());
        put_bytes(&mut node, 3, output.as_bytes());
        put_bytes(&mut node, 4, op_type.as_bytes());
        for &(name, value) in attrs {
            let mut attr = Vec::new();
            put_bytes(&mut attr, 1, name.as_bytes());
            put_int(&mut attr, 3, value);
            put_int(&mut attr, 20, 2); // AttributeType::INT
            put_bytes(&mut node, 5, &attr);
        }
        node
    }

    fn model(nodes: &[Vec<u8>], outputs: &[Vec<u8>]) -> Vec<u8> {
        let mut graph = Vec::new();
        for n in nodes {
            put_bytes(&mut graph, 1, n);
        }
        put_bytes(&mut graph, 2, b"classifier");
        put_bytes(&mut graph, 11, &tensor_info("input", FLOAT, &[1, FEATURE_COUNT as u64]));
        for o in outputs {
            put_bytes(&mut graph, 12, o);
        }

        let mut opset = Vec::new();
        put_int(&mut opset, 2, 13);

        let mut model = Vec::new();
        put_int(&mut model, 1, 7); // ir_version
        put_bytes(&mut model, 7, &graph);
        put_bytes(&mut model, 8, &opset);
        model
    }

    /// `probabilities` = input, `label` = ArgMin(input).
    /// ArgMin keeps the two outputs distinguishable.
    fn labelled_model() -> Vec<u8> {
        model(
            &[
                node("Identity", "input", "probabilities", &[]),
                node("ArgMin", "input", "label", &[("axis", 1), ("keepdims", 0)]),
            ],
            &[
                tensor_info("probabilities", FLOAT, &[1, FEATURE_COUNT as u64]),
                tensor_info("label", INT64, &[1]),
            ],
        )
    }

    /// Float scores only
    fn scores_model() -> Vec<u8> {
        model(
            &[node("Identity", "input", "scores", &[])],
            &[tensor_info("scores", FLOAT, &[1, FEATURE_COUNT as u64])],
        )
    }

    fn row_with_peak(index: usize) -> Vec<f32> {
        let mut row = vec![0.5; FEATURE_COUNT];
        row[index] = 0.9;
        row[(index + 1) % FEATURE_COUNT] = 0.1;
        row
    }

    #[test]
    fn test_predict_reads_label_output() {
        let classifier = OnnxClassifier::from_bytes(&labelled_model()).unwrap();
        assert_eq!(classifier.output_name, LABEL_OUTPUT);

        // label is the arg-min; the first output would have given the arg-max
        assert_eq!(classifier.predict(&row_with_peak(4)).unwrap(), 5);
        assert_eq!(classifier.predict(&row_with_peak(24)).unwrap(), 0);
    }

    #[test]
    fn test_predict_argmaxes_float_scores() {
        let classifier = OnnxClassifier::from_bytes(&scores_model()).unwrap();
        assert_eq!(classifier.output_name, "scores");

        assert_eq!(classifier.predict(&row_with_peak(4)).unwrap(), 4);
        assert_eq!(classifier.predict(&row_with_peak(23)).unwrap(), 23);
    }

    #[test]
    fn test_predict_rejects_wrong_length() {
        let classifier = OnnxClassifier::from_bytes(&labelled_model()).unwrap();
        let err = classifier.predict(&[0.0; 23]).unwrap_err();
        assert_eq!(err, InferenceError::ShapeMismatch { expected: FEATURE_COUNT, actual: 23 });
    }

    #[test]
    fn test_predict_from_shared_instance() {
        let classifier = std::sync::Arc::new(OnnxClassifier::from_bytes(&scores_model()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let classifier = classifier.clone();
                std::thread::spawn(move || classifier.predict(&row_with_peak(i)).unwrap())
            })
            .collect();
        let codes: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }
}
