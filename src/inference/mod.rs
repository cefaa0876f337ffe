//! Single-record churn inference against a trained artifact directory.
//!
//! [`ChurnPredictor`] loads the artifacts once and serves any number of
//! records from an immutable bundle. [`predict_record`] keeps the stateless
//! contract of loading on every call, and [`predict_message`] is the outer
//! boundary for display layers: it always returns a string, never an error.

mod error;
mod risk;

pub use error::{InferenceError, InferenceErrorKind};
pub use risk::{
    HIGH_RISK_THRESHOLD, LOW_RISK_THRESHOLD, MODERATE_RISK_THRESHOLD, Prediction, RiskAssessment,
    RiskTier,
};

use std::path::Path;

use serde_json::Value;

use crate::artifacts::{ArtifactBundle, ArtifactPaths, load_bundle};
use crate::encoding::{EncodingSchema, RawRecord};
use crate::ml::Classifier;
use crate::ml::scaler::StandardScaler;

/// Read-only scoring pipeline: align, scale, classify, tier.
pub struct ChurnPredictor {
    schema: EncodingSchema,
    scaler: StandardScaler,
    classifier: Box<dyn Classifier + Send + Sync>,
}

impl std::fmt::Debug for ChurnPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChurnPredictor")
            .field("features", &self.schema.feature_len())
            .finish_non_exhaustive()
    }
}

impl ChurnPredictor {
    /// Load and cross-check the artifacts in `artifact_dir`.
    pub fn open(artifact_dir: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let paths = ArtifactPaths::new(artifact_dir.as_ref());
        let bundle = load_bundle(&paths)?;
        tracing::debug!(
            "Loaded {} features from {}",
            bundle.feature_names.len(),
            paths.root().display()
        );
        Self::from_bundle(bundle)
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, InferenceError> {
        bundle.check_consistency()?;
        Self::from_parts(bundle.schema, bundle.scaler, Box::new(bundle.model))
    }

    /// Assemble a predictor around any classifier with a matching width.
    pub fn from_parts(
        schema: EncodingSchema,
        scaler: StandardScaler,
        classifier: Box<dyn Classifier + Send + Sync>,
    ) -> Result<Self, InferenceError> {
        let width = schema.feature_len();
        if scaler.n_features() != width || classifier.n_features() != width {
            return Err(InferenceError::SchemaMismatch(format!(
                "schema has {width} features, scaler {} and classifier {}",
                scaler.n_features(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            schema,
            scaler,
            classifier,
        })
    }

    /// Ordered feature names this predictor scores against.
    pub fn feature_names(&self) -> Vec<String> {
        self.schema.feature_names()
    }

    /// Unscaled feature vector for `record`.
    pub fn feature_vector(&self, record: &RawRecord) -> Vec<f64> {
        self.schema.align(record)
    }

    /// Score one record.
    pub fn predict(&self, record: &RawRecord) -> Result<RiskAssessment, InferenceError> {
        let features = self.feature_vector(record);
        let scaled = self
            .scaler
            .transform_row(&features)
            .map_err(|err| InferenceError::SchemaMismatch(err.to_string()))?
            .to_vec();
        match self.classifier.predict_proba(&scaled) {
            Some(probability) if (0.0..=1.0).contains(&probability) => {
                Ok(RiskAssessment::from_probability(probability))
            }
            Some(probability) => Err(InferenceError::InvalidInput(format!(
                "classifier produced probability {probability} outside [0, 1]"
            ))),
            None => Ok(RiskAssessment::from_label(
                self.classifier.predict_label(&scaled),
            )),
        }
    }

    /// Score a JSON value, which must be an object.
    pub fn predict_value(&self, value: &Value) -> Result<RiskAssessment, InferenceError> {
        match value {
            Value::Object(record) => self.predict(record),
            other => Err(InferenceError::InvalidInput(format!(
                "expected a JSON object record, got {}",
                json_type_name(other)
            ))),
        }
    }
}

/// Load the artifacts in `artifact_dir` and score one record.
pub fn predict_record(
    artifact_dir: &Path,
    record: &RawRecord,
) -> Result<RiskAssessment, InferenceError> {
    ChurnPredictor::open(artifact_dir)?.predict(record)
}

/// Score `record` and render the outcome as display text.
///
/// Failures come back as `"[inference error] <Kind>: <message>"`.
pub fn predict_message(artifact_dir: &Path, record: &Value) -> String {
    let outcome = ChurnPredictor::open(artifact_dir)
        .and_then(|predictor| predictor.predict_value(record));
    render(outcome)
}

/// Message for a prediction outcome.
pub fn render(outcome: Result<RiskAssessment, InferenceError>) -> String {
    match outcome {
        Ok(assessment) => assessment.message(),
        Err(err) => {
            tracing::warn!("Inference failed: {err}");
            err.to_message()
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::save_bundle;
    use crate::artifacts::tests::{manifest, telco_bundle};
    use serde_json::json;
    use tempfile::tempdir;

    struct LabelOnly(usize);

    impl Classifier for LabelOnly {
        fn n_features(&self) -> usize {
            self.0
        }

        fn predict_label(&self, features: &[f64]) -> u8 {
            u8::from(features.iter().sum::<f64>() > 0.0)
        }
    }

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn probability_is_tiered() {
        let predictor = ChurnPredictor::from_bundle(telco_bundle()).unwrap();
        // sigmoid(-0.5 - 1.0 * tenure + 0.2 * male)
        let short = predictor.predict(&record(json!({"tenure": -0.6}))).unwrap();
        assert_eq!(short.tier, RiskTier::Moderate);
        let long = predictor.predict(&record(json!({"tenure": 24}))).unwrap();
        assert_eq!(long.tier, RiskTier::VeryLow);
        let p = long.probability().unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn label_only_classifier_falls_back_to_hard_label() {
        let bundle = telco_bundle();
        let width = bundle.feature_names.len();
        let predictor =
            ChurnPredictor::from_parts(bundle.schema, bundle.scaler, Box::new(LabelOnly(width)))
                .unwrap();
        let churn = predictor.predict(&record(json!({"tenure": 5}))).unwrap();
        assert_eq!(churn.prediction, Prediction::Label(1));
        let stay = predictor.predict(&RawRecord::new()).unwrap();
        assert_eq!(stay.prediction, Prediction::Label(0));
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        let bundle = telco_bundle();
        let err = ChurnPredictor::from_parts(bundle.schema, bundle.scaler, Box::new(LabelOnly(3)))
            .unwrap_err();
        assert_eq!(err.kind(), InferenceErrorKind::SchemaMismatch);
    }

    #[test]
    fn non_object_input_is_invalid() {
        let predictor = ChurnPredictor::from_bundle(telco_bundle()).unwrap();
        let err = predictor.predict_value(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), InferenceErrorKind::InvalidInput);
        assert_eq!(
            err.to_message(),
            "[inference error] InvalidInput: expected a JSON object record, got an array"
        );
    }

    #[test]
    fn missing_artifacts_become_error_text() {
        let dir = tempdir().unwrap();
        let message = predict_message(&dir.path().join("absent"), &json!({"tenure": 1}));
        assert!(message.starts_with("[inference error] ArtifactNotFound: "));
    }

    #[test]
    fn per_call_loading_matches_cached_predictor() {
        let dir = tempdir().unwrap();
        let bundle = telco_bundle();
        save_bundle(
            &ArtifactPaths::new(dir.path()),
            &bundle,
            &manifest(bundle.feature_names.len()),
        )
        .unwrap();
        let input = record(json!({"tenure": 0.1, "gender": "Male", "Contract": "Two year"}));
        let cached = ChurnPredictor::open(dir.path()).unwrap().predict(&input).unwrap();
        let fresh = predict_record(dir.path(), &input).unwrap();
        assert_eq!(cached, fresh);
        assert_eq!(
            predict_message(dir.path(), &Value::Object(input)),
            cached.message()
        );
    }

    #[test]
    fn predictor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChurnPredictor>();
    }
}
