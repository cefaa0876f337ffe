//! Binary logistic regression over standardized feature vectors.

use serde::{Deserialize, Serialize};

use super::{Classifier, ModelError};

mod train;
pub use train::{TrainOptions, train_logreg};

/// Current `model.json` format version.
pub const LOGREG_MODEL_VERSION: i64 = 1;

/// Trained logistic regression model (`model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    pub model_version: i64,
    pub n_features: usize,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Gradient steps taken during fitting.
    #[serde(default)]
    pub iterations: usize,
    #[serde(default)]
    pub converged: bool,
}

impl LogRegModel {
    /// Validate the model dimensions and parameters.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.model_version != LOGREG_MODEL_VERSION {
            return Err(ModelError::Invalid(format!(
                "Unsupported model_version {} (expected {})",
                self.model_version, LOGREG_MODEL_VERSION
            )));
        }
        if self.weights.len() != self.n_features {
            return Err(ModelError::Invalid("weights length mismatch".to_string()));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Invalid("non-finite parameters".to_string()));
        }
        Ok(())
    }

    /// Linear score `w . x + b`.
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .fold(self.bias, |acc, (w, x)| acc + w * x)
    }
}

impl Classifier for LogRegModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Option<f64> {
        Some(sigmoid(self.decision_function(features)))
    }

    fn predict_label(&self, features: &[f64]) -> u8 {
        u8::from(self.decision_function(features) > 0.0)
    }
}

/// Logistic function, stable for large `|z|`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
pub(crate) fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LogRegModel {
        LogRegModel {
            model_version: LOGREG_MODEL_VERSION,
            n_features: 2,
            weights: vec![2.0, -1.0],
            bias: 0.5,
            iterations: 0,
            converged: true,
        }
    }

    #[test]
    fn probability_and_label_agree() {
        let model = model();
        model.validate().unwrap();
        let p = model.predict_proba(&[1.0, 0.0]).unwrap();
        assert!((p - sigmoid(2.5)).abs() < 1e-12);
        assert_eq!(model.predict_label(&[1.0, 0.0]), 1);
        assert_eq!(model.predict_label(&[-1.0, 0.0]), 0);
    }

    #[test]
    fn sigmoid_stays_in_unit_interval() {
        for z in [-1e6, -50.0, -1.0, 0.0, 1.0, 50.0, 1e6] {
            let p = sigmoid(z);
            assert!((0.0..=1.0).contains(&p), "{z} -> {p}");
        }
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(log1p_exp(1e6).is_finite());
    }

    #[test]
    fn validate_rejects_mismatched_weights() {
        let mut model = model();
        model.weights.push(0.0);
        assert!(model.validate().is_err());
    }
}
