//! Machine learning building blocks for training and inference.
//!
//! Everything here is deterministic: no randomness enters fitting, so the same
//! matrix always yields the same scaler and model.

pub mod logreg;
pub mod metrics;
pub mod scaler;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Empty training set")]
    EmptyTrainingSet,
    #[error("Mismatched training inputs/labels ({rows} rows, {labels} labels)")]
    LabelCountMismatch { rows: usize, labels: usize },
    #[error("Training labels must contain both classes 0 and 1")]
    SingleClass,
    #[error("Label {0} is not a binary class")]
    InvalidLabel(u8),
    #[error("Expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Invalid model: {0}")]
    Invalid(String),
}

/// A trained binary classifier.
///
/// Callers must pass exactly [`Classifier::n_features`] values.
pub trait Classifier {
    fn n_features(&self) -> usize;

    /// Probability of class 1, or `None` when the model cannot estimate one.
    fn predict_proba(&self, _features: &[f64]) -> Option<f64> {
        None
    }

    /// Hard 0/1 label.
    fn predict_label(&self, features: &[f64]) -> u8;
}
