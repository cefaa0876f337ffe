//! Per-column standardization fitted on the training split.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Zero-mean, unit-variance transform (`preprocessing.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation; 1 for constant columns.
    pub scale: Vec<f64>,
    pub n_samples_seen: usize,
}

impl StandardScaler {
    /// Fit column means and standard deviations of `x`.
    pub fn fit(x: ArrayView2<'_, f64>) -> Result<Self, ModelError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or(ModelError::EmptyTrainingSet)?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > f64::EPSILON { std } else { 1.0 });
        Ok(Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
            n_samples_seen: n,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.scale.len() != self.mean.len() {
            return Err(ModelError::Invalid("scale length mismatch".to_string()));
        }
        if self.mean.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::Invalid("non-finite mean".to_string()));
        }
        if self
            .scale
            .iter()
            .any(|value| !value.is_finite() || *value <= 0.0)
        {
            return Err(ModelError::Invalid("scale must be finite and > 0".to_string()));
        }
        Ok(())
    }

    /// Standardize every row of `x`.
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        self.check_width(x.ncols())?;
        let mean = ArrayView1::from(self.mean.as_slice());
        let scale = ArrayView1::from(self.scale.as_slice());
        Ok((&x - &mean) / &scale)
    }

    /// Standardize a single feature vector.
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>, ModelError> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((value, mean), scale)| (value - mean) / scale)
            .collect())
    }

    fn check_width(&self, found: usize) -> Result<(), ModelError> {
        if found != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                found,
            });
        }
        Ok(())
    }
}
