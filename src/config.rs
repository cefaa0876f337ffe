//! TOML configuration for training and inference.
//!
//! Every key is optional; a missing file or section yields the defaults, which
//! point at the stock Telco export and the `artifacts/v1_0` directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default raw dataset location, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "data/raw/WA_Fn-UseC_-Telco-Customer-Churn.csv";

/// Default artifact directory, relative to the working directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts/v1_0";

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to resolve the application directory.
    #[error("Unable to resolve config directory: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    pub training: TrainingSettings,
    pub inference: InferenceSettings,
}

/// Settings consumed by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    /// CSV file with one header row.
    pub dataset_path: PathBuf,
    /// Directory receiving the trained artifacts.
    pub artifact_dir: PathBuf,
    /// Column holding the churn label.
    pub label_column: String,
    /// Label text mapped to class 1.
    pub positive_label: String,
    /// Label text mapped to class 0.
    pub negative_label: String,
    /// Identifier columns excluded from the feature set.
    pub id_columns: Vec<String>,
    /// Fraction of cleaned rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    /// Gradient descent iteration budget.
    pub max_iter: usize,
    /// Gradient norm below which training stops early.
    pub tolerance: f64,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength.
    pub c: f64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            label_column: "Churn".to_string(),
            positive_label: "Yes".to_string(),
            negative_label: "No".to_string(),
            id_columns: vec!["customerID".to_string()],
            test_fraction: 0.2,
            seed: 42,
            max_iter: 1000,
            tolerance: 1e-6,
            learning_rate: 0.5,
            c: 1.0,
        }
    }
}

impl TrainingSettings {
    /// Clamp out-of-range values back to usable ones.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            self.test_fraction = defaults.test_fraction;
        }
        if self.max_iter == 0 {
            self.max_iter = 1;
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            self.tolerance = defaults.tolerance;
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            self.learning_rate = defaults.learning_rate;
        }
        if !self.c.is_finite() || self.c <= 0.0 {
            self.c = defaults.c;
        }
        self
    }
}

/// Settings consumed by the prediction tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub artifact_dir: PathBuf,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

impl ChurnConfig {
    pub fn normalized(mut self) -> Self {
        self.training = self.training.normalized();
        self
    }
}

/// Load the default configuration file.
///
/// Falls back to the defaults when the file is missing or when no config
/// directory can be resolved on this host.
pub fn load_or_default() -> Result<ChurnConfig, ConfigError> {
    load_resolved(app_dirs::config_file())
}

fn load_resolved(path: Result<PathBuf, app_dirs::AppDirError>) -> Result<ChurnConfig, ConfigError> {
    match path {
        Ok(path) => load_from(&path),
        Err(app_dirs::AppDirError::NoBaseDir) => {
            tracing::debug!("No config directory available; using built-in defaults");
            Ok(ChurnConfig::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Load configuration from `path`, returning defaults if the file is missing.
pub fn load_from(path: &Path) -> Result<ChurnConfig, ConfigError> {
    if !path.exists() {
        return Ok(ChurnConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(ChurnConfig::normalized)
}

fn parse(text: &str) -> Result<ChurnConfig, toml::de::Error> {
    toml::from_str(text)
}
