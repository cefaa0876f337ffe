//! On-disk artifact directory shared by training and inference.
//!
//! Layout:
//! - `model.json`: [`LogRegModel`]
//! - `preprocessing.json`: [`StandardScaler`]
//! - `feature_columns.txt`: newline-separated ordered feature names
//! - `encoding.json`: [`EncodingSchema`]
//! - `manifest.json`: [`TrainingManifest`]
//!
//! [`load_bundle`] refuses a directory whose pieces disagree on the feature
//! layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::encoding::{EncodingError, EncodingSchema};
use crate::ml::logreg::LogRegModel;
use crate::ml::metrics::BinaryReport;
use crate::ml::scaler::StandardScaler;
use crate::ml::ModelError;

pub const MODEL_FILE: &str = "model.json";
pub const PREPROCESSING_FILE: &str = "preprocessing.json";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.txt";
pub const ENCODING_FILE: &str = "encoding.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {path}")]
    NotFound { path: PathBuf },
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid model artifact {path}: {source}")]
    InvalidModel { path: PathBuf, source: ModelError },
    #[error("Invalid encoding artifact {path}: {source}")]
    InvalidEncoding {
        path: PathBuf,
        source: EncodingError,
    },
    #[error("Artifact schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Paths of every artifact inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn preprocessing(&self) -> PathBuf {
        self.root.join(PREPROCESSING_FILE)
    }

    pub fn feature_columns(&self) -> PathBuf {
        self.root.join(FEATURE_COLUMNS_FILE)
    }

    pub fn encoding(&self) -> PathBuf {
        self.root.join(ENCODING_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

/// Everything inference needs, checked for a consistent feature layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub model: LogRegModel,
    pub scaler: StandardScaler,
    pub feature_names: Vec<String>,
    pub schema: EncodingSchema,
}

impl ArtifactBundle {
    /// Check that schema, feature list, scaler and model describe one layout.
    pub fn check_consistency(&self) -> Result<(), ArtifactError> {
        let derived = self.schema.feature_names();
        if derived != self.feature_names {
            let first_diff = derived
                .iter()
                .zip(&self.feature_names)
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| derived.len().min(self.feature_names.len()));
            return Err(ArtifactError::SchemaMismatch(format!(
                "{FEATURE_COLUMNS_FILE} lists {} features but {ENCODING_FILE} produces {} \
                 (first difference at position {first_diff})",
                self.feature_names.len(),
                derived.len()
            )));
        }
        let width = self.feature_names.len();
        if self.scaler.n_features() != width {
            return Err(ArtifactError::SchemaMismatch(format!(
                "scaler expects {} features, feature list has {width}",
                self.scaler.n_features()
            )));
        }
        if self.model.n_features != width {
            return Err(ArtifactError::SchemaMismatch(format!(
                "model expects {} features, feature list has {width}",
                self.model.n_features
            )));
        }
        Ok(())
    }
}

/// Provenance and evaluation record of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingManifest {
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    pub crate_version: String,
    pub dataset_path: PathBuf,
    pub dataset_sha256: String,
    pub rows_raw: usize,
    pub rows_clean: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub n_features: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub max_iter: usize,
    pub c: f64,
    pub iterations: usize,
    pub converged: bool,
    pub evaluation: BinaryReport,
}

/// Write every artifact into `paths`, creating the directory and overwriting
/// existing files.
pub fn save_bundle(
    paths: &ArtifactPaths,
    bundle: &ArtifactBundle,
    manifest: &TrainingManifest,
) -> Result<(), ArtifactError> {
    bundle.check_consistency()?;
    std::fs::create_dir_all(paths.root()).map_err(|source| ArtifactError::Io {
        path: paths.root().to_path_buf(),
        source,
    })?;
    write_json(&paths.model(), &bundle.model)?;
    write_json(&paths.preprocessing(), &bundle.scaler)?;
    write_json(&paths.encoding(), &bundle.schema)?;
    write_text(&paths.feature_columns(), &bundle.feature_names.join("\n"))?;
    write_json(&paths.manifest(), manifest)?;
    tracing::info!(
        "Saved artifacts for {} features to {}",
        bundle.feature_names.len(),
        paths.root().display()
    );
    Ok(())
}

/// Load and cross-check the inference artifacts in `paths`.
pub fn load_bundle(paths: &ArtifactPaths) -> Result<ArtifactBundle, ArtifactError> {
    let model: LogRegModel = read_json(&paths.model())?;
    model
        .validate()
        .map_err(|source| ArtifactError::InvalidModel {
            path: paths.model(),
            source,
        })?;
    let scaler: StandardScaler = read_json(&paths.preprocessing())?;
    scaler
        .validate()
        .map_err(|source| ArtifactError::InvalidModel {
            path: paths.preprocessing(),
            source,
        })?;
    let schema: EncodingSchema = read_json(&paths.encoding())?;
    schema
        .validate()
        .map_err(|source| ArtifactError::InvalidEncoding {
            path: paths.encoding(),
            source,
        })?;
    let feature_names = read_feature_columns(&paths.feature_columns())?;

    let bundle = ArtifactBundle {
        model,
        scaler,
        feature_names,
        schema,
    };
    bundle.check_consistency()?;
    Ok(bundle)
}

pub fn load_manifest(paths: &ArtifactPaths) -> Result<TrainingManifest, ArtifactError> {
    read_json(&paths.manifest())
}

/// Read a feature list: one name per line, surrounding whitespace and blank
/// lines ignored.
pub fn read_feature_columns(path: &Path) -> Result<Vec<String>, ArtifactError> {
    let text = read_text(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_text(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), ArtifactError> {
    std::fs::write(path, text).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
