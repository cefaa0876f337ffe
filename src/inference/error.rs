use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::artifacts::ArtifactError;

/// Failure kinds a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceErrorKind {
    ArtifactNotFound,
    ArtifactCorrupt,
    SchemaMismatch,
    InvalidInput,
}

impl InferenceErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound => "ArtifactNotFound",
            Self::ArtifactCorrupt => "ArtifactCorrupt",
            Self::SchemaMismatch => "SchemaMismatch",
            Self::InvalidInput => "InvalidInput",
        }
    }
}

impl fmt::Display for InferenceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },
    #[error("{0}")]
    ArtifactCorrupt(ArtifactError),
    #[error("{0}")]
    SchemaMismatch(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl InferenceError {
    pub fn kind(&self) -> InferenceErrorKind {
        match self {
            Self::ArtifactNotFound { .. } => InferenceErrorKind::ArtifactNotFound,
            Self::ArtifactCorrupt(_) => InferenceErrorKind::ArtifactCorrupt,
            Self::SchemaMismatch(_) => InferenceErrorKind::SchemaMismatch,
            Self::InvalidInput(_) => InferenceErrorKind::InvalidInput,
        }
    }

    /// Display form used at the string boundary.
    pub fn to_message(&self) -> String {
        format!("[inference error] {}: {self}", self.kind())
    }
}

impl From<ArtifactError> for InferenceError {
    fn from(error: ArtifactError) -> Self {
        match error {
            ArtifactError::NotFound { path } => Self::ArtifactNotFound { path },
            ArtifactError::SchemaMismatch(reason) => Self::SchemaMismatch(reason),
            other => Self::ArtifactCorrupt(other),
        }
    }
}
