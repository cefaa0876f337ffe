//! Raw tabular data: CSV loading, row cleaning and the seeded train/test split.

mod clean;
pub mod loader;
mod split;

pub use clean::{LabelMapping, LabeledTable, clean};
pub use loader::{LoadedCsv, RawTable, load_csv, read_csv};
pub use split::{SplitIndices, train_test_split};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset has no header row")]
    MissingHeader,
    #[error("Duplicate column {0} in header")]
    DuplicateColumn(String),
    #[error("Label column {0} not found in header")]
    MissingLabelColumn(String),
    #[error("Unexpected label {value:?} on data row {row} (expected {positive:?} or {negative:?})")]
    InvalidLabel {
        row: usize,
        value: String,
        positive: String,
        negative: String,
    },
    #[error("Need at least {required} rows after cleaning, found {found}")]
    TooFewRows { required: usize, found: usize },
}
