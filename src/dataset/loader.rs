//! CSV loader for raw account tables.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::DatasetError;

/// Header plus rows of trimmed cells; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// A CSV file read from disk together with the SHA-256 of its bytes.
#[derive(Debug, Clone)]
pub struct LoadedCsv {
    pub table: RawTable,
    /// Lowercase hex digest of the file contents.
    pub sha256: String,
}

/// Read and parse the CSV file at `path`.
pub fn load_csv(path: &Path) -> Result<LoadedCsv, DatasetError> {
    let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    let table = read_csv(bytes.as_slice())?;
    tracing::info!(
        "Loaded {} rows x {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );
    Ok(LoadedCsv { table, sha256 })
}

/// Parse CSV text with a header row.
///
/// Cells are trimmed; empty cells become `None`. Rows whose field count differs
/// from the header are rejected.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(DatasetError::MissingHeader);
    }
    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(DatasetError::DuplicateColumn(header.clone()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}
