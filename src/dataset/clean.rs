use super::{DatasetError, RawTable};

/// Textual label values mapped onto classes 1 and 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    pub column: String,
    pub positive: String,
    pub negative: String,
}

impl LabelMapping {
    fn class_of(&self, value: &str) -> Option<u8> {
        if value == self.positive {
            Some(1)
        } else if value == self.negative {
            Some(0)
        } else {
            None
        }
    }
}

/// Complete rows with the label split off and identifier columns removed.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    /// Feature column names in source order.
    pub headers: Vec<String>,
    /// One entry per kept row, aligned with `headers`.
    pub rows: Vec<Vec<String>>,
    /// Class per kept row.
    pub labels: Vec<u8>,
    /// Number of rows dropped for missing values.
    pub dropped_rows: usize,
}

/// Drop incomplete rows, map the label column and exclude identifier columns.
pub fn clean(
    table: RawTable,
    label: &LabelMapping,
    id_columns: &[String],
) -> Result<LabeledTable, DatasetError> {
    let label_idx = table
        .column_index(&label.column)
        .ok_or_else(|| DatasetError::MissingLabelColumn(label.column.clone()))?;
    for id in id_columns {
        if table.column_index(id).is_none() {
            tracing::warn!("Identifier column {id} not present in dataset");
        }
    }
    let keep: Vec<usize> = (0..table.headers.len())
        .filter(|&idx| idx != label_idx && !id_columns.contains(&table.headers[idx]))
        .collect();
    let headers = keep.iter().map(|&idx| table.headers[idx].clone()).collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut labels = Vec::with_capacity(table.rows.len());
    let mut dropped_rows = 0usize;
    for (row_idx, row) in table.rows.into_iter().enumerate() {
        let Some(cells) = row.into_iter().collect::<Option<Vec<String>>>() else {
            dropped_rows += 1;
            continue;
        };
        let value = &cells[label_idx];
        let class = label.class_of(value).ok_or_else(|| DatasetError::InvalidLabel {
            row: row_idx + 1,
            value: value.clone(),
            positive: label.positive.clone(),
            negative: label.negative.clone(),
        })?;
        labels.push(class);
        rows.push(keep.iter().map(|&idx| cells[idx].clone()).collect());
    }
    if dropped_rows > 0 {
        tracing::warn!("Dropped {dropped_rows} rows with missing values");
    }
    Ok(LabeledTable {
        headers,
        rows,
        labels,
        dropped_rows,
    })
}
