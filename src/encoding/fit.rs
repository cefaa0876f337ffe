//! Column-role inference over a cleaned training table.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView1};

use super::{
    ColumnRule, EncodingError, EncodingSchema, LabelRule, SCHEMA_FORMAT_VERSION, TableRow,
    parse_number,
};
use crate::dataset::LabeledTable;

/// Derive the encoding schema from a cleaned table.
///
/// A column is numeric when every value parses as a finite number; every
/// other column is categorical with its observed values as vocabulary.
pub fn fit_schema(
    table: &LabeledTable,
    label: LabelRule,
    id_columns: Vec<String>,
) -> Result<EncodingSchema, EncodingError> {
    let mut columns = Vec::with_capacity(table.headers.len());
    for (idx, field) in table.headers.iter().enumerate() {
        let numeric = table
            .rows
            .iter()
            .all(|row| parse_number(&row[idx]).is_some());
        let rule = if numeric {
            ColumnRule::Numeric {
                field: field.clone(),
            }
        } else {
            let categories: BTreeSet<&str> = table.rows.iter().map(|row| row[idx].as_str()).collect();
            if categories.len() < 2 {
                tracing::debug!("Column {field} is constant and contributes no indicator");
            }
            ColumnRule::Categorical {
                field: field.clone(),
                categories: categories.into_iter().map(str::to_string).collect(),
            }
        };
        columns.push(rule);
    }
    let schema = EncodingSchema {
        format_version: SCHEMA_FORMAT_VERSION,
        label,
        id_columns,
        columns,
    };
    schema.validate()?;
    Ok(schema)
}

/// Encode every row of `table` through [`EncodingSchema::align`].
pub fn encode_table(schema: &EncodingSchema, table: &LabeledTable) -> Array2<f64> {
    let mut matrix = Array2::zeros((table.rows.len(), schema.feature_len()));
    for (mut out, values) in matrix.rows_mut().into_iter().zip(&table.rows) {
        let row = schema.align(&TableRow {
            headers: &table.headers,
            values,
        });
        out.assign(&ArrayView1::from(row.as_slice()));
    }
    matrix
}
