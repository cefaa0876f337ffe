//! One-hot encoding schema shared by training and inference.
//!
//! The schema records every column's role and the category vocabulary seen
//! at training time. Feature names and feature vectors are derived from it
//! mechanically, so the training matrix and the serving vector always agree on
//! column set and order.
//!
//! Layout follows `get_dummies(drop_first=True)`: numeric columns first in
//! source order, then `"{field}_{category}"` indicators for each categorical
//! column in source order, with the lexicographically first category dropped
//! as the reference.

mod align;
mod fit;

pub use align::{FieldSource, FieldValue, RawRecord, TableRow, parse_number};
pub use fit::{encode_table, fit_schema};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current `encoding.json` format version.
pub const SCHEMA_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Unsupported encoding schema version {0}")]
    UnsupportedVersion(u32),
    #[error("Column {0} appears more than once in the schema")]
    DuplicateField(String),
    #[error("Categorical column {0} has no categories")]
    EmptyVocabulary(String),
    #[error("Categories of column {0} are not sorted and unique")]
    UnsortedVocabulary(String),
    #[error("Feature name {0} is produced more than once")]
    DuplicateFeature(String),
    #[error("Feature name {0:?} cannot be stored one per line")]
    UnstorableFeatureName(String),
    #[error("Dataset has no feature columns")]
    NoFeatures,
}

/// How the label column was mapped when the schema was fitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub column: String,
    pub positive: String,
    pub negative: String,
}

/// Role a source column plays in the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Numeric,
    /// Two categories, encoded as a single indicator.
    Binary,
    /// More than two categories.
    MultiValued,
}

/// Encoding rule for one source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRule {
    Numeric { field: String },
    Categorical {
        field: String,
        /// Sorted vocabulary; the first entry is the dropped reference.
        categories: Vec<String>,
    },
}

impl ColumnRule {
    pub fn field(&self) -> &str {
        match self {
            Self::Numeric { field } | Self::Categorical { field, .. } => field,
        }
    }

    pub fn role(&self) -> ColumnRole {
        match self {
            Self::Numeric { .. } => ColumnRole::Numeric,
            Self::Categorical { categories, .. } if categories.len() <= 2 => ColumnRole::Binary,
            Self::Categorical { .. } => ColumnRole::MultiValued,
        }
    }

    /// Categories that get an indicator column, i.e. all but the reference.
    pub fn indicator_categories(&self) -> &[String] {
        match self {
            Self::Numeric { .. } => &[],
            Self::Categorical { categories, .. } => categories.get(1..).unwrap_or(&[]),
        }
    }
}

/// Indicator column name for a `(field, category)` pair.
pub fn indicator_name(field: &str, category: &str) -> String {
    format!("{field}_{category}")
}

/// `feature_columns.txt` holds one trimmed name per line.
fn is_line_safe(name: &str) -> bool {
    !name.is_empty() && !name.contains(['\n', '\r']) && name.trim() == name
}

/// Persisted encoding rule (`encoding.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSchema {
    pub format_version: u32,
    pub label: LabelRule,
    /// Identifier columns excluded from the feature set.
    #[serde(default)]
    pub id_columns: Vec<String>,
    /// Rules in source column order.
    pub columns: Vec<ColumnRule>,
}

impl EncodingSchema {
    /// Ordered feature names produced by this schema.
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self
            .columns
            .iter()
            .filter(|rule| rule.role() == ColumnRole::Numeric)
            .map(|rule| rule.field().to_string());
        let indicators = self.columns.iter().flat_map(|rule| {
            rule.indicator_categories()
                .iter()
                .map(move |category| indicator_name(rule.field(), category))
        });
        numeric.chain(indicators).collect()
    }

    pub fn feature_len(&self) -> usize {
        self.columns
            .iter()
            .map(|rule| match rule {
                ColumnRule::Numeric { .. } => 1,
                ColumnRule::Categorical { .. } => rule.indicator_categories().len(),
            })
            .sum()
    }

    pub fn rule(&self, field: &str) -> Option<&ColumnRule> {
        self.columns.iter().find(|rule| rule.field() == field)
    }

    /// Check structural invariants of a loaded or freshly fitted schema.
    pub fn validate(&self) -> Result<(), EncodingError> {
        if self.format_version != SCHEMA_FORMAT_VERSION {
            return Err(EncodingError::UnsupportedVersion(self.format_version));
        }
        let mut fields = HashSet::new();
        for rule in &self.columns {
            if !fields.insert(rule.field()) {
                return Err(EncodingError::DuplicateField(rule.field().to_string()));
            }
            if let ColumnRule::Categorical { field, categories } = rule {
                if categories.is_empty() {
                    return Err(EncodingError::EmptyVocabulary(field.clone()));
                }
                if categories.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return Err(EncodingError::UnsortedVocabulary(field.clone()));
                }
            }
        }
        let mut names = HashSet::new();
        for name in self.feature_names() {
            if !is_line_safe(&name) {
                return Err(EncodingError::UnstorableFeatureName(name));
            }
            if names.contains(&name) {
                return Err(EncodingError::DuplicateFeature(name));
            }
            names.insert(name);
        }
        if names.is_empty() {
            return Err(EncodingError::NoFeatures);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn telco_schema() -> EncodingSchema {
        let cat = |field: &str, categories: &[&str]| ColumnRule::Categorical {
            field: field.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        };
        let num = |field: &str| ColumnRule::Numeric {
            field: field.to_string(),
        };
        EncodingSchema {
            format_version: SCHEMA_FORMAT_VERSION,
            label: LabelRule {
                column: "Churn".to_string(),
                positive: "Yes".to_string(),
                negative: "No".to_string(),
            },
            id_columns: vec!["customerID".to_string()],
            columns: vec![
                cat("gender", &["Female", "Male"]),
                num("SeniorCitizen"),
                cat("Partner", &["No", "Yes"]),
                num("tenure"),
                cat("Contract", &["Month-to-month", "One year", "Two year"]),
                num("MonthlyCharges"),
            ],
        }
    }

    #[test]
    fn feature_names_put_numeric_columns_first() {
        let schema = telco_schema();
        assert_eq!(
            schema.feature_names(),
            vec![
                "SeniorCitizen",
                "tenure",
                "MonthlyCharges",
                "gender_Male",
                "Partner_Yes",
                "Contract_One year",
                "Contract_Two year",
            ]
        );
        assert_eq!(schema.feature_len(), 7);
        schema.validate().unwrap();
    }

    #[test]
    fn roles_follow_vocabulary_size() {
        let schema = telco_schema();
        assert_eq!(schema.rule("Partner").unwrap().role(), ColumnRole::Binary);
        assert_eq!(
            schema.rule("Contract").unwrap().role(),
            ColumnRole::MultiValued
        );
        assert_eq!(schema.rule("tenure").unwrap().role(), ColumnRole::Numeric);
        assert!(schema.rule("customerID").is_none());
    }

    #[test]
    fn validate_rejects_unsorted_vocabulary() {
        let mut schema = telco_schema();
        schema.columns[2] = ColumnRule::Categorical {
            field: "Partner".to_string(),
            categories: vec!["Yes".to_string(), "No".to_string()],
        };
        assert!(matches!(
            schema.validate(),
            Err(EncodingError::UnsortedVocabulary(field)) if field == "Partner"
        ));
    }

    #[test]
    fn validate_rejects_colliding_feature_names() {
        let mut schema = telco_schema();
        schema.columns.push(ColumnRule::Numeric {
            field: "Partner_Yes".to_string(),
        });
        assert!(matches!(
            schema.validate(),
            Err(EncodingError::DuplicateFeature(name)) if name == "Partner_Yes"
        ));
    }

    #[test]
    fn validate_rejects_names_that_break_the_feature_list() {
        let mut schema = telco_schema();
        schema.columns.push(ColumnRule::Categorical {
            field: "plan".to_string(),
            categories: vec!["Basic".to_string(), "Gold\nPlus".to_string()],
        });
        assert!(matches!(
            schema.validate(),
            Err(EncodingError::UnstorableFeatureName(name)) if name == "plan_Gold\nPlus"
        ));

        let mut schema = telco_schema();
        schema.columns.push(ColumnRule::Numeric {
            field: "notes\r".to_string(),
        });
        assert!(matches!(
            schema.validate(),
            Err(EncodingError::UnstorableFeatureName(_))
        ));
    }

    #[test]
    fn schema_json_uses_tagged_rules() {
        let schema = telco_schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][1]["kind"], "numeric");
        assert_eq!(json["columns"][0]["categories"][1], "Male");
        let parsed: EncodingSchema = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, schema);
    }
}
