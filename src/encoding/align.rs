//! Projection of a single record onto the encoding schema.

use serde_json::{Number, Value};

use super::{ColumnRule, EncodingSchema};

/// Raw inference input: field name to string, number or null.
pub type RawRecord = serde_json::Map<String, Value>;

/// A present, non-null field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(&'a Number),
    Bool(bool),
}

impl FieldValue<'_> {
    /// Numeric coercion; `None` for text that is not a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Text(text) => parse_number(text),
            Self::Number(number) => number.as_f64().filter(|value| value.is_finite()),
            Self::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        }
    }

    /// Whether this value names `category`.
    ///
    /// JSON numbers match numeric categories by value (`2.0` names `"2"`);
    /// everything else compares by textual form.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::Text(text) => text.trim() == category,
            Self::Number(number) => match (number.as_f64(), parse_number(category)) {
                (Some(value), Some(expected)) => value == expected,
                _ => number.to_string() == category,
            },
            Self::Bool(flag) => category.eq_ignore_ascii_case(if *flag { "true" } else { "false" }),
        }
    }
}

/// Parse trimmed text as a finite `f64`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Anything the schema can read named fields from.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl FieldSource for RawRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self.get(name)? {
            Value::String(text) => Some(FieldValue::Text(text)),
            Value::Number(number) => Some(FieldValue::Number(number)),
            Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
            Value::Null => None,
            other => {
                tracing::debug!("Ignoring non-scalar value for field {name}: {other}");
                None
            }
        }
    }
}

/// A cleaned training row viewed through its header.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    pub headers: &'a [String],
    pub values: &'a [String],
}

impl FieldSource for TableRow<'_> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let idx = self.headers.iter().position(|header| header == name)?;
        self.values.get(idx).map(|value| FieldValue::Text(value))
    }
}

impl EncodingSchema {
    /// Build the feature vector for `source`.
    ///
    /// The result always has [`EncodingSchema::feature_len`] entries in
    /// [`EncodingSchema::feature_names`] order. Missing or non-numeric numeric
    /// fields become 0. Every indicator is 0 or 1, and an indicator is 1 only
    /// when the field equals its category. Fields unknown to the schema are
    /// ignored.
    pub fn align<S: FieldSource + ?Sized>(&self, source: &S) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.feature_len());
        for rule in &self.columns {
            if let ColumnRule::Numeric { field } = rule {
                let value = source.field(field).and_then(|value| value.as_number());
                out.push(value.unwrap_or(0.0));
            }
        }
        for rule in &self.columns {
            let value = source.field(rule.field());
            for category in rule.indicator_categories() {
                let hit = value.is_some_and(|value| value.matches(category));
                out.push(if hit { 1.0 } else { 0.0 });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::tests::telco_schema;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn feature(schema: &EncodingSchema, vector: &[f64], name: &str) -> f64 {
        let idx = schema
            .feature_names()
            .iter()
            .position(|feature| feature == name)
            .unwrap();
        vector[idx]
    }

    #[test]
    fn empty_record_aligns_to_full_length_zero_vector() {
        let schema = telco_schema();
        let vector = schema.align(&RawRecord::new());
        assert_eq!(vector.len(), schema.feature_names().len());
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn binary_field_maps_yes_no_and_absent() {
        let schema = telco_schema();
        let yes = schema.align(&record(json!({"Partner": "Yes"})));
        let no = schema.align(&record(json!({"Partner": "No"})));
        let absent = schema.align(&record(json!({"gender": "Male"})));
        assert_eq!(feature(&schema, &yes, "Partner_Yes"), 1.0);
        assert_eq!(feature(&schema, &no, "Partner_Yes"), 0.0);
        assert_eq!(feature(&schema, &absent, "Partner_Yes"), 0.0);
        assert_eq!(feature(&schema, &absent, "gender_Male"), 1.0);
    }

    #[test]
    fn multi_valued_field_sets_exactly_one_indicator() {
        let schema = telco_schema();
        let vector = schema.align(&record(json!({"Contract": "Two year"})));
        assert_eq!(feature(&schema, &vector, "Contract_Two year"), 1.0);
        assert_eq!(feature(&schema, &vector, "Contract_One year"), 0.0);

        let unseen = schema.align(&record(json!({"Contract": "Lifetime"})));
        assert_eq!(feature(&schema, &unseen, "Contract_Two year"), 0.0);
        assert_eq!(feature(&schema, &unseen, "Contract_One year"), 0.0);
    }

    #[test]
    fn numeric_fields_coerce_or_default_to_zero() {
        let schema = telco_schema();
        let vector = schema.align(&record(json!({
            "tenure": "12",
            "MonthlyCharges": 70.35,
            "SeniorCitizen": "n/a",
        })));
        assert_eq!(feature(&schema, &vector, "tenure"), 12.0);
        assert_eq!(feature(&schema, &vector, "MonthlyCharges"), 70.35);
        assert_eq!(feature(&schema, &vector, "SeniorCitizen"), 0.0);

        let nulls = schema.align(&record(json!({"tenure": null, "MonthlyCharges": [1, 2]})));
        assert_eq!(feature(&schema, &nulls, "tenure"), 0.0);
        assert_eq!(feature(&schema, &nulls, "MonthlyCharges"), 0.0);
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let schema = telco_schema();
        let with_extra = schema.align(&record(json!({"Partner": "Yes", "PaymentMethod": "Cash"})));
        let without = schema.align(&record(json!({"Partner": "Yes"})));
        assert_eq!(with_extra, without);
    }

    #[test]
    fn numbers_match_categories_by_text() {
        assert!(FieldValue::Number(&Number::from(1)).matches("1"));
        assert!(FieldValue::Text(" Yes ").matches("Yes"));
        assert!(FieldValue::Bool(true).matches("True"));
        assert!(FieldValue::Number(&Number::from_f64(2.0).unwrap()).matches("2"));
        assert!(!FieldValue::Number(&Number::from_f64(2.5).unwrap()).matches("2"));
        assert!(!FieldValue::Number(&Number::from(2)).matches("Two"));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 29.85 "), Some(29.85));
    }

    #[test]
    fn float_valued_record_sets_integer_category() {
        let schema = EncodingSchema {
            columns: vec![ColumnRule::Categorical {
                field: "lines".to_string(),
                categories: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            }],
            ..telco_schema()
        };
        let vector = schema.align(&record(json!({"lines": 2.0})));
        assert_eq!(vector, vec![1.0, 0.0]);
        let text = schema.align(&record(json!({"lines": "3"})));
        assert_eq!(text, vec![0.0, 1.0]);
    }

    #[test]
    fn table_rows_align_like_records() {
        let schema = telco_schema();
        let headers: Vec<String> = ["tenure", "Partner", "Contract"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let values: Vec<String> = ["3", "Yes", "One year"].iter().map(|v| v.to_string()).collect();
        let from_row = schema.align(&TableRow {
            headers: &headers,
            values: &values,
        });
        let from_record = schema.align(&record(json!({
            "tenure": 3,
            "Partner": "Yes",
            "Contract": "One year",
        })));
        assert_eq!(from_row, from_record);
    }
}
