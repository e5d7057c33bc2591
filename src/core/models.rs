//! Typed schemas for the backend's JSON payloads.
//!
//! Every response is validated into one of these at the transport boundary;
//! render code never digs through untyped JSON. Mapping-valued fields keep
//! the backend's key order because the missing-value and categorical views
//! iterate them in given order.

use crate::core::types::DatasetId;
use serde::de::{self, Deserializer, MapAccess};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A decoded payload together with the unmodified JSON it came from.
///
/// The raw value backs the diagnostic dump that is kept available alongside
/// every rendered table.
#[derive(Debug, Clone)]
pub struct Payload<T> {
    pub data: T,
    pub raw: Value,
}

/// `(rows, columns)` pair; the backend serializes it as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(u64, u64)")]
pub struct Shape {
    pub rows: u64,
    pub columns: u64,
}

impl From<(u64, u64)> for Shape {
    fn from((rows, columns): (u64, u64)) -> Self {
        Self { rows, columns }
    }
}

/// Success body of `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub dataset_id: DatasetId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub saved_as: Option<String>,
}

/// Success body of `GET /datasets/{id}/preview`.
///
/// `rows` holds one record per previewed row, keyed by column name. Cell
/// values stay untyped (`Value`); the view layer decides how to render them.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewResult {
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    pub shape: Shape,
    pub columns: Vec<String>,
    #[serde(rename = "preview")]
    pub rows: Vec<serde_json::Map<String, Value>>,
}

impl PreviewResult {
    /// Record keys that are not declared in `columns`. A conforming backend
    /// never produces any; the client flags them rather than rendering them.
    pub fn undeclared_keys(&self) -> Vec<String> {
        let mut extra = Vec::new();
        for record in &self.rows {
            for key in record.keys() {
                if !self.columns.iter().any(|c| c == key) && !extra.contains(key) {
                    extra.push(key.clone());
                }
            }
        }
        extra
    }
}

/// Per-column missingness, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MissingStats {
    pub missing_count: u64,
    pub missing_pct: f64,
}

/// Per-column numeric summary. `std` is absent when the column has fewer
/// than two observations; `min`/`max` stay untyped so their original
/// representation survives to the view layer.
#[derive(Debug, Clone, Deserialize)]
pub struct NumericSummary {
    pub count: u64,
    pub mean: f64,
    #[serde(default)]
    pub std: Option<f64>,
    pub min: Value,
    pub max: Value,
}

/// One entry of a categorical top-values list. `value` is `None` when the
/// backend counted missing cells as their own bucket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopValue {
    pub value: Option<String>,
    pub count: u64,
}

/// Success body of `GET /datasets/{id}/profile`.
///
/// The mapping fields are kept as ordered entry lists: the backend emits
/// them in column order (top values in descending frequency) and the views
/// truncate in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResult {
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    pub shape: Shape,
    #[serde(default, deserialize_with = "ordered_map")]
    pub dtypes: Vec<(String, String)>,
    #[serde(deserialize_with = "ordered_map")]
    pub missing: Vec<(String, MissingStats)>,
    #[serde(deserialize_with = "ordered_map")]
    pub numeric_summary: Vec<(String, NumericSummary)>,
    #[serde(deserialize_with = "ordered_map")]
    pub categorical_top_values: Vec<(String, Vec<TopValue>)>,
}

/// Success body of the explain endpoints; `column` is set only by
/// `POST /datasets/{id}/explain-column`.
#[derive(Debug, Clone, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    pub explanation: String,
}

/// Success body of `GET /datasets/{id}/columns`.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsResponse {
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    pub columns: Vec<String>,
}

/// Success body of `POST /datasets/{id}/feature-ideas`. Each idea is an
/// opaque suggestion record; the client only tracks the ordered list.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureIdeas {
    #[serde(default)]
    pub dataset_id: Option<DatasetId>,
    #[serde(alias = "suggestions")]
    pub ideas: Vec<Value>,
}

/// Success body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Deserialize a JSON map into a `Vec` of entries, preserving the order the
/// backend emitted the keys in.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedMapVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> de::Visitor<'de> for OrderedMapVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_decodes_null_std() {
        let body = r#"{
            "dataset_id": "d1",
            "shape": [10, 2],
            "dtypes": {"age": "float64", "city": "object"},
            "missing": {"age": {"missing_count": 0, "missing_pct": 0.0}},
            "numeric_summary": {
                "age": {"count": 10, "mean": 30.125, "std": null, "min": 18.0, "max": 65.0}
            },
            "categorical_top_values": {}
        }"#;
        let profile: ProfileResult = serde_json::from_str(body).unwrap();

        assert_eq!(profile.shape, Shape::from((10, 2)));
        let (col, summary) = &profile.numeric_summary[0];
        assert_eq!(col, "age");
        assert_eq!(summary.count, 10);
        assert_eq!(summary.std, None);
    }

    #[test]
    fn test_profile_mapping_order_is_preserved() {
        let body = r#"{
            "shape": [3, 3],
            "missing": {
                "zulu": {"missing_count": 1, "missing_pct": 33.33},
                "alpha": {"missing_count": 0, "missing_pct": 0.0},
                "mike": {"missing_count": 2, "missing_pct": 66.67}
            },
            "numeric_summary": {},
            "categorical_top_values": {}
        }"#;
        let profile: ProfileResult = serde_json::from_str(body).unwrap();

        let keys: Vec<&str> = profile.missing.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
        assert!(profile.dtypes.is_empty(), "absent dtypes defaults to empty");
    }

    #[test]
    fn test_categorical_entries_keep_given_order() {
        let body = r#"{
            "shape": [6, 1],
            "missing": {},
            "numeric_summary": {},
            "categorical_top_values": {
                "city": [
                    {"value": "Oslo", "count": 3},
                    {"value": null, "count": 2},
                    {"value": "Bergen", "count": 1}
                ]
            }
        }"#;
        let profile: ProfileResult = serde_json::from_str(body).unwrap();

        let (col, values) = &profile.categorical_top_values[0];
        assert_eq!(col, "city");
        assert_eq!(
            values,
            &vec![
                TopValue { value: Some("Oslo".into()), count: 3 },
                TopValue { value: None, count: 2 },
                TopValue { value: Some("Bergen".into()), count: 1 },
            ]
        );
    }

    #[test]
    fn test_preview_flags_undeclared_record_keys() {
        let body = r#"{
            "dataset_id": "d1",
            "shape": [2, 2],
            "columns": ["a", "b"],
            "preview": [
                {"a": 1, "b": 2},
                {"a": 3, "rogue": 4}
            ]
        }"#;
        let preview: PreviewResult = serde_json::from_str(body).unwrap();
        assert_eq!(preview.undeclared_keys(), vec!["rogue".to_string()]);
    }

    #[test]
    fn test_feature_ideas_accepts_suggestions_alias() {
        let ideas: FeatureIdeas =
            serde_json::from_str(r#"{"suggestions": [{"name": "age_bucket"}]}"#).unwrap();
        assert_eq!(ideas.ideas.len(), 1);
    }

    #[test]
    fn test_upload_response_requires_dataset_id() {
        let ok: UploadResponse =
            serde_json::from_str(r#"{"dataset_id": "x", "filename": "a.csv"}"#).unwrap();
        assert_eq!(ok.dataset_id.as_str(), "x");

        let missing = serde_json::from_str::<UploadResponse>(r#"{"filename": "a.csv"}"#);
        assert!(missing.is_err());
    }
}
