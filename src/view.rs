//! Display-ready view models derived from raw backend payloads.
//!
//! Pure transformations: no network, no session state. Lists are truncated
//! to fixed limits and null-prone fields become plain strings here, so
//! render code can print everything verbatim.

use crate::core::models::{Payload, PreviewResult, ProfileResult, Shape};
use serde_json::Value;

/// Missing-value table keeps at most this many leading entries.
pub const MISSING_ROW_LIMIT: usize = 15;
/// Each categorical panel keeps at most this many leading top values.
pub const TOP_VALUE_LIMIT: usize = 5;

pub const NO_NUMERIC_COLUMNS: &str = "No numeric columns detected.";
pub const NO_CATEGORICAL_COLUMNS: &str = "No categorical columns detected.";

/// Render-ready preview table.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    pub shape: Shape,
    /// Header order; every row below follows it.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Pretty-printed dump of the unmodified payload, for diagnostics.
    pub raw_json: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingRow {
    pub column: String,
    pub missing_count: String,
    /// Percentage with a trailing `%`.
    pub missing_pct: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericRow {
    pub column: String,
    pub count: String,
    /// Rounded to exactly 3 decimal places.
    pub mean: String,
    /// Rounded to 3 decimals, or empty when the backend sent null (fewer
    /// than two observations).
    pub std: String,
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalPanel {
    pub column: String,
    /// `value (count)` lines, already truncated and null-substituted.
    pub items: Vec<String>,
}

/// Render-ready profile: missing-value table, numeric summary and
/// categorical panels.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub shape: Shape,
    pub missing: Vec<MissingRow>,
    pub numeric: Vec<NumericRow>,
    pub categorical: Vec<CategoricalPanel>,
    pub raw_json: String,
}

impl ProfileView {
    /// Indicator shown instead of an empty numeric table.
    pub fn numeric_placeholder(&self) -> Option<&'static str> {
        self.numeric.is_empty().then_some(NO_NUMERIC_COLUMNS)
    }

    /// Indicator shown instead of an empty categorical section.
    pub fn categorical_placeholder(&self) -> Option<&'static str> {
        self.categorical.is_empty().then_some(NO_CATEGORICAL_COLUMNS)
    }
}

/// Build the preview table. Cells are resolved per declared column (not per
/// record key); an absent or null cell renders as an empty string.
pub fn preview_view(payload: &Payload<PreviewResult>) -> PreviewView {
    let preview = &payload.data;
    let rows = preview
        .rows
        .iter()
        .map(|record| {
            preview
                .columns
                .iter()
                .map(|col| record.get(col).map(scalar_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    PreviewView {
        shape: preview.shape,
        columns: preview.columns.clone(),
        rows,
        raw_json: pretty_raw(&payload.raw),
    }
}

/// Build the profile tables, applying the truncation and formatting rules.
pub fn profile_view(payload: &Payload<ProfileResult>) -> ProfileView {
    let profile = &payload.data;

    let missing = profile
        .missing
        .iter()
        .take(MISSING_ROW_LIMIT)
        .map(|(column, stats)| MissingRow {
            column: column.clone(),
            missing_count: stats.missing_count.to_string(),
            missing_pct: format!("{}%", stats.missing_pct),
        })
        .collect();

    let numeric = profile
        .numeric_summary
        .iter()
        .map(|(column, summary)| NumericRow {
            column: column.clone(),
            count: summary.count.to_string(),
            mean: format!("{:.3}", summary.mean),
            std: summary.std.map(|v| format!("{v:.3}")).unwrap_or_default(),
            min: scalar_cell(&summary.min),
            max: scalar_cell(&summary.max),
        })
        .collect();

    let categorical = profile
        .categorical_top_values
        .iter()
        .map(|(column, values)| CategoricalPanel {
            column: column.clone(),
            items: values
                .iter()
                .take(TOP_VALUE_LIMIT)
                .map(|tv| format!("{} ({})", tv.value.as_deref().unwrap_or("null"), tv.count))
                .collect(),
        })
        .collect();

    ProfileView {
        shape: profile.shape,
        missing,
        numeric,
        categorical,
        raw_json: pretty_raw(&payload.raw),
    }
}

/// String form of an untyped cell. Strings render bare (no JSON quotes),
/// null renders empty, everything else uses its JSON representation.
fn scalar_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty_raw(raw: &Value) -> String {
    serde_json::to_string_pretty(raw).unwrap_or_default()
}
