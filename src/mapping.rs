//! Default mapping between CSV columns and target schema columns.
//!
//! Each schema column picks a CSV column by the first tier that matches:
//! exact name, case-insensitive name, then its source hint. Within a tier the
//! earliest CSV column in file order wins, so columns such as `ID` and `id`
//! in the same file resolve deterministically.

use crate::model::{ColumnMapping, SchemaColumn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    SourceHint,
}

/// Returns the CSV column chosen for `column` and the tier that matched.
pub fn match_column<'a>(
    column: &SchemaColumn,
    csv_columns: &'a [String],
) -> Option<(&'a str, MatchTier)> {
    if let Some(found) = csv_columns.iter().find(|csv| **csv == column.name) {
        return Some((found.as_str(), MatchTier::Exact));
    }
    let lowered = column.name.to_lowercase();
    if let Some(found) = csv_columns.iter().find(|csv| csv.to_lowercase() == lowered) {
        return Some((found.as_str(), MatchTier::CaseInsensitive));
    }
    column
        .source_hint
        .as_deref()
        .and_then(|hint| csv_columns.iter().find(|csv| csv.as_str() == hint))
        .map(|found| (found.as_str(), MatchTier::SourceHint))
}

/// Derives a fresh mapping, one entry per schema column in schema order.
pub fn recompute(csv_columns: &[String], schema_columns: &[SchemaColumn]) -> Vec<ColumnMapping> {
    schema_columns
        .iter()
        .map(|column| ColumnMapping {
            target_col: column.name.clone(),
            csv_col: match_column(column, csv_columns).map(|(csv, _)| csv.to_string()),
            target_type: column.sql_type.clone(),
        })
        .collect()
}
