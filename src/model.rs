//! Values held by an import session: CSV metadata, target schema and mapping.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

pub type PreviewRow = BTreeMap<String, String>;

/// Header and preview information for one uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvMetadata {
    pub file_id: String,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preview_rows: Vec<PreviewRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
}

impl CsvMetadata {
    pub fn new(file_id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            file_id: file_id.into(),
            columns,
            preview_rows: Vec::new(),
            total_rows: None,
        }
    }

    pub fn with_preview(mut self, rows: Vec<PreviewRow>) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Column names must be non-empty and distinct.
    pub fn ensure_valid(&self) -> Result<()> {
        ensure_unique_names(self.columns.iter().map(String::as_str), "CSV column")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<String>,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable,
            source_hint: None,
        }
    }

    pub fn with_source_hint(mut self, hint: impl Into<String>) -> Self {
        self.source_hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSchema {
    pub table: String,
    pub columns: Vec<SchemaColumn>,
}

impl TargetSchema {
    pub fn new(table: impl Into<String>, columns: Vec<SchemaColumn>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// Builds a schema with one nullable column per CSV column, each typed
    /// `default_type` and hinted back at the column it came from.
    pub fn from_csv_columns(table: &str, csv_columns: &[String], default_type: &str) -> Self {
        let columns = csv_columns
            .iter()
            .map(|name| SchemaColumn::new(name.clone(), default_type, true).with_source_hint(name))
            .collect();
        Self::new(table.trim(), columns)
    }

    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn ensure_valid_columns(&self) -> Result<()> {
        ensure_unique_names(
            self.columns.iter().map(|c| c.name.as_str()),
            "Schema column",
        )
    }
}

/// Where the session's current schema came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOrigin {
    /// Generated from the current CSV headers; dropped when the CSV changes.
    AdHoc,
    /// Supplied by the caller, optionally under a persisted schema name.
    Adopted { name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub target_col: String,
    pub csv_col: Option<String>,
    pub target_type: String,
}

impl ColumnMapping {
    pub fn is_mapped(&self) -> bool {
        self.csv_col.is_some()
    }
}

fn ensure_unique_names<'a>(names: impl Iterator<Item = &'a str>, label: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, name) in names.enumerate() {
        if name.trim().is_empty() {
            return Err(ReconcileError::invalid_input(format!(
                "{label} at position {} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(name) {
            return Err(ReconcileError::invalid_input(format!(
                "Duplicate {} name '{name}'",
                label.to_ascii_lowercase()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn from_csv_columns_preserves_order_and_hints() {
        let schema =
            TargetSchema::from_csv_columns(" dbo.people ", &names(&["b", "a"]), "INT");
        assert_eq!(schema.table, "dbo.people");
        assert_eq!(schema.column_names(), vec!["b", "a"]);
        assert!(schema.columns.iter().all(|c| c.nullable && c.sql_type == "INT"));
        assert_eq!(schema.columns[1].source_hint.as_deref(), Some("a"));
    }

    #[test]
    fn duplicate_csv_columns_are_rejected() {
        let meta = CsvMetadata::new("f1", names(&["id", "id"]));
        let err = meta.ensure_valid().unwrap_err();
        assert_eq!(
            err,
            ReconcileError::InvalidInput("Duplicate csv column name 'id'".to_string())
        );
    }

    #[test]
    fn blank_schema_column_is_rejected() {
        let schema = TargetSchema::new(
            "t",
            vec![SchemaColumn::new("id", "INT", false), SchemaColumn::new(" ", "INT", true)],
        );
        let err = schema.ensure_valid_columns().unwrap_err();
        assert!(err.to_string().contains("position 2 has an empty name"));
    }

    #[test]
    fn schema_column_serializes_type_key() {
        let json = serde_json::to_value(SchemaColumn::new("id", "INT", false)).unwrap();
        assert_eq!(json["type"], "INT");
        assert!(json.get("source_hint").is_none());
    }
}
