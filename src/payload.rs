//! Owned submission snapshot handed to the upload executor.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnMapping, CsvMetadata, SchemaColumn, SchemaOrigin, TargetSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub nullable: bool,
}

impl From<&SchemaColumn> for PayloadColumn {
    fn from(column: &SchemaColumn) -> Self {
        Self {
            name: column.name.clone(),
            sql_type: column.sql_type.clone(),
            nullable: column.nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingItem {
    pub target_col: String,
    pub csv_col: Option<String>,
    pub target_type: String,
}

impl From<&ColumnMapping> for MappingItem {
    fn from(mapping: &ColumnMapping) -> Self {
        Self {
            target_col: mapping.target_col.clone(),
            csv_col: mapping.csv_col.clone(),
            target_type: mapping.target_type.clone(),
        }
    }
}

/// Everything the executor needs to run one import. Built from copies of the
/// session's values, so later session edits never reach an in-flight payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub file_id: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub columns: Vec<PayloadColumn>,
    pub mappings: Vec<MappingItem>,
}

impl SubmissionPayload {
    pub(crate) fn snapshot(
        csv: &CsvMetadata,
        schema: &TargetSchema,
        origin: &SchemaOrigin,
        mappings: &[ColumnMapping],
    ) -> Self {
        let schema_name = match origin {
            SchemaOrigin::Adopted { name } => name.clone(),
            SchemaOrigin::AdHoc => None,
        };
        Self {
            file_id: csv.file_id.clone(),
            table: schema.table.trim().to_string(),
            schema_name,
            columns: schema.columns.iter().map(PayloadColumn::from).collect(),
            mappings: mappings.iter().map(MappingItem::from).collect(),
        }
    }

    pub fn mapped_count(&self) -> usize {
        self.mappings.iter().filter(|m| m.csv_col.is_some()).count()
    }

    pub fn mapping_for(&self, target: &str) -> Option<&MappingItem> {
        self.mappings.iter().find(|m| m.target_col == target)
    }
}
