//! Wire shapes exchanged with the upload service, schema store and executor.
//!
//! These mirror the JSON bodies of the HTTP API the session sits behind. They
//! convert into and out of the session types so callers never hand-assemble
//! JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    model::{CsvMetadata, SchemaColumn, TargetSchema},
    payload::{MappingItem, PayloadColumn, SubmissionPayload},
};

/// Body returned by `POST /api/csv/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvUploadResponse {
    pub file_id: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub preview_rows: Vec<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

impl From<CsvUploadResponse> for CsvMetadata {
    fn from(response: CsvUploadResponse) -> Self {
        let preview_rows = response
            .preview_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(column, value)| (column, display_value(value)))
                    .collect()
            })
            .collect();
        CsvMetadata {
            file_id: response.file_id,
            columns: response.columns,
            preview_rows,
            total_rows: response.total_rows,
        }
    }
}

fn display_value(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Body returned by `GET /api/schema/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaListResponse {
    pub schemas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumnDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub nullable: bool,
    /// CSV column this target column was built from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_csv: Option<String>,
}

/// Body returned by `GET /api/schema/{name}`; also the on-disk schema format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub table: String,
    pub columns: Vec<SchemaColumnDocument>,
}

impl From<SchemaDocument> for TargetSchema {
    fn from(document: SchemaDocument) -> Self {
        let columns = document
            .columns
            .into_iter()
            .map(|column| SchemaColumn {
                name: column.name,
                sql_type: column.sql_type,
                nullable: column.nullable,
                source_hint: column.source_csv,
            })
            .collect();
        TargetSchema::new(document.table, columns)
    }
}

impl From<&TargetSchema> for SchemaDocument {
    fn from(schema: &TargetSchema) -> Self {
        Self {
            table: schema.table.clone(),
            columns: schema
                .columns
                .iter()
                .map(|column| SchemaColumnDocument {
                    name: column.name.clone(),
                    sql_type: column.sql_type.clone(),
                    nullable: column.nullable,
                    source_csv: column.source_hint.clone(),
                })
                .collect(),
        }
    }
}

/// Body sent to `POST /api/upload/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRunRequest {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub schema: UploadSchema,
    pub mappings: Vec<MappingItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSchema {
    pub table: String,
    pub columns: Vec<PayloadColumn>,
}

impl From<&SubmissionPayload> for UploadRunRequest {
    fn from(payload: &SubmissionPayload) -> Self {
        Self {
            file_id: payload.file_id.clone(),
            schema_name: payload.schema_name.clone(),
            schema: UploadSchema {
                table: payload.table.clone(),
                columns: payload.columns.clone(),
            },
            mappings: payload.mappings.clone(),
        }
    }
}

/// Body returned by `POST /api/upload/run` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRunResponse {
    pub status: String,
    #[serde(default)]
    pub rows_inserted: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Vec<String>>,
}

/// Error body of any collaborator call: `{"detail": ...}` where the detail is
/// either a plain message or `{message, details}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Structured {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        details: Vec<String>,
    },
}

impl ErrorResponse {
    /// One line suitable for a status bar: `message | detail; detail`.
    pub fn summary(&self) -> String {
        match &self.detail {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Structured { message, details } => {
                let mut text = message
                    .clone()
                    .unwrap_or_else(|| "Upload failed".to_string());
                if !details.is_empty() {
                    text.push_str(" | ");
                    text.push_str(&details.join("; "));
                }
                text
            }
        }
    }
}
