//! The import session and the operations that move it between states.
//!
//! An [`ImportSession`] is owned by whoever drives the import (the CLI here)
//! and passed explicitly to every operation. Nothing is cached elsewhere: the
//! mapping is always rebuilt from the current CSV metadata and schema, then
//! optionally adjusted entry by entry before submission.
//!
//! The three ways a schema can arrive all go through the same two entry
//! points:
//!
//! - hand-built schemas and schemas fetched from a store use
//!   [`ImportSession::adopt_schema`] / [`ImportSession::adopt_named_schema`];
//! - schemas generated from the CSV header use
//!   [`ImportSession::derive_ad_hoc_schema`].

use log::debug;

use crate::{
    error::{ReconcileError, Result},
    mapping,
    model::{ColumnMapping, CsvMetadata, SchemaOrigin, TargetSchema},
    payload::SubmissionPayload,
    validate::{self, Violation},
};

#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    csv: Option<CsvMetadata>,
    schema: Option<(TargetSchema, SchemaOrigin)>,
    mappings: Vec<ColumnMapping>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn csv(&self) -> Option<&CsvMetadata> {
        self.csv.as_ref()
    }

    pub fn schema(&self) -> Option<&TargetSchema> {
        self.schema.as_ref().map(|(schema, _)| schema)
    }

    pub fn schema_origin(&self) -> Option<&SchemaOrigin> {
        self.schema.as_ref().map(|(_, origin)| origin)
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn mapping(&self, target_col: &str) -> Option<&ColumnMapping> {
        self.mappings.iter().find(|m| m.target_col == target_col)
    }

    /// Replaces the CSV metadata. A schema generated from the previous file is
    /// dropped; an adopted schema is kept and re-mapped against the new file.
    pub fn ingest_csv(&mut self, metadata: CsvMetadata) -> Result<()> {
        metadata.ensure_valid()?;
        debug!(
            "Ingesting CSV {} with {} column(s)",
            metadata.file_id,
            metadata.columns.len()
        );
        self.csv = Some(metadata);
        if matches!(self.schema_origin(), Some(SchemaOrigin::AdHoc)) {
            debug!("Dropping ad hoc schema built from the previous file");
            self.schema = None;
        }
        self.mappings.clear();
        if self.schema.is_some() {
            self.recompute_mapping();
        }
        Ok(())
    }

    /// Generates a schema from the current CSV columns and installs it.
    pub fn derive_ad_hoc_schema(
        &mut self,
        table_name: &str,
        default_type: &str,
    ) -> Result<&TargetSchema> {
        let csv = self.csv.as_ref().ok_or_else(|| {
            ReconcileError::precondition("Upload a CSV before generating a schema from it")
        })?;
        if table_name.trim().is_empty() {
            return Err(ReconcileError::invalid_input("Table name is required"));
        }
        if default_type.trim().is_empty() {
            return Err(ReconcileError::invalid_input("Default type is required"));
        }
        let schema = TargetSchema::from_csv_columns(table_name, &csv.columns, default_type.trim());
        debug!(
            "Derived ad hoc schema for {} with {} column(s)",
            schema.table,
            schema.columns.len()
        );
        Ok(self.install_schema(schema, SchemaOrigin::AdHoc))
    }

    pub fn adopt_schema(&mut self, schema: TargetSchema) -> Result<()> {
        self.adopt(schema, None)
    }

    /// Adopts a schema loaded from a store, remembering the name it was
    /// stored under so the executor can reference it.
    pub fn adopt_named_schema(&mut self, name: &str, schema: TargetSchema) -> Result<()> {
        self.adopt(schema, Some(name.to_string()))
    }

    fn adopt(&mut self, schema: TargetSchema, name: Option<String>) -> Result<()> {
        schema.ensure_valid_columns()?;
        debug!(
            "Adopting schema {} ({} column(s), store name {:?})",
            schema.table,
            schema.columns.len(),
            name
        );
        self.install_schema(schema, SchemaOrigin::Adopted { name });
        Ok(())
    }

    fn install_schema(&mut self, schema: TargetSchema, origin: SchemaOrigin) -> &TargetSchema {
        self.mappings = mapping::recompute(csv_columns(&self.csv), &schema.columns);
        self.log_mapping_summary();
        let (schema, _) = self.schema.insert((schema, origin));
        schema
    }

    /// Rebuilds the mapping from scratch, discarding any overrides.
    pub fn recompute_mapping(&mut self) {
        self.mappings = match &self.schema {
            Some((schema, _)) => mapping::recompute(csv_columns(&self.csv), &schema.columns),
            None => Vec::new(),
        };
        self.log_mapping_summary();
    }

    fn log_mapping_summary(&self) {
        debug!(
            "Recomputed mapping: {} of {} target column(s) matched",
            self.mappings.iter().filter(|m| m.is_mapped()).count(),
            self.mappings.len()
        );
    }

    /// Points one target column at a different CSV column (or none) and type.
    pub fn set_mapping_override(
        &mut self,
        target_col: &str,
        csv_col: Option<&str>,
        target_type: &str,
    ) -> Result<()> {
        let entry = self
            .mappings
            .iter_mut()
            .find(|m| m.target_col == target_col)
            .ok_or_else(|| {
                ReconcileError::not_found(format!("No mapping entry for target column '{target_col}'"))
            })?;
        if let Some(csv_col) = csv_col {
            let known = self.csv.as_ref().is_some_and(|csv| csv.has_column(csv_col));
            if !known {
                return Err(ReconcileError::invalid_input(format!(
                    "CSV column '{csv_col}' is not present in the uploaded file"
                )));
            }
        }
        if target_type.trim().is_empty() {
            return Err(ReconcileError::invalid_input(format!(
                "Target type for '{target_col}' cannot be empty"
            )));
        }
        entry.csv_col = csv_col.map(str::to_string);
        entry.target_type = target_type.trim().to_string();
        debug!(
            "Override {} -> {:?} as {}",
            entry.target_col, entry.csv_col, entry.target_type
        );
        Ok(())
    }

    pub fn validate_for_submission(&self) -> Vec<Violation> {
        validate::check(self.csv(), self.schema(), &self.mappings)
    }

    /// Target types outside the supported SQL grammar. Free-form types are
    /// allowed through submission; this is for callers that want to warn.
    pub fn unsupported_types(&self) -> Vec<Violation> {
        validate::check_types(&self.mappings)
    }

    pub fn build_submission_payload(&self) -> Result<SubmissionPayload> {
        let violations = self.validate_for_submission();
        if !violations.is_empty() {
            let summary = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ReconcileError::precondition(format!(
                "Mapping is not ready for submission: {summary}"
            )));
        }
        let (Some(csv), Some((schema, origin))) = (self.csv.as_ref(), self.schema.as_ref()) else {
            return Err(ReconcileError::precondition(
                "CSV and schema are required before submission",
            ));
        };
        Ok(SubmissionPayload::snapshot(csv, schema, origin, &self.mappings))
    }
}

fn csv_columns(csv: &Option<CsvMetadata>) -> &[String] {
    csv.as_ref()
        .map(|csv| csv.columns.as_slice())
        .unwrap_or_default()
}
