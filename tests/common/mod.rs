#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_table_mapper::{CsvMetadata, SchemaColumn, TargetSchema};
use tempfile::{TempDir, tempdir};

/// Scratch directory holding CSV inputs and a `schemas/` store for one test.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory used as the schema store; created on first write.
    pub fn schema_dir(&self) -> PathBuf {
        self.temp_dir.path().join("schemas")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Writes a schema document into the store directory.
    pub fn write_schema(&self, name: &str, contents: &str) -> PathBuf {
        let dir = self.schema_dir();
        fs::create_dir_all(&dir).expect("create schema dir");
        let path = dir.join(name);
        fs::write(&path, contents).expect("write schema document");
        path
    }
}

pub fn csv_meta(file_id: &str, columns: &[&str]) -> CsvMetadata {
    CsvMetadata::new(file_id, columns.iter().map(|c| c.to_string()).collect())
}

pub fn schema(table: &str, columns: &[(&str, &str, bool)]) -> TargetSchema {
    TargetSchema::new(
        table,
        columns
            .iter()
            .map(|(name, ty, nullable)| SchemaColumn::new(*name, *ty, *nullable))
            .collect(),
    )
}
