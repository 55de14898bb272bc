//! Persisted target schemas.
//!
//! A [`SchemaStore`] lists and loads named schemas. [`DirectorySchemaStore`]
//! keeps one document per file in a directory; the file extension picks the
//! format (`.json`/`.txt` for JSON, `.yml`/`.yaml` for YAML). Loaded documents
//! are checked before they are handed to a session: a table name, named
//! columns, and types from the supported SQL grammar.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use crate::{model::TargetSchema, protocol::SchemaDocument, sql_type::SqlType};

pub const DEFAULT_SCHEMA_DIR: &str = "schemas";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid schema name '{0}'")]
    InvalidName(String),

    #[error("schema '{0}' not found")]
    NotFound(String),

    #[error("schema '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("failed to parse schema '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait SchemaStore {
    /// Stored schema names, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn get(&self, name: &str) -> Result<TargetSchema, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn for_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" | "txt" => Some(DocumentFormat::Json),
            "yml" | "yaml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySchemaStore {
    root: PathBuf,
}

impl DirectorySchemaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `schema` under `name`, creating the directory when needed.
    pub fn save(&self, name: &str, schema: &TargetSchema) -> Result<PathBuf, StoreError> {
        let format = check_name(name)?;
        let document = SchemaDocument::from(schema);
        check_document(name, &document)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let rendered = match format {
            DocumentFormat::Json => serde_json::to_string_pretty(&document)
                .map_err(|err| parse_error(name, err))?,
            DocumentFormat::Yaml => {
                serde_yaml::to_string(&document).map_err(|err| parse_error(name, err))?
            }
        };
        let path = self.root.join(name);
        fs::write(&path, rendered).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Saved schema '{}' to {:?}", name, path);
        Ok(path)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let root = fs::canonicalize(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let candidate = root.join(name);
        if !candidate.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let resolved = fs::canonicalize(&candidate).map_err(|source| StoreError::Io {
            path: candidate.clone(),
            source,
        })?;
        if resolved.parent() != Some(root.as_path()) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(resolved)
    }
}

impl SchemaStore for DirectorySchemaStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Schema directory {:?} does not exist yet", self.root);
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && check_name(name).is_ok()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn get(&self, name: &str) -> Result<TargetSchema, StoreError> {
        let format = check_name(name)?;
        let path = self.resolve(name)?;
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let document: SchemaDocument = match format {
            DocumentFormat::Json => {
                serde_json::from_str(&raw).map_err(|err| parse_error(name, err))?
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(&raw).map_err(|err| parse_error(name, err))?
            }
        };
        check_document(name, &document)?;
        debug!(
            "Loaded schema '{}' for table {} ({} column(s))",
            name,
            document.table,
            document.columns.len()
        );
        Ok(document.into())
    }
}

static SCHEMA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid schema name regex"));

fn check_name(name: &str) -> Result<DocumentFormat, StoreError> {
    if !SCHEMA_NAME.is_match(name) || name.starts_with('.') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    DocumentFormat::for_name(name).ok_or_else(|| StoreError::InvalidName(name.to_string()))
}

fn check_document(name: &str, document: &SchemaDocument) -> Result<(), StoreError> {
    let invalid = |reason: String| StoreError::Invalid {
        name: name.to_string(),
        reason,
    };
    if document.table.trim().is_empty() {
        return Err(invalid("table is required".to_string()));
    }
    for (idx, column) in document.columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(invalid(format!("column {} has no name", idx + 1)));
        }
        if !SqlType::is_supported(&column.sql_type) {
            return Err(invalid(format!(
                "column '{}' has unsupported type '{}'",
                column.name, column.sql_type
            )));
        }
    }
    Ok(())
}

fn parse_error(name: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Parse {
        name: name.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_plain_file_names_with_known_extension() {
        assert!(check_name("people.yml").is_ok());
        assert!(check_name("orders_v2.json").is_ok());
        assert!(check_name("legacy.txt").is_ok());
        for bad in ["../etc/passwd.json", "a/b.yml", "..json", "people", "people.csv", ""] {
            assert!(
                matches!(check_name(bad), Err(StoreError::InvalidName(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn documents_with_unsupported_types_are_rejected() {
        let document: SchemaDocument = serde_json::from_str(
            r#"{"table": "dbo.t", "columns": [{"name": "a", "type": "MONEY", "nullable": true}]}"#,
        )
        .unwrap();
        let err = check_document("t.json", &document).unwrap_err();
        assert!(err.to_string().contains("unsupported type 'MONEY'"));
    }
}
