//! Pre-submission checks over an import session.
//!
//! Problems are collected rather than raised so the caller can show every one
//! of them at once.

use std::{collections::HashSet, fmt};

use itertools::Itertools;

use crate::{
    model::{ColumnMapping, CsvMetadata, TargetSchema},
    sql_type::SqlType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingCsv,
    MissingSchema,
    MissingTable,
    NothingMapped,
    Unmapped { target: String },
    EmptyTarget { position: usize },
    DuplicateTarget { target: String },
    UnknownCsvColumn { target: String, csv: String },
    UnsupportedType { target: String, sql_type: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingCsv => f.write_str("No CSV file has been uploaded"),
            Violation::MissingSchema => f.write_str("No target schema has been defined"),
            Violation::MissingTable => f.write_str("Table name is required"),
            Violation::NothingMapped => {
                f.write_str("At least one target column must be mapped to a CSV column")
            }
            Violation::Unmapped { target } => write!(f, "\"{target}\" has no mapped CSV column"),
            Violation::EmptyTarget { position } => {
                write!(f, "Target column at position {position} has an empty name")
            }
            Violation::DuplicateTarget { target } => {
                write!(f, "Target column \"{target}\" appears more than once")
            }
            Violation::UnknownCsvColumn { target, csv } => {
                write!(f, "\"{target}\" is mapped to unknown CSV column \"{csv}\"")
            }
            Violation::UnsupportedType { target, sql_type } => {
                write!(f, "\"{target}\" uses unsupported type \"{sql_type}\"")
            }
        }
    }
}

pub fn check(
    csv: Option<&CsvMetadata>,
    schema: Option<&TargetSchema>,
    mappings: &[ColumnMapping],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if csv.is_none() {
        violations.push(Violation::MissingCsv);
    }
    match schema {
        None => violations.push(Violation::MissingSchema),
        Some(schema) if schema.table.trim().is_empty() => {
            violations.push(Violation::MissingTable)
        }
        Some(_) => {}
    }

    if !mappings.iter().any(ColumnMapping::is_mapped) {
        violations.push(Violation::NothingMapped);
    }
    violations.extend(
        mappings
            .iter()
            .filter(|m| !m.is_mapped())
            .map(|m| Violation::Unmapped {
                target: m.target_col.clone(),
            }),
    );

    violations.extend(
        mappings
            .iter()
            .enumerate()
            .filter(|(_, m)| m.target_col.trim().is_empty())
            .map(|(idx, _)| Violation::EmptyTarget { position: idx + 1 }),
    );

    violations.extend(
        mappings
            .iter()
            .map(|m| m.target_col.as_str())
            .filter(|name| !name.trim().is_empty())
            .duplicates()
            .map(|name| Violation::DuplicateTarget {
                target: name.to_string(),
            }),
    );

    let known: HashSet<&str> = csv
        .map(|meta| meta.columns.iter().map(String::as_str).collect())
        .unwrap_or_default();
    violations.extend(mappings.iter().filter_map(|m| {
        let csv_col = m.csv_col.as_deref()?;
        (!known.contains(csv_col)).then(|| Violation::UnknownCsvColumn {
            target: m.target_col.clone(),
            csv: csv_col.to_string(),
        })
    }));

    violations
}

/// Advisory check of target types against the supported SQL grammar.
pub fn check_types(mappings: &[ColumnMapping]) -> Vec<Violation> {
    mappings
        .iter()
        .filter(|m| !SqlType::is_supported(&m.target_type))
        .map(|m| Violation::UnsupportedType {
            target: m.target_col.clone(),
            sql_type: m.target_type.clone(),
        })
        .collect()
}
