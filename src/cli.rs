use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    sql_type::{DEFAULT_TARGET_TYPE, parse_type_token},
    store::DEFAULT_SCHEMA_DIR,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Map CSV columns onto a target table schema", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the schemas stored in the schema directory
    Schemas(SchemasArgs),
    /// Generate a target schema from a CSV header and store it
    Derive(DeriveArgs),
    /// Map a CSV file onto a target schema and write the submission payload
    Map(MapArgs),
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Directory holding stored schema documents
    #[arg(long = "schema-dir", env = "SCHEMA_DIR", default_value = DEFAULT_SCHEMA_DIR)]
    pub schema_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SchemasArgs {
    /// Print the list as a JSON document instead of one name per line
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Target table name, e.g. dbo.customers
    #[arg(long)]
    pub table: String,
    /// SQL type given to every generated column
    #[arg(long = "default-type", default_value = DEFAULT_TARGET_TYPE, value_parser = parse_type_token)]
    pub default_type: String,
    /// File name to store the schema under (.json, .yml or .yaml)
    #[arg(long)]
    pub name: String,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Stored schema to map onto
    #[arg(long, conflicts_with = "table", required_unless_present = "table")]
    pub schema: Option<String>,
    /// Generate the schema from the CSV header using this table name
    #[arg(long)]
    pub table: Option<String>,
    /// SQL type for generated columns (with --table)
    #[arg(long = "default-type", default_value = DEFAULT_TARGET_TYPE, value_parser = parse_type_token)]
    pub default_type: String,
    /// Mapping overrides of the form `target=csv`, `target=csv:TYPE` or `target=` to unmap
    #[arg(long = "map", value_parser = parse_override, action = clap::ArgAction::Append)]
    pub overrides: Vec<MappingOverride>,
    /// Refuse target types outside the supported SQL grammar
    #[arg(long = "strict-types")]
    pub strict_types: bool,
    /// Number of preview rows to display
    #[arg(long = "preview-rows", default_value_t = 0)]
    pub preview_rows: usize,
    /// Write the submission payload JSON here ('-' for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub store: StoreArgs,
}

/// One `--map target=value` argument. `value` is resolved against the CSV
/// header by [`MappingOverride::resolve`], since column names may contain `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOverride {
    pub target: String,
    pub value: String,
}

impl MappingOverride {
    /// Splits the value into `(csv column, target type)`.
    ///
    /// A value naming a CSV column verbatim is taken whole. Otherwise the text
    /// after the last `:` is the type. An empty CSV part unmaps the target.
    pub fn resolve(&self, csv_columns: &[String]) -> (Option<&str>, Option<&str>) {
        let value = self.value.as_str();
        if value.is_empty() {
            return (None, None);
        }
        if csv_columns.iter().any(|column| column == value) {
            return (Some(value), None);
        }
        match value.rsplit_once(':') {
            Some((csv, ty)) if !ty.trim().is_empty() => {
                let csv = csv.trim();
                ((!csv.is_empty()).then_some(csv), Some(ty.trim()))
            }
            _ => (Some(value), None),
        }
    }
}

pub fn parse_override(value: &str) -> Result<MappingOverride, String> {
    let (target, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("Mapping override '{value}' must use the form target=csv[:TYPE]"))?;
    let target = target.trim();
    if target.is_empty() {
        return Err(format!("Mapping override '{value}' is missing a target column"));
    }
    Ok(MappingOverride {
        target: target.to_string(),
        value: rest.trim().to_string(),
    })
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
