//! Header and preview probing for local CSV files.
//!
//! Stands in for the upload service when the CLI works on files directly: it
//! reads the header row and a handful of preview rows, optionally counts the
//! remaining records, and issues a fresh file id. Values stay strings; no
//! type inference happens here.
//!
//! - **Delimiter**: extension-based (`.tsv` → tab, otherwise comma) unless
//!   overridden.
//! - **Encoding**: fields are decoded with `encoding_rs`, UTF-8 by default.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use uuid::Uuid;

use crate::model::{CsvMetadata, PreviewRow};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;
pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub preview_rows: usize,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub count_rows: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
            encoding: UTF_8,
            count_rows: true,
        }
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn probe_path(path: &Path, options: &ProbeOptions) -> Result<CsvMetadata> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let delimiter = resolve_delimiter(path, options.delimiter);
    let file_id = Uuid::new_v4().to_string();
    let metadata = probe_reader(BufReader::new(file), file_id, delimiter, options)
        .with_context(|| format!("Probing {path:?}"))?;
    debug!(
        "Probed {:?}: {} column(s), {} preview row(s)",
        path,
        metadata.columns.len(),
        metadata.preview_rows.len()
    );
    Ok(metadata)
}

pub fn probe_reader<R: Read>(
    reader: R,
    file_id: String,
    delimiter: u8,
    options: &ProbeOptions,
) -> Result<CsvMetadata> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);
    let headers = decode_record(reader.byte_headers()?, options.encoding)?;
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(anyhow!("CSV file has no header row"));
    }

    let mut preview_rows = Vec::new();
    let mut total = 0u64;
    for (idx, record) in reader.byte_records().enumerate() {
        if idx >= options.preview_rows && !options.count_rows {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        if idx < options.preview_rows {
            let values = decode_record(&record, options.encoding)?;
            let row: PreviewRow = headers
                .iter()
                .enumerate()
                .map(|(col, name)| (name.clone(), values.get(col).cloned().unwrap_or_default()))
                .collect();
            preview_rows.push(row);
        }
        total += 1;
    }

    Ok(CsvMetadata {
        file_id,
        columns: headers,
        preview_rows,
        total_rows: options.count_rows.then_some(total),
    })
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(anyhow!(
                    "Failed to decode text with encoding {}",
                    encoding.name()
                ))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}
