//! `map` subcommand: the whole import flow up to the executor call.
//!
//! Probe the CSV, pick or generate the schema, let the session derive the
//! mapping, apply `--map` overrides, then either report every violation or
//! write the submission payload. With `-o -` the payload owns stdout and the
//! preview and grid go to stderr.

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::{
    cli::{MapArgs, MappingOverride},
    grid,
    probe::{self, ProbeOptions},
    protocol::UploadRunRequest,
    session::ImportSession,
    store::{DirectorySchemaStore, SchemaStore},
    table,
};

pub fn execute(args: &MapArgs) -> Result<()> {
    let options = ProbeOptions {
        preview_rows: args.preview_rows,
        delimiter: args.input.delimiter,
        encoding: probe::resolve_encoding(args.input.input_encoding.as_deref())?,
        count_rows: true,
    };
    let metadata = probe::probe_path(&args.input.input, &options)?;
    info!(
        "CSV {:?} ready: file id {}, {} column(s), {} row(s)",
        args.input.input,
        metadata.file_id,
        metadata.columns.len(),
        metadata
            .total_rows
            .map(|n| n.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );
    let payload_on_stdout = args.output.as_deref() == Some(Path::new("-"));
    let report = |text: String| {
        if payload_on_stdout {
            eprint!("{text}");
        } else {
            print!("{text}");
        }
    };
    if args.preview_rows > 0 {
        report(table::render_preview(&metadata));
    }

    let mut session = ImportSession::new();
    session
        .ingest_csv(metadata)
        .with_context(|| format!("Ingesting {:?}", args.input.input))?;

    match (&args.schema, &args.table) {
        (Some(name), _) => {
            let store = DirectorySchemaStore::new(&args.store.schema_dir);
            let schema = store
                .get(name)
                .with_context(|| format!("Loading schema '{name}' from {:?}", store.root()))?;
            session.adopt_named_schema(name, schema)?;
        }
        (None, Some(table)) => {
            session.derive_ad_hoc_schema(table, &args.default_type)?;
        }
        (None, None) => bail!("Either --schema or --table is required"),
    }

    apply_overrides(&mut session, &args.overrides)?;

    if let Some(schema) = session.schema() {
        info!("Table: {} | Columns: {}", schema.table, schema.columns.len());
        report(grid::render_mapping_grid(schema, session.mappings()));
    }

    let type_problems = session.unsupported_types();
    for problem in &type_problems {
        warn!("{problem}");
    }
    if args.strict_types && !type_problems.is_empty() {
        bail!(
            "{} target column(s) use unsupported types",
            type_problems.len()
        );
    }

    let violations = session.validate_for_submission();
    if !violations.is_empty() {
        for violation in &violations {
            warn!("✗ {violation}");
        }
        bail!(
            "Mapping has {} problem(s) to fix before submission",
            violations.len()
        );
    }

    let payload = session.build_submission_payload()?;
    info!(
        "✓ {} of {} target column(s) mapped for {}",
        payload.mapped_count(),
        payload.mappings.len(),
        payload.table
    );
    if let Some(output) = &args.output {
        write_payload(output, &UploadRunRequest::from(&payload))?;
    }
    Ok(())
}

fn apply_overrides(session: &mut ImportSession, overrides: &[MappingOverride]) -> Result<()> {
    let csv_columns = session
        .csv()
        .map(|csv| csv.columns.clone())
        .unwrap_or_default();
    for item in overrides {
        let (csv, target_type) = item.resolve(&csv_columns);
        let current_type = session
            .mapping(&item.target)
            .map(|entry| entry.target_type.clone())
            .unwrap_or_default();
        let target_type = target_type.unwrap_or(current_type.as_str());
        session
            .set_mapping_override(&item.target, csv, target_type)
            .with_context(|| format!("Applying override for '{}'", item.target))?;
    }
    Ok(())
}

fn write_payload(path: &Path, request: &UploadRunRequest) -> Result<()> {
    let rendered = serde_json::to_string_pretty(request).context("Serializing payload")?;
    if path == Path::new("-") {
        println!("{rendered}");
        return Ok(());
    }
    let mut file = File::create(path).with_context(|| format!("Creating payload file {path:?}"))?;
    writeln!(file, "{rendered}").with_context(|| format!("Writing payload file {path:?}"))?;
    info!("Payload written to {:?}", path);
    Ok(())
}
