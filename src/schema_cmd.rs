//! `schemas` and `derive` subcommands: browsing and populating the schema
//! directory.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{DeriveArgs, SchemasArgs},
    probe::{self, ProbeOptions},
    protocol::SchemaListResponse,
    session::ImportSession,
    store::{DirectorySchemaStore, SchemaStore},
};

pub fn list(args: &SchemasArgs) -> Result<()> {
    let store = DirectorySchemaStore::new(&args.store.schema_dir);
    let names = store
        .list()
        .with_context(|| format!("Listing schemas in {:?}", store.root()))?;
    info!("{} schema(s) in {:?}", names.len(), store.root());
    if args.json {
        let response = SchemaListResponse { schemas: names };
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Serializing schema list")?
        );
    } else {
        for name in &names {
            println!("{name}");
        }
    }
    Ok(())
}

pub fn derive(args: &DeriveArgs) -> Result<()> {
    let options = ProbeOptions {
        preview_rows: 0,
        delimiter: args.input.delimiter,
        encoding: probe::resolve_encoding(args.input.input_encoding.as_deref())?,
        count_rows: false,
    };
    let metadata = probe::probe_path(&args.input.input, &options)?;

    let mut session = ImportSession::new();
    session
        .ingest_csv(metadata)
        .with_context(|| format!("Reading columns of {:?}", args.input.input))?;
    let schema = session
        .derive_ad_hoc_schema(&args.table, &args.default_type)
        .context("Generating schema from CSV header")?;

    let store = DirectorySchemaStore::new(&args.store.schema_dir);
    let path = store
        .save(&args.name, schema)
        .with_context(|| format!("Saving schema '{}'", args.name))?;
    info!(
        "Schema for {} with {} column(s) written to {:?}",
        schema.table,
        schema.columns.len(),
        path
    );
    Ok(())
}
