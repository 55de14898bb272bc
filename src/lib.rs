pub mod cli;
pub mod error;
pub mod grid;
pub mod map_cmd;
pub mod mapping;
pub mod model;
pub mod payload;
pub mod probe;
pub mod protocol;
pub mod schema_cmd;
pub mod session;
pub mod sql_type;
pub mod store;
pub mod table;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    error::ReconcileError,
    model::{ColumnMapping, CsvMetadata, SchemaColumn, SchemaOrigin, TargetSchema},
    payload::SubmissionPayload,
    session::ImportSession,
    validate::Violation,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_table_mapper", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Schemas(args) => schema_cmd::list(&args),
        Commands::Derive(args) => schema_cmd::derive(&args),
        Commands::Map(args) => map_cmd::execute(&args),
    }
}
