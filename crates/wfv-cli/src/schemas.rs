//! # Schemas and Versions Subcommands
//!
//! Introspection of the schema sets under the schema root.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use wfv_core::RawVersion;
use wfv_schema::{DispatchError, SchemaDispatcher};

/// Arguments for the `wfv schemas` subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Version to inspect, as it would appear in a workflow. Defaults to
    /// the version assumed for workflows without one.
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

/// Schema documents for the family `args.version` resolves to.
///
/// `Ok(None)` when the version is not supported.
pub fn lookup(
    dispatcher: &SchemaDispatcher,
    args: &SchemasArgs,
) -> Result<Option<BTreeMap<String, Value>>> {
    let raw = args.version.clone().map(RawVersion::from);
    match dispatcher.json_schemas(raw.as_ref()) {
        Ok(schemas) => Ok(Some(schemas)),
        Err(DispatchError::Validation(err)) => {
            tracing::warn!(error = %err, "no schema set for requested version");
            Ok(None)
        }
        Err(err) => Err(err).context("validator could not be loaded"),
    }
}

/// Execute the schemas subcommand: print the schema set as pretty JSON.
pub fn run_schemas(args: &SchemasArgs, dispatcher: &SchemaDispatcher) -> Result<u8> {
    match lookup(dispatcher, args)? {
        Some(schemas) => {
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            Ok(0)
        }
        None => {
            let requested = args.version.as_deref().unwrap_or("<none>");
            println!("Unsupported version: {requested}");
            println!("Supported versions: {}", version_list(dispatcher).join(", "));
            Ok(1)
        }
    }
}

/// Execute the versions subcommand: one supported version per line.
pub fn run_versions(dispatcher: &SchemaDispatcher) -> Result<u8> {
    for version in version_list(dispatcher) {
        println!("{version}");
    }
    Ok(0)
}

fn version_list(dispatcher: &SchemaDispatcher) -> Vec<String> {
    dispatcher
        .supported_versions()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}
