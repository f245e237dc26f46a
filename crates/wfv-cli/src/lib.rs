//! # wfv-cli: Workflow Validation Command-Line Interface
//!
//! Provides the `wfv` binary on top of [`wfv_schema::SchemaDispatcher`].
//!
//! ## Subcommands
//!
//! - `wfv validate FILE`: Validate a workflow file against the schema
//!   family its `version` declares.
//! - `wfv schemas [--version V]`: Print the schema set for a version.
//! - `wfv versions`: List the versions found under the schema root.
//!
//! ```bash
//! wfv validate codefresh.yml --output-format lint
//! wfv --config ci/wfv.yaml validate codefresh.yml --context account.yaml --strict
//! wfv schemas --version 1.1
//! ```
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the document fails validation, `2` on
//! operational errors (unreadable files, broken schema sets).
//!
//! Handlers only parse arguments, call into `wfv-schema`, and print.

pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wfv_schema::{DispatcherConfig, SchemaDispatcher};

/// Configuration file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "wfv.yaml";

/// Load the dispatcher configuration.
///
/// An explicit `path` must exist. Without one, `./wfv.yaml` is used when
/// present, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<DispatcherConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                tracing::debug!("no configuration file, using defaults");
                return Ok(DispatcherConfig::default());
            }
            fallback
        }
    };
    let config = DispatcherConfig::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        schema_root = %config.schema_root.display(),
        "loaded configuration"
    );
    Ok(config)
}

/// Build the dispatcher described by `config`.
pub fn build_dispatcher(config: &DispatcherConfig) -> Result<SchemaDispatcher> {
    SchemaDispatcher::from_config(config).with_context(|| {
        format!(
            "failed to load schema sets from {}",
            config.schema_root.display()
        )
    })
}
