//! # Dispatcher Configuration
//!
//! Loaded from a YAML file (conventionally `wfv.yaml`). Every field has a
//! default, so an empty file is a valid configuration:
//!
//! ```yaml
//! schema_root: schemas
//! preload: false
//! output_format: printify
//! options:
//!   ignore_warnings: false
//!   strict: false
//! context:
//!   registries: [dockerhub]
//!   git: [github]
//!   clusters: []
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wfv_core::OutputFormat;

use crate::error::ConfigError;
use crate::traits::{ValidateOptions, ValidationContext};

/// Settings for building a [`SchemaDispatcher`] and running validations.
///
/// [`SchemaDispatcher`]: crate::dispatch::SchemaDispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Directory holding one schema set per version.
    #[serde(default = "default_schema_root")]
    pub schema_root: PathBuf,
    /// Load every discovered version at startup instead of on first use.
    #[serde(default)]
    pub preload: bool,
    /// Default rendering for diagnostics.
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Default validation switches.
    #[serde(default)]
    pub options: ValidateOptions,
    /// Account resources; when present, validation checks references.
    #[serde(default)]
    pub context: Option<ValidationContext>,
}

fn default_schema_root() -> PathBuf {
    PathBuf::from("schemas")
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            schema_root: default_schema_root(),
            preload: false,
            output_format: OutputFormat::default(),
            options: ValidateOptions::default(),
            context: None,
        }
    }
}

impl DispatcherConfig {
    /// Parse configuration from YAML text. Empty text yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed YAML or unknown fields.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read configuration from a file. A relative `schema_root` is
    /// resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// the errors of [`DispatcherConfig::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;
        if config.schema_root.is_relative() {
            if let Some(parent) = path.parent() {
                config.schema_root = parent.join(&config.schema_root);
            }
        }
        Ok(config)
    }
}
