//! # Error Types
//!
//! Two families of failure leave this crate:
//!
//! - **User-correctable**: a [`ValidationError`], either built by the
//!   dispatcher for an unsupported `version` or returned by the delegated
//!   validator. Carried as [`DispatchError::Validation`].
//! - **Internal**: a registered validator that cannot be loaded, a schema
//!   root that cannot be read, an unreadable document or configuration file.

use std::path::PathBuf;

use thiserror::Error;
use wfv_core::{unsupported_version, ErrorKind, SchemaVersion, ValidationError};

/// Failure constructing a validator implementation.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The schema directory could not be read.
    #[error("cannot read schema directory {path}: {source}")]
    Directory {
        /// Directory that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The schema directory contains no `*.schema.json` files.
    #[error("no *.schema.json files found in {0}")]
    Empty(PathBuf),

    /// A schema file is not valid JSON.
    #[error("schema '{schema_name}' is not valid JSON: {reason}")]
    InvalidJson {
        /// Schema filename.
        schema_name: String,
        /// Parser message.
        reason: String,
    },

    /// The set lacks its entry schema.
    #[error("entry schema '{0}' is missing from the schema set")]
    MissingEntry(String),

    /// The entry schema could not be compiled.
    #[error("schema '{schema_name}' does not compile: {reason}")]
    Compile {
        /// Schema filename.
        schema_name: String,
        /// Compiler message.
        reason: String,
    },

    /// Any other construction failure reported by a custom factory.
    #[error("{0}")]
    Other(String),
}

/// Failure resolving a normalized version to an implementation.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No implementation is registered for the version.
    #[error("no validator registered for schema version {0}")]
    UnsupportedVersion(SchemaVersion),

    /// An implementation is registered but failed to load.
    #[error("unable to find a validator for schema version {version}: {source}")]
    ImplementationLoad {
        /// Version whose implementation failed.
        version: SchemaVersion,
        /// Why loading failed.
        #[source]
        source: LoadError,
    },
}

/// Failure populating a registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The schema root directory could not be read.
    #[error("cannot read schema root {path}: {reason}")]
    SchemaRoot {
        /// Root that was being read.
        path: String,
        /// Reason the root could not be read.
        reason: String,
    },

    /// Eager loading of a discovered version failed.
    #[error("failed to preload schema validators: {0}")]
    Preload(#[source] ResolveError),

    /// IO error while enumerating the root.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`SchemaDispatcher`] operations.
///
/// [`SchemaDispatcher`]: crate::dispatch::SchemaDispatcher
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The document is invalid: unsupported version, or a failure reported
    /// by the delegated validator (passed through unchanged).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The validator registered for the version could not be loaded.
    #[error("unable to find a validator for schema version {version}: {source}")]
    ImplementationLoad {
        /// Version whose implementation failed.
        version: SchemaVersion,
        /// Why loading failed.
        #[source]
        source: LoadError,
    },
}

impl DispatchError {
    /// Discriminator for upstream rendering.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ImplementationLoad { .. } => ErrorKind::Internal,
        }
    }

    /// The structured diagnostic, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::ImplementationLoad { .. } => None,
        }
    }
}

impl From<ResolveError> for DispatchError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnsupportedVersion(version) => {
                Self::Validation(unsupported_version(&version))
            }
            ResolveError::ImplementationLoad { version, source } => {
                Self::ImplementationLoad { version, source }
            }
        }
    }
}

/// Failure loading a workflow document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read document {path}: {source}")]
    Read {
        /// Path to the document.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid YAML (or JSON).
    #[error("invalid YAML: {0}")]
    Parse(String),

    /// The YAML uses constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}

/// Failure loading dispatcher configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML or has unknown fields.
    #[error("invalid config: {0}")]
    Parse(String),
}
