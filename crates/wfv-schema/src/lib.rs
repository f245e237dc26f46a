//! # wfv-schema: Versioned Schema Dispatch
//!
//! Routes a workflow document to the validator for the schema family it
//! declares, and surfaces a structured diagnostic when no such validator
//! exists.
//!
//! ## Dispatch (`dispatch`, `registry`)
//!
//! [`SchemaDispatcher`] is the public entry point. For every call it reads
//! the document's `version`, normalizes it with [`wfv_core::normalize`],
//! resolves an implementation from its owned [`ValidatorRegistry`] and
//! forwards the call with its arguments untouched:
//!
//! - [`SchemaDispatcher::validate`]
//! - [`SchemaDispatcher::validate_with_context`]
//! - [`SchemaDispatcher::json_schemas`]
//!
//! Implementations are loaded on first resolution and held for the life of
//! the registry. Loading is guarded so a version is constructed at most once.
//!
//! ## JSON Schema Implementation (`validate`)
//!
//! [`JsonSchemaValidator`] is the shipped [`ValidatorImplementation`]: one
//! directory of `*.schema.json` files per schema family, compiled once at
//! load time. [`ValidatorRegistry::discover`] registers one lazily loaded
//! validator per `<schema_root>/<version>/` directory.
//!
//! ## Crate Policy
//!
//! - Depends only on `wfv-core` internally.
//! - Resolution never partially succeeds: a call either reaches exactly one
//!   implementation or fails before delegation.
//! - Errors from a delegated call are returned unchanged.

pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod registry;
pub mod traits;
pub mod validate;

#[cfg(test)]
mod testing;

pub use config::DispatcherConfig;
pub use dispatch::SchemaDispatcher;
pub use document::{load_document, load_document_file};
pub use error::{ConfigError, DispatchError, DocumentError, LoadError, RegistryError, ResolveError};
pub use registry::{ValidatorFactory, ValidatorRegistry};
pub use traits::{ValidateOptions, ValidationContext, ValidationReport, ValidatorImplementation};
pub use validate::{JsonSchemaValidator, ENTRY_SCHEMA};
