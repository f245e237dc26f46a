//! # wfv-core: Foundational Types for Versioned Workflow Validation
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace. It depends on nothing internal and performs no I/O.
//!
//! ## Key Design Principles
//!
//! 1. **Raw versus normalized versions are distinct types.** A document's
//!    `version` field is read as a [`RawVersion`]; only [`normalize`] turns it
//!    into a [`SchemaVersion`], the key used for validator lookup. A
//!    `SchemaVersion` is never empty.
//!
//! 2. **Diagnostics are data.** Every user-facing failure is a
//!    [`ValidationError`] carrying an ordered list of
//!    [`ValidationErrorDetail`] records, serialized with the field names
//!    downstream tooling expects (`docsLink`, `actionItems`, ...).
//!
//! 3. **Rendering is separate from detection.** [`OutputFormat`] turns a
//!    detail list into text; validators never hand-format messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wfv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostics;
pub mod error;
pub mod format;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use diagnostics::{
    unsupported_version, DetailType, ErrorContext, ErrorKind, ErrorLevel, ValidationError,
    ValidationErrorDetail, VERSION_ACTION_ITEMS, VERSION_DOCS_LINK,
};
pub use error::CoreError;
pub use format::OutputFormat;
pub use version::{normalize, RawVersion, SchemaVersion, DEFAULT_VERSION};
