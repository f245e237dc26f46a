//! # Validation Diagnostics
//!
//! Structured, user-facing diagnostics. A [`ValidationError`] is the single
//! error shape surfaced for anything the document author can fix: schema
//! violations reported by a versioned validator, and an unsupported
//! `version` declaration reported by the dispatcher before delegation.
//!
//! Serialized field names match what editor integrations and build log
//! renderers consume: `type`, `context.key`, `level`, `docsLink`,
//! `actionItems`, `lines`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::OutputFormat;
use crate::version::{SchemaVersion, DEFAULT_VERSION};

/// Documentation page describing the workflow `version` field.
pub const VERSION_DOCS_LINK: &str =
    "https://codefresh.io/docs/docs/codefresh-yaml/what-is-the-codefresh-yaml/";

/// Remediation text attached to unsupported-version diagnostics.
pub const VERSION_ACTION_ITEMS: &str = "Please change the version to valid one";

/// Discriminates user-correctable validation failures from internal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The document is invalid; the author can fix it.
    #[serde(rename = "ValidationError")]
    Validation,
    /// The validator itself failed; not user-correctable.
    #[serde(rename = "InternalError")]
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => f.write_str("ValidationError"),
            Self::Internal => f.write_str("InternalError"),
        }
    }
}

/// Category of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailType {
    /// Structural or metadata validation.
    Validation,
}

/// Scope a diagnostic applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    /// Document metadata or top-level configuration.
    Workflow,
    /// A single step of the workflow.
    Step,
    /// Non-fatal finding, reported alongside a successful validation.
    Warning,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workflow => f.write_str("workflow"),
            Self::Step => f.write_str("step"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// The document key a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Offending key, e.g. `"version"`.
    pub key: String,
}

/// A single structured diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrorDetail {
    /// Human-readable description.
    pub message: String,
    /// Diagnostic category.
    #[serde(rename = "type")]
    pub detail_type: DetailType,
    /// Key the diagnostic is attached to.
    pub context: ErrorContext,
    /// Scope of the diagnostic.
    pub level: ErrorLevel,
    /// Documentation page for remediation.
    pub docs_link: String,
    /// Suggested fix.
    pub action_items: String,
    /// 1-based source line, or `0` when no specific line is implicated.
    pub lines: usize,
}

impl ValidationErrorDetail {
    /// A validation detail with no docs link, no action item and no line.
    pub fn new(message: impl Into<String>, key: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            message: message.into(),
            detail_type: DetailType::Validation,
            context: ErrorContext { key: key.into() },
            level,
            docs_link: String::new(),
            action_items: String::new(),
            lines: 0,
        }
    }

    /// Attach a documentation link.
    pub fn with_docs_link(mut self, link: impl Into<String>) -> Self {
        self.docs_link = link.into();
        self
    }

    /// Attach remediation text.
    pub fn with_action_items(mut self, action: impl Into<String>) -> Self {
        self.action_items = action.into();
        self
    }

    /// Attach a 1-based source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.lines = line;
        self
    }

    /// The key this detail is attached to.
    pub fn key(&self) -> &str {
        &self.context.key
    }
}

/// A tagged, structured validation failure.
///
/// Always carries [`ErrorKind::Validation`] so consumers can tell a
/// schema-invalid document apart from a runtime failure without probing
/// ad hoc fields. Serializes as
/// `{"name": "ValidationError", "message": ..., "details": [...]}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    #[serde(rename = "name")]
    kind: ErrorKind,
    message: String,
    details: Vec<ValidationErrorDetail>,
}

impl ValidationError {
    /// Construct from an explicit message and detail list.
    pub fn new(message: impl Into<String>, details: Vec<ValidationErrorDetail>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            details,
        }
    }

    /// Construct with the message rendered from the details.
    pub fn from_details(details: Vec<ValidationErrorDetail>, format: OutputFormat) -> Self {
        let message = format.render(&details);
        Self::new(message, details)
    }

    /// Kind marker; always [`ErrorKind::Validation`].
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Ordered diagnostic entries.
    pub fn details(&self) -> &[ValidationErrorDetail] {
        &self.details
    }

    /// Consumes self and returns the detail list.
    pub fn into_details(self) -> Vec<ValidationErrorDetail> {
        self.details
    }
}

/// Build the diagnostic for a document whose normalized version has no
/// registered validator.
///
/// The detail concerns the document's declared metadata rather than its
/// structure, so it is workflow-level and implicates no source line.
pub fn unsupported_version(version: &SchemaVersion) -> ValidationError {
    let message =
        format!("Current version: {version} is invalid. please change version to {DEFAULT_VERSION}");
    let detail = ValidationErrorDetail::new(message.clone(), "version", ErrorLevel::Workflow)
        .with_docs_link(VERSION_DOCS_LINK)
        .with_action_items(VERSION_ACTION_ITEMS);
    ValidationError::new(message, vec![detail])
}
