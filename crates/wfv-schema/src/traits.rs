//! # Validator Implementation Trait
//!
//! The contract every per-version validator satisfies. The dispatcher
//! treats all three operations as opaque: it forwards `document`,
//! `output_format`, `raw_text`, `context` and `options` exactly as received
//! and returns whatever the implementation returns.
//!
//! Implementations must be `Send + Sync`; a registry shares one instance
//! per version across every caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wfv_core::{OutputFormat, SchemaVersion, ValidationError, ValidationErrorDetail};

/// Caller-supplied validation switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateOptions {
    /// Drop warnings from successful reports.
    #[serde(default)]
    pub ignore_warnings: bool,
    /// Treat warnings as validation failures.
    #[serde(default)]
    pub strict: bool,
}

/// Account resources a document may reference, consulted by
/// [`ValidatorImplementation::validate_with_context`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationContext {
    /// Known container registry names.
    #[serde(default)]
    pub registries: Vec<String>,
    /// Known git integration names.
    #[serde(default)]
    pub git: Vec<String>,
    /// Known cluster names.
    #[serde(default)]
    pub clusters: Vec<String>,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Schema family the document was validated against.
    pub version: SchemaVersion,
    /// Non-fatal findings, in document order.
    pub warnings: Vec<ValidationErrorDetail>,
}

impl ValidationReport {
    /// A report with no warnings.
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            warnings: Vec::new(),
        }
    }

    /// True when there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A validator for one schema family.
pub trait ValidatorImplementation: Send + Sync {
    /// Validate a document model.
    ///
    /// `raw_text` is the source the model was parsed from, used to attach
    /// line numbers to diagnostics.
    fn validate(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError>;

    /// Validate a document model, additionally checking references against
    /// account resources in `context`.
    fn validate_with_context(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        context: &ValidationContext,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError>;

    /// The schema documents backing this validator, keyed by schema name.
    fn json_schemas(&self) -> BTreeMap<String, Value>;
}
