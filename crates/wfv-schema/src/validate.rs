//! # JSON Schema Validator
//!
//! The shipped [`ValidatorImplementation`]: validates workflow documents
//! against one schema family (Draft 2020-12).
//!
//! ## Schema Sets
//!
//! A schema family is a directory of `*.schema.json` files, one directory
//! per version (`schemas/1.0/`, `schemas/2.0/`, ...). The entry schema is
//! [`ENTRY_SCHEMA`]; the remaining files are only reachable through `$ref`.
//!
//! Schemas use `$id` URIs of the form
//!   `https://schemas.wfv.dev/<version>/<filename>`
//! and refer to siblings by relative filename. References resolve against
//! the loaded set only; nothing is fetched over the network.
//!
//! ## Diagnostics
//!
//! Every schema violation becomes one [`ValidationErrorDetail`]. Violations
//! under `/steps` are step-level, everything else is workflow-level. The
//! source line is recovered from the raw text by locating the offending key.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use wfv_core::{
    ErrorLevel, OutputFormat, SchemaVersion, ValidationError, ValidationErrorDetail,
    VERSION_DOCS_LINK,
};

use crate::error::LoadError;
use crate::traits::{ValidateOptions, ValidationContext, ValidationReport, ValidatorImplementation};

/// Filename of the schema documents are validated against.
pub const ENTRY_SCHEMA: &str = "workflow.schema.json";

const SCHEMA_SUFFIX: &str = ".schema.json";

/// URI prefix for `$id`s of shipped schemas.
const SCHEMA_URI_PREFIX: &str = "https://schemas.wfv.dev/";

const SCHEMA_ACTION_ITEMS: &str = "Please fix the workflow according to the schema";

/// Step fields that name account resources, with their display labels.
const CONTEXT_REFERENCES: [(&str, &str); 3] =
    [("registry", "registry"), ("git", "git context"), ("cluster", "cluster")];

/// Local retriever that resolves `$ref` URIs to schemas of the same set.
///
/// Unknown URIs are an error, so a dangling `$ref` fails compilation
/// instead of matching everything. Draft metaschemas are bundled with
/// `jsonschema` and never reach the retriever.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("schema not found for URI: {uri_str}").into())
    }
}

/// Validator for one schema family, compiled once at construction.
pub struct JsonSchemaValidator {
    version: SchemaVersion,
    /// Schema documents keyed by name without the `.schema.json` suffix.
    schemas: BTreeMap<String, Value>,
    validator: Validator,
}

impl JsonSchemaValidator {
    /// Load every `*.schema.json` file in `dir` and compile the entry schema.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the directory cannot be read, holds no
    /// schemas, holds invalid JSON, lacks [`ENTRY_SCHEMA`], or the entry
    /// schema does not compile.
    pub fn load(dir: &Path, version: SchemaVersion) -> Result<Self, LoadError> {
        let directory_error = |source: std::io::Error| LoadError::Directory {
            path: dir.to_path_buf(),
            source,
        };
        let entries = std::fs::read_dir(dir).map_err(directory_error)?;

        let mut files = BTreeMap::new();
        for entry in entries {
            let path = entry.map_err(directory_error)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(SCHEMA_SUFFIX) {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(directory_error)?;
            let value: Value =
                serde_json::from_str(&content).map_err(|e| LoadError::InvalidJson {
                    schema_name: name.to_string(),
                    reason: e.to_string(),
                })?;
            files.insert(name.to_string(), value);
        }

        if files.is_empty() {
            return Err(LoadError::Empty(dir.to_path_buf()));
        }
        Self::from_files(version, files)
    }

    /// Build from in-memory schemas keyed by filename
    /// (e.g. `"workflow.schema.json"`).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingEntry`] or [`LoadError::Compile`].
    pub fn from_files(
        version: SchemaVersion,
        files: BTreeMap<String, Value>,
    ) -> Result<Self, LoadError> {
        let entry = files
            .get(ENTRY_SCHEMA)
            .ok_or_else(|| LoadError::MissingEntry(ENTRY_SCHEMA.to_string()))?;

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &files {
            schemas_by_uri.insert(
                format!("{SCHEMA_URI_PREFIX}{version}/{filename}"),
                value.clone(),
            );
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        let validator = opts.build(entry).map_err(|e| LoadError::Compile {
            schema_name: ENTRY_SCHEMA.to_string(),
            reason: e.to_string(),
        })?;

        let schemas = files
            .into_iter()
            .map(|(filename, value)| {
                let name = filename
                    .strip_suffix(SCHEMA_SUFFIX)
                    .unwrap_or(&filename)
                    .to_string();
                (name, value)
            })
            .collect();

        Ok(Self {
            version,
            schemas,
            validator,
        })
    }

    /// The schema family this validator implements.
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    /// Names of all schemas in the set, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    fn violations(&self, document: &Value, raw_text: &str) -> Vec<ValidationErrorDetail> {
        self.validator
            .iter_errors(document)
            .map(|e| {
                let instance_path = e.instance_path.to_string();
                let key = match &e.kind {
                    ValidationErrorKind::Required { property } => {
                        property.as_str().map(str::to_string)
                    }
                    ValidationErrorKind::AdditionalProperties { unexpected } => {
                        unexpected.first().cloned()
                    }
                    _ => None,
                }
                .or_else(|| last_key_segment(&instance_path))
                .unwrap_or_else(|| "workflow".to_string());

                let level = if instance_path.starts_with("/steps") {
                    ErrorLevel::Step
                } else {
                    ErrorLevel::Workflow
                };

                ValidationErrorDetail::new(e.to_string(), key.clone(), level)
                    .with_docs_link(VERSION_DOCS_LINK)
                    .with_action_items(SCHEMA_ACTION_ITEMS)
                    .at_line(line_of_key(raw_text, &key))
            })
            .collect()
    }
}

impl ValidatorImplementation for JsonSchemaValidator {
    fn validate(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        _options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError> {
        let errors = self.violations(document, raw_text);
        if !errors.is_empty() {
            tracing::debug!(version = %self.version, count = errors.len(), "document failed schema validation");
            return Err(ValidationError::from_details(errors, output_format));
        }
        Ok(ValidationReport::new(self.version.clone()))
    }

    fn validate_with_context(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        context: &ValidationContext,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError> {
        let mut report = self.validate(document, output_format, raw_text, options)?;
        let warnings = context_warnings(document, context, raw_text);

        if options.strict && !warnings.is_empty() {
            return Err(ValidationError::from_details(warnings, output_format));
        }
        if !options.ignore_warnings {
            report.warnings = warnings;
        }
        Ok(report)
    }

    fn json_schemas(&self) -> BTreeMap<String, Value> {
        self.schemas.clone()
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("version", &self.version)
            .field("schemas", &self.schema_names())
            .finish_non_exhaustive()
    }
}

/// Warnings for step references to resources absent from `context`.
fn context_warnings(
    document: &Value,
    context: &ValidationContext,
    raw_text: &str,
) -> Vec<ValidationErrorDetail> {
    let Some(steps) = document.get("steps").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (step_name, step) in steps {
        for (field, label) in CONTEXT_REFERENCES {
            let Some(reference) = step.get(field).and_then(Value::as_str) else {
                continue;
            };
            let known = match field {
                "registry" => &context.registries,
                "git" => &context.git,
                _ => &context.clusters,
            };
            if known.iter().any(|k| k == reference) {
                continue;
            }
            warnings.push(
                ValidationErrorDetail::new(
                    format!("{label} '{reference}' used in step '{step_name}' does not exist"),
                    field,
                    ErrorLevel::Warning,
                )
                .with_docs_link(VERSION_DOCS_LINK)
                .with_action_items(format!(
                    "Add the {label} to your account or change the step to use an existing one"
                ))
                .at_line(line_of_key(raw_text, field)),
            );
        }
    }
    warnings
}

/// Last non-index segment of a JSON Pointer, e.g. `commands` for
/// `/steps/build/commands/0`.
fn last_key_segment(pointer: &str) -> Option<String> {
    pointer
        .rsplit('/')
        .find(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()))
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
}

/// 1-based line of the first `key:` occurrence in `raw_text`, or `0`.
fn line_of_key(raw_text: &str, key: &str) -> usize {
    let plain = format!("{key}:");
    let quoted = format!("\"{key}\":");
    raw_text
        .lines()
        .position(|line| {
            let line = line.trim_start().trim_start_matches("- ");
            line.starts_with(&plain) || line.starts_with(&quoted)
        })
        .map_or(0, |i| i + 1)
}
