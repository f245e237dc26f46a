//! Test double recording every call it receives.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde_json::{json, Value};
use wfv_core::{OutputFormat, SchemaVersion, ValidationError};

use crate::traits::{ValidateOptions, ValidationContext, ValidationReport, ValidatorImplementation};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Validate {
        document: Value,
        output_format: OutputFormat,
        raw_text: String,
        options: ValidateOptions,
    },
    ValidateWithContext {
        document: Value,
        output_format: OutputFormat,
        raw_text: String,
        context: ValidationContext,
        options: ValidateOptions,
    },
    JsonSchemas,
}

pub(crate) struct RecordingValidator {
    name: String,
    failure: Option<ValidationError>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingValidator {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every validate call fails with `failure`.
    pub(crate) fn failing(name: &str, failure: ValidationError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new(name)
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn outcome(&self) -> Result<ValidationReport, ValidationError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(ValidationReport::new(SchemaVersion::default_version())),
        }
    }
}

impl ValidatorImplementation for RecordingValidator {
    fn validate(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError> {
        self.calls.lock().push(Call::Validate {
            document: document.clone(),
            output_format,
            raw_text: raw_text.to_string(),
            options: options.clone(),
        });
        self.outcome()
    }

    fn validate_with_context(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        context: &ValidationContext,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, ValidationError> {
        self.calls.lock().push(Call::ValidateWithContext {
            document: document.clone(),
            output_format,
            raw_text: raw_text.to_string(),
            context: context.clone(),
            options: options.clone(),
        });
        self.outcome()
    }

    fn json_schemas(&self) -> BTreeMap<String, Value> {
        self.calls.lock().push(Call::JsonSchemas);
        BTreeMap::from([("workflow".to_string(), json!({ "title": self.name }))])
    }
}
