//! # Schema Dispatcher
//!
//! Public entry point for validation. Each operation reads the declared
//! version, normalizes it, resolves one validator from the owned registry
//! and forwards the call.
//!
//! Resolution failures are reported before any delegation. Errors from the
//! delegated validator are returned as-is inside
//! [`DispatchError::Validation`]; nothing is retried or rewritten.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use wfv_core::{normalize, OutputFormat, RawVersion, SchemaVersion};

use crate::config::DispatcherConfig;
use crate::error::{DispatchError, RegistryError};
use crate::registry::ValidatorRegistry;
use crate::traits::{ValidateOptions, ValidationContext, ValidationReport, ValidatorImplementation};

/// Routes documents to the validator for their declared schema version.
#[derive(Debug)]
pub struct SchemaDispatcher {
    registry: ValidatorRegistry,
}

impl SchemaDispatcher {
    /// Wrap a populated registry.
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// Discover schema sets under `config.schema_root`, loading them all
    /// immediately when `config.preload` is set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the root cannot be read or a preload fails.
    pub fn from_config(config: &DispatcherConfig) -> Result<Self, RegistryError> {
        let registry = ValidatorRegistry::discover(&config.schema_root)?;
        if config.preload {
            let loaded = registry.preload()?;
            tracing::info!(count = loaded, "preloaded schema validators");
        }
        Ok(Self::new(registry))
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Supported versions in ascending order.
    pub fn supported_versions(&self) -> Vec<&SchemaVersion> {
        self.registry.versions()
    }

    /// Normalize `raw_version` and resolve its validator.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Validation`] carrying the unsupported-version
    ///   diagnostic if no validator is registered.
    /// - [`DispatchError::ImplementationLoad`] if the validator fails to load.
    pub fn resolve(
        &self,
        raw_version: Option<&RawVersion>,
    ) -> Result<Arc<dyn ValidatorImplementation>, DispatchError> {
        let version = normalize(raw_version);
        tracing::debug!(
            raw = ?raw_version.map(ToString::to_string),
            version = %version,
            "resolving schema validator"
        );
        Ok(self.registry.resolve(&version)?)
    }

    /// Validate `document` against the schema family it declares.
    ///
    /// # Errors
    ///
    /// See [`SchemaDispatcher::resolve`]; validation failures from the
    /// resolved validator are returned unchanged.
    pub fn validate(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, DispatchError> {
        let implementation = self.resolve(RawVersion::from_document(document).as_ref())?;
        Ok(implementation.validate(document, output_format, raw_text, options)?)
    }

    /// Validate `document`, letting the validator consult `context`.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaDispatcher::validate`].
    pub fn validate_with_context(
        &self,
        document: &Value,
        output_format: OutputFormat,
        raw_text: &str,
        context: &ValidationContext,
        options: &ValidateOptions,
    ) -> Result<ValidationReport, DispatchError> {
        let implementation = self.resolve(RawVersion::from_document(document).as_ref())?;
        Ok(implementation.validate_with_context(document, output_format, raw_text, context, options)?)
    }

    /// Schema documents for the family `raw_version` normalizes to.
    ///
    /// # Errors
    ///
    /// See [`SchemaDispatcher::resolve`].
    pub fn json_schemas(
        &self,
        raw_version: Option<&RawVersion>,
    ) -> Result<BTreeMap<String, Value>, DispatchError> {
        Ok(self.resolve(raw_version)?.json_schemas())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::testing::{Call, RecordingValidator};
    use serde_json::json;
    use wfv_core::{ErrorKind, ErrorLevel, ValidationError, ValidationErrorDetail};

    fn version(s: &str) -> SchemaVersion {
        SchemaVersion::new(s).unwrap()
    }

    struct Fixture {
        v1: Arc<RecordingValidator>,
        v2: Arc<RecordingValidator>,
        dispatcher: SchemaDispatcher,
    }

    fn fixture() -> Fixture {
        let v1 = Arc::new(RecordingValidator::new("v1"));
        let v2 = Arc::new(RecordingValidator::new("v2"));
        let mut registry = ValidatorRegistry::new();
        registry.register_instance(version("1.0"), v1.clone());
        registry.register_instance(version("2.0"), v2.clone());
        Fixture {
            v1,
            v2,
            dispatcher: SchemaDispatcher::new(registry),
        }
    }

    #[test]
    fn validate_forwards_arguments_unmodified() {
        let f = fixture();
        let doc = json!({"version": "2.0", "steps": {"build": {"image": "alpine"}}});
        let options = ValidateOptions {
            ignore_warnings: true,
            strict: false,
        };

        f.dispatcher
            .validate(&doc, OutputFormat::Lint, "version: '2.0'\n", &options)
            .unwrap();

        assert_eq!(
            f.v2.calls(),
            vec![Call::Validate {
                document: doc,
                output_format: OutputFormat::Lint,
                raw_text: "version: '2.0'\n".to_string(),
                options,
            }]
        );
        assert!(f.v1.calls().is_empty());
    }

    #[test]
    fn validate_with_context_forwards_context() {
        let f = fixture();
        let doc = json!({"steps": {}});
        let context = ValidationContext {
            registries: vec!["dockerhub".to_string()],
            ..ValidationContext::default()
        };
        let options = ValidateOptions::default();

        f.dispatcher
            .validate_with_context(&doc, OutputFormat::Printify, "steps: {}", &context, &options)
            .unwrap();

        assert_eq!(
            f.v1.calls(),
            vec![Call::ValidateWithContext {
                document: doc,
                output_format: OutputFormat::Printify,
                raw_text: "steps: {}".to_string(),
                context,
                options,
            }]
        );
    }

    #[test]
    fn missing_version_routes_to_default_family() {
        let f = fixture();
        f.dispatcher
            .validate(&json!({"steps": {}}), OutputFormat::Message, "", &ValidateOptions::default())
            .unwrap();
        assert_eq!(f.v1.calls().len(), 1);
        assert!(f.v2.calls().is_empty());
    }

    #[test]
    fn legacy_versions_route_to_default_family() {
        let f = fixture();
        for raw in [json!("1"), json!("1.1"), json!(1.2)] {
            f.dispatcher
                .validate(&json!({"version": raw}), OutputFormat::Message, "", &ValidateOptions::default())
                .unwrap();
        }
        assert_eq!(f.v1.calls().len(), 3);
        assert!(f.v2.calls().is_empty());
    }

    #[test]
    fn version_two_resolves_distinct_implementation() {
        let f = fixture();
        let v1 = f.dispatcher.resolve(Some(&RawVersion::from("1.0"))).unwrap();
        let v2 = f.dispatcher.resolve(Some(&RawVersion::from("2.0"))).unwrap();
        assert!(!Arc::ptr_eq(&v1, &v2));
        assert_eq!(v2.json_schemas()["workflow"]["title"], "v2");
    }

    #[test]
    fn unsupported_version_fails_before_delegation() {
        let f = fixture();
        let err = f
            .dispatcher
            .validate(&json!({"version": "3.7"}), OutputFormat::Message, "", &ValidateOptions::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.details().len(), 1);
        let detail = &validation.details()[0];
        assert_eq!(detail.key(), "version");
        assert_eq!(detail.level, ErrorLevel::Workflow);
        assert!(detail.message.contains("3.7"));
        assert!(f.v1.calls().is_empty());
        assert!(f.v2.calls().is_empty());
    }

    #[test]
    fn non_numeric_version_is_unsupported() {
        let f = fixture();
        let err = f
            .dispatcher
            .json_schemas(Some(&RawVersion::from("latest")))
            .unwrap_err();
        let validation = err.as_validation().unwrap();
        assert!(validation.message().contains("latest"));
    }

    #[test]
    fn delegated_failure_is_returned_unchanged() {
        let failure = ValidationError::new(
            "steps missing",
            vec![ValidationErrorDetail::new("steps missing", "steps", ErrorLevel::Workflow)],
        );
        let mut registry = ValidatorRegistry::new();
        registry.register_instance(
            version("1.0"),
            Arc::new(RecordingValidator::failing("v1", failure.clone())),
        );
        let dispatcher = SchemaDispatcher::new(registry);

        let err = dispatcher
            .validate(&json!({}), OutputFormat::Message, "", &ValidateOptions::default())
            .unwrap_err();
        assert_eq!(err.as_validation(), Some(&failure));
    }

    #[test]
    fn load_failure_is_internal_error() {
        let mut registry = ValidatorRegistry::new();
        registry.register(version("1.0"), || Err(LoadError::Other("corrupt".to_string())));
        let dispatcher = SchemaDispatcher::new(registry);

        let err = dispatcher.json_schemas(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.as_validation().is_none());
        assert!(err.to_string().contains("1.0"));
    }

    #[test]
    fn json_schemas_for_legacy_aliases_are_identical() {
        let f = fixture();
        let a = f.dispatcher.json_schemas(Some(&RawVersion::from("1.0"))).unwrap();
        let b = f.dispatcher.json_schemas(Some(&RawVersion::from("1.1"))).unwrap();
        assert_eq!(a, b);
        assert_eq!(f.v1.calls(), vec![Call::JsonSchemas, Call::JsonSchemas]);
    }

    #[test]
    fn repeated_resolution_returns_same_instance() {
        let f = fixture();
        let a = f.dispatcher.resolve(None).unwrap();
        let b = f.dispatcher.resolve(Some(&RawVersion::Number(1.0))).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.json_schemas(), b.json_schemas());
    }

    #[test]
    fn supported_versions_lists_registry() {
        let f = fixture();
        let keys: Vec<&str> = f.dispatcher.supported_versions().iter().map(|v| v.as_str()).collect();
        assert_eq!(keys, ["1.0", "2.0"]);
    }
}
