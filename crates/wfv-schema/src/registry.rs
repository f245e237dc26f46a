//! # Validator Registry
//!
//! Maps each supported [`SchemaVersion`] to the factory that builds its
//! validator, and memoizes built validators.
//!
//! ## Lifecycle
//!
//! Registration happens while the registry is exclusively owned (explicit
//! [`ValidatorRegistry::register`] calls, or [`ValidatorRegistry::discover`]
//! over a schema root). Afterwards the registry is shared immutably and the
//! only mutation is the lazy load in [`ValidatorRegistry::resolve`]:
//!
//! - at most one construction per version, guarded by a mutex held across
//!   the factory call, so racing resolutions cannot build twice;
//! - every later resolution returns the same `Arc` instance;
//! - a failed load is not memoized; there is no eviction or reload path.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use wfv_core::{normalize, RawVersion, SchemaVersion};

use crate::error::{LoadError, RegistryError, ResolveError};
use crate::traits::ValidatorImplementation;
use crate::validate::JsonSchemaValidator;

/// Builds the validator for one version. Called at most once per
/// successful load.
pub type ValidatorFactory =
    Box<dyn Fn() -> Result<Arc<dyn ValidatorImplementation>, LoadError> + Send + Sync>;

/// Owned table of per-version validators.
pub struct ValidatorRegistry {
    factories: BTreeMap<SchemaVersion, ValidatorFactory>,
    loaded: Mutex<HashMap<SchemaVersion, Arc<dyn ValidatorImplementation>>>,
}

impl ValidatorRegistry {
    /// An empty registry. Every resolution fails with
    /// [`ResolveError::UnsupportedVersion`] until versions are registered.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Register a factory for `version`, replacing any previous
    /// registration (and its loaded instance).
    ///
    /// The factory must not resolve through this registry.
    pub fn register<F>(&mut self, version: SchemaVersion, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn ValidatorImplementation>, LoadError> + Send + Sync + 'static,
    {
        self.loaded.get_mut().remove(&version);
        self.factories.insert(version, Box::new(factory));
        self
    }

    /// Register an already-constructed validator for `version`.
    pub fn register_instance(
        &mut self,
        version: SchemaVersion,
        implementation: Arc<dyn ValidatorImplementation>,
    ) -> &mut Self {
        self.register(version, move || Ok(Arc::clone(&implementation)))
    }

    /// Build a registry with one lazily loaded [`JsonSchemaValidator`] per
    /// subdirectory of `schema_root`.
    ///
    /// Each directory name is taken as the version key; hidden directories
    /// and plain files are skipped, as are names not already in normalized
    /// form (`2`, `1.1`). Nothing is loaded here: a broken schema
    /// set surfaces as [`ResolveError::ImplementationLoad`] on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SchemaRoot`] if the root cannot be read.
    pub fn discover(schema_root: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let root = schema_root.as_ref();
        let entries = std::fs::read_dir(root).map_err(|e| RegistryError::SchemaRoot {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut registry = Self::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let Ok(version) = SchemaVersion::new(name) else {
                continue;
            };
            let canonical = normalize(Some(&RawVersion::from(name)));
            if canonical != version {
                tracing::warn!(
                    directory = %path.display(),
                    canonical = %canonical,
                    "skipping schema set whose directory name is not a canonical version"
                );
                continue;
            }

            tracing::debug!(version = %version, path = %path.display(), "discovered schema set");
            let load_version = version.clone();
            registry.register(version, move || {
                let validator = JsonSchemaValidator::load(&path, load_version.clone())?;
                Ok(Arc::new(validator) as Arc<dyn ValidatorImplementation>)
            });
        }
        Ok(registry)
    }

    /// Whether a validator is registered for `version`. Never loads.
    pub fn contains(&self, version: &SchemaVersion) -> bool {
        self.factories.contains_key(version)
    }

    /// Whether the validator for `version` has already been built.
    pub fn is_loaded(&self, version: &SchemaVersion) -> bool {
        self.loaded.lock().contains_key(version)
    }

    /// Registered versions in ascending order.
    pub fn versions(&self) -> Vec<&SchemaVersion> {
        self.factories.keys().collect()
    }

    /// Number of registered versions.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when no version is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve the validator for `version`, building it on first use.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::UnsupportedVersion`] if nothing is registered.
    /// - [`ResolveError::ImplementationLoad`] if the factory fails.
    pub fn resolve(
        &self,
        version: &SchemaVersion,
    ) -> Result<Arc<dyn ValidatorImplementation>, ResolveError> {
        let Some(factory) = self.factories.get(version) else {
            tracing::warn!(version = %version, "no validator registered for schema version");
            return Err(ResolveError::UnsupportedVersion(version.clone()));
        };

        let mut loaded = self.loaded.lock();
        if let Some(implementation) = loaded.get(version) {
            tracing::debug!(version = %version, "resolved cached schema validator");
            return Ok(Arc::clone(implementation));
        }

        let implementation = factory().map_err(|source| {
            tracing::error!(version = %version, error = %source, "failed to load schema validator");
            ResolveError::ImplementationLoad {
                version: version.clone(),
                source,
            }
        })?;
        tracing::info!(version = %version, "loaded schema validator");
        loaded.insert(version.clone(), Arc::clone(&implementation));
        Ok(implementation)
    }

    /// Build every registered validator now. Returns how many were loaded
    /// by this call.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Preload`] on the first version that fails.
    pub fn preload(&self) -> Result<usize, RegistryError> {
        let mut count = 0;
        for version in self.factories.keys() {
            if !self.is_loaded(version) {
                self.resolve(version).map_err(RegistryError::Preload)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut loaded: Vec<SchemaVersion> = self.loaded.lock().keys().cloned().collect();
        loaded.sort();
        f.debug_struct("ValidatorRegistry")
            .field("versions", &self.versions())
            .field("loaded", &loaded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingValidator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn version(s: &str) -> SchemaVersion {
        SchemaVersion::new(s).unwrap()
    }

    fn counting_registry(counter: &Arc<AtomicUsize>) -> ValidatorRegistry {
        let mut registry = ValidatorRegistry::new();
        let counter = Arc::clone(counter);
        registry.register(version("1.0"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(RecordingValidator::new("v1")) as Arc<dyn ValidatorImplementation>)
        });
        registry
    }

    #[test]
    fn unregistered_version_is_unsupported() {
        let registry = ValidatorRegistry::new();
        let err = registry.resolve(&version("3.7")).err().unwrap();
        match err {
            ResolveError::UnsupportedVersion(v) => assert_eq!(v.as_str(), "3.7"),
            other => panic!("Expected UnsupportedVersion, got: {other}"),
        }
    }

    #[test]
    fn failing_factory_is_implementation_load_error() {
        let mut registry = ValidatorRegistry::new();
        registry.register(version("2.0"), || Err(LoadError::Other("boom".to_string())));
        let err = registry.resolve(&version("2.0")).err().unwrap();
        assert!(
            matches!(&err, ResolveError::ImplementationLoad { version, .. } if version.as_str() == "2.0"),
            "Expected ImplementationLoad, got: {err}"
        );
        assert!(err.to_string().contains("2.0"));
        assert!(!registry.is_loaded(&version("2.0")));
    }

    #[test]
    fn failed_load_is_retried_on_next_resolution() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut registry = ValidatorRegistry::new();
        let counter = Arc::clone(&attempts);
        registry.register(version("2.0"), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LoadError::Other("transient".to_string()))
            } else {
                Ok(Arc::new(RecordingValidator::new("v2")) as Arc<dyn ValidatorImplementation>)
            }
        });

        assert!(registry.resolve(&version("2.0")).is_err());
        assert!(!registry.is_loaded(&version("2.0")));

        let loaded = registry.resolve(&version("2.0")).unwrap();
        assert!(registry.is_loaded(&version("2.0")));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let again = registry.resolve(&version("2.0")).unwrap();
        assert!(Arc::ptr_eq(&loaded, &again));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factory_runs_once_and_instance_is_shared() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(&counter);

        let first = registry.resolve(&version("1.0")).unwrap();
        let second = registry.resolve(&version("1.0")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_resolution_loads_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(counting_registry(&counter));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve(&version("1.0")).is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn contains_does_not_load() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(&counter);

        assert!(registry.contains(&version("1.0")));
        assert!(!registry.contains(&version("2.0")));
        assert!(!registry.is_loaded(&version("1.0")));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn versions_are_sorted() {
        let mut registry = ValidatorRegistry::new();
        for v in ["10.0", "2.0", "1.0"] {
            registry.register_instance(version(v), Arc::new(RecordingValidator::new(v)));
        }
        let keys: Vec<&str> = registry.versions().iter().map(|v| v.as_str()).collect();
        assert_eq!(keys, ["1.0", "2.0", "10.0"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn re_registration_replaces_loaded_instance() {
        let mut registry = ValidatorRegistry::new();
        let first: Arc<dyn ValidatorImplementation> = Arc::new(RecordingValidator::new("a"));
        let second: Arc<dyn ValidatorImplementation> = Arc::new(RecordingValidator::new("b"));

        registry.register_instance(version("1.0"), Arc::clone(&first));
        let resolved = registry.resolve(&version("1.0")).unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));

        registry.register_instance(version("1.0"), Arc::clone(&second));
        let resolved = registry.resolve(&version("1.0")).unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));
    }

    #[test]
    fn preload_builds_every_version() {
        let mut registry = ValidatorRegistry::new();
        registry.register_instance(version("1.0"), Arc::new(RecordingValidator::new("a")));
        registry.register_instance(version("2.0"), Arc::new(RecordingValidator::new("b")));

        assert_eq!(registry.preload().unwrap(), 2);
        assert!(registry.is_loaded(&version("2.0")));
        assert_eq!(registry.preload().unwrap(), 0);
    }

    #[test]
    fn preload_reports_failing_version() {
        let mut registry = ValidatorRegistry::new();
        registry.register(version("2.0"), || Err(LoadError::Other("broken".to_string())));
        let err = registry.preload().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Preload(ResolveError::ImplementationLoad { .. })
        ));
    }

    #[test]
    fn discover_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValidatorRegistry::discover(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, RegistryError::SchemaRoot { .. }));
    }

    #[test]
    fn discover_registers_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("1.0")).unwrap();
        std::fs::create_dir(dir.path().join("2.0")).unwrap();
        std::fs::create_dir(dir.path().join(".cache")).unwrap();
        std::fs::write(dir.path().join("README.md"), "schemas").unwrap();

        let registry = ValidatorRegistry::discover(dir.path()).unwrap();
        let keys: Vec<&str> = registry.versions().iter().map(|v| v.as_str()).collect();
        assert_eq!(keys, ["1.0", "2.0"]);
        assert!(!registry.is_loaded(&version("1.0")));
    }

    #[test]
    fn discover_skips_non_canonical_directory_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2", "1.1", "1.0", "2.0", "3.50", "beta"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }

        let registry = ValidatorRegistry::discover(dir.path()).unwrap();
        let keys: Vec<&str> = registry.versions().iter().map(|v| v.as_str()).collect();
        assert_eq!(keys, ["1.0", "2.0", "beta"]);
        for key in keys {
            assert_eq!(normalize(Some(&RawVersion::from(key))).as_str(), key);
        }
    }

    #[test]
    fn debug_lists_versions() {
        let mut registry = ValidatorRegistry::new();
        registry.register_instance(version("1.0"), Arc::new(RecordingValidator::new("a")));
        let debug = format!("{registry:?}");
        assert!(debug.contains("1.0"));
    }
}
