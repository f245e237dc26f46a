//! # Schema Versions
//!
//! A document declares the schema family it targets through its top-level
//! `version` field. That value is read as a [`RawVersion`] and normalized
//! into a [`SchemaVersion`], the key validators are registered under.
//!
//! ## Normalization Rules
//!
//! 1. An absent (or `null`) version defaults to [`DEFAULT_VERSION`].
//! 2. Values that coerce to a number in `[1, 1.2]` collapse onto `"1.0"`.
//!    Versions 1.0, 1.1 and 1.2 share one schema family.
//! 3. Any other number renders as `major.minor`: `2` and `"2.0"` both become
//!    `"2.0"`, `3.7` stays `"3.7"`.
//! 4. Values that do not coerce to a finite number pass through verbatim.
//!    They are expected to miss every registry and surface as an
//!    unsupported-version diagnostic.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Version assumed for documents that do not declare one.
pub const DEFAULT_VERSION: &str = "1.0";

/// Inclusive numeric range collapsed onto [`DEFAULT_VERSION`].
const LEGACY_RANGE: std::ops::RangeInclusive<f64> = 1.0..=1.2;

/// The unvalidated `version` value of a document.
///
/// Absence is modelled as `Option<RawVersion>`; see
/// [`RawVersion::from_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVersion {
    /// A numeric literal, e.g. `version: 1.1`.
    Number(f64),
    /// A string (or any non-numeric scalar rendered as text).
    Text(String),
}

impl RawVersion {
    /// Read the `version` field of a document model.
    ///
    /// Returns `None` when the document is not an object, the field is
    /// missing, or it is `null`.
    pub fn from_document(document: &Value) -> Option<Self> {
        document.get("version").and_then(Self::from_value)
    }

    /// Convert a JSON value into a raw version.
    ///
    /// Booleans, arrays and objects are carried as their JSON text so that
    /// they fall through normalization unchanged.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Text(n.to_string()),
            }),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// Numeric coercion.
    ///
    /// Strings are trimmed before parsing and a blank string coerces to `0`.
    /// Returns `None` for unparsable or non-finite values.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
        };
        n.is_finite().then_some(n)
    }
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawVersion {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawVersion {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawVersion {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Canonical key identifying a schema family, e.g. `"1.0"` or `"2.0"`.
///
/// Never empty. Ordering places numeric keys first, in numeric order,
/// followed by any non-numeric keys in lexical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Construct a version key, rejecting empty or blank strings.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CoreError::EmptyVersion);
        }
        Ok(Self(key))
    }

    /// The `"1.0"` family.
    pub fn default_version() -> Self {
        Self(DEFAULT_VERSION.to_string())
    }

    /// Access the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is [`DEFAULT_VERSION`].
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_VERSION
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a
                .partial_cmp(&b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SchemaVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SchemaVersion> for String {
    fn from(v: SchemaVersion) -> Self {
        v.0
    }
}

/// Normalize a raw document version into the key used for validator lookup.
///
/// Pure and total: every input yields a non-empty [`SchemaVersion`].
pub fn normalize(raw: Option<&RawVersion>) -> SchemaVersion {
    let Some(raw) = raw else {
        return SchemaVersion::default_version();
    };
    match raw.as_number() {
        Some(n) if LEGACY_RANGE.contains(&n) => SchemaVersion::default_version(),
        Some(n) => SchemaVersion(render_number(n)),
        // Text here is never blank: blank strings coerce to 0 above.
        None => SchemaVersion(raw.to_string()),
    }
}

/// Render a finite number as a version key without formatting artifacts.
fn render_number(n: f64) -> String {
    if n == 0.0 {
        // Covers -0.0 as well.
        "0.0".to_string()
    } else if n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(raw: impl Into<RawVersion>) -> String {
        normalize(Some(&raw.into())).to_string()
    }

    #[test]
    fn absent_version_defaults_to_one_zero() {
        assert_eq!(normalize(None).as_str(), "1.0");
        assert_eq!(
            normalize(RawVersion::from_document(&json!({"steps": {}})).as_ref()).as_str(),
            "1.0"
        );
    }

    #[test]
    fn null_version_is_treated_as_absent() {
        assert_eq!(RawVersion::from_document(&json!({"version": null})), None);
    }

    #[test]
    fn non_object_document_has_no_version() {
        assert_eq!(RawVersion::from_document(&json!(["version"])), None);
        assert_eq!(RawVersion::from_document(&Value::Null), None);
    }

    #[test]
    fn legacy_versions_collapse_onto_one_zero() {
        assert_eq!(norm("1"), "1.0");
        assert_eq!(norm("1.0"), "1.0");
        assert_eq!(norm("1.1"), "1.0");
        assert_eq!(norm("1.2"), "1.0");
        assert_eq!(norm(1.2), "1.0");
        assert_eq!(norm(1.0), "1.0");
        assert_eq!(norm(" 1.1 "), "1.0");
    }

    #[test]
    fn legacy_range_is_inclusive_and_bounded() {
        assert_eq!(norm("1.21"), "1.21");
        assert_eq!(norm("0.9"), "0.9");
    }

    #[test]
    fn integral_versions_render_with_minor_zero() {
        assert_eq!(norm("2.0"), "2.0");
        assert_eq!(norm("2"), "2.0");
        assert_eq!(norm(2.0), "2.0");
        assert_eq!(norm("10"), "10.0");
    }

    #[test]
    fn fractional_versions_render_without_artifacts() {
        assert_eq!(norm("3.7"), "3.7");
        assert_eq!(norm(3.7), "3.7");
        assert_eq!(norm("2.50"), "2.5");
    }

    #[test]
    fn blank_string_coerces_to_zero() {
        assert_eq!(norm(""), "0.0");
        assert_eq!(norm("   "), "0.0");
        assert_eq!(norm(-0.0), "0.0");
    }

    #[test]
    fn non_numeric_versions_pass_through() {
        assert_eq!(norm("latest"), "latest");
        assert_eq!(norm("v2"), "v2");
        assert_eq!(norm("NaN"), "NaN");
        assert_eq!(norm("inf"), "inf");
    }

    #[test]
    fn non_scalar_versions_pass_through_as_json_text() {
        let raw = RawVersion::from_document(&json!({"version": true})).unwrap();
        assert_eq!(normalize(Some(&raw)).as_str(), "true");
        let raw = RawVersion::from_document(&json!({"version": [1]})).unwrap();
        assert_eq!(normalize(Some(&raw)).as_str(), "[1]");
    }

    #[test]
    fn numeric_document_version_is_read_as_number() {
        let raw = RawVersion::from_document(&json!({"version": 1.1})).unwrap();
        assert_eq!(raw, RawVersion::Number(1.1));
        assert_eq!(normalize(Some(&raw)).as_str(), "1.0");
    }

    #[test]
    fn schema_version_rejects_blank_keys() {
        assert_eq!(SchemaVersion::new(""), Err(CoreError::EmptyVersion));
        assert_eq!(SchemaVersion::new("  "), Err(CoreError::EmptyVersion));
        assert!("2.0".parse::<SchemaVersion>().is_ok());
    }

    #[test]
    fn schema_version_serde_enforces_non_empty() {
        let v: SchemaVersion = serde_json::from_str("\"2.0\"").unwrap();
        assert_eq!(v.as_str(), "2.0");
        assert!(serde_json::from_str::<SchemaVersion>("\"\"").is_err());
    }

    #[test]
    fn schema_versions_order_numerically_then_lexically() {
        let mut versions: Vec<SchemaVersion> = ["10.0", "beta", "2.0", "1.0", "alpha"]
            .into_iter()
            .map(|s| SchemaVersion::new(s).unwrap())
            .collect();
        versions.sort();
        let keys: Vec<&str> = versions.iter().map(SchemaVersion::as_str).collect();
        assert_eq!(keys, ["1.0", "2.0", "10.0", "alpha", "beta"]);
    }
}
