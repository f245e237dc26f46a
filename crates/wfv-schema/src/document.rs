//! # Document Loading
//!
//! Parses workflow text (YAML, or JSON as a YAML subset) into the
//! `serde_json::Value` document model the dispatcher and validators share.

use std::path::Path;

use serde_json::Value;

use crate::error::DocumentError;

/// Parse workflow text into a document model.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] for malformed YAML and
/// [`DocumentError::Conversion`] for YAML with no JSON equivalent.
pub fn load_document(text: &str) -> Result<Value, DocumentError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| DocumentError::Parse(e.to_string()))?;
    yaml_to_json_value(yaml_value).map_err(DocumentError::Conversion)
}

/// Read and parse a workflow file. Returns the document model together
/// with the raw text, which validators use for line numbers.
///
/// # Errors
///
/// Returns [`DocumentError::Read`] if the file cannot be read, otherwise
/// the errors of [`load_document`].
pub fn load_document_file(path: &Path) -> Result<(Value, String), DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = load_document(&text)?;
    Ok((document, text))
}

/// Convert a YAML value into the JSON document model.
///
/// Custom tags (`image: !env IMAGE_NAME`) are unwrapped to their value.
/// Map keys must be scalars; numeric and boolean keys become their text.
fn yaml_to_json_value(yaml: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => json_number(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json_value)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| Ok((json_key(k)?, yaml_to_json_value(v)?)))
                .collect::<Result<serde_json::Map<String, Value>, String>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json_value(tagged.value)?,
    })
}

fn json_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("number {n} has no JSON representation"))
}

fn json_key(key: serde_yaml::Value) -> Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Tagged(tagged) => json_key(tagged.value),
        other => Err(format!("map key {other:?} is not a scalar")),
    }
}
