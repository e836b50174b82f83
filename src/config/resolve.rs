//! Variable reference resolution for configuration values.
//!
//! Supports `${section.field}` syntax for cross-referencing values within the
//! merged tree. Use `$${...}` to escape and produce a literal `${...}`.

use serde_json::{Map, Value};

use super::ConfigError;
use crate::path::PathAccessor;
use crate::Error;

const MAX_DEPTH: usize = 100;

/// Resolves all `${path.to.field}` references in the tree.
///
/// References are looked up in the tree as it was before resolution and
/// expanded recursively, so chained references work and escapes are applied
/// exactly once. Returns an error if a reference chain is circular or a
/// referenced path doesn't exist.
pub fn resolve_references(
    table: &mut Map<String, Value>,
    accessor: &PathAccessor,
) -> Result<(), ConfigError> {
    let snapshot = Value::Object(table.clone());
    for value in table.values_mut() {
        resolve_value(value, &snapshot, accessor)?;
    }
    Ok(())
}

/// Resolves references in a single value (recursively for objects/arrays).
fn resolve_value(value: &mut Value, root: &Value, accessor: &PathAccessor) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => {
            if s.contains('$') {
                *s = resolve_text(s, root, accessor, 0)?;
            }
        }
        Value::Object(t) => {
            for item in t.values_mut() {
                resolve_value(item, root, accessor)?;
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                resolve_value(item, root, accessor)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Expands all `${...}` references in a string. Handles `$$` escapes.
fn resolve_text(
    s: &str,
    root: &Value,
    accessor: &PathAccessor,
    depth: usize,
) -> Result<String, ConfigError> {
    if depth > MAX_DEPTH {
        return Err(ConfigError::CircularReference);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                result.push('$');
            }
            Some('{') => {
                chars.next();
                let path = consume_until(&mut chars, '}').ok_or(ConfigError::UnclosedReference)?;
                let referenced = lookup_path(root, &path, accessor)?;
                result.push_str(&resolve_text(&referenced, root, accessor, depth + 1)?);
            }
            _ => result.push('$'),
        }
    }

    Ok(result)
}

/// Consumes characters until the delimiter, returning the collected string.
fn consume_until(chars: &mut std::iter::Peekable<std::str::Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None
}

/// Looks up a path in the tree and returns the value as a string.
fn lookup_path(root: &Value, path: &str, accessor: &PathAccessor) -> Result<String, ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::InvalidReferencePath(path.to_string()));
    }

    let value = accessor.get(root, path).map_err(|e| match e {
        Error::InvalidPath { .. } => ConfigError::InvalidReferencePath(path.to_string()),
        _ => ConfigError::ReferenceNotFound(path.to_string()),
    })?;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ConfigError::NonScalarReference(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn resolve(value: Value) -> Result<Map<String, Value>, ConfigError> {
        let mut table = make_table(value);
        resolve_references(&mut table, &PathAccessor::new())?;
        Ok(table)
    }

    #[test]
    fn test_simple_reference() {
        let table = resolve(json!({"host": "localhost", "url": "http://${host}/api"})).unwrap();
        assert_eq!(table["url"], json!("http://localhost/api"));
    }

    #[test]
    fn test_nested_path() {
        let table = resolve(json!({
            "server": {"host": "example.com", "port": 8080},
            "client": {"endpoint": "https://${server.host}:${server.port}"}
        }))
        .unwrap();
        assert_eq!(
            table["client"]["endpoint"],
            json!("https://example.com:8080")
        );
    }

    #[test]
    fn test_chained_references() {
        let table = resolve(json!({"a": "hello", "b": "${a} world", "c": "${b}!"})).unwrap();
        assert_eq!(table["c"], json!("hello world!"));
    }

    #[test]
    fn test_escape_sequence() {
        let table = resolve(json!({"value": "use $${VAR} for env vars"})).unwrap();
        assert_eq!(table["value"], json!("use ${VAR} for env vars"));
    }

    #[test]
    fn test_sequence_index_reference() {
        let table = resolve(json!({"hosts": ["a", "b"], "primary": "${hosts.1}"})).unwrap();
        assert_eq!(table["primary"], json!("b"));
    }

    #[test]
    fn test_circular_reference() {
        let result = resolve(json!({"a": "${b}", "b": "${a}"}));
        assert!(matches!(result, Err(ConfigError::CircularReference)));
    }

    #[test]
    fn test_missing_reference() {
        let result = resolve(json!({"url": "${nonexistent.path}"}));
        assert!(matches!(result, Err(ConfigError::ReferenceNotFound(_))));
    }

    #[test]
    fn test_invalid_and_non_scalar_references() {
        assert!(matches!(
            resolve(json!({"a": "${b..c}"})),
            Err(ConfigError::InvalidReferencePath(_))
        ));
        assert!(matches!(
            resolve(json!({"a": "${}"})),
            Err(ConfigError::InvalidReferencePath(_))
        ));
        assert!(matches!(
            resolve(json!({"obj": {"k": 1}, "a": "${obj}"})),
            Err(ConfigError::NonScalarReference(_))
        ));
        assert!(matches!(
            resolve(json!({"a": "${open"})),
            Err(ConfigError::UnclosedReference)
        ));
    }

    #[test]
    fn test_escape_survives_other_references() {
        let table = resolve(json!({
            "host": "h",
            "url": "${host}",
            "literal": "$${VAR}",
            "quoted": "${literal}"
        }))
        .unwrap();
        assert_eq!(table["literal"], json!("${VAR}"));
        assert_eq!(table["quoted"], json!("${VAR}"));
    }

    #[test]
    fn test_array_values() {
        let table = resolve(json!({
            "base": "/api",
            "endpoints": ["${base}/users", "${base}/posts"]
        }))
        .unwrap();
        assert_eq!(table["endpoints"], json!(["/api/users", "/api/posts"]));
    }
}
