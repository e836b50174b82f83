//! File-based configuration source.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// A configuration source that loads a TOML or JSON file.
///
/// The format follows the extension: `.json` is JSON, `.toml` (or no
/// extension) is TOML. Files can be marked as required or optional.
/// Required files that don't exist cause an error; optional files that don't
/// exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        match load_config_file(&self.path, self.required)? {
            Some(table) => Ok(vec![ConfigEntry::root(table)]),
            None => Ok(vec![]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => Ok(Format::Toml),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(_) => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Loads and parses a config file into an object.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_config_file(path: &Path, required: bool) -> Result<Option<Map<String, Value>>, ConfigError> {
    let format = format_of(path)?;

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "optional config file not found");
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let table = match format {
        Format::Toml => {
            let table: toml::Table =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            toml_table_to_json(table)
        }
        Format::Json => {
            let value: Value =
                serde_json::from_str(&contents).map_err(|e| ConfigError::JsonParseError {
                    path: Some(path.to_path_buf()),
                    source: e,
                })?;
            match value {
                Value::Object(map) => map,
                _ => return Err(ConfigError::InvalidRoot(Some(path.to_path_buf()))),
            }
        }
    };

    tracing::debug!(path = %path.display(), keys = table.len(), "config file loaded");
    Ok(Some(table))
}

fn toml_table_to_json(table: toml::Table) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

/// Converts a TOML value to JSON. Datetimes become their TOML text form.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(toml_table_to_json(table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_with_suffix(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_file_source_loads_toml() {
        let file = temp_with_suffix(
            ".toml",
            "key = \"value\"\n[server]\nport = 8080\nstarted = 1979-05-27T07:32:00Z\n",
        );

        let source = FileSource::new(file.path(), true);
        let entries = source.entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_empty());
        assert_eq!(
            entries[0].value,
            json!({
                "key": "value",
                "server": {"port": 8080, "started": "1979-05-27T07:32:00Z"}
            })
        );
    }

    #[test]
    fn test_file_source_loads_json() {
        let file = temp_with_suffix(".json", r#"{"key": [1, "two"]}"#);
        let entries = FileSource::new(file.path(), true).entries().unwrap();
        assert_eq!(entries[0].value, json!({"key": [1, "two"]}));
    }

    #[test]
    fn test_json_file_must_hold_object() {
        let file = temp_with_suffix(".json", "[1, 2]");
        let result = FileSource::new(file.path(), true).entries();
        assert!(matches!(result, Err(ConfigError::InvalidRoot(Some(_)))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_with_suffix(".yaml", "key: value");
        let result = FileSource::new(file.path(), true).entries();
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let file = temp_with_suffix(".toml", "key = ");
        let result = FileSource::new(file.path(), true).entries();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::new("/nonexistent/path/config.toml", true);
        let result = source.entries();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::new("/nonexistent/path/config.toml", false);
        let entries = source.entries().unwrap();

        assert!(entries.is_empty());
    }
}
