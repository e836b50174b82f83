use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::env::EnvSource;
use super::file::FileSource;
use super::resolve::resolve_references;
use super::source::{merge_at_path, ConfigEntry, ConfigSource};
use super::ConfigError;
use crate::path::{PathAccessor, DEFAULT_SEPARATOR};
use crate::MetaData;

/// Builder for loading metadata from layered configuration sources.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested objects are merged recursively; other values
/// (including arrays) are replaced entirely.
///
/// ## Variable References
///
/// String values can reference other values using `${path.to.field}` syntax:
///
/// ```toml
/// [server]
/// host = "localhost"
/// port = 8080
/// url = "http://${server.host}:${server.port}/api"
/// ```
///
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use meta_commons::Config;
///
/// let meta = Config::builder()
///     .with_file("config/default.toml", true)
///     .with_file("config/local.json", false)
///     .with_env("MYAPP", "__")
///     .build()?;
///
/// let port = meta.get_numeric("port", Some("server"))?;
/// # Ok::<(), meta_commons::Error>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
    separator: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML or JSON file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads values from environment variables with the given prefix.
    ///
    /// Environment variables are mapped to paths by:
    /// 1. Removing the prefix and separator
    /// 2. Splitting remaining segments on the separator
    /// 3. Converting path segments to lowercase
    ///
    /// Values are typed with [`sniff`](crate::convert::sniff).
    ///
    /// ```no_run
    /// # use meta_commons::Config;
    /// // defaults -> env overrides -> local file overrides env
    /// let meta = Config::builder()
    ///     .with_file("config/default.toml", true)
    ///     .with_env("MYAPP", "__")
    ///     .with_file("config/local.toml", false)
    ///     .build()?;
    /// # Ok::<(), meta_commons::ConfigError>(())
    /// ```
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds an inline JSON object as a layer.
    pub fn with_json(self, json: impl Into<String>) -> Self {
        self.with_source(JsonSource { json: json.into() })
    }

    /// Adds a custom source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Sets the path separator used for references and on the built
    /// metadata.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Loads, merges and resolves all sources into a [`MetaData`].
    pub fn build(self) -> Result<MetaData, ConfigError> {
        let accessor = PathAccessor::with_separator(self.separator);
        let mut merged = Map::new();

        for source in &self.sources {
            for ConfigEntry { path, value } in source.entries()? {
                merge_at_path(&mut merged, &path, value);
            }
        }

        resolve_references(&mut merged, &accessor)?;
        tracing::debug!(sources = self.sources.len(), keys = merged.len(), "configuration built");

        let mut meta = MetaData::from(merged);
        meta.set_separator(self.separator);
        Ok(meta)
    }

    /// Builds and deserializes into a typed configuration.
    pub fn build_into<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let meta = self.build()?;
        serde_json::from_value(meta.into_value()).map_err(ConfigError::DeserializeError)
    }
}

/// An inline JSON object.
#[derive(Debug, Clone)]
struct JsonSource {
    json: String,
}

impl ConfigSource for JsonSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let value: Value = serde_json::from_str(&self.json)
            .map_err(|e| ConfigError::JsonParseError { path: None, source: e })?;
        match value {
            Value::Object(map) => Ok(vec![ConfigEntry::root(map)]),
            _ => Err(ConfigError::InvalidRoot(None)),
        }
    }
}
