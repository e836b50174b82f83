use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;
use crate::convert::sniff_str;

/// Environment variables under a prefix, e.g. `MYAPP__DATABASE__PORT=5432`
/// becomes `database.port = 5432`.
///
/// Values are typed with [`sniff`](crate::convert::sniff): boolean tokens,
/// then numbers, then strings.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    /// Creates an environment source. An empty separator yields no entries.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    fn entries_from<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.separator.is_empty() {
            tracing::debug!(prefix = %self.prefix, "empty env separator, source ignored");
            return Vec::new();
        }

        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(&self.separator)
                .map(|s| s.to_lowercase())
                .collect();
            if path.iter().any(|s| s.is_empty()) {
                continue;
            }

            entries.push(ConfigEntry::at_path(path, sniff_str(&value)));
        }

        entries
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }
}
