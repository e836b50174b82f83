use serde_json::{Map, Value};

use super::ConfigError;

/// A value contributed by a source, placed at `path` in the merged tree.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    pub fn root(table: Map<String, Value>) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Object(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// One layer of configuration.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}

/// Merges `value` into `table` at `path`.
///
/// Objects merge recursively; any other value replaces what was there.
/// Non-object values along the path are replaced by objects.
pub fn merge_at_path(table: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Object(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Object(base)), Value::Object(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(table.get(first), Some(Value::Object(_))) {
        table.insert(first.clone(), Value::Object(Map::new()));
    }

    if let Some(Value::Object(nested)) = table.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base_table)), Value::Object(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_deep_merge_recurses_into_objects() {
        let mut base = object(json!({"db": {"host": "a", "port": 1}, "list": [1, 2]}));
        deep_merge(&mut base, object(json!({"db": {"port": 2}, "list": [3]})));
        assert_eq!(
            Value::Object(base),
            json!({"db": {"host": "a", "port": 2}, "list": [3]})
        );
    }

    #[test]
    fn test_merge_at_path_creates_and_replaces() {
        let mut base = object(json!({"db": "scalar"}));
        merge_at_path(&mut base, &["db".into(), "port".into()], json!(5432));
        merge_at_path(&mut base, &["app".into()], json!({"name": "x"}));
        assert_eq!(
            Value::Object(base),
            json!({"db": {"port": 5432}, "app": {"name": "x"}})
        );
    }
}
