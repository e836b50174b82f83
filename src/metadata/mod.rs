//! Ordered, path-addressable metadata container.
//!
//! [`MetaData`] owns a tree of JSON values whose root is always an object.
//! Every read and write goes through a [`PathAccessor`], so the separator
//! configured on the container applies uniformly.

mod accumulate;
mod json;

use std::ops::Index;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::path::PathAccessor;
use crate::Error;

pub use json::JsonOptions;

static NULL: Value = Value::Null;

/// A mutable tree of named values with dotted-path access.
///
/// ## Example
///
/// ```
/// use meta_commons::MetaData;
/// use serde_json::json;
///
/// let mut meta = MetaData::from_value(json!({"user": {"age": "30"}}))?;
/// assert_eq!(meta.get("user.age"), Some(&json!("30")));
///
/// meta.add("name", "ada", false, Some("user"))?;
/// meta.increment("visits", 1, Some("user"))?;
/// assert_eq!(meta["user.visits"], json!(1));
/// # Ok::<(), meta_commons::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData {
    root: Value,
    accessor: PathAccessor,
}

impl Default for MetaData {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
            accessor: PathAccessor::default(),
        }
    }
}

impl MetaData {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container from a native value.
    ///
    /// `null` gives an empty container, an object is taken as the tree, and a
    /// top-level array is re-keyed by index (`"0"`, `"1"`, ...). A string is
    /// decoded as JSON text. Any other value fails with
    /// [`Error::InvalidSource`].
    pub fn from_value(source: Value) -> Result<Self, Error> {
        match source {
            Value::String(text) => Self::from_json(&text),
            other => Self::from_native(other),
        }
    }

    /// Creates a container from JSON text.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(source).map_err(|e| {
            tracing::debug!(error = %e, "metadata source is not valid JSON");
            Error::InvalidSource(format!("failed to decode the JSON source: {e}"))
        })?;
        Self::from_native(value)
    }

    fn from_native(source: Value) -> Result<Self, Error> {
        let root = match source {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            other => {
                tracing::debug!(source = %other, "rejected metadata source");
                return Err(Error::InvalidSource(format!(
                    "expected an object, array or null, found {}",
                    type_name(&other)
                )));
            }
        };

        Ok(Self {
            root: Value::Object(root),
            accessor: PathAccessor::default(),
        })
    }

    pub fn separator(&self) -> char {
        self.accessor.separator()
    }

    /// Changes the separator for subsequent path operations.
    ///
    /// Stored keys are not re-keyed, so keys containing the new separator
    /// become unreachable by path until it is changed back.
    pub fn set_separator(&mut self, separator: char) {
        self.accessor.set_separator(separator);
    }

    /// Returns true if `path` resolves. The empty path is the root.
    pub fn has(&self, path: &str) -> bool {
        self.accessor.has(&self.root, path)
    }

    /// Returns the value at `path`, or `None` when it does not resolve.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.accessor.get(&self.root, path).ok()
    }

    /// Returns an owned copy of the value at `path`, or `default`.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    /// Returns the value at `path`, failing with the segment that did not
    /// resolve.
    pub fn value(&self, path: &str) -> Result<&Value, Error> {
        self.accessor.get(&self.root, path)
    }

    /// Adds `value` under `name` inside the container at `path` (the root when
    /// `None`), creating missing parents.
    ///
    /// Fails with [`Error::AlreadyExists`] if the target is occupied and
    /// `update` is false.
    pub fn add(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        update: bool,
        path: Option<&str>,
    ) -> Result<(), Error> {
        let parent = path.unwrap_or("");
        self.accessor.check_key(name)?;

        if !update && self.has(&self.accessor.join(parent, name)) {
            return Err(Error::AlreadyExists {
                path: parent.to_string(),
                name: name.to_string(),
            });
        }

        self.accessor
            .set(&mut self.root, parent, name, value.into(), true)?;
        tracing::trace!(path = parent, name, update, "metadata value added");
        Ok(())
    }

    /// Writes `value` at a full path, replacing any existing value.
    ///
    /// Equivalent to `add(last_segment, value, true, parent)`. The empty path
    /// is rejected since it names no key.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), Error> {
        if self.accessor.segments(path)?.is_empty() {
            return Err(Error::invalid_path(path, "no key to set"));
        }

        let (parent, name) = path
            .rsplit_once(self.accessor.separator())
            .unwrap_or(("", path));
        self.add(name, value, true, Some(parent))
    }

    /// Removes and returns the value at `path`.
    pub fn remove(&mut self, path: &str) -> Result<Value, Error> {
        let removed = self.accessor.remove(&mut self.root, path)?;
        tracing::trace!(path, "metadata value removed");
        Ok(removed)
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.root = Value::Object(Map::new());
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.root.as_object().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the top-level entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root.as_object().into_iter().flat_map(|map| map.iter())
    }

    /// Returns a copy of the tree as a native map.
    pub fn to_map(&self) -> Map<String, Value> {
        self.root.as_object().cloned().unwrap_or_default()
    }

    /// Returns a copy of the tree as a JSON object value.
    pub fn to_value(&self) -> Value {
        self.root.clone()
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

impl From<Map<String, Value>> for MetaData {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            root: Value::Object(map),
            accessor: PathAccessor::default(),
        }
    }
}

impl TryFrom<Value> for MetaData {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl FromStr for MetaData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

/// Bracket read: `meta["a.b"]`. Yields `null` when the path does not resolve.
impl Index<&str> for MetaData {
    type Output = Value;

    fn index(&self, path: &str) -> &Value {
        self.get(path).unwrap_or(&NULL)
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
