//! Path-addressed access to nested JSON containers.
//!
//! A path is a list of segments joined by a separator character (`.` by
//! default), e.g. `server.limits.max_connections`. Each segment descends one
//! level into an object, or into a sequence when the segment is a decimal
//! index (`hosts.0`). The empty path addresses the root itself.
//!
//! Leading, trailing or doubled separators produce empty segments and are
//! rejected with [`Error::InvalidPath`].

use serde_json::{Map, Value};

use crate::Error;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '.';

/// Resolves separator-joined paths against a tree of [`Value`]s.
///
/// The accessor owns no data; it only carries the separator, so one accessor
/// can be used against any number of trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAccessor {
    separator: char,
}

impl Default for PathAccessor {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl PathAccessor {
    /// Creates an accessor using the default `.` separator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an accessor using a custom separator.
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Changes the separator used for subsequent resolutions.
    ///
    /// Keys already stored in a tree are not re-keyed.
    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    /// Splits a path into its segments.
    ///
    /// The empty path yields no segments (the root).
    pub fn segments<'p>(&self, path: &'p str) -> Result<Vec<&'p str>, Error> {
        if path.is_empty() {
            return Ok(Vec::new());
        }

        let parts: Vec<&str> = path.split(self.separator).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::invalid_path(path, "empty path segment"));
        }

        Ok(parts)
    }

    /// Joins a parent path and a child name with the separator.
    pub fn join(&self, parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}{}{name}", self.separator)
        }
    }

    /// Returns true if every segment of `path` resolves.
    ///
    /// Never fails: malformed paths are simply not present.
    pub fn has(&self, root: &Value, path: &str) -> bool {
        self.get(root, path).is_ok()
    }

    /// Returns the value addressed by `path`.
    pub fn get<'a>(&self, root: &'a Value, path: &str) -> Result<&'a Value, Error> {
        let mut current = root;
        for segment in self.segments(path)? {
            current = child(current, segment).ok_or_else(|| Error::path_not_found(path, segment))?;
        }
        Ok(current)
    }

    pub(crate) fn get_mut<'a>(&self, root: &'a mut Value, path: &str) -> Result<&'a mut Value, Error> {
        let mut current = root;
        for segment in self.segments(path)? {
            current =
                child_mut(current, segment).ok_or_else(|| Error::path_not_found(path, segment))?;
        }
        Ok(current)
    }

    /// Assigns `value` to `key` inside the container addressed by `path`.
    ///
    /// With `create` set, missing intermediate objects are synthesized on the
    /// way down; otherwise a missing segment fails with
    /// [`Error::PathNotFound`]. Existing scalars are never replaced by
    /// synthesized containers. Returns the previous value under `key`, if any.
    pub fn set(
        &self,
        root: &mut Value,
        path: &str,
        key: &str,
        value: Value,
        create: bool,
    ) -> Result<Option<Value>, Error> {
        self.check_key(key)?;

        let mut current = root;
        for segment in self.segments(path)? {
            current = match current {
                Value::Object(map) => {
                    if !create && !map.contains_key(segment) {
                        return Err(Error::path_not_found(path, segment));
                    }
                    map.entry(segment.to_string())
                        .or_insert_with(|| Value::Object(Map::new()))
                }
                Value::Array(items) => parse_index(segment)
                    .and_then(move |index| items.get_mut(index))
                    .ok_or_else(|| Error::path_not_found(path, segment))?,
                _ => return Err(Error::path_not_found(path, segment)),
            };
        }

        let full_path = self.join(path, key);
        match current {
            Value::Object(map) => Ok(map.insert(key.to_string(), value)),
            Value::Array(items) => match parse_index(key) {
                Some(index) if index < items.len() => {
                    Ok(Some(std::mem::replace(&mut items[index], value)))
                }
                Some(index) if index == items.len() => {
                    items.push(value);
                    Ok(None)
                }
                _ => Err(Error::path_not_found(&full_path, key)),
            },
            _ => Err(Error::path_not_found(&full_path, key)),
        }
    }

    /// Removes and returns the value addressed by `path`.
    ///
    /// The root cannot be removed.
    pub fn remove(&self, root: &mut Value, path: &str) -> Result<Value, Error> {
        let segments = self.segments(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::invalid_path(path, "cannot remove the root"));
        };

        let mut current = root;
        for segment in parents {
            current =
                child_mut(current, segment).ok_or_else(|| Error::path_not_found(path, segment))?;
        }

        let removed = match current {
            Value::Object(map) => map.shift_remove(*last),
            Value::Array(items) => match parse_index(last) {
                Some(index) if index < items.len() => Some(items.remove(index)),
                _ => None,
            },
            _ => None,
        };

        removed.ok_or_else(|| Error::path_not_found(path, last))
    }

    pub(crate) fn check_key(&self, key: &str) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::invalid_path(key, "empty key"));
        }
        if key.contains(self.separator) {
            return Err(Error::invalid_path(key, "key contains the path separator"));
        }
        Ok(())
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => parse_index(segment).and_then(move |index| items.get_mut(index)),
        _ => None,
    }
}

/// Parses a canonical decimal sequence index (no sign, no leading zeros).
fn parse_index(segment: &str) -> Option<usize> {
    let canonical = segment.bytes().all(|b| b.is_ascii_digit())
        && (segment.len() == 1 || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}
