//! Numeric accumulation over metadata values.
//!
//! Stored values count as numeric when they are JSON numbers or numeric
//! strings (`"12"`, `"1.5"`). Absent values count as zero. Boolean tokens are
//! not sniffed: `"yes"` or `true` is a type mismatch, not 1.

use serde_json::Value;

use super::MetaData;
use crate::convert::Numeric;
use crate::Error;

impl MetaData {
    /// Reads `name` inside `path` as a number, treating absence as zero.
    pub fn get_numeric(&self, name: &str, path: Option<&str>) -> Result<Numeric, Error> {
        let full_path = self.accessor.join(path.unwrap_or(""), name);
        numeric_at(self.get(&full_path), &full_path)
    }

    /// Adds `amount` to the value at `name` (zero when absent) and stores the
    /// result. Returns the new value.
    pub fn increment(
        &mut self,
        name: &str,
        amount: impl Into<Value>,
        path: Option<&str>,
    ) -> Result<Numeric, Error> {
        let current = self.get_numeric(name, path)?;
        let updated = current + amount_of(amount.into(), "increment")?;
        self.store_numeric(name, updated, path)?;
        Ok(updated)
    }

    /// Subtracts `amount` from the value at `name` (zero when absent) and
    /// stores the result. Returns the new value.
    pub fn decrement(
        &mut self,
        name: &str,
        amount: impl Into<Value>,
        path: Option<&str>,
    ) -> Result<Numeric, Error> {
        let current = self.get_numeric(name, path)?;
        let updated = current - amount_of(amount.into(), "decrement")?;
        self.store_numeric(name, updated, path)?;
        Ok(updated)
    }

    /// Totals the sibling sections of the container at `path`.
    ///
    /// Each child not named in `exclude` contributes its own value, or with
    /// `subfield` set, the value at `child.subfield` (which may itself be a
    /// path). Missing subfields count as zero.
    ///
    /// Fails with [`Error::NotIterable`] if `path` is not a container, with
    /// [`Error::InvalidPath`] if `subfield` is malformed, and with
    /// [`Error::TypeMismatch`] if a contributing value is not numeric or the
    /// total overflows.
    pub fn sum(
        &self,
        path: &str,
        subfield: Option<&str>,
        exclude: &[&str],
    ) -> Result<Numeric, Error> {
        let section = self
            .get(path)
            .ok_or_else(|| Error::NotIterable(path.to_string()))?;

        let children: Vec<(String, &Value)> = match section {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => return Err(Error::NotIterable(path.to_string())),
        };

        let mut total = Numeric::default();
        for (key, child) in children {
            if exclude.contains(&key.as_str()) {
                continue;
            }

            let child_path = self.accessor.join(path, &key);
            let value = match subfield {
                Some(field) => {
                    let location = self.accessor.join(&child_path, field);
                    let value = match self.accessor.get(child, field) {
                        Ok(value) => Some(value),
                        Err(Error::PathNotFound { .. }) => None,
                        Err(e) => return Err(e),
                    };
                    numeric_at(value, &location)?
                }
                None => numeric_at(Some(child), &child_path)?,
            };
            total = total + value;
        }

        finite(total, path)
    }

    fn store_numeric(
        &mut self,
        name: &str,
        value: Numeric,
        path: Option<&str>,
    ) -> Result<(), Error> {
        let location = self.accessor.join(path.unwrap_or(""), name);
        let value = finite(value, &location)?;
        self.add(name, value, true, path)
    }
}

/// Rejects results that overflowed the float range and cannot be stored.
fn finite(value: Numeric, location: &str) -> Result<Numeric, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::TypeMismatch(format!(
            "numeric result at [{location}] is out of range"
        )))
    }
}

fn numeric_at(value: Option<&Value>, location: &str) -> Result<Numeric, Error> {
    match value {
        None => Ok(Numeric::default()),
        Some(v) => Numeric::from_value(v).ok_or_else(|| {
            Error::TypeMismatch(format!("metadata value at [{location}] is not numeric"))
        }),
    }
}

fn amount_of(amount: Value, operation: &str) -> Result<Numeric, Error> {
    Numeric::from_value(&amount)
        .ok_or_else(|| Error::TypeMismatch(format!("{operation} amount {amount} is not numeric")))
}
