use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use super::MetaData;
use crate::convert::Numeric;

/// Output options for [`MetaData::to_json_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Indent the output over multiple lines.
    pub pretty: bool,
    /// Encode numeric strings (`"30"`) as numbers (`30`).
    pub numeric_check: bool,
}

impl JsonOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn numeric_check() -> Self {
        Self {
            numeric_check: true,
            ..Self::default()
        }
    }
}

impl MetaData {
    /// Serializes the tree to compact JSON text.
    ///
    /// `MetaData::from_json(&meta.to_json())` reproduces the same tree.
    pub fn to_json(&self) -> String {
        self.root.to_string()
    }

    /// Serializes the tree with explicit options.
    pub fn to_json_with(&self, options: JsonOptions) -> String {
        let checked;
        let value = if options.numeric_check {
            checked = numbers_from_strings(&self.root);
            &checked
        } else {
            &self.root
        };

        if options.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }
}

fn numbers_from_strings(value: &Value) -> Value {
    match value {
        Value::String(s) => Numeric::parse(s).map_or_else(|| value.clone(), Value::from),
        Value::Array(items) => Value::Array(items.iter().map(numbers_from_strings).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), numbers_from_strings(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl fmt::Display for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.root)
        } else {
            write!(f, "{}", self.root)
        }
    }
}

impl Serialize for MetaData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MetaData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        MetaData::from_value(value).map_err(de::Error::custom)
    }
}
