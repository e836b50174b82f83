use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::MetaData;

/// Declared type of a named value.
///
/// Serialized with the tag names used in schema definitions
/// (`"Integer"`, `"DateTime"`, `"JSON"`, `"ENUM"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    MetaData,
    #[serde(rename = "JSON")]
    Json,
    Serial,
    #[serde(rename = "ENUM")]
    Enum,
    #[default]
    Mixed,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::DateTime => "DateTime",
            DataType::MetaData => "MetaData",
            DataType::Json => "JSON",
            DataType::Serial => "Serial",
            DataType::Enum => "ENUM",
            DataType::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date format keyword selecting epoch seconds instead of a strftime pattern.
pub const TIMESTAMP_FORMAT: &str = "TimeStamp";

/// Default strftime pattern for date values.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Conversion options for one named parameter.
///
/// Unset fields take the common defaults: [`DataType::Mixed`], a `null`
/// default value, and not optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[must_use]
pub struct ParameterSpec {
    pub data_type: DataType,
    pub default_value: Value,
    pub optional: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// strftime pattern, or [`TIMESTAMP_FORMAT`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Raw date value that is never converted (e.g. a zero date).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_if: Option<Value>,
}

impl ParameterSpec {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_not_if(mut self, value: impl Into<Value>) -> Self {
        self.not_if = Some(value.into());
        self
    }

    pub(crate) fn date_format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }
}

/// Result of converting a raw value against its declared type.
///
/// [`TypedValue::Raw`] carries the input unchanged, either because the
/// declared type is [`DataType::Mixed`] or because the conversion could not
/// be performed.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    MetaData(MetaData),
    Json(Value),
    Serial(Value),
    Raw(Value),
}

impl TypedValue {
    pub fn is_raw(&self) -> bool {
        matches!(self, TypedValue::Raw(_))
    }

    /// Plain JSON view of the value. Dates render as RFC 3339.
    pub fn to_value(&self) -> Value {
        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::Float(f) => Value::from(*f),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            TypedValue::MetaData(meta) => meta.to_value(),
            TypedValue::Json(v) | TypedValue::Serial(v) | TypedValue::Raw(v) => v.clone(),
        }
    }
}
