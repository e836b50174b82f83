//! Coercion between raw stored values and declared types.
//!
//! Conversions degrade instead of failing: when a raw value cannot be read
//! as its declared type the result is [`TypedValue::Raw`] holding the input,
//! so callers can detect non-conversion without error handling.

mod numeric;
mod sniff;
mod types;

use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

pub use numeric::Numeric;
pub use sniff::{is_boolean_false, is_boolean_true, sniff, sniff_str};
pub use types::{DataType, ParameterSpec, TypedValue, DEFAULT_DATE_FORMAT, TIMESTAMP_FORMAT};

use crate::MetaData;

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Converts a raw stored value into its declared type.
pub fn to_typed(spec: &ParameterSpec, raw: &Value) -> TypedValue {
    let typed = match spec.data_type {
        DataType::String => TypedValue::String(string_form(raw)),
        DataType::Integer => integer_from(raw).map_or_else(
            || TypedValue::Raw(raw.clone()),
            TypedValue::Integer,
        ),
        DataType::Float => {
            float_from(raw).map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::Float)
        }
        DataType::Boolean => bool_from(raw)
            .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::Boolean),
        DataType::DateTime => {
            if spec.not_if.as_ref() == Some(raw) {
                TypedValue::Raw(raw.clone())
            } else {
                datetime_from(raw, spec.format.as_deref())
                    .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::DateTime)
            }
        }
        DataType::MetaData => metadata_from(raw)
            .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::MetaData),
        DataType::Json => json_decode(raw)
            .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::Json),
        DataType::Serial => unserialize(raw)
            .map_or_else(|| TypedValue::Raw(raw.clone()), TypedValue::Serial),
        DataType::Enum => {
            let chosen = if spec.options.contains(raw) {
                raw
            } else {
                &spec.default_value
            };
            TypedValue::String(string_form(chosen))
        }
        DataType::Mixed => TypedValue::Raw(raw.clone()),
    };

    if typed.is_raw() && spec.data_type != DataType::Mixed {
        tracing::debug!(data_type = %spec.data_type, "value left unconverted");
    }

    typed
}

/// Converts a typed value back into its raw stored form.
///
/// Typed values that do not match the declared type are first viewed as
/// plain JSON and then cast, so the result always follows `spec`.
pub fn to_raw(spec: &ParameterSpec, typed: &TypedValue) -> Value {
    match (spec.data_type, typed) {
        (DataType::DateTime, TypedValue::DateTime(dt)) => format_datetime(dt, spec.date_format())
            .unwrap_or_else(|| typed.to_value()),
        (DataType::DateTime, _) | (DataType::Mixed, _) => typed.to_value(),
        (DataType::MetaData, TypedValue::MetaData(meta)) => Value::String(meta.to_json()),
        (DataType::MetaData, _) | (DataType::Json, _) => {
            Value::String(typed.to_value().to_string())
        }
        (DataType::Serial, _) => Value::String(serialize(&typed.to_value())),
        (DataType::Enum, _) | (DataType::String, _) => {
            Value::String(string_form(&typed.to_value()))
        }
        (DataType::Integer, _) | (DataType::Float, _) | (DataType::Boolean, _) => {
            to_typed(spec, &typed.to_value()).to_value()
        }
    }
}

/// Encodes a value as a serial blob: base64 over compact JSON.
pub fn serialize(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

/// Decodes a serial blob; `None` if `raw` is not a well-formed blob.
pub fn unserialize(raw: &Value) -> Option<Value> {
    let Value::String(blob) = raw else {
        return None;
    };
    let bytes = STANDARD.decode(blob.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn json_decode(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(text) => serde_json::from_str(text).ok(),
        _ => None,
    }
}

fn metadata_from(raw: &Value) -> Option<MetaData> {
    match raw {
        Value::String(text) => MetaData::from_json(text).ok(),
        other => MetaData::from_value(other.clone()).ok(),
    }
}

/// Text form of a value: strings as-is, null as empty, containers as JSON.
fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn integer_from(raw: &Value) -> Option<i64> {
    match raw {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null => Some(0),
        other => Numeric::from_value(other).and_then(Numeric::to_i64),
    }
}

fn float_from(raw: &Value) -> Option<f64> {
    match raw {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        other => Numeric::from_value(other).map(Numeric::as_f64),
    }
}

fn bool_from(raw: &Value) -> Option<bool> {
    if is_boolean_true(raw) {
        return Some(true);
    }
    if is_boolean_false(raw) {
        return Some(false);
    }
    match raw {
        Value::Null => Some(false),
        Value::String(s) => Some(!s.is_empty()),
        Value::Number(_) => Numeric::from_value(raw).map(|n| n.as_f64() != 0.0),
        Value::Array(items) => Some(!items.is_empty()),
        Value::Object(map) => Some(!map.is_empty()),
        Value::Bool(b) => Some(*b),
    }
}

fn datetime_from(raw: &Value, format: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(n) = Numeric::from_value(raw) {
        return match n {
            Numeric::Int(secs) => DateTime::from_timestamp(secs, 0),
            Numeric::Float(f) => {
                let secs = f.floor();
                let nanos = ((f - secs) * 1e9) as u32;
                DateTime::from_timestamp(secs as i64, nanos)
            }
        };
    }

    let Value::String(text) = raw else {
        return None;
    };
    parse_datetime(text.trim(), format)
}

fn parse_datetime(text: &str, format: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(fmt) = format.filter(|f| *f != TIMESTAMP_FORMAT) {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
        if let Some(naive) = NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Some(naive.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Formats a date; `None` when the pattern is not a valid strftime pattern.
fn format_datetime(dt: &DateTime<Utc>, format: &str) -> Option<Value> {
    if format == TIMESTAMP_FORMAT {
        return Some(Value::from(dt.timestamp()));
    }

    let mut out = String::new();
    match write!(out, "{}", dt.format(format)) {
        Ok(()) => Some(Value::String(out)),
        Err(_) => {
            tracing::debug!(format, "invalid date format");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn spec(data_type: DataType) -> ParameterSpec {
        ParameterSpec::new(data_type)
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(
            to_typed(&spec(DataType::Integer), &json!("30")),
            TypedValue::Integer(30)
        );
        assert_eq!(
            to_typed(&spec(DataType::Integer), &json!(4.9)),
            TypedValue::Integer(4)
        );
        assert_eq!(
            to_typed(&spec(DataType::Float), &json!("2.5")),
            TypedValue::Float(2.5)
        );
        assert_eq!(
            to_typed(&spec(DataType::String), &json!(12)),
            TypedValue::String("12".into())
        );
        assert_eq!(
            to_typed(&spec(DataType::Boolean), &json!("off")),
            TypedValue::Boolean(false)
        );
        assert_eq!(
            to_typed(&spec(DataType::Boolean), &json!("anything")),
            TypedValue::Boolean(true)
        );
    }

    #[test]
    fn test_unparseable_scalar_stays_raw() {
        assert_eq!(
            to_typed(&spec(DataType::Integer), &json!("abc")),
            TypedValue::Raw(json!("abc"))
        );
        assert_eq!(
            to_typed(&spec(DataType::Float), &json!({"a": 1})),
            TypedValue::Raw(json!({"a": 1}))
        );
    }

    #[test]
    fn test_enum_substitutes_default() {
        let colour = spec(DataType::Enum)
            .with_options(["red", "green"])
            .with_default("red");
        assert_eq!(
            to_typed(&colour, &json!("blue")),
            TypedValue::String("red".into())
        );
        assert_eq!(
            to_typed(&colour, &json!("green")),
            TypedValue::String("green".into())
        );
    }

    #[test]
    fn test_datetime_from_epoch_and_string() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let date = spec(DataType::DateTime);
        assert_eq!(
            to_typed(&date, &json!(expected.timestamp())),
            TypedValue::DateTime(expected)
        );
        assert_eq!(
            to_typed(&date, &json!("2020-01-02 03:04:05")),
            TypedValue::DateTime(expected)
        );
        assert_eq!(
            to_typed(&date, &json!("2020-01-02T03:04:05Z")),
            TypedValue::DateTime(expected)
        );
    }

    #[test]
    fn test_datetime_parse_failure_returns_raw() {
        assert_eq!(
            to_typed(&spec(DataType::DateTime), &json!("not a date")),
            TypedValue::Raw(json!("not a date"))
        );
    }

    #[test]
    fn test_datetime_not_if_sentinel() {
        let date = spec(DataType::DateTime).with_not_if("0000-00-00 00:00:00");
        assert_eq!(
            to_typed(&date, &json!("0000-00-00 00:00:00")),
            TypedValue::Raw(json!("0000-00-00 00:00:00"))
        );
    }

    #[test]
    fn test_datetime_to_raw_formats() {
        let dt = Utc.with_ymd_and_hms(2021, 6, 7, 8, 9, 10).unwrap();
        let typed = TypedValue::DateTime(dt);
        assert_eq!(
            to_raw(&spec(DataType::DateTime), &typed),
            json!("2021-06-07 08:09:10")
        );
        assert_eq!(
            to_raw(&spec(DataType::DateTime).with_format("%d/%m/%Y"), &typed),
            json!("07/06/2021")
        );
        assert_eq!(
            to_raw(&spec(DataType::DateTime).with_format(TIMESTAMP_FORMAT), &typed),
            json!(dt.timestamp())
        );
    }

    #[test]
    fn test_datetime_custom_format_parses() {
        let date = spec(DataType::DateTime).with_format("%d/%m/%Y %H:%M");
        let expected = Utc.with_ymd_and_hms(2021, 6, 7, 8, 9, 0).unwrap();
        assert_eq!(
            to_typed(&date, &json!("07/06/2021 08:09")),
            TypedValue::DateTime(expected)
        );
    }

    #[test]
    fn test_date_only_format_round_trips() {
        let date = spec(DataType::DateTime).with_format("%d/%m/%Y");
        let midnight = Utc.with_ymd_and_hms(2021, 6, 7, 0, 0, 0).unwrap();
        let raw = to_raw(&date, &TypedValue::DateTime(midnight));
        assert_eq!(raw, json!("07/06/2021"));
        assert_eq!(to_typed(&date, &raw), TypedValue::DateTime(midnight));
    }

    #[test]
    fn test_integer_out_of_range_stays_raw() {
        let integer = spec(DataType::Integer);
        assert_eq!(
            to_typed(&integer, &json!("99999999999999999999")),
            TypedValue::Raw(json!("99999999999999999999"))
        );
        assert_eq!(
            to_typed(&integer, &json!(1e300)),
            TypedValue::Raw(json!(1e300))
        );
        assert_eq!(
            to_typed(&integer, &json!(i64::MIN)),
            TypedValue::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_json_round_trip() {
        let json = spec(DataType::Json);
        let raw = json!(r#"{"b":1,"a":[true,null]}"#);
        let typed = to_typed(&json, &raw);
        assert_eq!(typed, TypedValue::Json(json!({"b": 1, "a": [true, null]})));
        assert_eq!(to_raw(&json, &typed), raw);
    }

    #[test]
    fn test_malformed_json_returns_raw() {
        let raw = json!("{not json");
        assert_eq!(to_typed(&spec(DataType::Json), &raw), TypedValue::Raw(raw));
    }

    #[test]
    fn test_serial_round_trip() {
        let serial = spec(DataType::Serial);
        let blob = Value::String(serialize(&json!({"id": 7, "tags": ["x"]})));
        let typed = to_typed(&serial, &blob);
        assert_eq!(typed, TypedValue::Serial(json!({"id": 7, "tags": ["x"]})));
        assert_eq!(to_raw(&serial, &typed), blob);
    }

    #[test]
    fn test_malformed_serial_returns_raw() {
        for raw in [json!("!!not base64!!"), json!(STANDARD.encode("{oops")), json!(5)] {
            assert_eq!(
                to_typed(&spec(DataType::Serial), &raw),
                TypedValue::Raw(raw.clone())
            );
        }
    }

    #[test]
    fn test_metadata_conversion() {
        let meta = spec(DataType::MetaData);
        let typed = to_typed(&meta, &json!(r#"{"user":{"age":30}}"#));
        let TypedValue::MetaData(ref inner) = typed else {
            panic!("expected metadata, got {typed:?}");
        };
        assert_eq!(inner.get("user.age"), Some(&json!(30)));
        assert_eq!(to_raw(&meta, &typed), json!(r#"{"user":{"age":30}}"#));
        assert!(to_typed(&meta, &json!("garbage")).is_raw());
    }

    #[test]
    fn test_mixed_is_passthrough() {
        let raw = json!({"anything": [1, 2]});
        assert_eq!(
            to_typed(&spec(DataType::Mixed), &raw),
            TypedValue::Raw(raw.clone())
        );
        assert_eq!(to_raw(&spec(DataType::Mixed), &TypedValue::Raw(raw.clone())), raw);
    }

    #[test]
    fn test_to_raw_casts_mismatched_variants() {
        assert_eq!(
            to_raw(&spec(DataType::Integer), &TypedValue::String("15".into())),
            json!(15)
        );
        assert_eq!(
            to_raw(&spec(DataType::String), &TypedValue::Integer(15)),
            json!("15")
        );
    }
}
