use serde_json::Value;

use super::Numeric;

const TRUE_TOKENS: [&str; 4] = ["TRUE", "ON", "YES", "1"];
const FALSE_TOKENS: [&str; 4] = ["FALSE", "OFF", "NO", "0"];

/// Infers a typed value from an untyped scalar.
///
/// Classification order matters and is fixed:
/// 1. boolean-true token (`true`, `on`, `yes`, `1`, any case)
/// 2. boolean-false token (`false`, `off`, `no`, `0`, any case)
/// 3. native integer
/// 4. native float
/// 5. numeric string, integer literal first, float otherwise
/// 6. anything else is kept as a string
///
/// So `"1"` is `true`, not `1`. Null and containers are returned unchanged.
pub fn sniff(value: &Value) -> Value {
    if is_boolean_true(value) {
        return Value::Bool(true);
    }
    if is_boolean_false(value) {
        return Value::Bool(false);
    }

    match value {
        Value::Number(_) | Value::Null | Value::Array(_) | Value::Object(_) => value.clone(),
        Value::Bool(b) => Value::Bool(*b),
        Value::String(s) => match Numeric::parse(s) {
            Some(n) => n.into(),
            None => value.clone(),
        },
    }
}

/// Convenience for raw text, e.g. environment variables.
pub fn sniff_str(s: &str) -> Value {
    sniff(&Value::String(s.to_string()))
}

pub fn is_boolean_true(value: &Value) -> bool {
    matches_token(value, &TRUE_TOKENS) || matches!(value, Value::Bool(true))
}

pub fn is_boolean_false(value: &Value) -> bool {
    matches_token(value, &FALSE_TOKENS) || matches!(value, Value::Bool(false))
}

fn matches_token(value: &Value, tokens: &[&str]) -> bool {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };
    tokens.iter().any(|t| t.eq_ignore_ascii_case(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_tokens_any_case() {
        for token in ["YES", "yes", "On", "TRUE", "1"] {
            assert_eq!(sniff_str(token), json!(true), "{token}");
        }
        for token in ["no", "OFF", "False", "0"] {
            assert_eq!(sniff_str(token), json!(false), "{token}");
        }
    }

    #[test]
    fn test_boolean_tokens_win_over_numbers() {
        assert_eq!(sniff(&json!(1)), json!(true));
        assert_eq!(sniff(&json!(0)), json!(false));
        assert_eq!(sniff(&json!(2)), json!(2));
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(sniff_str("007"), json!(7));
        assert_eq!(sniff_str("-12"), json!(-12));
        assert_eq!(sniff_str("3.25"), json!(3.25));
    }

    #[test]
    fn test_native_numbers_pass_through() {
        assert_eq!(sniff(&json!(42)), json!(42));
        assert_eq!(sniff(&json!(2.5)), json!(2.5));
    }

    #[test]
    fn test_fallback_is_string() {
        assert_eq!(sniff_str("hello"), json!("hello"));
        assert_eq!(sniff_str(""), json!(""));
        assert_eq!(sniff(&json!(null)), json!(null));
        assert_eq!(sniff(&json!({"a": 1})), json!({"a": 1}));
    }
}
