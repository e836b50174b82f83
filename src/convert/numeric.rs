use std::fmt;
use std::ops::{Add, Sub};

use serde_json::{Number, Value};

/// A number read from metadata: either an exact integer or a float.
///
/// Integer arithmetic stays exact until it would overflow, at which point the
/// result widens to a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    /// Reads a number from a JSON value.
    ///
    /// Numbers are taken as-is and numeric strings (`"42"`, `" -1.5e3 "`) are
    /// parsed. Booleans, null and containers are not numeric.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Numeric::Int(i),
                None => Numeric::Float(n.as_f64()?),
            }),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Parses a numeric string.
    ///
    /// Surrounding whitespace is ignored. Integer literals (optional sign,
    /// digits only, leading zeros allowed) become [`Numeric::Int`]; anything
    /// else that reads as a finite decimal becomes [`Numeric::Float`].
    /// Spellings such as `inf` or `NaN` are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if looks_like_integer(s) {
            if let Ok(i) = s.parse::<i64>() {
                return Some(Numeric::Int(i));
            }
        }

        let decimal_only = s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
        if !decimal_only || !s.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }

        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Numeric::Float)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    /// Truncates toward zero; `None` when the value does not fit an `i64`.
    pub fn to_i64(self) -> Option<i64> {
        match self {
            Numeric::Int(i) => Some(i),
            // i64::MAX as f64 rounds up to 2^63, which is already out of range.
            Numeric::Float(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Some(f as i64),
            Numeric::Float(_) => None,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Numeric::Int(_) => true,
            Numeric::Float(f) => f.is_finite(),
        }
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Numeric::Float(a as f64 + b as f64), Numeric::Int),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sub for Numeric {
    type Output = Numeric;

    fn sub(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_sub(b)
                .map_or_else(|| Numeric::Float(a as f64 - b as f64), Numeric::Int),
            (a, b) => Numeric::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Int(0)
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Int(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Int(i) => Value::from(i),
            Numeric::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(i) => write!(f, "{i}"),
            Numeric::Float(x) => write!(f, "{x}"),
        }
    }
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integers_and_floats() {
        assert_eq!(Numeric::parse("42"), Some(Numeric::Int(42)));
        assert_eq!(Numeric::parse("-7"), Some(Numeric::Int(-7)));
        assert_eq!(Numeric::parse("007"), Some(Numeric::Int(7)));
        assert_eq!(Numeric::parse(" 3.5 "), Some(Numeric::Float(3.5)));
        assert_eq!(Numeric::parse("1e3"), Some(Numeric::Float(1000.0)));
    }

    #[test]
    fn test_parse_rejects_non_numbers() {
        for s in ["", "abc", "12abc", "inf", "NaN", "-", "."] {
            assert_eq!(Numeric::parse(s), None, "{s:?} should not parse");
        }
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Numeric::from_value(&json!(5)), Some(Numeric::Int(5)));
        assert_eq!(Numeric::from_value(&json!(2.5)), Some(Numeric::Float(2.5)));
        assert_eq!(Numeric::from_value(&json!("10")), Some(Numeric::Int(10)));
        assert_eq!(Numeric::from_value(&json!(true)), None);
        assert_eq!(Numeric::from_value(&json!(null)), None);
        assert_eq!(Numeric::from_value(&json!([1])), None);
    }

    #[test]
    fn test_integer_overflow_widens() {
        let sum = Numeric::Int(i64::MAX) + Numeric::Int(1);
        assert!(matches!(sum, Numeric::Float(_)));
        assert_eq!(Numeric::Int(2) + Numeric::Float(0.5), Numeric::Float(2.5));
        assert_eq!(Numeric::Int(2) - Numeric::Int(5), Numeric::Int(-3));
    }

    #[test]
    fn test_checked_integer_view() {
        assert_eq!(Numeric::Float(-4.9).to_i64(), Some(-4));
        assert_eq!(Numeric::Float(1e20).to_i64(), None);
        assert_eq!(Numeric::Float(f64::NAN).to_i64(), None);
        assert_eq!(Numeric::Int(i64::MAX).to_i64(), Some(i64::MAX));
        assert!(!(Numeric::Float(f64::MAX) + Numeric::Float(f64::MAX)).is_finite());
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Value::from(Numeric::Int(3)), json!(3));
        assert_eq!(Value::from(Numeric::Float(1.5)), json!(1.5));
    }
}
