//! Score values as they arrive over the wire.
//!
//! A grade's `value` is kept exactly as received (JSON number or string) so
//! the persisted document round-trips untouched. Arithmetic goes through two
//! readings of it: [`GradeValue::as_integer`] for sums and averages, and
//! [`GradeValue::as_number`] for ordering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeValue(pub Value);

impl GradeValue {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Integer reading with leading-prefix semantics: optional whitespace,
    /// optional sign, then decimal digits. `"15"`, `" 15 "`, `"15pts"` and
    /// `15.9` all read as 15. Anything without an integer prefix is NaN.
    pub fn as_integer(&self) -> f64 {
        match &self.0 {
            Value::Number(n) => match n.as_i64() {
                Some(i) => i as f64,
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(f64::trunc)
                    .unwrap_or(f64::NAN),
            },
            Value::String(s) => parse_int_prefix(s),
            _ => f64::NAN,
        }
    }

    /// Full numeric reading: a JSON number, or a string that is entirely a
    /// finite decimal number. `None` for everything else.
    pub fn as_number(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b)) {
                    return None;
                }
                s.parse::<f64>().ok().filter(|f| f.is_finite())
            }
            _ => None,
        }
    }
}

impl From<i64> for GradeValue {
    fn from(v: i64) -> Self {
        GradeValue(Value::from(v))
    }
}

impl From<i32> for GradeValue {
    fn from(v: i32) -> Self {
        GradeValue(Value::from(v))
    }
}

impl From<f64> for GradeValue {
    fn from(v: f64) -> Self {
        GradeValue(Value::from(v))
    }
}

impl From<&str> for GradeValue {
    fn from(v: &str) -> Self {
        GradeValue(Value::from(v))
    }
}

fn parse_int_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut seen = false;
    let mut acc = 0f64;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        acc = acc * 10.0 + f64::from(b - b'0');
    }
    match (seen, negative) {
        (false, _) => f64::NAN,
        (true, true) => -acc,
        (true, false) => acc,
    }
}
