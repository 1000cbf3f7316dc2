//! Literal expressions.
//!
//! Directive values are either state property names or literals. This
//! module recognises the literal forms: `true`, `false`, `null`,
//! `undefined`, `NaN`, numbers, and single or double quoted strings.
//! `undefined` and `NaN` have no JSON form and parse to `null`.

use serde_json::{Number, Value};

/// Parse `expr` as a literal. `None` means it is not one.
///
/// Numbers follow the leading-prefix rule: `"12px"` parses as `12`.
pub fn parse_literal(expr: &str) -> Option<Value> {
    match expr {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" | "undefined" | "NaN" => return Some(Value::Null),
        _ => {}
    }
    if let Some(number) = parse_number_prefix(expr) {
        return Some(number);
    }
    quoted(expr).map(|s| Value::String(s.to_owned()))
}

fn quoted(expr: &str) -> Option<&str> {
    let mut chars = expr.chars();
    let open = chars.next()?;
    if (open != '\'' && open != '"') || expr.len() < 2 || !expr.ends_with(open) {
        return None;
    }
    Some(&expr[1..expr.len() - 1])
}

/// Longest prefix of `expr` (after leading whitespace) that reads as a
/// decimal float.
fn parse_number_prefix(expr: &str) -> Option<Value> {
    let s = expr.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        // No JSON form for infinities.
        return Some(Value::Null);
    }

    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_start;
        if mantissa_digits > 0 {
            end = fraction_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let parsed: f64 = s[..end].parse().ok()?;
    Some(number_value(parsed))
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}
