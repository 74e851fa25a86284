//! Printing values the way an R prompt does

use super::value::Value;

/// Significant digits shown for numbers
const DIGITS: i32 = 7;
/// Console width used when wrapping long vectors
const WIDTH: usize = 80;

pub fn logical(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn needs_scientific(x: f64) -> bool {
    let e = x.abs().log10().floor() as i32;
    !(-5..15).contains(&e)
}

/// Scientific form with an R-style exponent, e.g. `1.5e+10`, `1e-05`
fn scientific(x: f64) -> String {
    let raw = format!("{:.*e}", (DIGITS - 1) as usize, x);
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Decimals needed to show `x` with `DIGITS` significant digits
fn decimals(x: f64) -> usize {
    if x == 0.0 || !x.is_finite() {
        return 0;
    }
    let e = x.abs().log10().floor() as i32;
    let fixed = format!("{:.*}", (DIGITS - 1 - e).max(0) as usize, x);
    trim_zeros(&fixed).split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

fn special(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("NaN".into())
    } else if x.is_infinite() {
        Some(if x > 0.0 { "Inf".into() } else { "-Inf".into() })
    } else if x == 0.0 {
        Some("0".into())
    } else {
        None
    }
}

/// A single number on its own
pub fn number(x: f64) -> String {
    if let Some(s) = special(x) {
        return s;
    }
    if needs_scientific(x) {
        return scientific(x);
    }
    format!("{:.*}", decimals(x), x)
}

/// Numbers sharing one decimal count, as in a printed vector
fn numbers(xs: &[f64]) -> Vec<String> {
    let shared = xs
        .iter()
        .filter(|x| x.is_finite() && *x != &0.0 && !needs_scientific(**x))
        .map(|x| decimals(*x))
        .max()
        .unwrap_or(0);
    xs.iter()
        .map(|x| match special(*x) {
            Some(s) if *x != 0.0 => s,
            _ if x.is_finite() && *x != 0.0 && needs_scientific(*x) => scientific(*x),
            _ => format!("{:.*}", shared, x),
        })
        .collect()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Lay out `items` in rows prefixed by `[i]` labels
fn wrap(items: Vec<String>, left_align: bool) -> Vec<String> {
    let item_width = items.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let label_width = format!("[{}]", items.len()).len();
    let per_row = ((WIDTH - label_width) / (item_width + 1)).max(1);

    items
        .chunks(per_row)
        .enumerate()
        .map(|(row, chunk)| {
            let label = format!("[{}]", row * per_row + 1);
            let mut line = format!("{:>width$}", label, width = label_width);
            for item in chunk {
                line.push(' ');
                if left_align {
                    line.push_str(&format!("{:<width$}", item, width = item_width));
                } else {
                    line.push_str(&format!("{:>width$}", item, width = item_width));
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Lines printed for `value`, without trailing newlines
pub fn print_lines(value: &Value) -> Vec<String> {
    if value.is_empty() {
        let empty = match value {
            Value::Null => "NULL".to_string(),
            other => format!("{}(0)", other.type_name()),
        };
        return vec![empty];
    }
    match value {
        Value::Null => vec!["NULL".into()],
        Value::Numeric(v) => wrap(numbers(v), false),
        Value::Character(v) => wrap(v.iter().map(|s| quote(s)).collect(), true),
        Value::Logical(v) => wrap(v.iter().map(|b| logical(*b).to_string()).collect(), false),
    }
}
