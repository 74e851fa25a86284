//! Runtime values of the stat language
//!
//! Everything is a vector. Scalars are vectors of length one, and `NULL`
//! is the empty object.

use std::fmt;

use super::format;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Numeric(Vec<f64>),
    Character(Vec<String>),
    Logical(Vec<bool>),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Numeric(vec![v])
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(vec![v])
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Character(vec![v.to_string()])
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Character(vec![v])
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Numeric(_) => "numeric",
            Value::Character(_) => "character",
            Value::Logical(_) => "logical",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Numeric(v) => v.len(),
            Value::Character(v) => v.len(),
            Value::Logical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numbers behind a numeric or logical value; `None` for characters
    pub fn as_numeric(&self) -> Option<Vec<f64>> {
        match self {
            Value::Null => Some(Vec::new()),
            Value::Numeric(v) => Some(v.clone()),
            Value::Logical(v) => Some(v.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect()),
            Value::Character(_) => None,
        }
    }

    /// Elements as unquoted text, as `cat` and `paste` see them
    pub fn as_strings(&self) -> Vec<String> {
        match self {
            Value::Null => Vec::new(),
            Value::Numeric(v) => v.iter().map(|x| format::number(*x)).collect(),
            Value::Character(v) => v.clone(),
            Value::Logical(v) => v.iter().map(|b| format::logical(*b).to_string()).collect(),
        }
    }

    /// Elements `indices` (0-based) of this value, keeping its type
    pub fn select(&self, indices: &[usize]) -> Value {
        fn pick<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().filter_map(|i| v.get(*i).cloned()).collect()
        }
        match self {
            Value::Null => Value::Null,
            Value::Numeric(v) => Value::Numeric(pick(v, indices)),
            Value::Character(v) => Value::Character(pick(v, indices)),
            Value::Logical(v) => Value::Logical(pick(v, indices)),
        }
    }

    /// Printed form, one trailing newline included
    pub fn render(&self) -> String {
        let mut out = format::print_lines(self).join("\n");
        out.push('\n');
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format::print_lines(self).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_coerces_to_numbers() {
        let v = Value::Logical(vec![true, false]);
        assert_eq!(v.as_numeric(), Some(vec![1.0, 0.0]));
        assert_eq!(Value::from("a").as_numeric(), None);
    }

    #[test]
    fn select_keeps_type() {
        let v = Value::Character(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(v.select(&[2, 0, 9]), Value::Character(vec!["c".into(), "a".into()]));
    }

    #[test]
    fn render_has_trailing_newline() {
        assert_eq!(Value::from(2.0).render(), "[1] 2\n");
        assert_eq!(Value::from(2.0).to_string(), "[1] 2");
    }
}
