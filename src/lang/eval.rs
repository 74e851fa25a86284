//! Tree-walking evaluator and the [`Session`] built on it

use std::collections::BTreeMap;

use super::parser::{parse, BinOp, Expr, UnaryOp};
use super::value::Value;
use crate::errors::EvalError;
use crate::session::Session;

/// Longest vector `a:b`, `seq` or `rep` may build
pub(super) const MAX_LENGTH: f64 = 10_000_000.0;

/// Interpreter state for the built-in statistics language
pub struct StatSession {
    globals: BTreeMap<String, Value>,
    output: String,
}

impl Default for StatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StatSession {
    pub fn new() -> Self {
        let mut globals = BTreeMap::new();
        globals.insert("pi".to_string(), Value::from(std::f64::consts::PI));
        StatSession { globals, output: String::new() }
    }

    pub(super) fn globals(&self) -> &BTreeMap<String, Value> {
        &self.globals
    }

    pub(super) fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Num(n) => Ok(Value::from(*n)),
            Expr::Str(s) => Ok(Value::from(s.as_str())),
            Expr::Bool(b) => Ok(Value::from(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Ident(name) => self
                .globals
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::recognized(format!("object '{}' not found", name))),
            Expr::Assign(name, value) => {
                let value = self.eval(value)?;
                self.globals.insert(name.clone(), value.clone());
                Ok(value)
            }
            Expr::Unary(op, operand) => {
                let operand = self.eval(operand)?;
                unary(*op, &operand)
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                binary(*op, &lhs, &rhs)
            }
            Expr::Call(name, args) => {
                let args = args.iter().map(|a| self.eval(a)).collect::<Result<Vec<_>, _>>()?;
                self.call(name, args)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                subset(&target, &index)
            }
        }
    }
}

impl Session for StatSession {
    fn language(&self) -> &str {
        "Stat"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn assign(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    fn parse_eval(&mut self, source: &str) -> Result<Value, EvalError> {
        let statements = parse(source)?;
        let mut last = Value::Null;
        for statement in &statements {
            last = self.eval(statement)?;
        }
        Ok(last)
    }

    fn print(&mut self, value: &Value) {
        self.output.push_str(&value.render());
    }

    fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    let xs = operand
        .as_numeric()
        .ok_or_else(|| EvalError::recognized("invalid argument to unary operator"))?;
    Ok(match op {
        UnaryOp::Neg => Value::Numeric(xs.iter().map(|x| -x).collect()),
        UnaryOp::Plus => Value::Numeric(xs),
        UnaryOp::Not => Value::Logical(xs.iter().map(|x| *x == 0.0).collect()),
    })
}

/// Apply `f` pairwise, recycling the shorter side
fn recycle<A, B, R>(a: &[A], b: &[B], f: impl Fn(&A, &B) -> R) -> Vec<R> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let n = a.len().max(b.len());
    (0..n).map(|i| f(&a[i % a.len()], &b[i % b.len()])).collect()
}

fn binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Range => range(lhs, rhs),
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, lhs, rhs),
        _ => {
            let (a, b) = match (lhs.as_numeric(), rhs.as_numeric()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(EvalError::recognized("non-numeric argument to binary operator")),
            };
            let f: fn(&f64, &f64) -> f64 = match op {
                BinOp::Add => |x: &f64, y: &f64| x + y,
                BinOp::Sub => |x: &f64, y: &f64| x - y,
                BinOp::Mul => |x: &f64, y: &f64| x * y,
                BinOp::Div => |x: &f64, y: &f64| x / y,
                BinOp::Pow => |x: &f64, y: &f64| x.powf(*y),
                _ => |x: &f64, y: &f64| x - (x / y).floor() * y,
            };
            Ok(Value::Numeric(recycle(&a, &b, f)))
        }
    }
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    fn test<T: PartialOrd>(op: BinOp, a: &T, b: &T) -> bool {
        match op {
            BinOp::Eq => a == b,
            BinOp::Ne => a != b,
            BinOp::Lt => a < b,
            BinOp::Le => a <= b,
            BinOp::Gt => a > b,
            _ => a >= b,
        }
    }
    let result = match (lhs.as_numeric(), rhs.as_numeric()) {
        (Some(a), Some(b)) => recycle(&a, &b, |x, y| test(op, x, y)),
        _ => recycle(&lhs.as_strings(), &rhs.as_strings(), |x, y| test(op, x, y)),
    };
    Ok(Value::Logical(result))
}

fn range(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let first = |v: &Value| -> Result<f64, EvalError> {
        let xs = v
            .as_numeric()
            .ok_or_else(|| EvalError::recognized("NA/NaN argument"))?;
        match xs.first() {
            Some(x) if x.is_finite() => Ok(*x),
            Some(_) => Err(EvalError::recognized("NA/NaN argument")),
            None => Err(EvalError::recognized("argument of length 0")),
        }
    };
    let from = first(lhs)?;
    let to = first(rhs)?;
    let count = (to - from).abs().floor();
    if count >= MAX_LENGTH {
        return Err(EvalError::recognized("result would be too long a vector"));
    }
    let step = if to >= from { 1.0 } else { -1.0 };
    Ok(Value::Numeric((0..=count as usize).map(|i| from + step * i as f64).collect()))
}

/// `target[index]` with 1-based, negative (drop) or logical subscripts
fn subset(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let n = target.len();
    let picked: Vec<usize> = match index {
        Value::Logical(mask) => {
            if mask.is_empty() {
                Vec::new()
            } else {
                (0..n).filter(|i| mask[i % mask.len()]).collect()
            }
        }
        other => {
            let xs = other
                .as_numeric()
                .ok_or_else(|| EvalError::recognized("invalid subscript type 'character'"))?;
            let positive = xs.iter().any(|x| *x >= 1.0);
            let negative = xs.iter().any(|x| *x <= -1.0);
            if positive && negative {
                return Err(EvalError::recognized(
                    "can't mix positive and negative subscripts",
                ));
            }
            if negative {
                let dropped: Vec<usize> =
                    xs.iter().filter(|x| **x <= -1.0).map(|x| (-x) as usize - 1).collect();
                (0..n).filter(|i| !dropped.contains(i)).collect()
            } else {
                let mut picked = Vec::new();
                for x in xs.iter().filter(|x| **x >= 1.0) {
                    let i = *x as usize - 1;
                    if i >= n {
                        return Err(EvalError::recognized("subscript out of bounds"));
                    }
                    picked.push(i);
                }
                picked
            }
        }
    };
    Ok(target.select(&picked))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Result<Value, EvalError> {
        StatSession::new().parse_eval(src)
    }

    fn num(src: &str) -> Vec<f64> {
        match run(src).unwrap() {
            Value::Numeric(v) => v,
            other => panic!("expected numeric, got {:?}", other),
        }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(num("1+1"), vec![2.0]);
        assert_eq!(num("2 * 3 + 4"), vec![10.0]);
        assert_eq!(num("-2^2"), vec![-4.0]);
        assert_eq!(num("2^-1"), vec![0.5]);
        assert_eq!(num("-7 %% 3"), vec![2.0]);
        assert_eq!(num("(1 + 2) * 3"), vec![9.0]);
    }

    #[test]
    fn vectors_recycle() {
        assert_eq!(num("1:4 * 2"), vec![2.0, 4.0, 6.0, 8.0]);
        assert_eq!(num("c(1, 2, 3, 4) + c(10, 20)"), vec![11.0, 22.0, 13.0, 24.0]);
        assert_eq!(num("3:1"), vec![3.0, 2.0, 1.0]);
        assert_eq!(num("NULL + 1"), Vec::<f64>::new());
    }

    #[test]
    fn assignment_persists() {
        let mut s = StatSession::new();
        assert_eq!(s.parse_eval("x <- 5").unwrap(), Value::from(5.0));
        assert_eq!(s.parse_eval("x = x * 2; x + 1").unwrap(), Value::from(11.0));
    }

    #[test]
    fn missing_object() {
        assert_eq!(run("nope"), Err(EvalError::recognized("object 'nope' not found")));
    }

    #[test]
    fn type_errors() {
        assert_eq!(
            run("\"a\" + 1"),
            Err(EvalError::recognized("non-numeric argument to binary operator"))
        );
        assert_eq!(run("-\"a\""), Err(EvalError::recognized("invalid argument to unary operator")));
    }

    #[test]
    fn comparisons() {
        assert_eq!(run("1:3 > 1").unwrap(), Value::Logical(vec![false, true, true]));
        assert_eq!(run("\"b\" == c(\"a\", \"b\")").unwrap(), Value::Logical(vec![false, true]));
        assert_eq!(run("!c(TRUE, FALSE)").unwrap(), Value::Logical(vec![false, true]));
    }

    #[test]
    fn subsetting() {
        assert_eq!(num("(10:15)[2]"), vec![11.0]);
        assert_eq!(num("x <- 1:5; x[-1]"), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(num("x <- 1:5; x[x > 3]"), vec![4.0, 5.0]);
        assert_eq!(run("(1:3)[4]"), Err(EvalError::recognized("subscript out of bounds")));
        assert_eq!(
            run("(1:3)[c(1, -2)]"),
            Err(EvalError::recognized("can't mix positive and negative subscripts"))
        );
    }

    #[test]
    fn huge_ranges_are_refused() {
        assert_eq!(run("1:1e9"), Err(EvalError::recognized("result would be too long a vector")));
    }

    #[test]
    fn pasted_long_sums_fail_without_crashing() {
        assert_eq!(run(&format!("1{}", "+1".repeat(20_000))), Err(EvalError::Opaque));
        assert_eq!(num(&format!("1{}", "+1".repeat(99))), vec![100.0]);
    }

    #[test]
    fn print_goes_to_output() {
        let mut s = StatSession::new();
        let value = s.parse_eval("1:3").unwrap();
        s.print(&value);
        assert_eq!(s.take_output(), "[1] 1 2 3\n");
        assert_eq!(s.take_output(), "");
    }

    #[test]
    fn bindings_are_visible() {
        let mut s = StatSession::new();
        s.assign("session.user", Value::from("ann"));
        assert_eq!(s.parse_eval("session.user").unwrap(), Value::from("ann"));
    }
}
