//! Builtin functions of the stat language

use super::eval::{StatSession, MAX_LENGTH};
use super::value::Value;
use crate::errors::EvalError;

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        return Err(EvalError::recognized(format!(
            "{} arguments passed to '{}' which requires {}",
            args.len(),
            name,
            if min == max { min.to_string() } else { format!("{} to {}", min, max) }
        )));
    }
    Ok(())
}

fn numeric(name: &str, v: &Value) -> Result<Vec<f64>, EvalError> {
    v.as_numeric().ok_or_else(|| {
        EvalError::recognized(format!("non-numeric argument to mathematical function '{}'", name))
    })
}

/// Every argument flattened to numbers, as `sum`, `min` and `max` take them
fn numeric_all(name: &str, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    let mut out = Vec::new();
    for arg in args {
        let xs = arg.as_numeric().ok_or_else(|| {
            EvalError::recognized(format!(
                "invalid 'type' ({}) of argument to '{}'",
                arg.type_name(),
                name
            ))
        })?;
        out.extend(xs);
    }
    Ok(out)
}

fn scalar(name: &str, v: &Value) -> Result<f64, EvalError> {
    numeric(name, v)?
        .first()
        .copied()
        .ok_or_else(|| EvalError::recognized(format!("invalid argument to '{}'", name)))
}

fn map(name: &str, args: &[Value], f: impl Fn(f64) -> f64) -> Result<Value, EvalError> {
    arity(name, args, 1, 1)?;
    Ok(Value::Numeric(numeric(name, &args[0])?.into_iter().map(f).collect()))
}

fn variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64
}

fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

/// `c(...)`: the result takes the most general type among the arguments
fn combine(args: &[Value]) -> Value {
    let args: Vec<&Value> = args.iter().filter(|a| !matches!(a, Value::Null)).collect();
    if args.is_empty() {
        return Value::Null;
    }
    if args.iter().any(|a| matches!(a, Value::Character(_))) {
        return Value::Character(args.iter().flat_map(|a| a.as_strings()).collect());
    }
    if args.iter().all(|a| matches!(a, Value::Logical(_))) {
        let mut out = Vec::new();
        for a in &args {
            if let Value::Logical(v) = a {
                out.extend(v.iter().copied());
            }
        }
        return Value::Logical(out);
    }
    Value::Numeric(args.iter().flat_map(|a| a.as_numeric().unwrap_or_default()).collect())
}

fn seq(args: &[Value]) -> Result<Value, EvalError> {
    arity("seq", args, 1, 3)?;
    let (from, to) = if args.len() == 1 {
        (1.0, scalar("seq", &args[0])?)
    } else {
        (scalar("seq", &args[0])?, scalar("seq", &args[1])?)
    };
    let by = match args.get(2) {
        Some(v) => scalar("seq", v)?,
        None if to >= from => 1.0,
        None => -1.0,
    };
    if by == 0.0 && from != to {
        return Err(EvalError::recognized("invalid '(to - from)/by' in seq(.)"));
    }
    if (to - from) * by < 0.0 {
        return Err(EvalError::recognized("wrong sign in 'by' argument"));
    }
    let steps = if from == to { 0.0 } else { ((to - from) / by + 1e-10).floor() };
    if steps >= MAX_LENGTH {
        return Err(EvalError::recognized("result would be too long a vector"));
    }
    Ok(Value::Numeric((0..=steps as usize).map(|i| from + by * i as f64).collect()))
}

fn rep(args: &[Value]) -> Result<Value, EvalError> {
    arity("rep", args, 1, 2)?;
    let times = match args.get(1) {
        Some(v) => scalar("rep", v)?,
        None => 1.0,
    };
    if times < 0.0 || !times.is_finite() {
        return Err(EvalError::recognized("invalid 'times' argument"));
    }
    let n = args[0].len();
    if n == 0 {
        return Ok(args[0].select(&[]));
    }
    if times.floor() * n as f64 > MAX_LENGTH {
        return Err(EvalError::recognized("result would be too long a vector"));
    }
    let indices: Vec<usize> = (0..times as usize).flat_map(|_| 0..n).collect();
    Ok(args[0].select(&indices))
}

fn paste(args: &[Value]) -> Value {
    let parts: Vec<Vec<String>> = args.iter().map(|a| a.as_strings()).filter(|p| !p.is_empty()).collect();
    let n = parts.iter().map(|p| p.len()).max().unwrap_or(0);
    Value::Character(
        (0..n)
            .map(|i| parts.iter().map(|p| p[i % p.len()].as_str()).collect::<Vec<_>>().join(" "))
            .collect(),
    )
}

impl StatSession {
    pub(super) fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        match name {
            "c" => Ok(combine(&args)),
            "length" => {
                arity(name, &args, 1, 1)?;
                Ok(Value::from(args[0].len() as f64))
            }
            "sum" => Ok(Value::from(numeric_all(name, &args)?.iter().sum::<f64>())),
            "min" => Ok(Value::from(numeric_all(name, &args)?.into_iter().fold(f64::INFINITY, f64::min))),
            "max" => Ok(Value::from(
                numeric_all(name, &args)?.into_iter().fold(f64::NEG_INFINITY, f64::max),
            )),
            "mean" => {
                arity(name, &args, 1, 1)?;
                let xs = args[0]
                    .as_numeric()
                    .ok_or_else(|| EvalError::recognized("argument is not numeric or logical"))?;
                Ok(Value::from(xs.iter().sum::<f64>() / xs.len() as f64))
            }
            "median" => {
                arity(name, &args, 1, 1)?;
                Ok(Value::from(median(numeric(name, &args[0])?)))
            }
            "var" => {
                arity(name, &args, 1, 1)?;
                Ok(Value::from(variance(&numeric(name, &args[0])?)))
            }
            "sd" => {
                arity(name, &args, 1, 1)?;
                Ok(Value::from(variance(&numeric(name, &args[0])?).sqrt()))
            }
            "sqrt" => map(name, &args, f64::sqrt),
            "abs" => map(name, &args, f64::abs),
            "exp" => map(name, &args, f64::exp),
            "log" => {
                arity(name, &args, 1, 2)?;
                let base = match args.get(1) {
                    Some(b) => scalar(name, b)?,
                    None => std::f64::consts::E,
                };
                Ok(Value::Numeric(numeric(name, &args[0])?.into_iter().map(|x| x.log(base)).collect()))
            }
            "round" => {
                arity(name, &args, 1, 2)?;
                let digits = match args.get(1) {
                    Some(d) => scalar(name, d)?,
                    None => 0.0,
                };
                let scale = 10f64.powi(digits as i32);
                Ok(Value::Numeric(
                    numeric(name, &args[0])?
                        .into_iter()
                        .map(|x| (x * scale).round_ties_even() / scale)
                        .collect(),
                ))
            }
            "seq" => seq(&args),
            "rep" => rep(&args),
            "paste" => Ok(paste(&args)),
            "print" => {
                arity(name, &args, 1, 1)?;
                self.write(&args[0].render());
                Ok(args[0].clone())
            }
            "cat" => {
                let text: Vec<String> = args.iter().flat_map(|a| a.as_strings()).collect();
                self.write(&text.join(" "));
                Ok(Value::Null)
            }
            "ls" => {
                arity(name, &args, 0, 0)?;
                Ok(Value::Character(self.globals().keys().cloned().collect()))
            }
            _ => Err(EvalError::recognized(format!("could not find function \"{}\"", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn run(src: &str) -> Result<Value, EvalError> {
        StatSession::new().parse_eval(src)
    }

    #[test]
    fn summaries() {
        assert_eq!(run("sum(1:10)").unwrap(), Value::from(55.0));
        assert_eq!(run("mean(c(1, 2, 3, 4))").unwrap(), Value::from(2.5));
        assert_eq!(run("median(c(5, 1, 3))").unwrap(), Value::from(3.0));
        assert_eq!(run("max(1, c(7, 2))").unwrap(), Value::from(7.0));
        assert_eq!(run("var(c(2, 4, 4, 4, 5, 5, 7, 9))").unwrap(), Value::from(32.0 / 7.0));
        assert_eq!(run("length(NULL)").unwrap(), Value::from(0.0));
    }

    #[test]
    fn oversized_repeats_are_refused() {
        let too_long = Err(EvalError::recognized("result would be too long a vector"));
        assert_eq!(run("rep(1, 1e12)"), too_long);
        assert_eq!(run("rep(c(1, 2), 6e6)"), too_long);
        assert_eq!(run("rep(1, 1e300)"), too_long);
        assert_eq!(run("length(rep(c(1, 2), 5e5))").unwrap(), Value::Numeric(vec![1e6]));
        assert_eq!(run("rep(NULL, 1e12)").unwrap(), Value::Null);
    }

    #[test]
    fn combine_promotes_types() {
        assert_eq!(run("c(1, TRUE)").unwrap(), Value::Numeric(vec![1.0, 1.0]));
        assert_eq!(run("c(1, \"a\")").unwrap(), Value::Character(vec!["1".into(), "a".into()]));
        assert_eq!(run("c()").unwrap(), Value::Null);
    }

    #[test]
    fn sequences() {
        assert_eq!(run("seq(0, 1, 0.25)").unwrap(), Value::Numeric(vec![0.0, 0.25, 0.5, 0.75, 1.0]));
        assert_eq!(run("seq(3)").unwrap(), Value::Numeric(vec![1.0, 2.0, 3.0]));
        assert_eq!(run("rep(c(1, 2), 2)").unwrap(), Value::Numeric(vec![1.0, 2.0, 1.0, 2.0]));
        assert_eq!(run("rep(\"a\", 0)").unwrap(), Value::Character(vec![]));
        assert_eq!(
            run("seq(1, 5, -1)"),
            Err(EvalError::recognized("wrong sign in 'by' argument"))
        );
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(run("round(c(0.5, 1.5, 2.5))").unwrap(), Value::Numeric(vec![0.0, 2.0, 2.0]));
        assert_eq!(run("round(pi, 2)").unwrap(), Value::from(3.14));
    }

    #[test]
    fn text_functions() {
        assert_eq!(
            run("paste(\"x\", 1:2)").unwrap(),
            Value::Character(vec!["x 1".into(), "x 2".into()])
        );
        let mut s = StatSession::new();
        assert_eq!(s.parse_eval("cat(\"a\", 1.5)").unwrap(), Value::Null);
        assert_eq!(s.take_output(), "a 1.5");
        s.parse_eval("print(2)").unwrap();
        assert_eq!(s.take_output(), "[1] 2\n");
    }

    #[test]
    fn ls_lists_globals() {
        let mut s = StatSession::new();
        s.parse_eval("b <- 1; a <- 2").unwrap();
        assert_eq!(
            s.parse_eval("ls()").unwrap(),
            Value::Character(vec!["a".into(), "b".into(), "pi".into()])
        );
    }

    #[test]
    fn call_errors() {
        assert_eq!(run("nosuch(1)"), Err(EvalError::recognized("could not find function \"nosuch\"")));
        assert_eq!(
            run("length(1, 2)"),
            Err(EvalError::recognized("2 arguments passed to 'length' which requires 1"))
        );
        assert_eq!(
            run("sum(\"a\")"),
            Err(EvalError::recognized("invalid 'type' (character) of argument to 'sum'"))
        );
    }

    #[test]
    fn every_builtin_is_dispatched() {
        let names = [
            "abs", "c", "cat", "exp", "length", "log", "ls", "max", "mean", "median", "min",
            "paste", "print", "rep", "round", "sd", "seq", "sqrt", "sum", "var",
        ];
        let mut s = StatSession::new();
        for name in names {
            let err = s.call(name, Vec::new()).err();
            assert_ne!(
                err,
                Some(EvalError::recognized(format!("could not find function \"{}\"", name)))
            );
        }
    }
}
