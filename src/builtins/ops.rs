//! Operator primitives the compiler desugars infix syntax into.
//!
//! Integer arithmetic stays integral while it is exact and does not
//! overflow; anything else falls back to floats.

use std::cmp::Ordering;
use std::rc::Rc;

use super::{arg0, arg2, Registry};
use crate::error::CoreError;
use crate::operations::{compare, deep_merge};
use crate::value::{Number, Value};

pub fn register(registry: &mut Registry) {
    registry.register(arg0("_plus", plus));
    registry.register(arg0("_negate", negate));
    registry.register(arg2("_add", |_, l, r| add(l, r)));
    registry.register(arg2("_subtract", |_, l, r| subtract(l, r)));
    registry.register(arg2("_multiply", |_, l, r| multiply(l, r)));
    registry.register(arg2("_divide", |_, l, r| divide(l, r)));
    registry.register(arg2("_modulo", |_, l, r| modulo(l, r)));
    registry.register(arg2("_alternative", |_, l, r| {
        Ok(if l.is_truthy() { l.clone() } else { r.clone() })
    }));
    registry.register(arg2("_equal", |_, l, r| Ok(Value::Bool(l == r))));
    registry.register(arg2("_notequal", |_, l, r| Ok(Value::Bool(l != r))));
    registry.register(arg2("_greater", |_, l, r| {
        Ok(Value::Bool(compare(l, r) == Ordering::Greater))
    }));
    registry.register(arg2("_less", |_, l, r| {
        Ok(Value::Bool(compare(l, r) == Ordering::Less))
    }));
    registry.register(arg2("_greatereq", |_, l, r| {
        Ok(Value::Bool(compare(l, r) != Ordering::Less))
    }));
    registry.register(arg2("_lesseq", |_, l, r| {
        Ok(Value::Bool(compare(l, r) != Ordering::Greater))
    }));
}

fn binop_error(op: &'static str, l: &Value, r: &Value) -> CoreError {
    CoreError::BinaryType {
        op,
        lhs: l.clone(),
        rhs: r.clone(),
    }
}

/// Integer path when both sides are `Int` and `int` succeeds, float path otherwise.
fn arith(
    a: Number,
    b: Number,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Value {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(n) = int(x, y) {
            return Value::int(n);
        }
    }
    Value::float(float(a.as_f64(), b.as_f64()))
}

pub fn plus(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::Number(_) => Ok(v.clone()),
        _ => Err(CoreError::UnaryType {
            op: "plus",
            value: v.clone(),
        }),
    }
}

pub fn negate(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::Number(Number::Int(i)) => Ok(match i.checked_neg() {
            Some(n) => Value::int(n),
            None => Value::float(-(*i as f64)),
        }),
        Value::Number(Number::Float(f)) => Ok(Value::float(-f)),
        _ => Err(CoreError::UnaryType {
            op: "negate",
            value: v.clone(),
        }),
    }
}

pub fn add(l: &Value, r: &Value) -> Result<Value, CoreError> {
    match (l, r) {
        (Value::Null, _) => Ok(r.clone()),
        (_, Value::Null) => Ok(l.clone()),
        (Value::Number(a), Value::Number(b)) => Ok(arith(*a, *b, i64::checked_add, |x, y| x + y)),
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::Array(a), Value::Array(b)) => {
            let mut items = Rc::clone(a);
            Rc::make_mut(&mut items).extend(b.iter().cloned());
            Ok(Value::Array(items))
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut map = Rc::clone(a);
            let m = Rc::make_mut(&mut map);
            for (k, v) in b.iter() {
                m.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(map))
        }
        _ => Err(binop_error("add", l, r)),
    }
}

pub fn subtract(l: &Value, r: &Value) -> Result<Value, CoreError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(arith(*a, *b, i64::checked_sub, |x, y| x - y)),
        (Value::Array(a), Value::Array(b)) => Ok(Value::array(
            a.iter()
                .filter(|x| !b.iter().any(|y| compare(x, y) == Ordering::Equal))
                .cloned()
                .collect(),
        )),
        _ => Err(binop_error("subtract", l, r)),
    }
}

pub fn multiply(l: &Value, r: &Value) -> Result<Value, CoreError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(arith(*a, *b, i64::checked_mul, |x, y| x * y)),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            repeat(s, *n)
        }
        (Value::Object(_), Value::Object(_)) => Ok(deep_merge(l, r)),
        _ => Err(binop_error("multiply", l, r)),
    }
}

/// Longest string, in bytes, that `repeat` may build.
pub const MAX_REPEAT_LEN: usize = 1 << 29;

/// `"ab" * 3`; a count below one yields `null`.
fn repeat(s: &str, n: Number) -> Result<Value, CoreError> {
    let count = n.to_i64();
    if count <= 0 {
        return Ok(Value::Null);
    }
    let too_long = || CoreError::RepeatTooLong(count);
    let count = usize::try_from(count).map_err(|_| too_long())?;
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(Value::String(s.repeat(count))),
        _ => Err(too_long()),
    }
}

pub fn divide(l: &Value, r: &Value) -> Result<Value, CoreError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            if b.as_f64() == 0.0 {
                return Err(CoreError::ZeroDivision {
                    lhs: l.clone(),
                    rhs: r.clone(),
                });
            }
            Ok(arith(
                *a,
                *b,
                |x, y| if x.checked_rem(y)? == 0 { x.checked_div(y) } else { None },
                |x, y| x / y,
            ))
        }
        (Value::String(a), Value::String(sep)) => Ok(split(a, sep)),
        _ => Err(binop_error("divide", l, r)),
    }
}

fn split(s: &str, sep: &str) -> Value {
    if s.is_empty() {
        return Value::array(Vec::new());
    }
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::from).collect()
    };
    Value::array(parts)
}

/// Both sides are truncated to integers first; the sign follows the dividend.
pub fn modulo(l: &Value, r: &Value) -> Result<Value, CoreError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            let (x, y) = (a.to_i64(), b.to_i64());
            if y == 0 {
                return Err(CoreError::ZeroModulo {
                    lhs: l.clone(),
                    rhs: r.clone(),
                });
            }
            Ok(Value::int(x.checked_rem(y).unwrap_or(0)))
        }
        _ => Err(binop_error("modulo", l, r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::call;

    fn v(text: &str) -> Value {
        Value::from_json(text).unwrap()
    }

    #[test]
    fn test_add() {
        assert!(add(&Value::int(1), &Value::int(2)).unwrap().is_int());
        assert_eq!(add(&Value::int(1), &Value::float(0.5)).unwrap(), Value::float(1.5));
        assert!(!add(&Value::int(i64::MAX), &Value::int(1)).unwrap().is_int());
        assert_eq!(add(&Value::Null, &Value::from("a")).unwrap(), Value::from("a"));
        assert_eq!(add(&Value::from("a"), &Value::from("b")).unwrap(), Value::from("ab"));
        assert_eq!(add(&v("[1]"), &v("[2]")).unwrap(), v("[1,2]"));
        assert_eq!(add(&v(r#"{"a":1,"b":1}"#), &v(r#"{"b":2}"#)).unwrap(), v(r#"{"a":1,"b":2}"#));
        assert!(matches!(add(&Value::int(1), &Value::from("a")), Err(CoreError::BinaryType { op: "add", .. })));
    }

    #[test]
    fn test_add_leaves_inputs_alone() {
        let a = v("[1]");
        let _ = add(&a, &v("[2]")).unwrap();
        assert_eq!(a, v("[1]"));
    }

    #[test]
    fn test_subtract() {
        assert_eq!(subtract(&Value::int(5), &Value::int(7)).unwrap(), Value::int(-2));
        assert_eq!(subtract(&v("[1,2,3,1]"), &v("[1]")).unwrap(), v("[2,3]"));
        assert!(subtract(&Value::from("a"), &Value::from("a")).is_err());
    }

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(&Value::int(6), &Value::int(7)).unwrap(), Value::int(42));
        assert_eq!(multiply(&Value::from("ab"), &Value::int(3)).unwrap(), Value::from("ababab"));
        assert_eq!(multiply(&Value::from("ab"), &Value::int(0)).unwrap(), Value::Null);
        assert_eq!(multiply(&Value::int(2), &Value::from("ab")).unwrap(), Value::from("abab"));
        assert_eq!(
            multiply(&v(r#"{"a":{"x":1}}"#), &v(r#"{"a":{"y":2}}"#)).unwrap(),
            v(r#"{"a":{"x":1,"y":2}}"#)
        );
    }

    #[test]
    fn test_multiply_huge_repeat_is_an_error() {
        let err = multiply(&Value::from("ab"), &Value::float(9.0e18)).unwrap_err();
        assert!(matches!(err, CoreError::RepeatTooLong(_)));
        assert_eq!(err.to_string(), "repeat string result too long");
        let err = call("_multiply", &Value::Null, &[Value::from("ab"), Value::int(i64::MAX)]).unwrap_err();
        assert!(matches!(err, crate::error::CallError::Value(CoreError::RepeatTooLong(_))));
        let too_many = (MAX_REPEAT_LEN / 2 + 1) as i64;
        assert!(multiply(&Value::from("ab"), &Value::int(too_many)).is_err());
        assert_eq!(multiply(&Value::from(""), &Value::int(i64::MAX)).unwrap(), Value::from(""));
    }

    #[test]
    fn test_divide() {
        assert!(divide(&Value::int(6), &Value::int(3)).unwrap().is_int());
        assert_eq!(divide(&Value::int(7), &Value::int(2)).unwrap(), Value::float(3.5));
        assert!(matches!(divide(&Value::int(1), &Value::int(0)), Err(CoreError::ZeroDivision { .. })));
        assert_eq!(divide(&Value::from("a,b"), &Value::from(",")).unwrap(), v(r#"["a","b"]"#));
        assert_eq!(divide(&Value::from("ab"), &Value::from("")).unwrap(), v(r#"["a","b"]"#));
        assert_eq!(divide(&Value::from(""), &Value::from(",")).unwrap(), v("[]"));
    }

    #[test]
    fn test_modulo() {
        assert_eq!(modulo(&Value::int(7), &Value::int(3)).unwrap(), Value::int(1));
        assert_eq!(modulo(&Value::int(-7), &Value::int(3)).unwrap(), Value::int(-1));
        assert_eq!(modulo(&Value::float(7.9), &Value::int(3)).unwrap(), Value::int(1));
        assert_eq!(modulo(&Value::int(i64::MIN), &Value::int(-1)).unwrap(), Value::int(0));
        assert!(matches!(modulo(&Value::int(1), &Value::float(0.5)), Err(CoreError::ZeroModulo { .. })));
    }

    #[test]
    fn test_unary() {
        assert_eq!(negate(&Value::int(3)).unwrap(), Value::int(-3));
        assert_eq!(plus(&Value::float(1.5)).unwrap(), Value::float(1.5));
        assert!(matches!(negate(&Value::from("a")), Err(CoreError::UnaryType { op: "negate", .. })));
    }

    #[test]
    fn test_comparisons_and_alternative() {
        assert_eq!(call("_less", &Value::Null, &[Value::int(1), Value::from("a")]).unwrap(), Value::Bool(true));
        assert_eq!(call("_greatereq", &Value::Null, &[Value::int(1), Value::float(1.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("_equal", &Value::Null, &[Value::int(1), Value::float(1.0)]).unwrap(), Value::Bool(true));
        assert_eq!(call("_notequal", &Value::Null, &[v("[1]"), v("[2]")]).unwrap(), Value::Bool(true));
        assert_eq!(call("_alternative", &Value::Null, &[Value::Bool(false), Value::int(2)]).unwrap(), Value::int(2));
        assert_eq!(call("_alternative", &Value::Null, &[Value::int(0), Value::int(2)]).unwrap(), Value::int(0));
    }
}
