use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::error::CoreError;

pub type Map = IndexMap<String, Value>;

/// A jq number. Integers read from JSON stay `Int` until an operation
/// produces a result that no longer fits or is no longer integral.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Truncates toward zero. NaN maps to 0 and out-of-range values saturate.
    pub fn to_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// `Int` when `f` is integral and representable, `Float` otherwise.
    pub fn integral(f: f64) -> Number {
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Number::Int(f as i64)
        } else {
            Number::Float(f)
        }
    }

    /// Re-tags `f` as an integer only when every input was an integer.
    pub fn sticky(f: f64, ints: bool) -> Number {
        if ints {
            Number::integral(f)
        } else {
            Number::Float(f)
        }
    }

    /// Numeric ordering across the int/float split. NaN sorts below every number.
    pub fn cmp_value(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (a, b) => {
                let (x, y) = (a.as_f64(), b.as_f64());
                match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                }
            }
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(n) => f.write_str(&format_float(*n)),
        }
    }
}

fn is_negative_zero(n: f64) -> bool {
    n == 0.0 && n.is_sign_negative()
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "null".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 {
            "1.7976931348623157e+308".to_string()
        } else {
            "-1.7976931348623157e+308".to_string()
        };
    }
    if n.fract() == 0.0 && n.abs() < 1e17 && !is_negative_zero(n) {
        format!("{}", n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(|x| x.to_string())
            .unwrap_or_else(|| n.to_string())
    }
}

/// A JSON value. Containers sit behind `Rc`, so cloning is cheap and every
/// write goes through `Rc::make_mut`, leaving other holders untouched.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Rc<Vec<Value>>),
    Object(Rc<Map>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || a == b,
            // IndexMap equality ignores insertion order
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) | Value::Object(_) => match self.to_json() {
                Ok(text) => f.write_str(&text),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(Rc::new(v))
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Object(Rc::new(m))
    }
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }

    pub fn float(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    pub fn object(map: Map) -> Self {
        Value::Object(Rc::new(map))
    }

    /// jq truthiness: false and null are falsy, everything else truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Number(Number::Int(_)))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    /// Numeric argument coercion. `name` only feeds the error message.
    pub fn to_float(&self, name: &str) -> Result<f64, CoreError> {
        match self {
            Value::Number(n) => Ok(n.as_f64()),
            _ => Err(CoreError::Type {
                name: name.to_string(),
                value: self.clone(),
            }),
        }
    }

    /// Index coercion for path components and slice bounds.
    pub fn to_int(&self) -> Option<i64> {
        self.as_number().map(Number::to_i64)
    }

    /// Compact JSON. Values that cannot be encoded as-is (non-finite
    /// floats) are normalised and encoded again.
    pub fn to_json(&self) -> Result<String, CoreError> {
        match serde_json::to_string(self) {
            Ok(text) => Ok(text),
            Err(first) => {
                log::debug!("tojson: normalising after encode failure: {}", first);
                serde_json::to_string(&self.normalized()).map_err(|e| CoreError::Json {
                    message: e.to_string(),
                    text: String::new(),
                })
            }
        }
    }

    /// Parses one JSON document, keeping integers as `Int`.
    pub fn from_json(text: &str) -> Result<Value, CoreError> {
        serde_json::from_str::<serde_json::Value>(text)
            .map(Value::from_serde_json)
            .map_err(|e| CoreError::Json {
                message: e.to_string(),
                text: text.to_string(),
            })
    }

    /// Replace NaN with null and infinities with the largest finite floats.
    pub(crate) fn normalized(&self) -> Value {
        match self {
            Value::Number(Number::Float(f)) if f.is_nan() => Value::Null,
            Value::Number(Number::Float(f)) if f.is_infinite() => {
                Value::float(if *f > 0.0 { f64::MAX } else { f64::MIN })
            }
            Value::Array(items) => Value::array(items.iter().map(Value::normalized).collect()),
            Value::Object(map) => Value::object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.normalized()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Convert from serde_json::Value
    pub fn from_serde_json(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::int(i),
                None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::array(arr.into_iter().map(Value::from_serde_json).collect())
            }
            serde_json::Value::Object(obj) => {
                let mut map = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k, Value::from_serde_json(v));
                }
                Value::object(map)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => {
                if !f.is_finite() {
                    return Err(S::Error::custom(format!("unsupported value: {}", f)));
                }
                if f.fract() == 0.0 && f.abs() < 1e17 && !is_negative_zero(*f) {
                    serializer.serialize_i64(*f as i64)
                } else {
                    serializer.serialize_f64(*f)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut out = serializer.serialize_map(Some(keys.len()))?;
                for key in keys {
                    out.serialize_entry(key, &map[key])?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: Vec<(&str, Value)>) -> Value {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v);
        }
        Value::object(map)
    }

    #[test]
    fn test_value_null() {
        let v = Value::Null;
        assert!(v.is_null());
        assert_eq!(v.type_name(), "null");
        assert!(!v.is_truthy());
    }

    #[test]
    fn test_value_bool() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert_eq!(Value::Bool(true).type_name(), "boolean");
    }

    #[test]
    fn test_int_float_equality() {
        assert_eq!(Value::int(1), Value::float(1.0));
        assert_ne!(Value::int(1), Value::float(1.5));
        assert_ne!(Value::float(f64::NAN), Value::float(f64::NAN));
    }

    #[test]
    fn test_integral_retag() {
        assert!(matches!(Number::integral(4.0), Number::Int(4)));
        assert!(matches!(Number::integral(4.5), Number::Float(_)));
        assert!(matches!(Number::integral(1e300), Number::Float(_)));
        assert!(matches!(Number::sticky(4.0, false), Number::Float(_)));
    }

    #[test]
    fn test_to_int_truncates() {
        assert_eq!(Value::float(2.9).to_int(), Some(2));
        assert_eq!(Value::float(-2.9).to_int(), Some(-2));
        assert_eq!(Value::int(-7).to_int(), Some(-7));
        assert_eq!(Value::from("1").to_int(), None);
    }

    #[test]
    fn test_to_float_error_names_function() {
        let err = Value::from("x").to_float("sqrt").unwrap_err();
        assert!(matches!(err, CoreError::Type { ref name, .. } if name == "sqrt"));
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let a = obj(vec![("x", Value::int(1)), ("y", Value::int(2))]);
        let b = obj(vec![("y", Value::int(2)), ("x", Value::int(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_json_sorts_keys() {
        let v = obj(vec![("b", Value::int(1)), ("a", Value::array(vec![Value::Null]))]);
        assert_eq!(v.to_json().unwrap(), r#"{"a":[null],"b":1}"#);
    }

    #[test]
    fn test_to_json_integral_float() {
        assert_eq!(Value::float(3.0).to_json().unwrap(), "3");
        assert_eq!(Value::float(3.25).to_json().unwrap(), "3.25");
    }

    #[test]
    fn test_to_json_keeps_negative_zero() {
        let text = Value::float(-0.0).to_json().unwrap();
        assert!(text.starts_with('-'));
        let back = Value::from_json(&text).unwrap();
        assert!(back.as_number().unwrap().as_f64().is_sign_negative());
        assert_eq!(Value::float(0.0).to_json().unwrap(), "0");
        assert!(Value::float(-0.0).to_string().starts_with('-'));
    }

    #[test]
    fn test_to_json_normalises_non_finite() {
        let v = Value::array(vec![Value::float(f64::NAN), Value::float(f64::INFINITY)]);
        assert_eq!(v.to_json().unwrap(), "[null,1.7976931348623157e308]");
    }

    #[test]
    fn test_from_json_keeps_integers() {
        let v = Value::from_json(r#"{"a": 1, "b": 1.5, "c": 2.0}"#).unwrap();
        if let Value::Object(map) = &v {
            assert!(map["a"].is_int());
            assert!(!map["b"].is_int());
            assert!(!map["c"].is_int());
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn test_from_json_error_carries_text() {
        let err = Value::from_json("{\"a\":").unwrap_err();
        assert!(matches!(err, CoreError::Json { ref text, .. } if text == "{\"a\":"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::int(42)), "42");
        assert_eq!(format!("{}", Value::float(3.14)), "3.14");
        assert_eq!(format!("{}", Value::from("hi")), "hi");
        assert_eq!(format!("{}", Value::array(vec![Value::int(1)])), "[1]");
    }
}
