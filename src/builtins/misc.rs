use super::{arg0, arg1, registry, Function, Registry, ARGCOUNT0, ARGCOUNT1};
use crate::error::CoreError;
use crate::value::{Map, Number, Value};

pub fn register(registry: &mut Registry) {
    registry.register(Function::intrinsic("empty", ARGCOUNT0));
    registry.register(Function::intrinsic("path", ARGCOUNT1));
    registry.register(arg0("length", length));
    registry.register(arg0("utf8bytelength", utf8_byte_length));
    registry.register(arg0("keys", keys));
    registry.register(arg1("has", has));
    registry.register(arg0("type", type_of));
    registry.register(Function::native("error", ARGCOUNT0 | ARGCOUNT1, |_, v, args| {
        error(v, args.first())
    }));
    registry.register(arg0("builtins", |_| Ok(builtins())));
    registry.register(Function::native("env", ARGCOUNT0, |ctx, _, _| {
        let map: Map = ctx
            .env
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Ok(Value::object(map))
    }));
    registry.register(arg0("_break", break_label));
    registry.register(arg1("_type_error", type_error));
}

pub fn length(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::Null => Ok(Value::int(0)),
        Value::Array(items) => Ok(Value::int(items.len() as i64)),
        Value::Object(map) => Ok(Value::int(map.len() as i64)),
        Value::String(s) => Ok(Value::int(s.chars().count() as i64)),
        Value::Number(Number::Int(i)) => Ok(match i.checked_abs() {
            Some(n) => Value::int(n),
            None => Value::float((*i as f64).abs()),
        }),
        Value::Number(Number::Float(f)) => Ok(Value::float(f.abs())),
        Value::Bool(_) => Err(CoreError::type_error("length", v)),
    }
}

fn utf8_byte_length(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::String(s) => Ok(Value::int(s.len() as i64)),
        _ => Err(CoreError::type_error("utf8bytelength", v)),
    }
}

/// Array indices, or object keys in sorted order.
pub fn keys(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::Array(items) => Ok(Value::array(
            (0..items.len() as i64).map(Value::int).collect(),
        )),
        Value::Object(map) => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            Ok(Value::array(
                names.into_iter().map(|k| Value::String(k.clone())).collect(),
            ))
        }
        _ => Err(CoreError::type_error("keys", v)),
    }
}

pub fn has(v: &Value, key: &Value) -> Result<Value, CoreError> {
    let mismatch = || CoreError::HasKeyType {
        container: v.clone(),
        key: key.clone(),
    };
    match (v, key) {
        (Value::Array(items), Value::Number(n)) => {
            let i = n.to_i64();
            Ok(Value::Bool(0 <= i && i < items.len() as i64))
        }
        (Value::Object(map), Value::String(k)) => Ok(Value::Bool(map.contains_key(k))),
        _ => Err(mismatch()),
    }
}

fn type_of(v: &Value) -> Result<Value, CoreError> {
    Ok(Value::from(v.type_name()))
}

/// `error` raises its input, `error(msg)` its argument. Only strings are
/// accepted as messages.
fn error(v: &Value, msg: Option<&Value>) -> Result<Value, CoreError> {
    let msg = msg.unwrap_or(v);
    match msg {
        Value::String(s) => Err(CoreError::User(s.clone())),
        _ => Err(CoreError::type_error("error", msg)),
    }
}

/// `name/arity` of every public builtin, sorted.
pub fn builtins() -> Value {
    Value::array(registry().listing().into_iter().map(Value::String).collect())
}

fn break_label(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::String(label) => Err(CoreError::Break(label.clone())),
        _ => Err(CoreError::type_error("_break", v)),
    }
}

fn type_error(v: &Value, name: &Value) -> Result<Value, CoreError> {
    match name {
        Value::String(name) => Err(CoreError::type_error(name, v)),
        _ => Err(CoreError::type_error("_type_error", name)),
    }
}
