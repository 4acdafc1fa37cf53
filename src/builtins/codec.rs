//! String and JSON conversions: `tojson`, `fromjson`, `tostring`,
//! `tonumber`, and the code point bridge `explode`/`implode`.

use super::{arg0, Registry};
use crate::error::CoreError;
use crate::value::Value;

pub fn register(registry: &mut Registry) {
    registry.register(arg0("tonumber", to_number));
    registry.register(arg0("tostring", to_string));
    registry.register(arg0("explode", explode));
    registry.register(arg0("implode", implode));
    registry.register(arg0("tojson", to_json));
    registry.register(arg0("fromjson", from_json));
}

/// Numbers pass through; strings must hold exactly one JSON number.
pub fn to_number(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::Number(_) => Ok(v.clone()),
        Value::String(s) => match serde_json::from_str::<serde_json::Number>(s) {
            Ok(n) => Ok(Value::from_serde_json(serde_json::Value::Number(n))),
            Err(e) => Err(CoreError::Json {
                message: e.to_string(),
                text: s.clone(),
            }),
        },
        _ => Err(CoreError::type_error("tonumber", v)),
    }
}

pub fn to_string(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::String(_) => Ok(v.clone()),
        _ => to_json(v),
    }
}

pub fn explode(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::String(s) => Ok(Value::array(
            s.chars().map(|c| Value::int(c as i64)).collect(),
        )),
        _ => Err(CoreError::type_error("explode", v)),
    }
}

/// Code points that are not valid scalar values become U+FFFD.
pub fn implode(v: &Value) -> Result<Value, CoreError> {
    let items = match v {
        Value::Array(items) => items,
        _ => return Err(CoreError::type_error("implode", v)),
    };
    let mut out = String::with_capacity(items.len());
    for item in items.iter() {
        let cp = match item {
            Value::Number(n) => n.to_i64(),
            _ => return Err(CoreError::type_error("implode", v)),
        };
        let c = u32::try_from(cp)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(c);
    }
    Ok(Value::String(out))
}

pub fn to_json(v: &Value) -> Result<Value, CoreError> {
    v.to_json().map(Value::String)
}

pub fn from_json(v: &Value) -> Result<Value, CoreError> {
    match v {
        Value::String(s) => Value::from_json(s),
        _ => Err(CoreError::type_error("fromjson", v)),
    }
}
