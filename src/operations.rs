use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::Value;

/// Type ordering for jq: null < false < true < number < string < array < object
fn type_order(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over values, as used by sorting and subsequence search.
///
/// Objects compare first by their sorted key lists, then value by value in
/// key order.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let ta = type_order(a);
    let tb = type_order(b);
    if ta != tb {
        return ta.cmp(&tb);
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.cmp_value(*y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let c = compare(l, r);
                if c != Ordering::Equal {
                    return c;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let mut kx: Vec<&String> = x.keys().collect();
            let mut ky: Vec<&String> = y.keys().collect();
            kx.sort();
            ky.sort();
            let c = kx.cmp(&ky);
            if c != Ordering::Equal {
                return c;
            }
            for key in kx {
                let c = compare(&x[key], &y[key]);
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        }
        _ => Ordering::Equal,
    }
}

/// Deep merge two objects. For non-objects, b wins.
pub fn deep_merge(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            let mut result = Rc::clone(obj_a);
            let map = Rc::make_mut(&mut result);
            for (key, val_b) in obj_b.iter() {
                let merged = match map.get(key) {
                    Some(val_a) => deep_merge(val_a, val_b),
                    None => val_b.clone(),
                };
                map.insert(key.clone(), merged);
            }
            Value::Object(result)
        }
        _ => b.clone(),
    }
}
