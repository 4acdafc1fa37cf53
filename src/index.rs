//! Index/Slice Engine
//!
//! Direct access for `.[x]` and `.[a:b]`: single index with negative
//! wraparound, clamped range slices, and subsequence search when the
//! selector is itself an array. Strings are addressed by code point.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::CoreError;
use crate::operations::compare;
use crate::value::Value;

/// Where an integer index lands against a container of some length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// `i < -len`
    Before,
    At(usize),
    /// `i >= len`
    Past,
}

pub fn resolve_index(i: i64, len: usize) -> Position {
    let l = len as i64;
    if i < -l {
        Position::Before
    } else if i < 0 {
        Position::At((l + i) as usize)
    } else if i < l {
        Position::At(i as usize)
    } else {
        Position::Past
    }
}

/// `container[selector]`
pub fn index(container: &Value, selector: &Value) -> Result<Value, CoreError> {
    match selector {
        Value::String(key) => match container {
            Value::Null => Ok(Value::Null),
            Value::Object(map) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
            _ => Err(CoreError::ExpectedObject(container.clone())),
        },
        Value::Number(n) => {
            let i = n.to_i64();
            match container {
                Value::Null => Ok(Value::Null),
                Value::Array(items) => match resolve_index(i, items.len()) {
                    Position::At(idx) => Ok(items[idx].clone()),
                    _ => Ok(Value::Null),
                },
                Value::String(s) => {
                    let len = s.chars().count();
                    match resolve_index(i, len) {
                        Position::At(idx) => Ok(Value::String(
                            s.chars().nth(idx).map(String::from).unwrap_or_default(),
                        )),
                        _ => Ok(Value::String(String::new())),
                    }
                }
                _ => Err(CoreError::ExpectedArray(container.clone())),
            }
        }
        Value::Array(needle) => match container {
            Value::Null => Ok(Value::Null),
            Value::Array(haystack) => Ok(Value::array(subsequence_offsets(haystack, needle))),
            _ => Err(CoreError::ExpectedArray(container.clone())),
        },
        _ => Err(CoreError::ObjectKeyNotString(selector.clone())),
    }
}

fn subsequence_offsets(haystack: &[Value], needle: &[Value]) -> Vec<Value> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| {
            window
                .iter()
                .zip(needle)
                .all(|(a, b)| compare(a, b) == Ordering::Equal)
        })
        .map(|(i, _)| Value::int(i as i64))
        .collect()
}

/// `container[start:end]`. Bounds arrive end first, the order the
/// evaluator pushes them; `null` means unbounded. A non-numeric start is
/// reported before a non-numeric end.
pub fn slice(container: &Value, end: &Value, start: &Value) -> Result<Value, CoreError> {
    match container {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => {
            let (start, end) = (bound(start)?, bound(end)?);
            let range = slice_range(items.len(), end, start);
            Ok(Value::array(items[range].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = (bound(start)?, bound(end)?);
            let range = slice_range(chars.len(), end, start);
            Ok(Value::String(chars[range].iter().collect()))
        }
        _ => Err(CoreError::ExpectedArray(container.clone())),
    }
}

fn bound(v: &Value) -> Result<Option<i64>, CoreError> {
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(Some(n.to_i64())),
        _ => Err(CoreError::ArrayIndexNotNumber(v.clone())),
    }
}

/// The end is applied first; the start is then resolved against the full
/// length but clamped into what the end left.
fn slice_range(len: usize, end: Option<i64>, start: Option<i64>) -> Range<usize> {
    let hi = match end.map(|e| resolve_index(e, len)) {
        None | Some(Position::Past) => len,
        Some(Position::Before) => 0,
        Some(Position::At(i)) => i,
    };
    let lo = match start.map(|s| resolve_index(s, len)) {
        None | Some(Position::Before) => 0,
        Some(Position::Past) => hi,
        Some(Position::At(i)) => i.min(hi),
    };
    lo..hi
}
