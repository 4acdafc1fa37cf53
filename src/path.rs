//! Path Navigation & Mutation Engine
//!
//! `setpath`, `delpaths` and `getpath` all walk a path (an array of string
//! keys and numeric indices) through a value. The walk resolves every
//! component against the current subtree into a concrete [`Step`], producing
//! a trail. Setting then writes along that trail with `Rc::make_mut`, so only
//! the containers on the trail are copied and the caller's value is never
//! touched. Deleting records the trail as a hole; holes are compacted once
//! the whole batch has been walked, which keeps every index in the batch
//! resolving against the same array shape.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::CoreError;
use crate::index::{index, resolve_index, Position};
use crate::operations::compare;
use crate::value::{Map, Value};

/// Upper bound for an index that `setpath` may grow an array to.
pub const MAX_ARRAY_INDEX: i64 = 536_870_911;

/// One resolved path component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Positions deleted so far in a `delpaths` batch.
#[derive(Debug, Default)]
pub struct Holes {
    trails: BTreeSet<Vec<Step>>,
}

impl Holes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    fn covers(&self, trail: &[Step]) -> bool {
        self.trails.contains(trail)
    }
}

enum Mode<'a> {
    /// `setpath`: the only mode that grows arrays past their end.
    Set,
    /// Any other update; a past-end index leaves the root as it is.
    Update,
    Delete(&'a Holes),
}

enum Walk {
    Reached(Vec<Step>),
    /// Nothing to do; the root stays as it is.
    Skipped,
}

/// The shared walk. `Set` treats `null` and missing positions as containers
/// to be created; `Delete` short-circuits on anything that does not exist.
fn walk(name: &str, root: &Value, path: &Value, mode: &Mode<'_>) -> Result<Walk, CoreError> {
    let keys = match path {
        Value::Array(keys) => keys,
        _ => return Err(CoreError::type_error(name, path)),
    };
    let deleting = matches!(mode, Mode::Delete(_));
    let mut trail: Vec<Step> = Vec::with_capacity(keys.len());
    if let Mode::Delete(holes) = mode {
        if holes.covers(&trail) {
            return Ok(Walk::Skipped);
        }
    }

    // `None` is a position that does not exist yet
    let mut current: Option<&Value> = Some(root);
    for key in keys.iter() {
        let step = match key {
            Value::String(k) => match current {
                None | Some(Value::Null) => {
                    if deleting {
                        return Ok(Walk::Skipped);
                    }
                    current = None;
                    Step::Key(k.clone())
                }
                Some(Value::Object(map)) => {
                    let child = map.get(k);
                    if child.is_none() && deleting {
                        return Ok(Walk::Skipped);
                    }
                    current = child;
                    Step::Key(k.clone())
                }
                Some(other) => return Err(CoreError::ExpectedObject(other.clone())),
            },
            Value::Number(n) => {
                let items = match current {
                    None | Some(Value::Null) => {
                        if deleting {
                            return Ok(Walk::Skipped);
                        }
                        None
                    }
                    Some(Value::Array(items)) => Some(items),
                    Some(other) => return Err(CoreError::ExpectedArray(other.clone())),
                };
                let i = n.to_i64();
                match resolve_index(i, items.map_or(0, |a| a.len())) {
                    Position::Before => {
                        if deleting {
                            return Ok(Walk::Skipped);
                        }
                        return Err(CoreError::type_error(name, &Value::int(i)));
                    }
                    Position::Past => {
                        if !matches!(mode, Mode::Set) {
                            return Ok(Walk::Skipped);
                        }
                        if i > MAX_ARRAY_INDEX {
                            return Err(CoreError::IndexTooLarge(i));
                        }
                        current = None;
                        Step::Index(i as usize)
                    }
                    Position::At(idx) => {
                        current = items.and_then(|a| a.get(idx));
                        Step::Index(idx)
                    }
                }
            }
            other => {
                return Err(match current {
                    Some(Value::Array(_)) => CoreError::ArrayIndexNotNumber(other.clone()),
                    _ => CoreError::ObjectKeyNotString(other.clone()),
                })
            }
        };
        trail.push(step);
        if let Mode::Delete(holes) = mode {
            if holes.covers(&trail) {
                return Ok(Walk::Skipped);
            }
        }
    }
    Ok(Walk::Reached(trail))
}

/// Writes `transform(current)` at the end of `trail`, creating objects,
/// arrays and `null` padding where the trail leaves the existing value.
fn write_along<F>(node: &mut Value, trail: &[Step], transform: F)
where
    F: FnOnce(Value) -> Value,
{
    match trail.split_first() {
        None => {
            let current = std::mem::take(node);
            *node = transform(current);
        }
        Some((Step::Key(k), rest)) => {
            if !matches!(node, Value::Object(_)) {
                *node = Value::object(Map::new());
            }
            if let Value::Object(map) = node {
                let child = Rc::make_mut(map).entry(k.clone()).or_insert(Value::Null);
                write_along(child, rest, transform);
            }
        }
        Some((Step::Index(i), rest)) => {
            if !matches!(node, Value::Array(_)) {
                *node = Value::array(Vec::new());
            }
            if let Value::Array(items) = node {
                let items = Rc::make_mut(items);
                if items.len() <= *i {
                    items.resize(*i + 1, Value::Null);
                }
                write_along(&mut items[*i], rest, transform);
            }
        }
    }
}

/// Applies `transform` once, at the value `path` points to (`null` when it
/// does not exist yet), and returns the new root. `name` labels errors and
/// picks the mode: only `setpath` grows an array to reach a past-end index,
/// every other caller gets the root back unchanged.
pub fn update_paths<F>(name: &str, root: Value, path: &Value, transform: F) -> Result<Value, CoreError>
where
    F: FnOnce(Value) -> Value,
{
    let mode = if name == "setpath" { Mode::Set } else { Mode::Update };
    match walk(name, &root, path, &mode)? {
        Walk::Reached(trail) => {
            let mut root = root;
            write_along(&mut root, &trail, transform);
            Ok(root)
        }
        Walk::Skipped => Ok(root),
    }
}

/// Records `path` as a hole in `holes` if it exists in `root`.
pub fn mark_deleted(root: &Value, path: &Value, holes: &mut Holes) -> Result<(), CoreError> {
    let walked = walk("delpaths", root, path, &Mode::Delete(&*holes))?;
    if let Walk::Reached(trail) = walked {
        holes.trails.insert(trail);
    }
    Ok(())
}

/// Removes every hole from `root`. Trails are visited in descending order,
/// so higher array indices go before lower ones and children before their
/// parents.
pub fn compact(mut root: Value, holes: &Holes) -> Value {
    for trail in holes.trails.iter().rev() {
        remove_at(&mut root, trail);
    }
    root
}

fn remove_at(node: &mut Value, trail: &[Step]) {
    let Some((step, rest)) = trail.split_first() else {
        *node = Value::Null;
        return;
    };
    if rest.is_empty() {
        match (node, step) {
            (Value::Object(map), Step::Key(k)) => {
                Rc::make_mut(map).shift_remove(k);
            }
            (Value::Array(items), Step::Index(i)) if *i < items.len() => {
                Rc::make_mut(items).remove(*i);
            }
            _ => {}
        }
        return;
    }
    let child = match (node, step) {
        (Value::Object(map), Step::Key(k)) => Rc::make_mut(map).get_mut(k),
        (Value::Array(items), Step::Index(i)) => Rc::make_mut(items).get_mut(*i),
        _ => None,
    };
    if let Some(child) = child {
        remove_at(child, rest);
    }
}

pub fn set_path(root: Value, path: &Value, value: Value) -> Result<Value, CoreError> {
    update_paths("setpath", root, path, |_| value)
}

/// Deletes every path in `paths` (an array of paths). Paths go in
/// descending order so that a longer path is handled before its prefix.
pub fn del_paths(root: Value, paths: &Value) -> Result<Value, CoreError> {
    let list = match paths {
        Value::Array(list) => list,
        _ => return Err(CoreError::type_error("delpaths", paths)),
    };
    let mut ordered: Vec<&Value> = list.iter().collect();
    ordered.sort_by(|a, b| compare(b, a));

    let mut holes = Holes::new();
    for path in ordered {
        mark_deleted(&root, path, &mut holes)?;
    }
    log::trace!("delpaths: {} paths, {} holes", list.len(), holes.len());
    if holes.is_empty() {
        return Ok(root);
    }
    Ok(compact(root, &holes))
}

/// Follows `path` with `index` at every step. Any failure is reported as a
/// `Getpath` error carrying the original root and path.
pub fn get_path(root: &Value, path: &Value) -> Result<Value, CoreError> {
    let keys = match path {
        Value::Array(keys) => keys,
        _ => return Err(CoreError::type_error("getpath", path)),
    };
    let failed = || CoreError::Getpath {
        root: root.clone(),
        path: path.clone(),
    };
    let mut current = root.clone();
    for key in keys.iter() {
        if !matches!(current, Value::Null | Value::Array(_) | Value::Object(_)) {
            return Err(failed());
        }
        current = index(&current, key).map_err(|_| failed())?;
    }
    Ok(current)
}
