//! Builtin Dispatch Table
//!
//! Every builtin is registered under its name with a bitmask of the
//! argument counts it accepts. The evaluator resolves `(name, argc)` once
//! and then calls the entry with the current input and the evaluated
//! arguments. Names starting with `_` are internal: operators and other
//! desugaring targets that `builtins` does not list.

pub mod codec;
pub mod misc;
pub mod math;
pub mod ops;
pub mod paths;

use std::collections::HashMap;

use crate::context::CallContext;
use crate::error::{CallError, CoreError, ResolveError};
use crate::value::Value;

pub const ARGCOUNT0: u8 = 1 << 0;
pub const ARGCOUNT1: u8 = 1 << 1;
pub const ARGCOUNT2: u8 = 1 << 2;
pub const ARGCOUNT3: u8 = 1 << 3;

/// Prefix reserved for internal functions
pub const INTERNAL_PREFIX: char = '_';

pub type NativeFn = dyn Fn(&CallContext, &Value, &[Value]) -> Result<Value, CoreError> + Send + Sync;

pub enum Body {
    Native(Box<NativeFn>),
    /// Known to the resolver but evaluated by the caller (`empty`, `path`).
    Intrinsic,
}

pub struct Function {
    name: &'static str,
    arity: u8,
    body: Body,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Function {
    pub fn native<F>(name: &'static str, arity: u8, f: F) -> Self
    where
        F: Fn(&CallContext, &Value, &[Value]) -> Result<Value, CoreError> + Send + Sync + 'static,
    {
        Function {
            name,
            arity,
            body: Body::Native(Box::new(f)),
        }
    }

    pub fn intrinsic(name: &'static str, arity: u8) -> Self {
        Function {
            name,
            arity,
            body: Body::Intrinsic,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc <= 3 && self.arity & (1 << argc) != 0
    }

    /// Accepted argument counts, ascending.
    pub fn arities(&self) -> impl Iterator<Item = usize> + '_ {
        (0..=3).filter(move |n| self.accepts(*n))
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self.body, Body::Intrinsic)
    }

    pub fn call(&self, ctx: &CallContext, input: &Value, args: &[Value]) -> Result<Value, CoreError> {
        if !self.accepts(args.len()) {
            return Err(CoreError::Arity {
                name: self.name.to_string(),
                arity: args.len(),
            });
        }
        match &self.body {
            Body::Native(f) => f(ctx, input, args),
            Body::Intrinsic => Err(CoreError::Intrinsic(self.name.to_string())),
        }
    }
}

/// Adapters from plain functions to registry entries
pub fn arg0(name: &'static str, f: fn(&Value) -> Result<Value, CoreError>) -> Function {
    Function::native(name, ARGCOUNT0, move |_, v, _| f(v))
}

pub fn arg1(name: &'static str, f: fn(&Value, &Value) -> Result<Value, CoreError>) -> Function {
    Function::native(name, ARGCOUNT1, move |_, v, args| f(v, &args[0]))
}

pub fn arg2(name: &'static str, f: fn(&Value, &Value, &Value) -> Result<Value, CoreError>) -> Function {
    Function::native(name, ARGCOUNT2, move |_, v, args| f(v, &args[0], &args[1]))
}

pub fn arg3(
    name: &'static str,
    f: fn(&Value, &Value, &Value, &Value) -> Result<Value, CoreError>,
) -> Function {
    Function::native(name, ARGCOUNT3, move |_, v, args| {
        f(v, &args[0], &args[1], &args[2])
    })
}

pub struct Registry {
    functions: HashMap<&'static str, Function>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Every builtin this crate implements
    pub fn standard() -> Self {
        let mut registry = Self::new();
        misc::register(&mut registry);
        codec::register(&mut registry);
        paths::register(&mut registry);
        ops::register(&mut registry);
        math::register(&mut registry);
        registry
    }

    pub fn register(&mut self, f: Function) {
        self.functions.insert(f.name, f);
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn resolve(&self, name: &str, argc: usize) -> Result<&Function, ResolveError> {
        match self.functions.get(name) {
            Some(f) if f.accepts(argc) => Ok(f),
            _ => {
                log::debug!("unresolved builtin {}/{}", name, argc);
                Err(ResolveError::Undefined {
                    name: name.to_string(),
                    arity: argc,
                })
            }
        }
    }

    pub fn call(
        &self,
        ctx: &CallContext,
        name: &str,
        input: &Value,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let f = self.resolve(name, args.len())?;
        Ok(f.call(ctx, input, args)?)
    }

    /// `name/arity` for every public entry, sorted.
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .functions
            .values()
            .filter(|f| !f.name.starts_with(INTERNAL_PREFIX))
            .flat_map(|f| f.arities().map(move |n| format!("{}/{}", f.name, n)))
            .collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    static ref STANDARD: Registry = Registry::standard();
}

/// The process-wide table, built on first use and never modified.
pub fn registry() -> &'static Registry {
    &STANDARD
}

/// Resolve and call in one go, reading `env` from the process environment.
pub fn call(name: &str, input: &Value, args: &[Value]) -> Result<Value, CallError> {
    registry().call(&CallContext::from_process(), name, input, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bitmask() {
        let f = Function::intrinsic("error", ARGCOUNT0 | ARGCOUNT1);
        assert!(f.accepts(0));
        assert!(f.accepts(1));
        assert!(!f.accepts(2));
        assert!(!f.accepts(9));
        assert_eq!(f.arities().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_resolve_wrong_arity() {
        let err = registry().resolve("keys", 1).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Undefined {
                name: "keys".to_string(),
                arity: 1
            }
        );
        assert!(registry().resolve("no_such_function", 0).is_err());
        assert!(registry().resolve("keys", 0).is_ok());
    }

    #[test]
    fn test_intrinsic_not_callable() {
        let f = registry().resolve("empty", 0).unwrap();
        assert!(f.is_intrinsic());
        let err = f.call(&CallContext::new(), &Value::Null, &[]).unwrap_err();
        assert!(matches!(err, CoreError::Intrinsic(ref n) if n == "empty"));
    }

    #[test]
    fn test_call_checks_arity() {
        let f = registry().resolve("has", 1).unwrap();
        let err = f.call(&CallContext::new(), &Value::Null, &[]).unwrap_err();
        assert!(matches!(err, CoreError::Arity { arity: 0, .. }));
    }

    #[test]
    fn test_listing_sorted_and_public() {
        let names = registry().listing();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.iter().all(|n| !n.starts_with('_')));
        assert!(names.contains(&"error/0".to_string()));
        assert!(names.contains(&"error/1".to_string()));
        assert!(names.contains(&"setpath/2".to_string()));
        assert!(names.contains(&"fma/3".to_string()));
    }

    #[test]
    fn test_call_round_trip() {
        let out = call("length", &Value::from("héllo"), &[]).unwrap();
        assert_eq!(out, Value::int(5));
        assert!(matches!(
            call("length", &Value::Null, &[Value::Null]),
            Err(CallError::Resolve(_))
        ));
        assert!(matches!(
            call("keys", &Value::int(1), &[]),
            Err(CallError::Value(CoreError::Type { .. }))
        ));
    }
}
