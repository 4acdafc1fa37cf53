//! jq-runtime - builtin function runtime for a jq-style JSON query language
//!
//! This library provides the value model, the index/slice and path engines,
//! and the table of native builtins an evaluator dispatches calls into.

pub mod builtins;
pub mod context;
pub mod error;
pub mod index;
pub mod operations;
pub mod path;
pub mod value;

pub use builtins::{call, registry, Function, Registry};
pub use context::CallContext;
pub use error::{CallError, CoreError, ResolveError};
pub use index::{index, slice};
pub use path::{del_paths, get_path, set_path, update_paths};
pub use value::{Map, Number, Value};
