//! Error Types
//!
//! Every builtin reports failure through `CoreError` instead of panicking.
//! Each variant keeps the offending values so messages can be rendered
//! the way jq renders them.

use thiserror::Error;

use crate::value::Value;

/// Longest JSON preview embedded in an error message.
const PREVIEW_LEN: usize = 11;

/// `type (json...)`, the value summary jq puts in its error messages.
pub fn preview(v: &Value) -> String {
    let text = v.to_json().unwrap_or_else(|_| v.type_name().to_string());
    let short = if text.chars().count() > PREVIEW_LEN {
        let cut: String = text.chars().take(PREVIEW_LEN - 3).collect();
        format!("{}...", cut)
    } else {
        text
    };
    format!("{} ({})", v.type_name(), short)
}

/// Errors returned as values from every builtin
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("{} cannot be applied to: {}", .name, preview(.value))]
    Type { name: String, value: Value },

    #[error("expected an object but got: {}", preview(.0))]
    ExpectedObject(Value),

    #[error("expected an array but got: {}", preview(.0))]
    ExpectedArray(Value),

    #[error("expected a string for object key but got: {}", preview(.0))]
    ObjectKeyNotString(Value),

    #[error("expected a number for indexing an array but got: {}", preview(.0))]
    ArrayIndexNotNumber(Value),

    #[error("cannot check whether {} has a key: {}", .container.type_name(), preview(.key))]
    HasKeyType { container: Value, key: Value },

    #[error("cannot getpath with {} against: {}", preview(.path), preview(.root))]
    Getpath { root: Value, path: Value },

    #[error("array index too large: {0}")]
    IndexTooLarge(i64),

    #[error("cannot {}: {}", .op, preview(.value))]
    UnaryType { op: &'static str, value: Value },

    #[error("cannot {}: {} and {}", .op, preview(.lhs), preview(.rhs))]
    BinaryType { op: &'static str, lhs: Value, rhs: Value },

    #[error("cannot divide {} by: {}", preview(.lhs), preview(.rhs))]
    ZeroDivision { lhs: Value, rhs: Value },

    #[error("cannot modulo {} by: {}", preview(.lhs), preview(.rhs))]
    ZeroModulo { lhs: Value, rhs: Value },

    /// String repetition whose result would exceed the size limit.
    #[error("repeat string result too long")]
    RepeatTooLong(i64),

    #[error("{message}: {text:?}")]
    Json { message: String, text: String },

    #[error("{name}/{arity} called with the wrong number of arguments")]
    Arity { name: String, arity: usize },

    #[error("{0} is evaluated by the caller, not the builtin table")]
    Intrinsic(String),

    /// Unwinds to the label of the same name. Never shown when a label catches it.
    #[error("break")]
    Break(String),

    #[error("{0}")]
    User(String),
}

impl CoreError {
    pub fn is_break(&self) -> bool {
        matches!(self, CoreError::Break(_))
    }

    pub(crate) fn type_error(name: &str, value: &Value) -> Self {
        CoreError::Type {
            name: name.to_string(),
            value: value.clone(),
        }
    }
}

/// Name resolution failures, raised before any value is computed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{name}/{arity} is not defined")]
    Undefined { name: String, arity: usize },
}

/// Either side of a one-shot `call`
#[derive(Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Value(#[from] CoreError),
}
