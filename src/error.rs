//! Error kinds surfaced by tables, views and records.
//!
//! Every condition here is an ordinary recoverable result. The host
//! interpreter turns them into language-level errors.

use core::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// The structural mutation that was rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    Insert,
    Delete,
    Clear,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mutation::Insert => "insert into",
            Mutation::Delete => "delete from",
            Mutation::Clear => "clear",
        })
    }
}

/// Comparison operators a host may ask a record to evaluate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key or value type does not support hashing.
    #[error("unhashable type: {0}")]
    Unhashable(String),

    #[error("cannot {0} frozen hash table")]
    Frozen(Mutation),

    /// A cursor is active on an unfrozen table.
    #[error("cannot {0} hash table during iteration")]
    ConcurrentMutation(Mutation),

    /// Field access on a record for a name it does not have. `constructor`
    /// holds the display form of a non-default constructor.
    #[error("{}struct has no .{name} attribute", constructor_prefix(.constructor))]
    NoSuchAttr {
        constructor: Option<String>,
        name: String,
    },

    #[error("cannot add structs of different constructors: {left} + {right}")]
    ConstructorMismatch { left: String, right: String },

    /// Comparing two constructors failed before a verdict was reached.
    #[error("error comparing constructors {left} and {right}: {source}")]
    ConstructorComparison {
        left: String,
        right: String,
        source: Box<Error>,
    },

    #[error("duplicate key {0}")]
    DuplicateKey(String),

    /// A caller-supplied hash that is not the text hash of its key.
    #[error("hash {hash:#010x} does not belong to key {key}")]
    KeyHashMismatch { key: String, hash: u32 },

    #[error("comparison exceeded maximum recursion depth")]
    RecursionLimit,

    #[error("{type_name} {op} {type_name} not implemented")]
    UnsupportedComparison {
        op: CompareOp,
        type_name: &'static str,
    },

    /// Any other failure reported by a host value.
    #[error("{0}")]
    Value(String),
}

fn constructor_prefix(constructor: &Option<String>) -> String {
    match constructor {
        Some(c) => format!("{c} "),
        None => String::new(),
    }
}
