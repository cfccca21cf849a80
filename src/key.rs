//! Key policies: how a table hashes, compares and freezes its keys.
//!
//! A policy is a zero-sized type parameter of [`Table`](crate::Table), in
//! the same position a `BuildHasher` would take in a std map.

use crate::error::Result;
use crate::value::{self, hash_text, Value};

pub trait KeyPolicy<K> {
    /// Borrowed form used for lookups (`K` itself, or `str` for text keys).
    type Query: ?Sized;

    fn query(key: &K) -> &Self::Query;

    /// Raw hash of a query; the table remaps zero itself.
    fn hash(q: &Self::Query) -> Result<u32>;

    fn eq(a: &Self::Query, b: &Self::Query) -> Result<bool>;

    fn freeze(key: &K);
}

/// Keys are host values: hashed with [`Value::hash`] and compared with
/// bounded recursive equality. Both may fail.
#[derive(Copy, Clone, Debug, Default)]
pub struct ByValue;

impl<K: Value> KeyPolicy<K> for ByValue {
    type Query = K;

    #[inline]
    fn query(key: &K) -> &K {
        key
    }

    #[inline]
    fn hash(q: &K) -> Result<u32> {
        Value::hash(q)
    }

    #[inline]
    fn eq(a: &K, b: &K) -> Result<bool> {
        value::equal(a, b)
    }

    #[inline]
    fn freeze(key: &K) {
        key.freeze();
    }
}

/// Keys are plain text: FNV-1a hashing and direct string comparison.
/// Never fails and never calls into host code.
#[derive(Copy, Clone, Debug, Default)]
pub struct ByText;

impl KeyPolicy<String> for ByText {
    type Query = str;

    #[inline]
    fn query(key: &String) -> &str {
        key.as_str()
    }

    #[inline]
    fn hash(q: &str) -> Result<u32> {
        Ok(hash_text(q))
    }

    #[inline]
    fn eq(a: &str, b: &str) -> Result<bool> {
        Ok(a == b)
    }

    #[inline]
    fn freeze(_key: &String) {}
}
