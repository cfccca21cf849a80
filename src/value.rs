//! The host value capability set consumed by tables and records.

use crate::error::{Error, Result};
use core::fmt;

/// Default depth budget for key and constructor comparisons.
pub const MAX_COMPARE_DEPTH: usize = 10;

/// Capabilities the core needs from the interpreter's dynamic values.
///
/// `Display` is the value's representation as it appears inside a record's
/// printed form (strings quoted, for instance).
pub trait Value: Clone + fmt::Display {
    /// Name of the value's type, used in error messages.
    fn type_name(&self) -> &'static str;

    /// 32-bit hash; fails with [`Error::Unhashable`] for mutable or
    /// otherwise unhashable types. Equal values must hash equally.
    fn hash(&self) -> Result<u32>;

    /// Same-type equality with a remaining recursion budget of `depth`.
    /// Implementations for containers compare their elements with
    /// [`equal_depth`], which spends one unit of the budget per level.
    fn equals(&self, other: &Self, depth: usize) -> Result<bool>;

    /// Make this value and everything it owns permanently immutable.
    /// Must be idempotent, and must mark the value frozen before visiting
    /// children so that cyclic graphs terminate.
    fn freeze(&self);

    /// Build a text value. Used for the default record constructor.
    fn from_text(text: &str) -> Self;

    /// The text content when this value is a text value.
    fn as_text(&self) -> Option<&str>;
}

/// Compares two values with a bounded recursion budget.
///
/// An exhausted budget is an error rather than a verdict.
pub fn equal_depth<T: Value>(x: &T, y: &T, depth: usize) -> Result<bool> {
    if depth < 1 {
        return Err(Error::RecursionLimit);
    }
    x.equals(y, depth - 1)
}

/// [`equal_depth`] with the default budget.
pub fn equal<T: Value>(x: &T, y: &T) -> Result<bool> {
    equal_depth(x, y, MAX_COMPARE_DEPTH)
}

/// Zero marks an unused bucket slot; real hashes of zero become one.
#[inline]
pub fn remap_hash(h: u32) -> u32 {
    if h == 0 {
        1
    } else {
        h
    }
}

/// 32-bit FNV-1a hash of `s`. Used for all text keys.
pub fn hash_text(s: &str) -> u32 {
    let mut h: u32 = 2166136261;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(16777619);
    }
    h
}
