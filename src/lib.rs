//! record-table: the value-representation core of an embedded,
//! dynamically typed language. Insertion-ordered hash tables back dict and
//! set values; immutable records ("structs") sit on a text-keyed variant.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table algorithm shared by every associative value, with
//!   insertion order, deep freeze and mutation-during-iteration detection
//!   as first-class properties rather than add-ons.
//! - Layers:
//!   - Buckets<I>: open-chaining index from 32-bit hashes to entry ids,
//!     eight slots per bucket plus overflow chains; never calls user code.
//!   - Table<K, V, P>: entries in a generational arena threaded by an
//!     index-linked list in insertion order; the key policy `P` decides
//!     how keys hash and compare (`ByValue` for host values, `ByText`
//!     for plain strings).
//!   - OrderedView<V>: fixed key set in a flat vector for positional
//!     access, indexed by the same bucket structure.
//!   - Record<V>: constructor tag plus a `StringKeyedMap` whose order is
//!     sorted field-name order; merge and equality are linear walks.
//!
//! Constraints
//! - Single-threaded mutation (`&mut self`). A frozen table can be read
//!   from several threads when its keys and values allow it.
//! - Hash zero marks an empty slot; real zero hashes are remapped to one.
//! - Growth doubles the chain count once `len >= 8 && len >= 6.5 *
//!   chains`, re-placing entries by stored hash. Storage never shrinks and
//!   emptied overflow buckets are not compacted.
//!
//! Freeze and iteration
//! - `freeze` is deep, idempotent and irreversible. The frozen flag is set
//!   before children are visited, which stops recursion on cyclic values.
//! - `Table::iterate` returns a detached cursor registered with a counter;
//!   while any cursor is live, insert/delete/clear fail with
//!   `Error::ConcurrentMutation`. Frozen tables skip the counter.
//!
//! Errors
//! - Every failure is an [`Error`] value; nothing here panics on bad
//!   input, unhashable keys or exhausted comparison depth.

mod buckets;
pub mod error;
mod iter_guard;
pub mod key;
pub mod record;
pub mod table;
mod table_proptest;
#[cfg(test)]
mod testing;
pub mod value;
pub mod view;

// Public surface
pub use buckets::{BUCKET_SIZE, LOAD_FACTOR};
pub use error::{CompareOp, Error, Mutation, Result};
pub use key::{ByText, ByValue, KeyPolicy};
pub use record::{Record, DEFAULT_CONSTRUCTOR};
pub use table::{Cursor, Iter, OrderedMap, StringKeyedMap, Table};
pub use value::{equal, equal_depth, hash_text, Value, MAX_COMPARE_DEPTH};
pub use view::OrderedView;

/// Internal bucket index, exposed for benchmarks only.
#[cfg(feature = "bench_internal")]
pub mod bench_internal {
    pub use crate::buckets::{overloaded, Buckets};
}
