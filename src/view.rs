//! OrderedView: fixed key set with positional access.
//!
//! Entries sit in a flat vector in append order; the bucket index maps
//! text hashes to positions. After construction keys can be neither added
//! nor removed, only values overwritten.

use crate::buckets::{overloaded, Buckets};
use crate::error::{Error, Result};
use crate::table::StringKeyedMap;
use crate::value::{hash_text, remap_hash};
use core::fmt;

#[derive(Debug, Clone)]
struct ViewEntry<V> {
    hash: u32,
    key: String,
    value: V,
}

pub struct OrderedView<V> {
    buckets: Buckets<u32>,
    entries: Vec<ViewEntry<V>>,
}

impl<V> OrderedView<V> {
    pub fn new() -> Self {
        Self {
            buckets: Buckets::new(),
            entries: Vec::new(),
        }
    }

    /// A view sized for `size_hint` appends without growth.
    pub fn with_capacity(size_hint: usize) -> Self {
        Self {
            buckets: Buckets::with_capacity(size_hint),
            entries: Vec::with_capacity(size_hint),
        }
    }

    /// Builds a view of `map` with keys in ascending order.
    pub fn from_map(map: &StringKeyedMap<V>) -> Self
    where
        V: Clone,
    {
        let mut pairs: Vec<(&String, &V)> = map.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let mut view = Self::with_capacity(pairs.len());
        for (k, v) in pairs {
            view.push_unique(hash_text(k), k.clone(), v.clone());
        }
        view
    }

    /// Builds a view from pairs in the order given. Fails on the first
    /// repeated key.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let pairs = pairs.into_iter();
        let mut view = Self::with_capacity(pairs.size_hint().0);
        for (k, v) in pairs {
            view.push(k, v)?;
        }
        Ok(view)
    }

    /// Appends `key` with a caller-computed text hash.
    ///
    /// `hash` must be `hash_text(&key)`; any other value fails with
    /// [`Error::KeyHashMismatch`], since name lookups always rehash.
    pub fn append(&mut self, hash: u32, key: String, value: V) -> Result<()> {
        let hash = remap_hash(hash);
        if hash != remap_hash(hash_text(&key)) {
            return Err(Error::KeyHashMismatch { key, hash });
        }
        if self.position(hash, &key).is_some() {
            return Err(Error::DuplicateKey(key));
        }
        self.push_unique(hash, key, value);
        Ok(())
    }

    /// [`append`](Self::append) with the hash computed from `key`.
    pub fn push(&mut self, key: String, value: V) -> Result<()> {
        let hash = hash_text(&key);
        self.append(hash, key, value)
    }

    fn push_unique(&mut self, hash: u32, key: String, value: V) {
        let hash = remap_hash(hash);
        if self.buckets.is_uninit() {
            self.buckets.init(1);
        }
        while overloaded(self.entries.len(), self.buckets.chain_count()) {
            let live = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| (e.hash, i as u32));
            self.buckets.grow(live);
        }
        let pos = self.entries.len() as u32;
        self.entries.push(ViewEntry { hash, key, value });
        self.buckets.place(hash, pos);
    }

    fn position(&self, hash: u32, key: &str) -> Option<usize> {
        let entries = &self.entries;
        // Text comparison cannot fail.
        self.buckets
            .find(hash, |i| Ok(entries[i as usize].key == key))
            .ok()
            .flatten()
            .map(|i| i as usize)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let hash = remap_hash(hash_text(key));
        self.position(hash, key).map(|i| &self.entries[i].value)
    }

    /// Overwrites the value of an existing key. A missing key is left
    /// missing and `false` is returned.
    pub fn set(&mut self, key: &str, value: V) -> bool {
        let hash = remap_hash(hash_text(key));
        match self.position(hash, key) {
            Some(i) => {
                self.entries[i].value = value;
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let hash = remap_hash(hash_text(key));
        self.position(hash, key).is_some()
    }

    /// Value at position `i`.
    pub fn index(&self, i: usize) -> Option<&V> {
        self.entries.get(i).map(|e| &e.value)
    }

    /// Key and value at position `i`.
    pub fn key_index(&self, i: usize) -> Option<(&str, &V)> {
        self.entries.get(i).map(|e| (e.key.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    /// Calls `f` on each entry in order until it returns `false`.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        for e in &self.entries {
            if !f(&e.key, &e.value) {
                break;
            }
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.chain_count()
    }
}

impl<V> Default for OrderedView<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for OrderedView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
