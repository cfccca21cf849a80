//! Table: insertion-ordered hash table with freeze and iteration guards.
//!
//! Entries live in a generational arena and form a doubly linked list in
//! insertion order; links are arena keys rather than pointers, so removal
//! splices in O(1) without traversal. A separate bucket index maps hashes
//! to arena keys.

use crate::buckets::{overloaded, Buckets};
use crate::error::{Error, Mutation, Result};
use crate::iter_guard::{CounterId, IterCounter, IterGuard};
use crate::key::{ByText, ByValue, KeyPolicy};
use crate::value::{hash_text, remap_hash, Value};
use core::fmt::{self, Write as _};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Entry<K, V> {
    hash: u32, // remapped, never zero
    key: K,
    value: V,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Hash table backing dict and set values, generic over how keys are
/// treated (see [`KeyPolicy`]).
///
/// # Sharing
///
/// The frozen flag and the cursor counter are atomics, so a table of
/// `Sync` keys and values is `Sync` frozen or not. Through `&Table` the
/// only writes are [`freeze`](Self::freeze) and cursor registration.
/// `freeze` claims the flag with a single swap, so concurrent calls visit
/// the elements once; a cursor registered while another thread freezes
/// is released on drop like any other. Mutation takes `&mut self` and so
/// never overlaps with either.
pub struct Table<K, V, P = ByValue> {
    buckets: Buckets<DefaultKey>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    head: Option<DefaultKey>,
    // The next appended entry links after `tail` (or becomes `head`).
    tail: Option<DefaultKey>,
    iterators: IterCounter,
    frozen: AtomicBool,
    _policy: PhantomData<fn() -> P>,
}

/// Table keyed by host values.
pub type OrderedMap<K, V> = Table<K, V, ByValue>;

/// Table keyed by plain text.
pub type StringKeyedMap<V> = Table<String, V, ByText>;

impl<K, V, P> Table<K, V, P> {
    /// An empty table. No buckets are allocated until the first insert.
    pub fn new() -> Self {
        Self {
            buckets: Buckets::new(),
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
            iterators: IterCounter::new(),
            frozen: AtomicBool::new(false),
            _policy: PhantomData,
        }
    }

    /// A table sized so that `size_hint` inserts never trigger growth.
    pub fn with_capacity(size_hint: usize) -> Self {
        Self {
            buckets: Buckets::with_capacity(size_hint),
            entries: SlotMap::with_capacity_and_key(size_hint),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    /// Number of bucket chains; zero or a power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.chain_count()
    }

    /// Number of cursors currently registered against this table.
    pub fn active_iterators(&self) -> u32 {
        self.iterators.active()
    }

    /// Borrowing iterator in insertion order.
    ///
    /// The borrow already rules out mutation, so this does not register
    /// with the iterator counter. Use [`iterate`](Self::iterate) for a
    /// traversal that must coexist with a mutable path to the table.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            links: self.links(),
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// The earliest inserted key still present.
    pub fn first(&self) -> Option<&K> {
        self.head.and_then(|id| self.entries.get(id)).map(|e| &e.key)
    }

    /// Snapshot of all pairs in insertion order.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Starts a detached insertion-order traversal.
    ///
    /// Until the returned cursor is finished or dropped, `insert`, `delete`
    /// and `clear` fail with [`Error::ConcurrentMutation`]. Frozen tables
    /// cannot change, so their cursors are not counted. The cursor only
    /// walks the table it was started on.
    pub fn iterate(&self) -> Cursor {
        let guard = if self.is_frozen() {
            None
        } else {
            Some(self.iterators.enter())
        };
        Cursor {
            next: self.head,
            owner: self.iterators.id(),
            _guard: guard,
        }
    }

    /// Removes every entry. Bucket chains are kept at their current count.
    pub fn clear(&mut self) -> Result<()> {
        self.check_mutable(Mutation::Clear)?;
        self.buckets.clear();
        self.entries.clear();
        self.head = None;
        self.tail = None;
        Ok(())
    }

    fn links(&self) -> Links<'_, K, V> {
        Links {
            entries: &self.entries,
            next: self.head,
        }
    }

    fn check_mutable(&self, op: Mutation) -> Result<()> {
        if self.is_frozen() {
            log::debug!("rejected {op:?} on frozen table");
            return Err(Error::Frozen(op));
        }
        if self.iterators.active() > 0 {
            log::debug!(
                "rejected {op:?} with {} active iterator(s)",
                self.iterators.active()
            );
            return Err(Error::ConcurrentMutation(op));
        }
        Ok(())
    }

    /// Adds an entry known to be absent, growing first if needed.
    fn push_new(&mut self, hash: u32, key: K, value: V) {
        if self.buckets.is_uninit() {
            self.buckets.init(1);
        }
        if overloaded(self.len(), self.buckets.chain_count()) {
            self.grow();
        }
        let id = self.entries.insert(Entry {
            hash,
            key,
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail.and_then(|t| self.entries.get_mut(t)) {
            Some(t) => t.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.buckets.place(hash, id);
    }

    /// Doubles the chain count. Stored hashes are reused, so no key code
    /// runs and insertion order is untouched.
    fn grow(&mut self) {
        let live = Links {
            entries: &self.entries,
            next: self.head,
        }
        .map(|(id, e)| (e.hash, id));
        self.buckets.grow(live);
    }

    fn unlink(&mut self, prev: Option<DefaultKey>, next: Option<DefaultKey>) {
        match prev.and_then(|p| self.entries.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.entries.get_mut(n)) {
            Some(n) => n.prev = prev,
            // Removed the last entry; the append point moves back.
            None => self.tail = prev,
        }
    }

    /// Renders the table, its bucket chains and its order list.
    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.dump_into(&mut out);
        out
    }

    fn dump_into(&self, out: &mut String) -> fmt::Result
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        writeln!(
            out,
            "hashtable len={} chains={} frozen={} iterators={} head={:?} tail={:?}",
            self.len(),
            self.bucket_count(),
            self.is_frozen(),
            self.active_iterators(),
            self.head,
            self.tail
        )?;
        self.buckets.dump_into(out)?;
        for (id, e) in self.links() {
            writeln!(
                out,
                "entry {:?} hash={:#010x} key={:?} value={:?} prev={:?} next={:?}",
                id, e.hash, e.key, e.value, e.prev, e.next
            )?;
        }
        Ok(())
    }
}

impl<K, V, P> Table<K, V, P>
where
    P: KeyPolicy<K>,
{
    fn find(&self, hash: u32, q: &P::Query) -> Result<Option<DefaultKey>> {
        let entries = &self.entries;
        self.buckets.find(hash, |id| match entries.get(id) {
            Some(e) => P::eq(q, P::query(&e.key)),
            None => Ok(false),
        })
    }

    /// Inserts or updates. Updating an existing key keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.check_mutable(Mutation::Insert)?;
        let hash = remap_hash(P::hash(P::query(&key))?);
        if let Some(id) = self.find(hash, P::query(&key))? {
            if let Some(e) = self.entries.get_mut(id) {
                e.value = value;
            }
            return Ok(());
        }
        self.push_new(hash, key, value);
        Ok(())
    }

    pub fn lookup(&self, q: &P::Query) -> Result<Option<&V>> {
        let hash = remap_hash(P::hash(q)?);
        Ok(self
            .find(hash, q)?
            .and_then(|id| self.entries.get(id))
            .map(|e| &e.value))
    }

    pub fn contains_key(&self, q: &P::Query) -> Result<bool> {
        let hash = remap_hash(P::hash(q)?);
        Ok(self.find(hash, q)?.is_some())
    }

    /// Removes `q`, returning its value. Emptied buckets are not compacted.
    pub fn delete(&mut self, q: &P::Query) -> Result<Option<V>> {
        self.check_mutable(Mutation::Delete)?;
        let hash = remap_hash(P::hash(q)?);
        let Some(id) = self.find(hash, q)? else {
            return Ok(None);
        };
        self.buckets.remove(hash, id);
        let Some(e) = self.entries.remove(id) else {
            return Ok(None);
        };
        self.unlink(e.prev, e.next);
        Ok(Some(e.value))
    }
}

impl<K, V, P> Table<K, V, P>
where
    P: KeyPolicy<K>,
    V: Value,
{
    /// Makes the table and every key and value in it permanently immutable.
    ///
    /// Idempotent. The flag is set before any element is visited, so a
    /// value that leads back to this table stops the recursion.
    pub fn freeze(&self) {
        if self.frozen.swap(true, Ordering::Relaxed) {
            return;
        }
        log::trace!("freezing table of {} entries", self.len());
        for (k, v) in self.iter() {
            P::freeze(k);
            v.freeze();
        }
    }
}

impl<V> Table<String, V, ByText> {
    /// Appends a key the caller guarantees is absent, bypassing the
    /// duplicate scan and mutation guards. Used while building records,
    /// whose tables are private and not yet shared.
    pub(crate) fn append_unique(&mut self, key: String, value: V) {
        debug_assert!(!self.is_frozen());
        let hash = remap_hash(hash_text(&key));
        self.push_new(hash, key, value);
    }
}

impl<K, V, P> Default for Table<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P> fmt::Debug for Table<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, P> IntoIterator for &'a Table<K, V, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct Links<'a, K, V> {
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    next: Option<DefaultKey>,
}

impl<'a, K, V> Iterator for Links<'a, K, V> {
    type Item = (DefaultKey, &'a Entry<K, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let e = self.entries.get(id)?;
        self.next = e.next;
        Some((id, e))
    }
}

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    links: Links<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (_, e) = self.links.next()?;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Detached insertion-order cursor returned by [`Table::iterate`].
///
/// It does not borrow the table; each step takes the table by shared
/// reference. While the cursor lives, the table rejects structural
/// mutation, so the position it holds stays valid. Stepping it over any
/// other table yields nothing.
#[derive(Debug)]
pub struct Cursor {
    next: Option<DefaultKey>,
    owner: CounterId,
    _guard: Option<IterGuard>,
}

impl Cursor {
    /// Advances to the next entry of `table`, or `None` at the end or when
    /// `table` is not the one this cursor was started on.
    #[allow(clippy::should_implement_trait)]
    pub fn next<'t, K, V, P>(&mut self, table: &'t Table<K, V, P>) -> Option<(&'t K, &'t V)> {
        if !table.iterators.is(&self.owner) {
            log::debug!("cursor stepped over a table it was not started on");
            return None;
        }
        let id = self.next?;
        let e = table.entries.get(id)?;
        self.next = e.next;
        Some((&e.key, &e.value))
    }

    /// Releases the cursor's registration. Equivalent to dropping it.
    pub fn done(self) {}
}
