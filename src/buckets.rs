//! Bucket index shared by `Table` and `OrderedView`.
//!
//! An open-chaining index from 32-bit hashes to entry ids. Each chain head
//! holds `BUCKET_SIZE` slots and links to boxed overflow buckets. A slot
//! whose hash is zero is unused. The index never calls user code: callers
//! pass a `matches` closure to resolve hash collisions.

use crate::error::Result;
use core::fmt::{self, Write as _};
use smallvec::SmallVec;

/// Slots per bucket.
pub const BUCKET_SIZE: usize = 8;

/// Average chain occupancy that triggers doubling.
pub const LOAD_FACTOR: f64 = 6.5;

/// Whether `elems` entries exceed the load factor of `buckets` chains.
#[inline]
pub fn overloaded(elems: usize, buckets: usize) -> bool {
    elems >= BUCKET_SIZE && elems as f64 >= LOAD_FACTOR * buckets as f64
}

/// Smallest power-of-two chain count that holds `size` entries without growing.
pub fn chains_for(size: usize) -> usize {
    let mut nb = 1usize;
    while overloaded(size, nb) {
        nb <<= 1;
    }
    nb
}

#[derive(Copy, Clone, Debug, Default)]
struct Slot<I> {
    hash: u32, // nonzero => in use
    id: I,
}

#[derive(Debug)]
struct Bucket<I> {
    slots: [Slot<I>; BUCKET_SIZE],
    next: Option<Box<Bucket<I>>>,
}

impl<I: Copy + Default> Bucket<I> {
    fn empty() -> Self {
        Self {
            slots: [Slot::default(); BUCKET_SIZE],
            next: None,
        }
    }
}

#[derive(Debug)]
pub struct Buckets<I> {
    // len is zero or a power of two; a single chain stays inline.
    table: SmallVec<[Bucket<I>; 1]>,
}

impl<I> Default for Buckets<I> {
    fn default() -> Self {
        Self {
            table: SmallVec::new(),
        }
    }
}

impl<I> Buckets<I>
where
    I: Copy + Default + PartialEq + fmt::Debug,
{
    /// An index with no chains. Nothing is allocated until `init`.
    pub fn new() -> Self {
        Self::default()
    }

    /// An index pre-sized so `size` entries fit without growing.
    pub fn with_capacity(size: usize) -> Self {
        let mut b = Self::new();
        b.init(size);
        b
    }

    /// Replace the chains with enough empty ones for `size` entries.
    pub fn init(&mut self, size: usize) {
        let nb = chains_for(size);
        self.table = (0..nb).map(|_| Bucket::empty()).collect();
    }

    pub fn chain_count(&self) -> usize {
        self.table.len()
    }

    pub fn is_uninit(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    fn chain(&self, hash: u32) -> usize {
        debug_assert!(self.table.len().is_power_of_two());
        hash as usize & (self.table.len() - 1)
    }

    /// Finds the id in `hash`'s chain for which `matches` holds. Only slots
    /// with an equal hash are offered to `matches`; its first error aborts
    /// the search.
    pub fn find<F>(&self, hash: u32, mut matches: F) -> Result<Option<I>>
    where
        F: FnMut(I) -> Result<bool>,
    {
        debug_assert!(hash != 0);
        if self.table.is_empty() {
            return Ok(None);
        }
        let mut p = Some(&self.table[self.chain(hash)]);
        while let Some(b) = p {
            for s in &b.slots {
                if s.hash == hash && matches(s.id)? {
                    return Ok(Some(s.id));
                }
            }
            p = b.next.as_deref();
        }
        Ok(None)
    }

    /// Records `id` under `hash` in the first free slot of its chain,
    /// appending an overflow bucket when the chain is full.
    pub fn place(&mut self, hash: u32, id: I) {
        debug_assert!(hash != 0);
        let i = self.chain(hash);
        let mut b = &mut self.table[i];
        loop {
            if let Some(s) = b.slots.iter_mut().find(|s| s.hash == 0) {
                *s = Slot { hash, id };
                return;
            }
            if b.next.is_none() {
                // No space in existing buckets; add a new one to the chain.
                let mut nb = Box::new(Bucket::empty());
                nb.slots[0] = Slot { hash, id };
                b.next = Some(nb);
                return;
            }
            b = match b.next.as_deref_mut() {
                Some(n) => n,
                None => return,
            };
        }
    }

    /// Clears the slot holding `id`. Emptied overflow buckets are kept.
    pub fn remove(&mut self, hash: u32, id: I) -> bool {
        if self.table.is_empty() {
            return false;
        }
        let i = self.chain(hash);
        let mut p = Some(&mut self.table[i]);
        while let Some(b) = p {
            if let Some(s) = b
                .slots
                .iter_mut()
                .find(|s| s.hash == hash && s.id == id)
            {
                *s = Slot::default();
                return true;
            }
            p = b.next.as_deref_mut();
        }
        false
    }

    /// Empties every chain, releasing overflow buckets. The chain count is kept.
    pub fn clear(&mut self) {
        for b in self.table.iter_mut() {
            *b = Bucket::empty();
        }
    }

    /// Doubles the chain count and re-places `live` (stored hashes, in order).
    pub fn grow<It>(&mut self, live: It)
    where
        It: IntoIterator<Item = (u32, I)>,
    {
        let nb = (self.table.len() << 1).max(1);
        log::trace!("growing bucket index from {} to {} chains", self.table.len(), nb);
        self.table = (0..nb).map(|_| Bucket::empty()).collect();
        for (hash, id) in live {
            self.place(hash, id);
        }
    }

    /// Number of occupied slots across all chains.
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn occupied(&self) -> usize {
        let mut n = 0;
        for head in &self.table {
            let mut p = Some(head);
            while let Some(b) = p {
                n += b.slots.iter().filter(|s| s.hash != 0).count();
                p = b.next.as_deref();
            }
        }
        n
    }

    /// Renders every chain, bucket and slot; a debugging aid.
    pub fn dump_into(&self, out: &mut String) -> fmt::Result {
        for (j, head) in self.table.iter().enumerate() {
            writeln!(out, "bucket chain {j}")?;
            let mut p = Some(head);
            let mut depth = 0;
            while let Some(b) = p {
                writeln!(out, "  bucket {depth}")?;
                for (i, s) in b.slots.iter().enumerate() {
                    if s.hash != 0 {
                        writeln!(out, "    slot {i} hash={:#010x} id={:?}", s.hash, s.id)?;
                    }
                }
                p = b.next.as_deref();
                depth += 1;
            }
        }
        Ok(())
    }
}
