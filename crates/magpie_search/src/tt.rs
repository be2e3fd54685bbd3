//! Transposition cache for leaf values.
//!
//! Direct-mapped and lossy: a slot holds the upper hash bits for collision
//! detection and the latest value, nothing else. A colliding store simply
//! overwrites. The cache only short-circuits leaf evaluation; it never
//! bypasses legality checking.

/// Marks a slot that has never been written. Real values live in [-1, 1].
pub const UNEVALUATED: f32 = -2.0;

#[derive(Debug, Clone, Copy)]
struct TtEntry {
    key: u32,
    value: f32,
}

impl Default for TtEntry {
    fn default() -> Self {
        TtEntry {
            key: 0,
            value: UNEVALUATED,
        }
    }
}

pub struct TranspositionCache {
    slots: Vec<TtEntry>,
}

impl TranspositionCache {
    /// Build a cache filling `mib` mebibytes.
    pub fn new_mib(mib: usize) -> Self {
        let bytes = mib.max(1) * 1024 * 1024;
        let capacity = (bytes / std::mem::size_of::<TtEntry>()).max(1);
        TranspositionCache {
            slots: vec![TtEntry::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.fill(TtEntry::default());
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    fn key(hash: u64) -> u32 {
        (hash >> 32) as u32
    }

    /// Cached value for `hash`, if the slot still belongs to it.
    #[inline]
    pub fn probe(&self, hash: u64) -> Option<f32> {
        let entry = self.slots[self.index(hash)];
        if entry.key == Self::key(hash) && entry.value != UNEVALUATED {
            Some(entry.value)
        } else {
            None
        }
    }

    #[inline]
    pub fn store(&mut self, hash: u64, value: f32) {
        let idx = self.index(hash);
        self.slots[idx] = TtEntry {
            key: Self::key(hash),
            value,
        };
    }
}

#[cfg(test)]
#[path = "tt_tests.rs"]
mod tt_tests;
