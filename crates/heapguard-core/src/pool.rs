//! Object pools (free lists).
//!
//! A [`Pool`] is a LIFO stack of slot indices returned by their owners.
//! Callers consult the pool before tapping the arena again, so a
//! release-then-allocate cycle reuses the slots it just gave back without
//! advancing the arena head.
//!
//! Pools are not thread-safe on their own; the surface layer's mutex
//! serialises all pool use on the concurrent path.

/// LIFO free list of arena slot indices.
#[derive(Debug, Default)]
pub struct Pool {
    free: Vec<u32>,
}

impl Pool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Returns a slot to the pool.
    pub fn push(&mut self, idx: u32) {
        self.free.push(idx);
    }

    /// Pops the most recently returned slot, if any.
    pub fn try_pop(&mut self) -> Option<u32> {
        self.free.pop()
    }

    /// Number of slots currently awaiting reuse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// True when no slots are pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Drops every pooled index and frees the backing buffer.
    pub fn clear(&mut self) {
        self.free = Vec::new();
    }
}
