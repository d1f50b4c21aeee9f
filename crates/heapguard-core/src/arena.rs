//! Fixed-capacity bump arenas.
//!
//! An [`Arena`] hands out slots of a single fixed type, one bump at a time.
//! Individual slots are never freed; the whole backing buffer is released at
//! teardown via [`Arena::clear`]. Recycling of returned slots happens above
//! the arena, in the object pools.
//!
//! The backing buffer is reserved lazily on the first `take_with`, so
//! constructing an arena is free until the first allocation arrives.

/// A bump allocator over slots of type `S`.
///
/// Capacity is fixed at construction. `take_with` returns slot indices;
/// exhaustion surfaces as `None` and is mapped to an allocation failure by
/// the enclosing request.
#[derive(Debug)]
pub struct Arena<S> {
    slots: Vec<S>,
    capacity: usize,
}

impl<S> Arena<S> {
    /// Creates an arena that will hold at most `capacity` slots.
    ///
    /// No memory is allocated until the first `take_with`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Bump-allocates the next slot, initialised with `vacant()`.
    ///
    /// Returns the slot index, or `None` once `capacity` slots have been
    /// handed out or the backing buffer cannot be reserved.
    pub fn take_with(&mut self, vacant: impl FnOnce() -> S) -> Option<u32> {
        if self.slots.len() >= self.capacity {
            return None;
        }
        if self.slots.capacity() == 0 {
            // First touch: reserve the whole backing buffer so slot
            // addresses stay stable for the arena's lifetime. A refused or
            // overflowing reservation surfaces as exhaustion, not a panic.
            if self.slots.try_reserve_exact(self.capacity).is_err() {
                return None;
            }
        }
        let idx = u32::try_from(self.slots.len()).ok()?;
        self.slots.push(vacant());
        Some(idx)
    }

    /// Checked slot access.
    #[must_use]
    pub fn get(&self, idx: u32) -> Option<&S> {
        self.slots.get(idx as usize)
    }

    /// Checked mutable slot access.
    pub fn get_mut(&mut self, idx: u32) -> Option<&mut S> {
        self.slots.get_mut(idx as usize)
    }

    /// Trusted slot access for indices previously returned by `take_with`.
    pub(crate) fn slot(&self, idx: u32) -> &S {
        &self.slots[idx as usize]
    }

    /// Trusted mutable slot access for indices previously returned by
    /// `take_with`.
    pub(crate) fn slot_mut(&mut self, idx: u32) -> &mut S {
        &mut self.slots[idx as usize]
    }

    /// Number of slots handed out so far.
    #[must_use]
    pub fn used(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of slots this arena will hand out.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once every slot has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Drops every slot and frees the backing buffer.
    ///
    /// All previously returned indices become invalid.
    pub fn clear(&mut self) {
        self.slots = Vec::new();
    }
}
