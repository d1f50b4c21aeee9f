//! Guard records and handles.
//!
//! A guard record wraps one user allocation with a strong refcount, an
//! optional finalizer, and a back-link to its registry node. Each guard is
//! independently single-mode (plain counter) or concurrent-mode (atomic
//! counter); the mode is chosen at allocation time and never changes.
//!
//! User code holds copyable [`GuardId`] handles. Slots are recycled through
//! the pools, so every handle carries the record's generation at issue time;
//! a mismatch marks the handle stale and the operation is ignored rather
//! than corrupting an unrelated guard.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-guard refcount mode, immutable after allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefMode {
    /// Plain counter. Fast, but every raise/lower must be serialised by
    /// the caller.
    #[default]
    Single,
    /// Sequentially-consistent atomic counter safe to balance across
    /// threads.
    Concurrent,
}

/// Distinguishes the two moments a finalizer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalizeCause {
    /// The last strong reference dropped (or the guard was explicitly
    /// dropped); the cell is about to be recycled through the pools.
    Recycle,
    /// The process-exit sweep; the arenas are about to be destroyed
    /// wholesale, so nothing is returned to a pool.
    Exit,
}

impl FinalizeCause {
    /// True for the process-exit sweep.
    #[must_use]
    pub const fn is_exit(self) -> bool {
        matches!(self, Self::Exit)
    }
}

/// User finalizer, invoked exactly once just before the payload cell is
/// recycled or torn down at process exit.
pub type Finalizer<T> = Box<dyn FnMut(&mut T, FinalizeCause) + Send>;

/// Handle to a live guard.
///
/// The generation field detects use of a handle whose record has since been
/// recycled; stale handles are diagnosed, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardId {
    index: u32,
    generation: u32,
}

impl GuardId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Guard-record slot index. Stable across the record's reuse cycles.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Recycle generation this handle was issued under.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Handle to a payload cell, used by the preset-payload allocation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub(crate) u32);

impl CellId {
    /// Cell slot index. Stable across the cell's reuse cycles.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Result of one `lower` on a guard's refcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LowerOutcome {
    /// Other strong references remain.
    Shared,
    /// This lower released the last strong reference.
    ReachedZero,
    /// The count was already zero; the decrement was undone.
    AlreadyZero,
}

/// Metadata record for one user allocation.
pub(crate) struct GuardRecord<T> {
    /// Payload cell index; `None` exactly when the guard is dropped.
    pub(crate) cell: Option<u32>,
    /// Byte size of the payload region. Informational for fixed-`T`
    /// stores; live for the byte-buffer specialisation.
    pub(crate) allocated: usize,
    /// Refcount mode, set by `arm` and immutable until the next recycle.
    pub(crate) mode: RefMode,
    /// Strong count, single mode.
    strong: usize,
    /// Strong count, concurrent mode.
    strong_atomic: AtomicUsize,
    /// Finalizer, invoked at most once per guard lifetime.
    pub(crate) finalizer: Option<Finalizer<T>>,
    /// Back-link to this guard's registry node.
    pub(crate) node: Option<u32>,
    /// Bumped on every release so stale handles are detectable.
    pub(crate) generation: u32,
}

impl<T> GuardRecord<T> {
    /// A blank record as produced by the guard arena.
    pub(crate) fn vacant() -> Self {
        Self {
            cell: None,
            allocated: 0,
            mode: RefMode::Single,
            strong: 0,
            strong_atomic: AtomicUsize::new(0),
            finalizer: None,
            node: None,
            generation: 1,
        }
    }

    /// Initialises the mode-appropriate counter to one.
    pub(crate) fn arm(&mut self, mode: RefMode) {
        self.mode = mode;
        match mode {
            RefMode::Single => self.strong = 1,
            RefMode::Concurrent => self.strong_atomic = AtomicUsize::new(1),
        }
    }

    /// Increments the strong count.
    ///
    /// The new value is not observed by anyone, so the concurrent path can
    /// use a relaxed fetch-add.
    pub(crate) fn raise_strong(&mut self) {
        match self.mode {
            RefMode::Single => self.strong += 1,
            RefMode::Concurrent => {
                self.strong_atomic.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Decrements the strong count and reports whether it reached zero.
    ///
    /// The concurrent path decides from the value *returned by* `fetch_sub`
    /// (the pre-decrement value): exactly one thread observes one, so
    /// exactly one thread frees. An underflowing decrement is restored.
    pub(crate) fn lower_strong(&mut self) -> LowerOutcome {
        match self.mode {
            RefMode::Single => {
                if self.strong == 0 {
                    return LowerOutcome::AlreadyZero;
                }
                self.strong -= 1;
                if self.strong == 0 {
                    LowerOutcome::ReachedZero
                } else {
                    LowerOutcome::Shared
                }
            }
            RefMode::Concurrent => match self.strong_atomic.fetch_sub(1, Ordering::SeqCst) {
                0 => {
                    self.strong_atomic.fetch_add(1, Ordering::SeqCst);
                    LowerOutcome::AlreadyZero
                }
                1 => LowerOutcome::ReachedZero,
                _ => LowerOutcome::Shared,
            },
        }
    }

    /// Current strong count via the mode-appropriate primitive.
    pub(crate) fn strong_count(&self) -> usize {
        match self.mode {
            RefMode::Single => self.strong,
            RefMode::Concurrent => self.strong_atomic.load(Ordering::SeqCst),
        }
    }

    /// Resets the counters while the record sits in the pool.
    pub(crate) fn disarm(&mut self) {
        self.strong = 0;
        self.strong_atomic = AtomicUsize::new(0);
        self.allocated = 0;
        self.generation = self.generation.wrapping_add(1);
    }
}
