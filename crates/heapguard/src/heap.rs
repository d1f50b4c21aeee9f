//! Shared guard heaps.
//!
//! [`GuardHeap`] is the concurrent surface over a
//! [`GuardStore`](heapguard_core::GuardStore): one process-wide
//! `parking_lot::Mutex` serialises every registry and pool mutation.
//! Callers that never share a store across threads can own a `GuardStore`
//! directly and skip the lock entirely.
//!
//! The first successful allocation arms the process-exit sweep exactly
//! once: a teardown hook that finalizes every still-live guard with
//! [`FinalizeCause::Exit`] and destroys the arenas, pools, and registry.

use parking_lot::Mutex;
use std::sync::Once;

use heapguard_core::{
    CellId, FinalizeCause, Finalizer, GuardError, GuardId, GuardLogRecord, GuardStats, GuardStore,
    RefMode, StoreConfig,
};

use crate::exit;

/// Mutex-guarded guard store with an at-exit sweep.
pub struct GuardHeap<T> {
    store: Mutex<GuardStore<T>>,
    sweep_hook: Once,
}

impl<T: Send + 'static> GuardHeap<T> {
    /// Creates the heap and leaks it into a process-lifetime handle.
    ///
    /// This is the only constructor: the allocation methods take
    /// `&'static self` so the first successful allocation can arm an
    /// exit hook that reaches back into the heap, which requires the heap
    /// itself to live for the rest of the process.
    #[must_use]
    pub fn install(config: StoreConfig) -> &'static Self {
        Box::leak(Box::new(Self {
            store: Mutex::new(GuardStore::new(config)),
            sweep_hook: Once::new(),
        }))
    }

    /// Allocates a guard over `value`. See
    /// [`GuardStore::alloc`](heapguard_core::GuardStore::alloc).
    pub fn alloc(
        &'static self,
        mode: RefMode,
        finalizer: Option<Finalizer<T>>,
        value: T,
    ) -> Result<GuardId, GuardError> {
        let out = self.store.lock().alloc(mode, finalizer, value);
        if out.is_ok() {
            self.arm_sweep();
        }
        out
    }

    /// Allocates a guard using the configured default mode.
    pub fn alloc_default(
        &'static self,
        finalizer: Option<Finalizer<T>>,
        value: T,
    ) -> Result<GuardId, GuardError> {
        let out = self.store.lock().alloc_default(finalizer, value);
        if out.is_ok() {
            self.arm_sweep();
        }
        out
    }

    /// Allocates a guard over a cell previously obtained from
    /// [`take_cell`](Self::take_cell); the payload pool is not consulted.
    pub fn alloc_preset(
        &'static self,
        mode: RefMode,
        finalizer: Option<Finalizer<T>>,
        cell: CellId,
    ) -> Result<GuardId, GuardError> {
        let out = self.store.lock().alloc_preset(mode, finalizer, cell);
        if out.is_ok() {
            self.arm_sweep();
        }
        out
    }

    /// Obtains a payload cell holding `value` for a later `alloc_preset`.
    pub fn take_cell(&self, value: T) -> Result<CellId, GuardError> {
        self.store.lock().take_cell(value)
    }

    /// Increments the strong count of a live guard.
    pub fn raise(&self, id: GuardId) {
        self.store.lock().raise(id);
    }

    /// Decrements the strong count; releases on zero and nulls the handle.
    pub fn lower(&self, handle: &mut Option<GuardId>) {
        self.store.lock().lower(handle);
    }

    /// Releases immediately, ignoring the refcount.
    pub fn drop_guard(&self, handle: &mut Option<GuardId>, cause: FinalizeCause) {
        self.store.lock().drop_guard(handle, cause);
    }

    /// Sweeps every live guard and tears the heap down. Idempotent.
    pub fn destroy_all(&self) {
        self.store.lock().destroy_all();
    }

    /// Runs `f` against the payload of a live guard.
    pub fn with_payload<R>(&self, id: GuardId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut store = self.store.lock();
        store.payload_mut(id).map(f)
    }

    /// Strong count of a live guard.
    #[must_use]
    pub fn strong_count(&self, id: GuardId) -> Option<usize> {
        self.store.lock().strong_count(id)
    }

    /// True while the handle refers to a live guard.
    #[must_use]
    pub fn is_live(&self, id: GuardId) -> bool {
        self.store.lock().is_live(id)
    }

    /// The payload cell backing a live guard.
    #[must_use]
    pub fn cell_of(&self, id: GuardId) -> Option<CellId> {
        self.store.lock().cell_of(id)
    }

    /// Byte size of the payload region of a live guard.
    #[must_use]
    pub fn allocated(&self, id: GuardId) -> Option<usize> {
        self.store.lock().allocated(id)
    }

    /// Number of live guards.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.store.lock().live_count()
    }

    /// True once the heap has been swept.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.store.lock().is_torn_down()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> GuardStats {
        self.store.lock().stats()
    }

    /// Drains the structured lifecycle records.
    pub fn drain_lifecycle_logs(&self) -> Vec<GuardLogRecord> {
        self.store.lock().drain_lifecycle_logs()
    }

    fn arm_sweep(&'static self) {
        self.sweep_hook.call_once(|| {
            exit::on_process_exit(move || {
                self.destroy_all();
            });
        });
    }
}

impl GuardHeap<Vec<u8>> {
    /// Allocates a guard over a zeroed byte buffer of `size` bytes.
    pub fn alloc_bytes(
        &'static self,
        mode: RefMode,
        finalizer: Option<Finalizer<Vec<u8>>>,
        size: usize,
    ) -> Result<GuardId, GuardError> {
        let out = self.store.lock().alloc_bytes(mode, finalizer, size);
        if out.is_ok() {
            self.arm_sweep();
        }
        out
    }

    /// Reallocates the payload to `new_size` bytes.
    pub fn resize(&self, id: GuardId, new_size: usize) -> bool {
        self.store.lock().resize(id, new_size)
    }

    /// Grows the payload by `delta` bytes.
    pub fn extend(&self, id: GuardId, delta: usize) -> bool {
        self.store.lock().extend(id, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_heap_starts_empty_and_unswept() {
        let heap: &'static GuardHeap<u32> = GuardHeap::install(StoreConfig::new(4));
        assert_eq!(heap.live_count(), 0);
        assert!(!heap.is_torn_down());
    }
}
