//! Core guard-store state.
//!
//! [`GuardStore`] coordinates the three arenas, their pools, and the
//! registry behind the allocator surface: `alloc`, `raise`, `lower`,
//! `drop_guard`, `destroy_all`. It is a single-owner (`&mut self`) state
//! machine; the `heapguard` crate wraps it in the process-wide mutex for
//! the concurrent path.
//!
//! Misuse (lowering a dropped guard, using a handle after its record was
//! recycled, calling in after the sweep) is diagnosed and ignored, with a
//! `Warn` lifecycle record instead of undefined behaviour.

use crate::arena::Arena;
use crate::config::StoreConfig;
use crate::error::{ArenaKind, GuardError};
use crate::guard::{CellId, FinalizeCause, Finalizer, GuardId, GuardRecord, LowerOutcome, RefMode};
use crate::log::{GuardLogLevel, GuardLogRecord};
use crate::pool::Pool;
use crate::registry::Registry;

/// Counter snapshot for the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardStats {
    /// Guards currently live.
    pub live_guards: usize,
    /// Payload cells served from the pool.
    pub cell_pool_hits: u64,
    /// Payload cells served from the arena.
    pub cell_arena_takes: u64,
    /// Guard records served from the pool.
    pub guard_pool_hits: u64,
    /// Guard records served from the arena.
    pub guard_arena_takes: u64,
    /// Guards released back through the pools.
    pub recycled_guards: u64,
    /// Operations rejected because the handle was stale.
    pub stale_handle_ops: u64,
}

/// Reference-counted guard allocator for payloads of type `T`.
pub struct GuardStore<T> {
    config: StoreConfig,
    cells: Arena<Option<T>>,
    cell_pool: Pool,
    guards: Arena<GuardRecord<T>>,
    guard_pool: Pool,
    registry: Registry,
    live_count: usize,
    torn_down: bool,
    stats: GuardStats,
    next_decision_id: u64,
    lifecycle_logs: Vec<GuardLogRecord>,
}

impl<T> GuardStore<T> {
    /// Creates a store. Nothing is allocated until the first `alloc`.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cells: Arena::new(config.arena_capacity),
            cell_pool: Pool::new(),
            guards: Arena::new(config.arena_capacity),
            guard_pool: Pool::new(),
            registry: Registry::new(config.arena_capacity),
            live_count: 0,
            torn_down: false,
            stats: GuardStats::default(),
            next_decision_id: 1,
            lifecycle_logs: Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------

    /// Allocates a guard over `value`.
    ///
    /// Obtains a guard record (pool, then arena), a payload cell (pool,
    /// then arena), and a registry node; every post-guard failure rolls
    /// the already-obtained objects back to their pools before surfacing.
    pub fn alloc(
        &mut self,
        mode: RefMode,
        finalizer: Option<Finalizer<T>>,
        value: T,
    ) -> Result<GuardId, GuardError> {
        if self.torn_down {
            return Err(GuardError::TornDown);
        }
        let guard_idx = self.take_guard_record()?;
        let cell = match self.take_cell(value) {
            Ok(cell) => cell,
            Err(err) => {
                self.guard_pool.push(guard_idx);
                self.record_lifecycle(
                    GuardLogLevel::Warn,
                    "alloc",
                    "rollback_guard_record",
                    Some(guard_idx),
                    "oom",
                    err.to_string(),
                );
                return Err(err);
            }
        };
        self.finish_alloc(guard_idx, mode, finalizer, cell, false)
    }

    /// Allocates a guard using `config.default_mode`.
    pub fn alloc_default(
        &mut self,
        finalizer: Option<Finalizer<T>>,
        value: T,
    ) -> Result<GuardId, GuardError> {
        let mode = self.config.default_mode;
        self.alloc(mode, finalizer, value)
    }

    /// Allocates a guard over a cell the caller already obtained via
    /// [`take_cell`](Self::take_cell).
    ///
    /// The payload pool is not consulted; the caller relinquishes the cell,
    /// which is returned to the payload pool when the guard is released.
    pub fn alloc_preset(
        &mut self,
        mode: RefMode,
        finalizer: Option<Finalizer<T>>,
        cell: CellId,
    ) -> Result<GuardId, GuardError> {
        if self.torn_down {
            return Err(GuardError::TornDown);
        }
        if !matches!(self.cells.get(cell.index()), Some(Some(_))) {
            self.record_lifecycle(
                GuardLogLevel::Warn,
                "alloc",
                "preset_cell_vacant",
                None,
                "rejected",
                format!("cell={}", cell.index()),
            );
            return Err(GuardError::VacantCell);
        }
        // Guard-record failure leaves the preset cell with the caller.
        let guard_idx = self.take_guard_record()?;
        self.finish_alloc(guard_idx, mode, finalizer, cell, true)
    }

    /// Obtains a payload cell (pool, then arena) holding `value`.
    ///
    /// On exhaustion `value` is dropped and the error surfaced.
    pub fn take_cell(&mut self, value: T) -> Result<CellId, GuardError> {
        if self.torn_down {
            return Err(GuardError::TornDown);
        }
        let idx = match self.cell_pool.try_pop() {
            Some(idx) => {
                self.stats.cell_pool_hits += 1;
                idx
            }
            None => {
                let idx = self
                    .cells
                    .take_with(|| None)
                    .ok_or(GuardError::ArenaExhausted(ArenaKind::Cell))?;
                self.stats.cell_arena_takes += 1;
                idx
            }
        };
        *self.cells.slot_mut(idx) = Some(value);
        Ok(CellId(idx))
    }

    fn take_guard_record(&mut self) -> Result<u32, GuardError> {
        match self.guard_pool.try_pop() {
            Some(idx) => {
                self.stats.guard_pool_hits += 1;
                Ok(idx)
            }
            None => {
                let idx = self
                    .guards
                    .take_with(GuardRecord::vacant)
                    .ok_or(GuardError::ArenaExhausted(ArenaKind::Guard))?;
                self.stats.guard_arena_takes += 1;
                Ok(idx)
            }
        }
    }

    fn finish_alloc(
        &mut self,
        guard_idx: u32,
        mode: RefMode,
        finalizer: Option<Finalizer<T>>,
        cell: CellId,
        preset: bool,
    ) -> Result<GuardId, GuardError> {
        let node = match self.registry.append(guard_idx) {
            Ok(node) => node,
            Err(err) => {
                // Ownership of the cell was relinquished either way; both
                // objects go back to their pools before surfacing.
                drop(self.cells.slot_mut(cell.index()).take());
                self.cell_pool.push(cell.index());
                self.guard_pool.push(guard_idx);
                self.record_lifecycle(
                    GuardLogLevel::Warn,
                    "alloc",
                    "rollback_registry_node",
                    Some(guard_idx),
                    "oom",
                    err.to_string(),
                );
                return Err(err);
            }
        };
        let generation = {
            let rec = self.guards.slot_mut(guard_idx);
            rec.cell = Some(cell.index());
            rec.allocated = std::mem::size_of::<T>();
            rec.finalizer = finalizer;
            rec.node = Some(node);
            rec.arm(mode);
            rec.generation
        };
        self.live_count += 1;
        self.record_lifecycle(
            GuardLogLevel::Trace,
            "alloc",
            "alloc",
            Some(guard_idx),
            "success",
            format!("mode={mode:?} preset={preset} cell={}", cell.index()),
        );
        Ok(GuardId::new(guard_idx, generation))
    }

    // -----------------------------------------------------------------
    // Refcount protocol
    // -----------------------------------------------------------------

    /// Increments the strong count. Ignored (with a `Warn` record) on
    /// stale handles and after teardown.
    pub fn raise(&mut self, id: GuardId) {
        if self.torn_down {
            self.reject(id, "raise", "raise_after_teardown");
            return;
        }
        match self.live_record_mut(id) {
            Some(rec) => {
                rec.raise_strong();
                self.record_lifecycle(
                    GuardLogLevel::Trace,
                    "raise",
                    "raise",
                    Some(id.index()),
                    "success",
                    String::new(),
                );
            }
            None => self.reject(id, "raise", "stale_handle_ignored"),
        }
    }

    /// Decrements the strong count; releases the guard when it reaches
    /// zero and nulls the caller's handle.
    ///
    /// A non-zero result leaves the handle intact (shared owners remain).
    pub fn lower(&mut self, handle: &mut Option<GuardId>) {
        let Some(id) = *handle else { return };
        if self.torn_down {
            self.reject(id, "lower", "lower_after_teardown");
            return;
        }
        let outcome = match self.live_record_mut(id) {
            Some(rec) => rec.lower_strong(),
            None => {
                self.reject(id, "lower", "stale_handle_ignored");
                return;
            }
        };
        match outcome {
            LowerOutcome::Shared => self.record_lifecycle(
                GuardLogLevel::Trace,
                "lower",
                "lower_shared",
                Some(id.index()),
                "success",
                String::new(),
            ),
            LowerOutcome::AlreadyZero => {
                self.reject(id, "lower", "lower_after_zero_ignored");
            }
            LowerOutcome::ReachedZero => {
                self.release(id, FinalizeCause::Recycle, "lower");
                *handle = None;
            }
        }
    }

    /// Releases the guard immediately, ignoring the refcount, and nulls
    /// the caller's handle.
    ///
    /// With [`FinalizeCause::Recycle`] the registry node, cell, and record
    /// are returned to their pools. With [`FinalizeCause::Exit`] nothing
    /// is unlinked or pooled: the arenas are about to be destroyed
    /// wholesale.
    pub fn drop_guard(&mut self, handle: &mut Option<GuardId>, cause: FinalizeCause) {
        let Some(id) = *handle else { return };
        if self.torn_down {
            self.reject(id, "drop_guard", "drop_after_teardown");
            return;
        }
        if self.live_record(id).is_none() {
            self.reject(id, "drop_guard", "stale_handle_ignored");
            *handle = None;
            return;
        }
        self.release(id, cause, "drop_guard");
        *handle = None;
    }

    /// Unlink, finalize, recycle. Callers guarantee `id` is live.
    fn release(&mut self, id: GuardId, cause: FinalizeCause, op: &'static str) {
        let idx = id.index();
        let (cell, node, mut finalizer) = {
            let rec = self.guards.slot_mut(idx);
            (rec.cell.take(), rec.node.take(), rec.finalizer.take())
        };
        // Unlink before finalizing so a finalizer observing the store sees
        // the guard already gone from the registry.
        if let Some(node) = node {
            if !cause.is_exit() {
                self.registry.remove(node);
            }
        }
        if let (Some(cell), Some(finalize)) = (cell, finalizer.as_mut()) {
            if let Some(value) = self.cells.slot_mut(cell).as_mut() {
                finalize(value, cause);
            }
        }
        if let Some(cell) = cell {
            drop(self.cells.slot_mut(cell).take());
            if !cause.is_exit() {
                self.cell_pool.push(cell);
            }
        }
        self.guards.slot_mut(idx).disarm();
        if !cause.is_exit() {
            self.guard_pool.push(idx);
            self.stats.recycled_guards += 1;
        }
        self.live_count -= 1;
        self.record_lifecycle(
            GuardLogLevel::Trace,
            op,
            if cause.is_exit() {
                "release_exit"
            } else {
                "release_recycle"
            },
            Some(idx),
            "success",
            String::new(),
        );
    }

    // -----------------------------------------------------------------
    // Sweep
    // -----------------------------------------------------------------

    /// Finalizes every live guard with [`FinalizeCause::Exit`] in
    /// insertion order, then destroys arenas, pools, and the registry.
    ///
    /// Idempotent; the store accepts no further work afterwards.
    pub fn destroy_all(&mut self) {
        if self.torn_down {
            return;
        }
        let order: Vec<u32> = self.registry.iter().collect();
        for guard_idx in order {
            let generation = self.guards.slot(guard_idx).generation;
            let mut handle = Some(GuardId::new(guard_idx, generation));
            self.drop_guard(&mut handle, FinalizeCause::Exit);
        }
        self.cells.clear();
        self.cell_pool.clear();
        self.guards.clear();
        self.guard_pool.clear();
        self.registry.clear();
        self.live_count = 0;
        self.torn_down = true;
        self.record_lifecycle(
            GuardLogLevel::Info,
            "destroy_all",
            "sweep_complete",
            None,
            "success",
            String::new(),
        );
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Shared access to the payload of a live guard.
    #[must_use]
    pub fn payload(&self, id: GuardId) -> Option<&T> {
        let cell = self.live_record(id)?.cell?;
        self.cells.get(cell)?.as_ref()
    }

    /// Mutable access to the payload of a live guard.
    pub fn payload_mut(&mut self, id: GuardId) -> Option<&mut T> {
        let cell = self.live_record(id)?.cell?;
        self.cells.get_mut(cell)?.as_mut()
    }

    /// Strong count of a live guard, read via the mode-appropriate
    /// primitive.
    #[must_use]
    pub fn strong_count(&self, id: GuardId) -> Option<usize> {
        self.live_record(id).map(GuardRecord::strong_count)
    }

    /// True while the handle refers to a live guard.
    #[must_use]
    pub fn is_live(&self, id: GuardId) -> bool {
        self.live_record(id).is_some()
    }

    /// The payload cell backing a live guard.
    #[must_use]
    pub fn cell_of(&self, id: GuardId) -> Option<CellId> {
        self.live_record(id)?.cell.map(CellId)
    }

    /// Byte size of the payload region of a live guard.
    #[must_use]
    pub fn allocated(&self, id: GuardId) -> Option<usize> {
        self.live_record(id).map(|rec| rec.allocated)
    }

    /// Number of live guards.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// True once `destroy_all` has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Instantiation-time options.
    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> GuardStats {
        GuardStats {
            live_guards: self.live_count,
            ..self.stats
        }
    }

    /// Returns a view of the lifecycle records.
    #[must_use]
    pub fn lifecycle_logs(&self) -> &[GuardLogRecord] {
        &self.lifecycle_logs
    }

    /// Drains the lifecycle records.
    pub fn drain_lifecycle_logs(&mut self) -> Vec<GuardLogRecord> {
        std::mem::take(&mut self.lifecycle_logs)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn live_record(&self, id: GuardId) -> Option<&GuardRecord<T>> {
        self.guards
            .get(id.index())
            .filter(|rec| rec.generation == id.generation() && rec.cell.is_some())
    }

    pub(crate) fn live_record_mut(&mut self, id: GuardId) -> Option<&mut GuardRecord<T>> {
        self.guards
            .get_mut(id.index())
            .filter(|rec| rec.generation == id.generation() && rec.cell.is_some())
    }

    pub(crate) fn cell_value_mut(&mut self, cell: CellId) -> Option<&mut T> {
        self.cells.get_mut(cell.index())?.as_mut()
    }

    fn reject(&mut self, id: GuardId, op: &'static str, event: &'static str) {
        self.stats.stale_handle_ops += 1;
        self.record_lifecycle(
            GuardLogLevel::Warn,
            op,
            event,
            Some(id.index()),
            "ignored",
            format!("generation={}", id.generation()),
        );
    }

    pub(crate) fn record_lifecycle(
        &mut self,
        level: GuardLogLevel,
        op: &'static str,
        event: &'static str,
        guard: Option<u32>,
        outcome: &'static str,
        details: impl Into<String>,
    ) {
        let decision_id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        self.lifecycle_logs.push(GuardLogRecord {
            decision_id,
            level,
            op,
            event,
            guard,
            outcome,
            details: details.into(),
            live_count: self.live_count,
            cell_pool_depth: self.cell_pool.len(),
            guard_pool_depth: self.guard_pool.len(),
        });
    }
}

impl<T> Default for GuardStore<T> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_finalizer(
        normal: &Arc<AtomicUsize>,
        exit: &Arc<AtomicUsize>,
    ) -> Finalizer<String> {
        let normal = Arc::clone(normal);
        let exit = Arc::clone(exit);
        Box::new(move |_value, cause| {
            if cause.is_exit() {
                exit.fetch_add(1, Ordering::SeqCst);
            } else {
                normal.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn test_single_mode_lifecycle() {
        let normal = Arc::new(AtomicUsize::new(0));
        let exit = Arc::new(AtomicUsize::new(0));
        let mut store: GuardStore<String> = GuardStore::default();

        let id = store
            .alloc(
                RefMode::Single,
                Some(counting_finalizer(&normal, &exit)),
                "payload".to_string(),
            )
            .unwrap();
        assert_eq!(store.strong_count(id), Some(1));
        assert_eq!(store.payload(id).map(String::as_str), Some("payload"));

        store.raise(id);
        assert_eq!(store.strong_count(id), Some(2));

        let mut handle = Some(id);
        store.lower(&mut handle);
        assert_eq!(handle, Some(id));
        assert_eq!(normal.load(Ordering::SeqCst), 0);

        store.lower(&mut handle);
        assert_eq!(handle, None);
        assert_eq!(normal.load(Ordering::SeqCst), 1);
        assert_eq!(exit.load(Ordering::SeqCst), 0);
        assert!(!store.is_live(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_lower_on_consumed_handle_is_noop() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let id = store.alloc(RefMode::Single, None, 5).unwrap();
        let mut handle = Some(id);
        store.lower(&mut handle);
        assert_eq!(handle, None);
        // Handle already nulled; nothing to do.
        store.lower(&mut handle);
        assert_eq!(store.stats().stale_handle_ops, 0);
    }

    #[test]
    fn test_stale_handle_is_diagnosed_not_reused() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let first = store.alloc(RefMode::Single, None, 1).unwrap();
        let mut handle = Some(first);
        store.lower(&mut handle);

        // Same slot, new generation.
        let second = store.alloc(RefMode::Single, None, 2).unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());

        store.raise(first);
        assert_eq!(store.strong_count(second), Some(1));
        assert_eq!(store.stats().stale_handle_ops, 1);
        assert!(store.lifecycle_logs().iter().any(|entry| {
            entry.level == GuardLogLevel::Warn && entry.event == "stale_handle_ignored"
        }));
    }

    #[test]
    fn test_pool_recycling_is_lifo() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let id = store.alloc(RefMode::Single, None, 1).unwrap();
        let cell = store.cell_of(id).unwrap();
        let mut handle = Some(id);
        store.drop_guard(&mut handle, FinalizeCause::Recycle);

        let next = store.alloc(RefMode::Single, None, 2).unwrap();
        assert_eq!(next.index(), id.index());
        assert_eq!(store.cell_of(next), Some(cell));

        let stats = store.stats();
        assert_eq!(stats.guard_pool_hits, 1);
        assert_eq!(stats.cell_pool_hits, 1);
        assert_eq!(stats.recycled_guards, 1);
    }

    #[test]
    fn test_preset_payload_skips_cell_pool() {
        let mut store: GuardStore<u32> = GuardStore::default();
        // Seed the pool with one recycled cell.
        let seed = store.alloc(RefMode::Single, None, 0).unwrap();
        let mut handle = Some(seed);
        store.drop_guard(&mut handle, FinalizeCause::Recycle);
        let pool_hits_before = store.stats().cell_pool_hits;

        // take_cell consults the pool; alloc_preset must not.
        let cell = store.take_cell(7).unwrap();
        let hits_after_take = store.stats().cell_pool_hits;
        assert_eq!(hits_after_take, pool_hits_before + 1);

        let id = store.alloc_preset(RefMode::Single, None, cell).unwrap();
        assert_eq!(store.stats().cell_pool_hits, hits_after_take);
        assert_eq!(store.cell_of(id), Some(cell));
        assert_eq!(store.payload(id), Some(&7));

        // Release returns the relinquished cell to the pool.
        let mut handle = Some(id);
        store.lower(&mut handle);
        let reused = store.take_cell(9).unwrap();
        assert_eq!(reused, cell);
    }

    #[test]
    fn test_alloc_preset_rejects_vacant_cell() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let cell = store.take_cell(3).unwrap();
        let id = store.alloc_preset(RefMode::Single, None, cell).unwrap();
        let mut handle = Some(id);
        store.lower(&mut handle);
        // The cell went back to the pool and is vacant now.
        assert_eq!(
            store.alloc_preset(RefMode::Single, None, cell),
            Err(GuardError::VacantCell)
        );
    }

    #[test]
    fn test_guard_arena_exhaustion_rolls_back() {
        let mut store: GuardStore<u32> = GuardStore::new(StoreConfig::new(2));
        let a = store.alloc(RefMode::Single, None, 1).unwrap();
        let _b = store.alloc(RefMode::Single, None, 2).unwrap();
        assert_eq!(
            store.alloc(RefMode::Single, None, 3),
            Err(GuardError::ArenaExhausted(ArenaKind::Guard))
        );
        // Freeing one slot makes allocation possible again.
        let mut handle = Some(a);
        store.lower(&mut handle);
        assert!(store.alloc(RefMode::Single, None, 4).is_ok());
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn test_unreservable_arena_capacity_surfaces_as_exhaustion() {
        // A configured capacity the allocator can never satisfy (for
        // example via the environment override) must error, not abort.
        let mut store: GuardStore<u64> = GuardStore::new(StoreConfig::new(usize::MAX));
        assert_eq!(
            store.alloc(RefMode::Single, None, 1),
            Err(GuardError::ArenaExhausted(ArenaKind::Guard))
        );
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_destroy_all_sweeps_in_insertion_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut store: GuardStore<u32> = GuardStore::default();
        for value in [10, 20, 30] {
            let order = Arc::clone(&order);
            store
                .alloc(
                    RefMode::Single,
                    Some(Box::new(move |payload, cause| {
                        assert!(cause.is_exit());
                        order.lock().unwrap().push(*payload);
                    })),
                    value,
                )
                .unwrap();
        }
        store.destroy_all();
        assert_eq!(*order.lock().unwrap(), vec![10, 20, 30]);
        assert!(store.is_torn_down());
        assert_eq!(store.live_count(), 0);

        // Idempotent, and further work is refused.
        store.destroy_all();
        assert_eq!(
            store.alloc(RefMode::Single, None, 1),
            Err(GuardError::TornDown)
        );
    }

    #[test]
    fn test_finalizer_runs_once_per_lifetime() {
        let normal = Arc::new(AtomicUsize::new(0));
        let exit = Arc::new(AtomicUsize::new(0));
        let mut store: GuardStore<String> = GuardStore::default();
        let id = store
            .alloc(
                RefMode::Single,
                Some(counting_finalizer(&normal, &exit)),
                "x".to_string(),
            )
            .unwrap();
        let mut handle = Some(id);
        store.lower(&mut handle);
        store.destroy_all();
        assert_eq!(normal.load(Ordering::SeqCst), 1);
        assert_eq!(exit.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lifecycle_logs_carry_decision_ids_and_snapshots() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let id = store.alloc(RefMode::Single, None, 1).unwrap();
        let mut handle = Some(id);
        store.lower(&mut handle);

        let logs = store.drain_lifecycle_logs();
        assert!(!logs.is_empty());
        assert!(logs.iter().all(|entry| entry.decision_id > 0));
        assert!(
            logs.iter()
                .any(|entry| entry.op == "alloc" && entry.event == "alloc")
        );
        let release = logs
            .iter()
            .find(|entry| entry.event == "release_recycle")
            .expect("release record");
        assert_eq!(release.live_count, 0);
        assert_eq!(release.cell_pool_depth, 1);
        assert_eq!(release.guard_pool_depth, 1);
        assert!(store.lifecycle_logs().is_empty());
    }

    #[test]
    fn test_concurrent_mode_counts_through_atomic() {
        let mut store: GuardStore<u32> = GuardStore::default();
        let id = store.alloc(RefMode::Concurrent, None, 1).unwrap();
        store.raise(id);
        store.raise(id);
        assert_eq!(store.strong_count(id), Some(3));
        let mut handle = Some(id);
        store.lower(&mut handle);
        store.lower(&mut handle);
        assert!(store.is_live(id));
        store.lower(&mut handle);
        assert_eq!(handle, None);
        assert!(!store.is_live(id));
    }

    #[test]
    fn test_alloc_default_uses_configured_mode() {
        let config = StoreConfig::new(8).with_default_mode(RefMode::Concurrent);
        let mut store: GuardStore<u32> = GuardStore::new(config);
        let id = store.alloc_default(None, 1).unwrap();
        store.raise(id);
        assert_eq!(store.strong_count(id), Some(2));
    }
}
