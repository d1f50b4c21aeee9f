//! # heapguard
//!
//! Process-wide surface for the heap-guard allocator.
//!
//! The `heapguard-core` crate owns the state machine: guard records, the
//! live-guard registry, the fixed-capacity arenas, and the LIFO pools in
//! front of them. This crate layers on the shared-use concerns:
//!
//! - [`GuardHeap`], a `parking_lot::Mutex`-guarded store that many threads
//!   can allocate from and release into;
//! - [`on_process_exit`], the `atexit`-backed hook registry a heap uses to
//!   arm its teardown sweep on the first successful allocation.
//!
//! Core types are re-exported so most users depend on this crate alone.

mod exit;
mod heap;

pub use exit::on_process_exit;
pub use heap::GuardHeap;

pub use heapguard_core::{
    ARENA_CAPACITY_ENV, ArenaKind, CellId, DEFAULT_ARENA_CAPACITY, FinalizeCause, Finalizer,
    GuardError, GuardId, GuardLogLevel, GuardLogRecord, GuardStats, GuardStore, RefMode,
    StoreConfig,
};
