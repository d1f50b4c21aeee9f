//! # heapguard-core
//!
//! Reference-counted heap-guard allocator core.
//!
//! Every user allocation is wrapped in a guard record carrying a strong
//! refcount, an optional finalizer, and a back-link into a registry of all
//! live guards. Storage comes from three fixed-capacity bump arenas
//! (payload cells, guard records, registry nodes) fronted by LIFO pools, so
//! a release-then-allocate cycle reuses the slots it just gave back. The
//! registry is walked at teardown so every still-live guard is finalized
//! exactly once before the arenas are destroyed.
//!
//! This crate is the single-owner (`&mut self`) state machine; the
//! `heapguard` crate adds the process-wide mutex, the exit hook, and the
//! shared-surface API. No `unsafe` code is permitted at the crate level.
//!
//! ## Refcount modes
//!
//! Each guard is independently `Single` (plain counter) or `Concurrent`
//! (sequentially-consistent atomic), chosen at allocation time. The
//! concurrent release decision uses the pre-decrement value returned by
//! `fetch_sub`, so exactly one balancer frees.

pub mod arena;
pub mod bytes;
pub mod config;
pub mod error;
pub mod guard;
pub mod log;
pub mod pool;
mod registry;
pub mod store;

pub use arena::Arena;
pub use config::{ARENA_CAPACITY_ENV, DEFAULT_ARENA_CAPACITY, StoreConfig};
pub use error::{ArenaKind, GuardError};
pub use guard::{CellId, FinalizeCause, Finalizer, GuardId, RefMode};
pub use log::{GuardLogLevel, GuardLogRecord};
pub use pool::Pool;
pub use store::{GuardStats, GuardStore};
