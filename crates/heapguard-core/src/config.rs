//! Store configuration.
//!
//! One capacity value is shared by the payload-cell, guard-record, and
//! registry-node arenas. The capacity can be pinned in code or picked up
//! from the `HEAPGUARD_ARENA_CAPACITY` environment variable; anything
//! unparseable or zero falls back to the built-in default.

use crate::guard::RefMode;

/// Default number of slots per arena.
pub const DEFAULT_ARENA_CAPACITY: usize = 1024;

/// Environment variable overriding the default arena capacity.
pub const ARENA_CAPACITY_ENV: &str = "HEAPGUARD_ARENA_CAPACITY";

/// Instantiation-time options for a [`GuardStore`](crate::GuardStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Slots per arena, shared across all three arenas.
    pub arena_capacity: usize,
    /// Refcount mode used by `alloc_default`.
    pub default_mode: RefMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            default_mode: RefMode::Single,
        }
    }
}

impl StoreConfig {
    /// Config with an explicit arena capacity and the default refcount mode.
    #[must_use]
    pub fn new(arena_capacity: usize) -> Self {
        Self {
            arena_capacity,
            ..Self::default()
        }
    }

    /// Config honouring `HEAPGUARD_ARENA_CAPACITY` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var(ARENA_CAPACITY_ENV).ok();
        Self::new(capacity_from(raw.as_deref()))
    }

    /// Replaces the refcount mode used by `alloc_default`.
    #[must_use]
    pub const fn with_default_mode(mut self, mode: RefMode) -> Self {
        self.default_mode = mode;
        self
    }
}

/// Parses a capacity override, falling back to the default for missing,
/// malformed, or zero values.
fn capacity_from(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<usize>().ok()) {
        Some(n) if n > 0 => n,
        _ => DEFAULT_ARENA_CAPACITY,
    }
}
