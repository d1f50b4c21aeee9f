//! Structured lifecycle records.
//!
//! The store appends one record per observable decision (allocation,
//! refcount transition, recycle, sweep, rejected misuse) into an in-memory
//! buffer that callers inspect or drain. There is no global logger and no
//! I/O; embedders decide where the records go.

/// Severity of a lifecycle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardLogRecord {
    /// Monotonic decision/event id.
    pub decision_id: u64,
    /// Severity level.
    pub level: GuardLogLevel,
    /// API operation (`alloc`, `raise`, `lower`, `drop_guard`, `resize`,
    /// `destroy_all`).
    pub op: &'static str,
    /// Event kind (`alloc`, `release_recycle`, `stale_handle_ignored`, ...).
    pub event: &'static str,
    /// Guard-record slot involved in the event.
    pub guard: Option<u32>,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    /// Free-form details for debugging.
    pub details: String,
    /// Snapshot: live guard count after the event.
    pub live_count: usize,
    /// Snapshot: payload-cell pool depth after the event.
    pub cell_pool_depth: usize,
    /// Snapshot: guard-record pool depth after the event.
    pub guard_pool_depth: usize,
}
