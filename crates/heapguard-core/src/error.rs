//! Error types for the guard allocator.
//!
//! Allocation failures roll back any partially acquired objects before
//! surfacing; nothing here is raised as a panic in non-test code.

use std::fmt;

use thiserror::Error;

/// Identifies which of the three fixed-capacity arenas refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaKind {
    /// The payload-cell arena (user data).
    Cell,
    /// The guard-record arena (allocation metadata).
    Guard,
    /// The registry-node arena (live-guard list links).
    Node,
}

impl fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cell => "payload-cell",
            Self::Guard => "guard-record",
            Self::Node => "registry-node",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the guard store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    /// An arena ran out of slots, or the underlying byte allocator refused.
    #[error("{0} arena exhausted")]
    ArenaExhausted(ArenaKind),
    /// The store was swept by `destroy_all` and accepts no further work.
    #[error("guard store has been torn down")]
    TornDown,
    /// A preset payload cell does not hold a value.
    #[error("preset payload cell is vacant")]
    VacantCell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_arena() {
        let err = GuardError::ArenaExhausted(ArenaKind::Node);
        assert_eq!(err.to_string(), "registry-node arena exhausted");
        assert_eq!(
            GuardError::TornDown.to_string(),
            "guard store has been torn down"
        );
    }
}
