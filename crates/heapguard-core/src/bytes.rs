//! Byte-buffer specialisation.
//!
//! A `GuardStore<Vec<u8>>` treats the payload region as opaque bytes and
//! gains first-class `resize`/`extend`. Growth goes through the fallible
//! `try_reserve_exact` path so an allocator refusal surfaces as `false`
//! with the guard unchanged instead of aborting the process.

use crate::error::{ArenaKind, GuardError};
use crate::guard::{Finalizer, GuardId, RefMode};
use crate::log::GuardLogLevel;
use crate::store::GuardStore;

impl GuardStore<Vec<u8>> {
    /// Allocates a guard over a zeroed byte buffer of `size` bytes.
    pub fn alloc_bytes(
        &mut self,
        mode: RefMode,
        finalizer: Option<Finalizer<Vec<u8>>>,
        size: usize,
    ) -> Result<GuardId, GuardError> {
        let mut buf = Vec::new();
        if buf.try_reserve_exact(size).is_err() {
            self.record_lifecycle(
                GuardLogLevel::Warn,
                "alloc",
                "byte_buffer_refused",
                None,
                "oom",
                format!("size={size}"),
            );
            return Err(GuardError::ArenaExhausted(ArenaKind::Cell));
        }
        buf.resize(size, 0);
        let id = self.alloc(mode, finalizer, buf)?;
        if let Some(rec) = self.live_record_mut(id) {
            rec.allocated = size;
        }
        Ok(id)
    }

    /// Reallocates the payload to `new_size` bytes.
    ///
    /// Returns `true` with `allocated` updated, or `false` with the guard
    /// unchanged when the handle is stale or the underlying allocator
    /// refuses the growth.
    pub fn resize(&mut self, id: GuardId, new_size: usize) -> bool {
        let Some(cell) = self.cell_of(id) else {
            self.record_lifecycle(
                GuardLogLevel::Warn,
                "resize",
                "stale_handle_ignored",
                Some(id.index()),
                "ignored",
                String::new(),
            );
            return false;
        };
        let resized = match self.cell_value_mut(cell) {
            Some(buf) => {
                if new_size > buf.len() {
                    if buf.try_reserve_exact(new_size - buf.len()).is_err() {
                        false
                    } else {
                        buf.resize(new_size, 0);
                        true
                    }
                } else {
                    buf.truncate(new_size);
                    true
                }
            }
            None => false,
        };
        if resized {
            if let Some(rec) = self.live_record_mut(id) {
                rec.allocated = new_size;
            }
            self.record_lifecycle(
                GuardLogLevel::Trace,
                "resize",
                "resize",
                Some(id.index()),
                "success",
                format!("new_size={new_size}"),
            );
        } else {
            self.record_lifecycle(
                GuardLogLevel::Warn,
                "resize",
                "resize_refused",
                Some(id.index()),
                "oom",
                format!("new_size={new_size}"),
            );
        }
        resized
    }

    /// Grows the payload by `delta` bytes; sugar for
    /// `resize(allocated + delta)`.
    pub fn extend(&mut self, id: GuardId, delta: usize) -> bool {
        let Some(allocated) = self.allocated(id) else {
            return false;
        };
        match allocated.checked_add(delta) {
            Some(new_size) => self.resize(id, new_size),
            None => false,
        }
    }
}
