//! Process-exit hook registration.
//!
//! Keeps a process-wide list of teardown hooks and registers a single
//! `libc::atexit` trampoline the first time a hook is added. The
//! trampoline runs after user `main` returns, draining hooks in
//! registration order; each installed heap contributes one hook that
//! sweeps its still-live guards.

use std::sync::{Mutex, Once};

type ExitHook = Box<dyn FnOnce() + Send>;

// Global list of teardown hooks, drained once at process exit.
static EXIT_HOOKS: Mutex<Vec<ExitHook>> = Mutex::new(Vec::new());
static REGISTER_ATEXIT: Once = Once::new();

/// Schedules `hook` to run once, after user `main` returns.
///
/// The underlying `atexit` registration happens exactly once per process,
/// no matter how many hooks are added.
pub fn on_process_exit(hook: impl FnOnce() + Send + 'static) {
    REGISTER_ATEXIT.call_once(|| {
        // SAFETY: `run_exit_hooks` is a plain `extern "C"` function with
        // no preconditions; `atexit` only stores the pointer.
        let rc = unsafe { libc::atexit(run_exit_hooks) };
        debug_assert_eq!(rc, 0, "atexit registration failed");
    });
    if let Ok(mut hooks) = EXIT_HOOKS.lock() {
        hooks.push(Box::new(hook));
    }
}

extern "C" fn run_exit_hooks() {
    // Swap the list out under the lock, then run unlocked so a hook that
    // allocates (and would register another hook) cannot deadlock.
    let hooks = match EXIT_HOOKS.lock() {
        Ok(mut hooks) => std::mem::take(&mut *hooks),
        Err(_) => Vec::new(),
    };
    for hook in hooks {
        hook();
    }
}
