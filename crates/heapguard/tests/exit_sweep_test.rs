//! At-exit sweep coverage through a real process exit.
//!
//! The test re-invokes its own binary as a child: the child installs a
//! heap, allocates guards with finalizers that print on `Exit`, and simply
//! returns, leaving the guards live. The armed `atexit` hook must sweep
//! them after `main`, so the parent asserts the finalizer output appeared
//! in the child's stdout, in allocation order.

use std::process::Command;

use heapguard::{GuardHeap, RefMode, StoreConfig};

const CHILD_ENV: &str = "HEAPGUARD_EXIT_SWEEP_CHILD";

fn leave_guards_live_until_exit() {
    let heap: &'static GuardHeap<u32> = GuardHeap::install(StoreConfig::new(8));
    for value in [10, 20] {
        heap.alloc(
            RefMode::Single,
            Some(Box::new(|payload, cause| {
                assert!(cause.is_exit());
                println!("exit-finalized:{payload}");
            })),
            value,
        )
        .unwrap();
    }
    assert_eq!(heap.live_count(), 2);
    // No teardown here: the atexit trampoline must do it after main.
}

#[test]
fn test_atexit_hook_sweeps_live_guards_after_main() {
    if std::env::var_os(CHILD_ENV).is_some() {
        leave_guards_live_until_exit();
        return;
    }

    let exe = std::env::current_exe().unwrap();
    let output = Command::new(exe)
        .args([
            "test_atexit_hook_sweeps_live_guards_after_main",
            "--exact",
            "--nocapture",
        ])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "child failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout
        .find("exit-finalized:10")
        .expect("first guard finalized at exit");
    let second = stdout
        .find("exit-finalized:20")
        .expect("second guard finalized at exit");
    // Sweep order is allocation order.
    assert!(first < second);
}
