//! Integration Test: Runtime-Free Core
//!
//! **Policy**: `dashboard-core` is synchronous. It must not depend on an async
//! runtime or sleep; timing belongs to whoever drives the manager.

use architectural_enforcement::{assert_clean, scan};

#[test]
fn test_core_has_no_async_runtime() {
    let violations = scan("dashboard/core/src", |code| {
        code.contains("tokio") || code.contains("async fn") || code.contains(".await")
    });
    assert_clean("dashboard-core must stay runtime-free", &violations);
}

#[test]
fn test_core_does_not_sleep() {
    let violations = scan("dashboard/core/src", |code| {
        code.contains("thread::sleep") || code.contains("sleep(")
    });
    assert_clean("dashboard-core must not sleep", &violations);
}
