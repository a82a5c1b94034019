//! Integration Test: No Panicking Shortcuts
//!
//! **Policy**: Production code propagates errors with `Result` and `?`.
//! `unwrap()` and `expect()` are only allowed in tests.

use architectural_enforcement::{assert_clean, scan};

fn panics(code: &str) -> bool {
    code.contains(".unwrap()") || code.contains(".expect(")
}

#[test]
fn test_core_does_not_unwrap() {
    assert_clean(
        "no unwrap/expect in dashboard-core",
        &scan("dashboard/core/src", panics),
    );
}

#[test]
fn test_daemon_does_not_unwrap() {
    assert_clean(
        "no unwrap/expect in dashboard-daemon",
        &scan("dashboard/daemon/src", panics),
    );
}
