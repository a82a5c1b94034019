//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: The daemon runs its command loop on tokio. Reading commands
//! and writing replies must go through `tokio::io`, not the blocking std
//! handles. Logging to stderr through `tracing` is fine.

use architectural_enforcement::{assert_clean, scan};

#[test]
fn test_daemon_uses_async_stdio() {
    let violations = scan("dashboard/daemon/src", |code| {
        code.contains("std::io::stdin()")
            || code.contains("std::io::stdout()")
            || code.contains("println!")
            || code.contains("read_line(")
    });
    assert_clean("daemon stdio must be async", &violations);
}

#[test]
fn test_daemon_reads_files_asynchronously() {
    let violations = scan("dashboard/daemon/src", |code| code.contains("std::fs::"));
    assert_clean("daemon file reads must use tokio::fs", &violations);
}
