//! Async code never blocks the runtime thread. Synchronous setup such as
//! loading the config file before the loop starts is fine.

use architectural_enforcement::{blocking_in_async, scan, BLOCKING_PATTERNS};

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(
        &["conductor/core/src", "conductor/companion/src", "tui/src"],
        blocking_in_async,
    );

    if !violations.is_empty() {
        eprintln!("\nBlocking calls found inside async functions:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nForbidden in async bodies: {BLOCKING_PATTERNS:?}");
        eprintln!("Use tokio::fs, tokio::net or tokio::time instead.");
        panic!("Found {} blocking I/O violation(s)", violations.len());
    }
}
