//! The scene engine and the terminal surface never sleep: animation time
//! comes from the frame ticker and delayed work goes through the effects
//! clock. The companion is excluded; its paced turns are the product.

use architectural_enforcement::{scan, sleep_calls};

#[test]
fn test_no_sleep_in_engine_or_surface() {
    let violations = scan(&["conductor/core/src", "tui/src"], sleep_calls);

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nSchedule delayed work on the EffectsClock or a tokio interval instead.");
        panic!("Found {} sleep violation(s)", violations.len());
    }
}
