//! Fatal contract assertions
//!
//! Contract violations (using a released GPU handle, calling a subsystem before
//! it is running) are caller bugs, not runtime conditions. They are logged with
//! their source location and then abort the current thread with a panic.
//! Unlike `debug_assert!`, these checks stay on in release builds.

use std::panic::Location;

/// Log a violated contract at the caller's location, then panic
#[cold]
#[track_caller]
pub fn contract_violation(expression: &str, message: &str) -> ! {
    let location = Location::caller();
    if message.is_empty() {
        log::error!(
            "[{}:{}] Assertion failed: {expression}.",
            location.file(),
            location.line()
        );
        panic!("assertion failed: {expression}");
    }
    log::error!(
        "[{}:{}] Assertion failed: {expression}. {message}",
        location.file(),
        location.line()
    );
    panic!("assertion failed: {expression}. {message}");
}

/// Assert a caller contract, logging the failed expression before panicking
///
/// ```should_panic
/// let handle = 0_u32;
/// nexus::nexus_assert!(handle != 0, "buffer already released");
/// ```
#[macro_export]
macro_rules! nexus_assert {
    ($expr:expr $(,)?) => {
        if !($expr) {
            $crate::assert::contract_violation(stringify!($expr), "");
        }
    };
    ($expr:expr, $($msg:tt)+) => {
        if !($expr) {
            $crate::assert::contract_violation(stringify!($expr), &format!($($msg)+));
        }
    };
}
