//! Unified exit codes for Shakeout.
//! Part of the public contract: detecting flaky tests is a successful
//! detection run, not a failure.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 2; // Setup failed before any trial ran
