//! Stable exit codes for the `qgate` command line.

/// Every check passed, or the project has no applicable checks.
pub const OK: i32 = 0;
/// At least one check failed.
pub const CHECKS_FAILED: i32 = 1;
/// The run could not complete: invalid mode or config, filesystem failure.
pub const SYSTEM_ERROR: i32 = 2;
