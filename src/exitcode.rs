//! Standard exit codes (BSD sysexits.h compatible)
//!
//! Console applications themselves exit with 0 or 1; these codes are used by
//! `conharness` for its own failures.

/// Successful termination
pub const OK: i32 = 0;

/// Dispatched command failed (no route matched, or the handler reported an error)
pub const FAILURE: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (invalid route pattern)
pub const DATAERR: i32 = 65;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
