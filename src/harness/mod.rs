//! Console test harness
//!
//! Drives a `ConsoleApplication` one command at a time and asserts on the
//! captured status code, console output and route match.

pub mod error;
pub mod test_case;

pub use error::{HarnessError, HarnessResult, STATUS_DOMAIN_MESSAGE};
pub use test_case::{ConsoleTestCase, DispatchResult};
