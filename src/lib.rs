//! Console route dispatch and assertion harness.
//!
//! - [`domain`]: argument parsing, route patterns, route matches
//! - [`application`]: router, handlers, the console application
//! - [`infrastructure`]: console output sink with scoped capture
//! - [`harness`]: `ConsoleTestCase` for dispatching commands and asserting on the outcome
//! - [`config`]: layered TOML configuration
//! - [`cli`]: the `conharness` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod harness;
pub mod infrastructure;
pub mod util;

pub use application::{ConsoleApplication, Handler};
pub use config::AppConfig;
pub use domain::{parse, ParamValue, ParsedArguments, RouteMatch};
pub use harness::{ConsoleTestCase, DispatchResult, HarnessError, HarnessResult};
