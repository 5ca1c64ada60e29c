//! Application layer: routing, handlers and the console application
//!
//! This layer orchestrates domain logic and depends on the console boundary.

pub mod console_app;
pub mod error;
pub mod error_ext;
pub mod handler;
pub mod router;

pub use console_app::{ConsoleApplication, FAILURE_REASON, STATUS_ERROR, STATUS_SUCCESS};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use handler::{Handler, ParamsHandler, PrintHandler};
pub use router::{Route, Router};
