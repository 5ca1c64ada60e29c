//! Domain layer: argument parsing and route matching
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod args;
pub mod error;
pub mod param;
pub mod route;
pub mod route_match;

pub use args::{parse, parse_with, FlagValue, ParseOptions, ParsedArguments};
pub use error::DomainError;
pub use param::ParamValue;
pub use route::{RouteDefinition, RoutePart};
pub use route_match::RouteMatch;
