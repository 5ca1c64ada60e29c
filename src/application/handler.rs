//! Route handlers
//!
//! A handler runs once its route matched, writes to the console and returns
//! the exit status of the dispatch.

use std::sync::Arc;

use itertools::Itertools;

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::ActionConfig;
use crate::domain::{ParamValue, RouteMatch};
use crate::infrastructure::Console;

/// Executes a matched route.
pub trait Handler: Send + Sync {
    fn handle(&self, route_match: &RouteMatch, console: &Console) -> ApplicationResult<i32>;
}

impl<F> Handler for F
where
    F: Fn(&RouteMatch, &Console) -> ApplicationResult<i32> + Send + Sync,
{
    fn handle(&self, route_match: &RouteMatch, console: &Console) -> ApplicationResult<i32> {
        self(route_match, console)
    }
}

/// Writes a text template and returns a fixed status.
#[derive(Debug, Clone)]
pub struct PrintHandler {
    text: String,
    status: i32,
}

impl PrintHandler {
    pub fn new(text: impl Into<String>, status: i32) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }
}

impl Handler for PrintHandler {
    fn handle(&self, route_match: &RouteMatch, console: &Console) -> ApplicationResult<i32> {
        console
            .writeln(&render(&self.text, route_match))
            .with_console_context("write output")?;
        Ok(self.status)
    }
}

/// Writes every parameter as `name=value`, sorted by name.
#[derive(Debug, Clone)]
pub struct ParamsHandler {
    status: i32,
}

impl ParamsHandler {
    pub fn new(status: i32) -> Self {
        Self { status }
    }
}

impl Handler for ParamsHandler {
    fn handle(&self, route_match: &RouteMatch, console: &Console) -> ApplicationResult<i32> {
        let listing = route_match
            .params()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .join("\n");
        if !listing.is_empty() {
            console
                .writeln(&listing)
                .with_console_context("write parameters")?;
        }
        Ok(self.status)
    }
}

/// Build the handler configured for a route.
pub fn from_action(action: &ActionConfig) -> Arc<dyn Handler> {
    match action {
        ActionConfig::Print { text, status } => Arc::new(PrintHandler::new(text.clone(), *status)),
        ActionConfig::Params { status } => Arc::new(ParamsHandler::new(*status)),
    }
}

/// Replace `{name}` placeholders with parameter values. Absent values render empty.
///
/// Braces that do not enclose a plain name are copied through.
pub fn render(template: &str, route_match: &RouteMatch) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                match route_match.param(&after[..close]) {
                    ParamValue::Absent => {}
                    value => out.push_str(&value.to_string()),
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
