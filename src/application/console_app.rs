//! Console application: routes a command string and runs its handler

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::handler::{self, Handler};
use crate::application::router::Router;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::{AppConfig, ConsoleSettings};
use crate::domain::RouteMatch;
use crate::infrastructure::Console;

/// Exit status of a successful dispatch.
pub const STATUS_SUCCESS: i32 = 0;

/// Exit status of a failed dispatch.
pub const STATUS_ERROR: i32 = 1;

/// Last line written when no route matches.
pub const FAILURE_REASON: &str = "Reason for failure: Invalid arguments or no arguments provided";

/// Application invoked as a command-line tool.
///
/// Holds the route table, one handler per route and the console it writes to.
/// The route match of the most recent run is kept for inspection.
pub struct ConsoleApplication {
    settings: ConsoleSettings,
    router: Router,
    handlers: HashMap<String, Arc<dyn Handler>>,
    console: Console,
    route_match: Option<RouteMatch>,
}

impl ConsoleApplication {
    /// Build from config, writing to stdout.
    pub fn from_config(config: &AppConfig) -> ApplicationResult<Self> {
        Self::with_console(config, Console::stdout())
    }

    /// Build from config, writing to `console`.
    pub fn with_console(config: &AppConfig, console: Console) -> ApplicationResult<Self> {
        let router = Router::from_config(&config.routes)?;
        let handlers = config
            .routes
            .iter()
            .map(|r| (r.name.clone(), handler::from_action(&r.action)))
            .collect();

        Ok(Self {
            settings: config.console.clone(),
            router,
            handlers,
            console,
            route_match: None,
        })
    }

    /// Replace the handler of an existing route.
    pub fn register_handler(
        &mut self,
        route: &str,
        handler: Arc<dyn Handler>,
    ) -> ApplicationResult<()> {
        if self.router.get(route).is_none() {
            return Err(ApplicationError::UnknownRoute(route.to_string()));
        }
        self.handlers.insert(route.to_string(), handler);
        Ok(())
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route match of the most recent run; `None` before any run or when nothing matched.
    pub fn route_match(&self) -> Option<&RouteMatch> {
        self.route_match.as_ref()
    }

    /// Resolve a command without running anything.
    pub fn match_command(&self, command: &str) -> Option<RouteMatch> {
        self.router.match_command(command)
    }

    /// Route `command` and run the matched handler.
    ///
    /// Returns the handler's status, or `STATUS_ERROR` after printing usage when
    /// no route matches. Handler errors are returned unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self, command: &str) -> ApplicationResult<i32> {
        self.route_match = None;

        let Some(route_match) = self.router.match_command(command) else {
            info!("no route for command");
            self.write_usage()?;
            return Ok(STATUS_ERROR);
        };

        let route = route_match.matched_route_name().unwrap_or_default().to_string();
        let handler = self
            .handlers
            .get(&route)
            .cloned()
            .ok_or_else(|| ApplicationError::handler(&route, "no handler registered"))?;

        let route_match = self.route_match.insert(route_match);
        let status = handler.handle(route_match, &self.console)?;
        self.console.flush().with_console_context("flush output")?;
        debug!(%route, status, "handler finished");
        Ok(status)
    }

    /// Usage listing: one line per route in match order.
    pub fn usage(&self) -> String {
        let width = self
            .router
            .routes()
            .iter()
            .map(|r| r.name().len())
            .max()
            .unwrap_or(0);
        let mut text = String::from("Usage:\n");
        for route in self.router.routes() {
            text.push_str(&format!(
                "  {:width$}  {}\n",
                route.name(),
                route.definition(),
                width = width
            ));
        }
        text
    }

    fn write_usage(&self) -> ApplicationResult<()> {
        if let Some(banner) = &self.settings.banner {
            self.console
                .writeln(banner)
                .with_console_context("write banner")?;
        }
        if self.settings.show_usage && !self.router.is_empty() {
            self.console
                .write(&self.usage())
                .with_console_context("write usage")?;
        }
        self.console
            .writeln(FAILURE_REASON)
            .with_console_context("write usage")
    }
}

impl fmt::Debug for ConsoleApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleApplication")
            .field("settings", &self.settings)
            .field("router", &self.router)
            .field("route_match", &self.route_match)
            .finish_non_exhaustive()
    }
}
