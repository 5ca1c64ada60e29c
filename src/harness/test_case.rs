//! Console test case: dispatch a command, then assert on status, output and route match
//!
//! ```ignore
//! let mut test = ConsoleTestCase::new();
//! test.set_application_config(config)?;
//! test.set_up()?;
//!
//! test.dispatch("--console")?;
//! test.assert_response_status_code(0)?;
//! test.assert_console_output_contains("foo")?;
//! ```
//!
//! Every failing assertion returns `HarnessError::Assertion` with a message that
//! includes the actual value observed.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, ConsoleApplication, Handler, STATUS_ERROR, STATUS_SUCCESS,
};
use crate::config::AppConfig;
use crate::domain::{ParamValue, RouteMatch};
use crate::harness::error::{HarnessError, HarnessResult, STATUS_DOMAIN_MESSAGE};

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    status_code: i32,
    console_output: String,
}

impl DispatchResult {
    /// 0 (success) or 1 (error).
    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    /// Everything written to the console during the dispatch.
    pub fn console_output(&self) -> &str {
        &self.console_output
    }
}

/// Dispatch-and-assert harness for console applications.
///
/// The application is built lazily from the stored config on first use and
/// reused across dispatches until `reset()`.
pub struct ConsoleTestCase {
    use_console_request: bool,
    application_config: Option<AppConfig>,
    handlers: Vec<(String, Arc<dyn Handler>)>,
    application: Option<ConsoleApplication>,
    result: Option<DispatchResult>,
}

impl ConsoleTestCase {
    pub fn new() -> Self {
        Self {
            use_console_request: true,
            application_config: None,
            handlers: Vec::new(),
            application: None,
            result: None,
        }
    }

    /// Shorthand for `new`, `set_application_config` and `set_up`.
    pub fn from_config(config: AppConfig) -> HarnessResult<Self> {
        let mut test = Self::new();
        test.set_application_config(config)?;
        test.set_up()?;
        Ok(test)
    }

    /// Always true: requests are dispatched in console mode.
    pub fn use_console_request(&self) -> bool {
        self.use_console_request
    }

    /// Store the config the application is built from.
    ///
    /// Fails once the application has been built; call `reset()` first.
    pub fn set_application_config(&mut self, config: AppConfig) -> HarnessResult<()> {
        if self.application.is_some() {
            return Err(HarnessError::Configuration(
                "application config can not be set, the application is already built".into(),
            ));
        }
        if let Some((route, _)) = self.handlers.iter().find(|(r, _)| config.route(r).is_none()) {
            return Err(HarnessError::Configuration(format!(
                "registered handler route \"{route}\" is not in the application config"
            )));
        }
        self.application_config = Some(config);
        Ok(())
    }

    pub fn application_config(&self) -> Option<&AppConfig> {
        self.application_config.as_ref()
    }

    /// Use `handler` for `route` in every application this harness builds.
    ///
    /// The route must exist in the stored application config.
    pub fn register_handler(
        &mut self,
        route: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> HarnessResult<()> {
        let route = route.into();
        let config = self.application_config.as_ref().ok_or_else(|| {
            HarnessError::Configuration(
                "application config must be set before registering handlers".into(),
            )
        })?;
        if config.route(&route).is_none() {
            return Err(ApplicationError::UnknownRoute(route).into());
        }
        if let Some(app) = self.application.as_mut() {
            app.register_handler(&route, Arc::clone(&handler))?;
        }
        self.handlers.push((route, handler));
        Ok(())
    }

    /// Prepare for a test. Requires the application config to be set.
    pub fn set_up(&mut self) -> HarnessResult<()> {
        if self.application_config.is_none() {
            return Err(HarnessError::Configuration(
                "application config must be set before set_up()".into(),
            ));
        }
        self.reset();
        Ok(())
    }

    /// Drop the application and all captured state.
    ///
    /// The next dispatch builds a fresh application from the stored config.
    pub fn reset(&mut self) {
        debug!("reset console test case");
        self.application = None;
        self.result = None;
    }

    /// The application, built from the stored config if needed.
    pub fn application(&mut self) -> HarnessResult<&mut ConsoleApplication> {
        let app = match self.application.take() {
            Some(app) => app,
            None => self.build_application()?,
        };
        Ok(self.application.insert(app))
    }

    fn build_application(&self) -> HarnessResult<ConsoleApplication> {
        let config = self.application_config.as_ref().ok_or_else(|| {
            HarnessError::Configuration("application config must be set before dispatch".into())
        })?;
        let mut app = ConsoleApplication::from_config(config)?;
        for (route, handler) in &self.handlers {
            app.register_handler(route, Arc::clone(handler))?;
        }
        debug!("built console application with {} routes", app.router().len());
        Ok(app)
    }

    /// Dispatch `command` to the application and capture status and output.
    ///
    /// Supersedes the previous result. Application errors propagate; a status
    /// outside {0, 1} is reported as an assertion failure.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: &str) -> HarnessResult<()> {
        self.result = None;

        let app = self.application()?;
        let capture = app.console().capture();
        let status = app.run(command)?;
        let console_output = capture.finish();
        debug!(status, bytes = console_output.len(), "dispatch finished");

        if !is_console_status(status) {
            return Err(HarnessError::Assertion(format!(
                "Console application returned status code \"{status}\", expected 0 (valid) or 1 (error); output was \"{console_output}\""
            )));
        }

        self.result = Some(DispatchResult {
            status_code: status,
            console_output,
        });
        Ok(())
    }

    pub fn dispatch_result(&self) -> Option<&DispatchResult> {
        self.result.as_ref()
    }

    /// Route match of the last dispatch, if a route matched.
    pub fn route_match(&self) -> Option<&RouteMatch> {
        self.application.as_ref().and_then(|app| app.route_match())
    }

    pub fn assert_response_status_code(&self, expected: i32) -> HarnessResult<()> {
        check_status_domain(expected)?;
        let actual = self.last_result()?.status_code;
        if actual != expected {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting response code \"{expected}\", actual status code is \"{actual}\""
            )));
        }
        Ok(())
    }

    pub fn assert_not_response_status_code(&self, expected: i32) -> HarnessResult<()> {
        check_status_domain(expected)?;
        let actual = self.last_result()?.status_code;
        if actual == expected {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting response code was NOT \"{expected}\", actual status code is \"{actual}\""
            )));
        }
        Ok(())
    }

    pub fn assert_console_output_contains(&self, needle: &str) -> HarnessResult<()> {
        let output = self.last_result()?.console_output();
        if !output.contains(needle) {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting output CONTAINS content \"{needle}\", actual content is \"{output}\""
            )));
        }
        Ok(())
    }

    pub fn assert_not_console_output_contains(&self, needle: &str) -> HarnessResult<()> {
        let output = self.last_result()?.console_output();
        if output.contains(needle) {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting output DOES NOT CONTAIN content \"{needle}\", actual content is \"{output}\""
            )));
        }
        Ok(())
    }

    pub fn assert_matched_route_name(&self, expected: &str) -> HarnessResult<()> {
        match self.dispatched_route_name()? {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(HarnessError::Assertion(format!(
                "Failed asserting matched route name was \"{expected}\", actual matched route name is \"{actual}\""
            ))),
            None => Err(HarnessError::Assertion(format!(
                "Failed asserting matched route name was \"{expected}\", no route matched"
            ))),
        }
    }

    pub fn assert_not_matched_route_name(&self, expected: &str) -> HarnessResult<()> {
        match self.dispatched_route_name()? {
            Some(actual) if actual == expected => Err(HarnessError::Assertion(format!(
                "Failed asserting route matched was NOT \"{expected}\", actual matched route name is \"{actual}\""
            ))),
            _ => Ok(()),
        }
    }

    /// Assert the value bound to a parameter of the matched route.
    pub fn assert_route_param(
        &self,
        name: &str,
        expected: impl Into<ParamValue>,
    ) -> HarnessResult<()> {
        self.last_result()?;
        let expected = expected.into();
        let Some(route_match) = self.route_match() else {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting route parameter \"{name}\" was \"{expected}\", no route matched"
            )));
        };
        let actual = route_match.param(name);
        if *actual != expected {
            return Err(HarnessError::Assertion(format!(
                "Failed asserting route parameter \"{name}\" was \"{expected}\", actual value is \"{actual}\""
            )));
        }
        Ok(())
    }

    fn last_result(&self) -> HarnessResult<&DispatchResult> {
        self.result.as_ref().ok_or_else(|| {
            HarnessError::Usage("no dispatch result available, call dispatch() first".into())
        })
    }

    fn dispatched_route_name(&self) -> HarnessResult<Option<&str>> {
        self.last_result()?;
        Ok(self.route_match().and_then(RouteMatch::matched_route_name))
    }
}

impl Default for ConsoleTestCase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleTestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleTestCase")
            .field("use_console_request", &self.use_console_request)
            .field("application_config", &self.application_config)
            .field("application", &self.application)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

fn is_console_status(code: i32) -> bool {
    code == STATUS_SUCCESS || code == STATUS_ERROR
}

fn check_status_domain(code: i32) -> HarnessResult<()> {
    if is_console_status(code) {
        Ok(())
    } else {
        Err(HarnessError::Usage(STATUS_DOMAIN_MESSAGE.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActionConfig, RouteConfig};

    fn config() -> AppConfig {
        AppConfig::new(vec![RouteConfig::new("console", "--console").with_action(
            ActionConfig::Print {
                text: "foo, bar".into(),
                status: 0,
            },
        )])
    }

    #[test]
    fn given_no_config_when_setting_up_then_configuration_error() {
        let mut test = ConsoleTestCase::new();

        let err = test.set_up().unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
        let err = test.dispatch("--console").unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn given_built_application_when_setting_config_then_configuration_error() {
        let mut test = ConsoleTestCase::from_config(config()).unwrap();
        test.dispatch("--console").unwrap();

        let err = test.set_application_config(config()).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));

        test.reset();
        test.set_application_config(config()).unwrap();
    }

    #[test]
    fn given_unknown_route_when_registering_handler_then_rejected_and_dispatch_unaffected() {
        let mut test = ConsoleTestCase::from_config(config()).unwrap();

        let err = test
            .register_handler("ghost", Arc::new(crate::application::ParamsHandler::new(0)))
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Application(ApplicationError::UnknownRoute(ref r)) if r == "ghost"
        ));

        test.dispatch("--console").unwrap();
        test.assert_response_status_code(0).unwrap();
    }

    #[test]
    fn given_no_config_when_registering_handler_then_configuration_error() {
        let mut test = ConsoleTestCase::new();

        let err = test
            .register_handler("console", Arc::new(crate::application::ParamsHandler::new(0)))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn given_registered_handler_when_config_lacks_route_then_configuration_error() {
        let mut test = ConsoleTestCase::from_config(config()).unwrap();
        test.register_handler("console", Arc::new(crate::application::ParamsHandler::new(0)))
            .unwrap();

        let err = test
            .set_application_config(AppConfig::new(vec![RouteConfig::new("other", "other")]))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
        assert!(test.application_config().unwrap().route("console").is_some());
    }

    #[test]
    fn given_no_dispatch_when_asserting_then_usage_error() {
        let test = ConsoleTestCase::from_config(config()).unwrap();

        assert!(test.assert_response_status_code(0).unwrap_err().is_usage());
        assert!(test.assert_console_output_contains("foo").unwrap_err().is_usage());
        assert!(test.assert_matched_route_name("console").unwrap_err().is_usage());
    }

    #[test]
    fn given_bad_code_when_asserting_then_usage_error_precedes_dispatch_check() {
        let test = ConsoleTestCase::from_config(config()).unwrap();

        let err = test.assert_response_status_code(-1).unwrap_err();
        assert!(err.is_usage());
        assert_eq!(err.to_string(), STATUS_DOMAIN_MESSAGE);
    }

    #[test]
    fn given_dispatch_when_inspecting_result_then_exposes_status_and_output() {
        let mut test = ConsoleTestCase::from_config(config()).unwrap();
        test.dispatch("--console").unwrap();

        let result = test.dispatch_result().expect("result");
        assert_eq!(result.status_code(), 0);
        assert_eq!(result.console_output(), "foo, bar\n");
        assert!(test.use_console_request());
    }
}
