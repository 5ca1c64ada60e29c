//! Console route table
//!
//! Routes are tried by descending priority; routes with equal priority keep
//! the order they were added in. The first route that fits wins.

use std::collections::BTreeMap;

use tracing::{debug, instrument, trace};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::RouteConfig;
use crate::domain::{ParamValue, RouteDefinition, RouteMatch};

/// A named console route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    name: String,
    definition: RouteDefinition,
    priority: i32,
    defaults: BTreeMap<String, ParamValue>,
}

impl Route {
    pub fn new(name: impl Into<String>, pattern: &str) -> ApplicationResult<Self> {
        Ok(Self {
            name: name.into(),
            definition: RouteDefinition::parse(pattern)?,
            priority: 0,
            defaults: BTreeMap::new(),
        })
    }

    pub fn from_config(config: &RouteConfig) -> ApplicationResult<Self> {
        let mut route = Self::new(config.name.clone(), &config.route)?.with_priority(config.priority);
        for (name, value) in &config.defaults {
            route = route.with_default(name.clone(), ParamValue::from(value));
        }
        Ok(route)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_default(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &RouteDefinition {
        &self.definition
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn defaults(&self) -> &BTreeMap<String, ParamValue> {
        &self.defaults
    }

    /// Match a raw command against this route, filling defaults for unset parameters.
    pub fn match_command(&self, raw: &str) -> Option<RouteMatch> {
        let mut params = self.definition.match_command(raw)?;
        for (name, value) in &self.defaults {
            let slot = params.entry(name.clone()).or_default();
            if slot.is_absent() {
                *slot = value.clone();
            }
        }
        Some(RouteMatch::new(params).with_route_name(self.name.clone()))
    }
}

/// Ordered table of named routes.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(routes: &[RouteConfig]) -> ApplicationResult<Self> {
        let mut router = Self::new();
        for config in routes {
            router.add(Route::from_config(config)?)?;
        }
        debug!("router: {} routes", router.len());
        Ok(router)
    }

    /// Add a route behind every route of equal or higher priority.
    pub fn add(&mut self, route: Route) -> ApplicationResult<()> {
        if self.get(route.name()).is_some() {
            return Err(ApplicationError::DuplicateRoute(route.name().to_string()));
        }
        let position = self
            .routes
            .iter()
            .position(|r| r.priority < route.priority)
            .unwrap_or(self.routes.len());
        self.routes.insert(position, route);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Routes in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route matching `raw`, if any.
    #[instrument(level = "debug", skip(self))]
    pub fn match_command(&self, raw: &str) -> Option<RouteMatch> {
        let found = self.routes.iter().find_map(|route| {
            trace!(route = route.name(), "trying route");
            route.match_command(raw)
        });
        match &found {
            Some(m) => debug!(route = ?m.matched_route_name(), "route matched"),
            None => debug!("no route matched"),
        }
        found
    }
}
