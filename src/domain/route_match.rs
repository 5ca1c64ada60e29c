//! Result of resolving a command against a route

use std::collections::BTreeMap;

use crate::domain::param::ParamValue;

static ABSENT: ParamValue = ParamValue::Absent;

/// Route name and bound parameters for one dispatch.
///
/// Created fresh per dispatch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteMatch {
    matched_route_name: Option<String>,
    params: BTreeMap<String, ParamValue>,
}

impl RouteMatch {
    pub fn new(params: BTreeMap<String, ParamValue>) -> Self {
        Self {
            matched_route_name: None,
            params,
        }
    }

    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.matched_route_name = Some(name.into());
        self
    }

    pub fn matched_route_name(&self) -> Option<&str> {
        self.matched_route_name.as_deref()
    }

    /// Look up a parameter. Unknown names read as `Absent`.
    pub fn param(&self, name: &str) -> &ParamValue {
        self.params.get(name).unwrap_or(&ABSENT)
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }
}
