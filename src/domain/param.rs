//! Route parameter values

use std::fmt;

/// Value bound to a route parameter.
///
/// Literal flags and optional literal words resolve to `Boolean`, value-bearing
/// parts resolve to `Text`, and anything not given (and not defaulted) is `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamValue {
    #[default]
    Absent,
    Boolean(bool),
    Text(String),
}

impl ParamValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ParamValue::Absent)
    }

    /// Boolean payload; `None` for text and absent values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text payload; `None` for booleans and absent values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Absent => f.write_str("null"),
            ParamValue::Boolean(b) => write!(f, "{b}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}
