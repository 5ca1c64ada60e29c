//! Console route definitions
//!
//! A route pattern is a whitespace separated list of parts:
//!
//! | part        | meaning                     |
//! |-------------|-----------------------------|
//! | `word`      | mandatory literal word      |
//! | `[word]`    | optional literal word       |
//! | `<name>`    | mandatory positional value  |
//! | `[<name>]`  | optional positional value   |
//! | `--name`    | mandatory literal flag      |
//! | `[--name]`  | optional literal flag       |
//! | `--name=`   | mandatory value flag        |
//! | `[--name=]` | optional value flag         |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::domain::args::{self, FlagValue, ParseOptions, ParsedArguments, FLAG_PREFIX};
use crate::domain::error::DomainError;
use crate::domain::param::ParamValue;

/// One element of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePart {
    Literal { word: String, optional: bool },
    Positional { name: String, optional: bool },
    Flag { name: String, optional: bool },
    ValueFlag { name: String, optional: bool },
}

impl RoutePart {
    pub fn is_optional(&self) -> bool {
        match self {
            RoutePart::Literal { optional, .. }
            | RoutePart::Positional { optional, .. }
            | RoutePart::Flag { optional, .. }
            | RoutePart::ValueFlag { optional, .. } => *optional,
        }
    }

    /// Parameter name this part binds, if any. Mandatory literal words bind nothing.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            RoutePart::Literal {
                word,
                optional: true,
            } => Some(word.as_str()),
            RoutePart::Literal { .. } => None,
            RoutePart::Positional { name, .. }
            | RoutePart::Flag { name, .. }
            | RoutePart::ValueFlag { name, .. } => Some(name.as_str()),
        }
    }

    fn is_positional(&self) -> bool {
        matches!(
            self,
            RoutePart::Literal { .. } | RoutePart::Positional { .. }
        )
    }
}

impl fmt::Display for RoutePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match self {
            RoutePart::Literal { word, .. } => word.clone(),
            RoutePart::Positional { name, .. } => format!("<{name}>"),
            RoutePart::Flag { name, .. } => format!("{FLAG_PREFIX}{name}"),
            RoutePart::ValueFlag { name, .. } => format!("{FLAG_PREFIX}{name}="),
        };
        if self.is_optional() {
            write!(f, "[{inner}]")
        } else {
            f.write_str(&inner)
        }
    }
}

/// A parsed console route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pattern: String,
    parts: Vec<RoutePart>,
}

impl RouteDefinition {
    /// Parse a route pattern.
    pub fn parse(pattern: &str) -> Result<Self, DomainError> {
        let mut parts = Vec::new();
        let mut seen = BTreeSet::new();

        for token in pattern.split_whitespace() {
            let part = parse_part(pattern, token)?;
            if let Some(name) = part.param_name() {
                if !seen.insert(name.to_string()) {
                    return Err(DomainError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            parts.push(part);
        }

        if parts.is_empty() {
            return Err(DomainError::invalid_route(pattern, "empty pattern"));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            parts,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn parts(&self) -> &[RoutePart] {
        &self.parts
    }

    /// Parser hints for this route: its literal flags never take values.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::with_literal_flags(self.parts.iter().filter_map(|p| match p {
            RoutePart::Flag { name, .. } => Some(name.clone()),
            _ => None,
        }))
    }

    /// Parse `raw` with this route's hints and match it.
    pub fn match_command(&self, raw: &str) -> Option<BTreeMap<String, ParamValue>> {
        let parsed = args::parse_with(raw, &self.parse_options());
        self.match_arguments(&parsed)
    }

    /// Match already parsed arguments against this route.
    ///
    /// Returns the bound parameters, or `None` when the arguments do not fit.
    pub fn match_arguments(&self, parsed: &ParsedArguments) -> Option<BTreeMap<String, ParamValue>> {
        let mut params = BTreeMap::new();

        let mut positionals = parsed.positionals().iter().peekable();
        for part in self.parts.iter().filter(|p| p.is_positional()) {
            match part {
                RoutePart::Literal {
                    word,
                    optional: false,
                } => {
                    positionals.next_if(|p| *p == word)?;
                }
                RoutePart::Literal {
                    word,
                    optional: true,
                } => {
                    let present = positionals.next_if(|p| *p == word).is_some();
                    params.insert(word.clone(), ParamValue::Boolean(present));
                }
                RoutePart::Positional {
                    name,
                    optional: false,
                } => {
                    let value = positionals.next()?;
                    params.insert(name.clone(), ParamValue::Text(value.clone()));
                }
                RoutePart::Positional {
                    name,
                    optional: true,
                } => {
                    let value = positionals
                        .next()
                        .map_or(ParamValue::Absent, |v| ParamValue::Text(v.clone()));
                    params.insert(name.clone(), value);
                }
                RoutePart::Flag { .. } | RoutePart::ValueFlag { .. } => {}
            }
        }
        if let Some(extra) = positionals.next() {
            trace!(route = %self.pattern, %extra, "unexpected positional");
            return None;
        }

        for (name, given) in parsed.flags() {
            let declared = self.parts.iter().find(|p| match p {
                RoutePart::Flag { name: n, .. } | RoutePart::ValueFlag { name: n, .. } => n == name,
                _ => false,
            });
            match (declared, given) {
                (Some(RoutePart::Flag { .. }), FlagValue::Present)
                | (Some(RoutePart::ValueFlag { .. }), FlagValue::Value(_)) => {}
                _ => {
                    trace!(route = %self.pattern, flag = %name, "flag does not fit route");
                    return None;
                }
            }
        }

        for part in &self.parts {
            match part {
                RoutePart::Flag { name, optional } => {
                    let present = parsed.has_literal_flag(name);
                    if !present && !optional {
                        return None;
                    }
                    params.insert(name.clone(), ParamValue::Boolean(present));
                }
                RoutePart::ValueFlag { name, optional } => match parsed.value(name) {
                    Some(v) => {
                        params.insert(name.clone(), ParamValue::Text(v.to_string()));
                    }
                    None if *optional => {
                        params.insert(name.clone(), ParamValue::Absent);
                    }
                    None => return None,
                },
                RoutePart::Literal { .. } | RoutePart::Positional { .. } => {}
            }
        }

        Some(params)
    }
}

impl FromStr for RouteDefinition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

fn parse_part(pattern: &str, token: &str) -> Result<RoutePart, DomainError> {
    let (body, optional) = match (token.strip_prefix('['), token.strip_suffix(']')) {
        (Some(_), Some(_)) if token.len() >= 2 => (&token[1..token.len() - 1], true),
        (None, None) => (token, false),
        _ => {
            return Err(DomainError::invalid_route(
                pattern,
                format!("unbalanced brackets in '{token}'"),
            ))
        }
    };
    if body.contains(['[', ']']) {
        return Err(DomainError::invalid_route(
            pattern,
            format!("nested brackets in '{token}'"),
        ));
    }

    if let Some(flag) = body.strip_prefix(FLAG_PREFIX) {
        let (name, valued) = match flag.strip_suffix('=') {
            Some(name) => (name, true),
            None => (flag, false),
        };
        validate_name(pattern, token, name)?;
        let name = name.to_string();
        return Ok(if valued {
            RoutePart::ValueFlag { name, optional }
        } else {
            RoutePart::Flag { name, optional }
        });
    }

    if body.starts_with('-') {
        return Err(DomainError::invalid_route(
            pattern,
            format!("short flags are not supported: '{token}'"),
        ));
    }

    if let Some(inner) = body.strip_prefix('<') {
        let Some(name) = inner.strip_suffix('>') else {
            return Err(DomainError::invalid_route(
                pattern,
                format!("unclosed '<' in '{token}'"),
            ));
        };
        validate_name(pattern, token, name)?;
        return Ok(RoutePart::Positional {
            name: name.to_string(),
            optional,
        });
    }

    validate_name(pattern, token, body)?;
    Ok(RoutePart::Literal {
        word: body.to_string(),
        optional,
    })
}

fn validate_name(pattern: &str, token: &str, name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::invalid_route(
            pattern,
            format!("empty name in '{token}'"),
        ));
    }
    if name.contains(['=', '<', '>', '"', '\'']) {
        return Err(DomainError::invalid_route(
            pattern,
            format!("invalid character in '{token}'"),
        ));
    }
    Ok(())
}
