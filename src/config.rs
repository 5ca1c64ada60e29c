//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/conharness/conharness.toml`
//! 3. Application config file passed explicitly (e.g. `--config app.toml`)
//! 4. Environment variables: `CONHARNESS_*` prefix
//!
//! Routes merge by name: a later layer's route replaces an earlier route with
//! the same name in place, new names are appended.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::ParamValue;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "CONHARNESS";

/// Console behaviour of the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Printed before the usage listing when no route matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Print the route usage listing when no route matches
    pub show_usage: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            banner: None,
            show_usage: true,
        }
    }
}

/// Route default value as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl From<&DefaultValue> for ParamValue {
    fn from(value: &DefaultValue) -> Self {
        match value {
            DefaultValue::Boolean(b) => ParamValue::Boolean(*b),
            DefaultValue::Integer(i) => ParamValue::Text(i.to_string()),
            DefaultValue::Text(s) => ParamValue::Text(s.clone()),
        }
    }
}

/// What runs when a route matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Write `text` (with `{param}` placeholders filled) and exit with `status`
    Print {
        text: String,
        #[serde(default)]
        status: i32,
    },
    /// Write every route parameter as `name=value` and exit with `status`
    Params {
        #[serde(default)]
        status: i32,
    },
}

impl Default for ActionConfig {
    fn default() -> Self {
        ActionConfig::Params { status: 0 }
    }
}

/// One named console route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    pub name: String,
    /// Route pattern, e.g. `filter [--date=] [--id=]`
    pub route: String,
    /// Higher priorities are tried first
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub action: ActionConfig,
    /// Values for parameters the command leaves unset
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, DefaultValue>,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            priority: 0,
            action: ActionConfig::default(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, action: ActionConfig) -> Self {
        self.action = action;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_default(mut self, name: impl Into<String>, value: DefaultValue) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }
}

/// Raw console settings for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConsoleSettings {
    pub banner: Option<String>,
    pub show_usage: Option<bool>,
}

/// Raw application config for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAppConfig {
    pub console: RawConsoleSettings,
    pub routes: Vec<RouteConfig>,
}

/// Configuration handed to the console application.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub console: ConsoleSettings,
    pub routes: Vec<RouteConfig>,
}

/// Get the XDG config directory for conharness.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "conharness").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("conharness.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path given on the command line.
///
/// Unknown variables leave the input untouched.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

/// Load a TOML file into RawAppConfig for manual merging.
fn load_raw_config(path: &Path) -> Result<RawAppConfig, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Environment source for `CONHARNESS_*` overrides.
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl AppConfig {
    pub fn new(routes: Vec<RouteConfig>) -> Self {
        Self {
            console: ConsoleSettings::default(),
            routes,
        }
    }

    /// Parse a complete config from TOML text (no layering).
    pub fn from_toml_str(content: &str) -> Result<Self, ApplicationError> {
        toml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse config: {e}"),
        })
    }

    /// Load a complete config from a single TOML file (no layering).
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_config(path)?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Console scalars: overlay wins if Some, otherwise keep base
    /// - Routes: same name replaces in place, new names append
    fn merge_with(&self, overlay: &RawAppConfig) -> Self {
        let mut routes = self.routes.clone();
        for route in &overlay.routes {
            match routes.iter_mut().find(|r| r.name == route.name) {
                Some(existing) => *existing = route.clone(),
                None => routes.push(route.clone()),
            }
        }

        Self {
            console: ConsoleSettings {
                banner: overlay
                    .console
                    .banner
                    .clone()
                    .or_else(|| self.console.banner.clone()),
                show_usage: overlay
                    .console
                    .show_usage
                    .unwrap_or(self.console.show_usage),
            },
            routes,
        }
    }

    /// Load config with layered precedence.
    ///
    /// # Arguments
    /// * `app_config` - Optional application config file; must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults (no routes)
    /// 2. Global config: `$XDG_CONFIG_HOME/conharness/conharness.toml`
    /// 3. Application config file
    /// 4. Environment variables: `CONHARNESS_*` prefix
    pub fn load(app_config: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), app_config, env_source())
    }

    /// Load config from explicit layers.
    ///
    /// A missing global file is skipped; a missing application file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        app_config: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config (optional)
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                let raw = load_raw_config(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Application config (required when given)
        if let Some(path) = app_config {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("load: application config {}", path.display());
            let raw = load_raw_config(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (replace - explicit override)
        Self::apply_env_overrides(current, env)
    }

    /// Apply `CONHARNESS_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut config: Self, env: Environment) -> Result<Self, ApplicationError> {
        let overrides = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = overrides.get_string("console.banner") {
            config.console.banner = Some(val);
        }
        if let Ok(val) = overrides.get_bool("console.show_usage") {
            config.console.show_usage = val;
        }

        Ok(config)
    }

    /// Route config by name.
    pub fn route(&self, name: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# conharness configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/conharness/conharness.toml
#   App:    file passed with --config
#   Env:    CONHARNESS_* environment variables (e.g. CONHARNESS_CONSOLE__BANNER)
#
# Routes merge by name: a route in the app config replaces a global route
# with the same name; other routes are appended.

[console]
# Printed before the usage listing when no route matches
# banner = "My console application"

# Print the usage listing when no route matches
# show_usage = true

# Route pattern syntax:
#   word / [word]         mandatory / optional literal word
#   <name> / [<name>]     mandatory / optional positional value
#   --name / [--name]     mandatory / optional literal flag (true/false)
#   --name= / [--name=]   mandatory / optional value flag

[[routes]]
name = "filter"
route = "filter [--date=] [--id=] [--text=]"
priority = 0
action = { type = "params" }

[[routes]]
name = "greet"
route = "greet <name> [--loud]"
action = { type = "print", text = "Hello, {name}!", status = 0 }
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
