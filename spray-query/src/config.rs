//! Repository configuration.
//!
//! Configuration can come from three places:
//!
//! - code, through [`RepositoryConfig::default`] and the builder methods,
//! - the environment (`SPRAY_HYDRATE`, `SPRAY_DEFAULT_ORDER`),
//! - a TOML document.
//!
//! ```rust
//! use spray_query::config::{MapEnvSource, RepositoryConfig};
//! use spray_query::OrderByField;
//!
//! let env = MapEnvSource::new()
//!     .set("SPRAY_HYDRATE", "false")
//!     .set("SPRAY_DEFAULT_ORDER", "created_at:desc,id");
//!
//! let config = RepositoryConfig::from_env_source(&env).unwrap();
//! assert!(!config.hydrate);
//! assert_eq!(
//!     config.default_order,
//!     vec![OrderByField::desc("created_at"), OrderByField::asc("id")]
//! );
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::types::OrderByField;

/// Environment variable toggling hydration.
pub const HYDRATE_VAR: &str = "SPRAY_HYDRATE";

/// Environment variable holding the default ordering, as comma-separated
/// `column[:asc|desc]` entries.
pub const DEFAULT_ORDER_VAR: &str = "SPRAY_DEFAULT_ORDER";

/// Source for environment variables.
pub trait EnvSource {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Environment source reading the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a map, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Settings applied to a repository at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Hydrate rows into entities (`true`) or keep scalar projections.
    pub hydrate: bool,
    /// Ordering added to every composed query before filters run.
    pub default_order: Vec<OrderByField>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            hydrate: true,
            default_order: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hydration mode.
    pub fn hydrate(mut self, hydrate: bool) -> Self {
        self.hydrate = hydrate;
        self
    }

    /// Append a default ordering entry.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.default_order.push(field);
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> QueryResult<Self> {
        Self::from_env_source(&StdEnvSource)
    }

    /// Load from an environment source. Unset variables keep their defaults.
    pub fn from_env_source(env: &impl EnvSource) -> QueryResult<Self> {
        let mut config = Self::default();

        if let Some(value) = env.get(HYDRATE_VAR) {
            config.hydrate = parse_bool(&value).ok_or_else(|| {
                QueryError::invalid_config(format!(
                    "{} must be a boolean (true/false/1/0/yes/no), got '{}'",
                    HYDRATE_VAR, value
                ))
            })?;
        }

        if let Some(value) = env.get(DEFAULT_ORDER_VAR) {
            config.default_order = value
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| {
                    OrderByField::parse(part).ok_or_else(|| {
                        QueryError::invalid_config(format!(
                            "invalid {} entry '{}'",
                            DEFAULT_ORDER_VAR,
                            part.trim()
                        ))
                        .with_help("Use `column`, `column:asc` or `column:desc`")
                    })
                })
                .collect::<QueryResult<_>>()?;
        }

        Ok(config)
    }

    /// Parse from a TOML document.
    ///
    /// ```rust
    /// use spray_query::config::RepositoryConfig;
    ///
    /// let config = RepositoryConfig::from_toml(r#"
    ///     hydrate = false
    ///
    ///     [[default_order]]
    ///     column = "title"
    /// "#).unwrap();
    /// assert!(!config.hydrate);
    /// assert_eq!(config.default_order.len(), 1);
    /// ```
    pub fn from_toml(source: &str) -> QueryResult<Self> {
        toml::from_str(source).map_err(|e| {
            QueryError::invalid_config(format!("invalid repository configuration: {}", e))
                .with_source(e)
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
