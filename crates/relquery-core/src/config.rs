//! Statement templating and logging knobs.
//!
//! Defaults reproduce the `${PARAM1}` placeholder format the execution layer
//! resolves by name. A config can be loaded from TOML:
//!
//! ```toml
//! placeholder_open = ":"
//! placeholder_close = ""
//! param_prefix = "p"
//! log_statements = false
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// QueryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub placeholder_open: String,
    pub placeholder_close: String,
    /// Prefix for generated parameter names (`PARAM1`, `PARAM2_0`, ...).
    pub param_prefix: String,
    /// Emit a `debug` event for every compiled statement.
    pub log_statements: bool,
}

impl QueryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Placeholder text for a bound parameter name.
    #[must_use]
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{name}{}", self.placeholder_open, self.placeholder_close)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.param_prefix;

        if prefix.is_empty() {
            return Err(ConfigError::InvalidParamPrefix {
                prefix: prefix.clone(),
            });
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidParamPrefix {
                prefix: prefix.clone(),
            });
        }

        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            placeholder_open: "${".to_string(),
            placeholder_close: "}".to_string(),
            param_prefix: "PARAM".to_string(),
            log_statements: true,
        }
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid query config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("param_prefix '{prefix}' must be non-empty ASCII alphanumerics or '_'")]
    InvalidParamPrefix { prefix: String },
}
