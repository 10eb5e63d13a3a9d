//! Router configuration.
//!
//! A [`Config`] can be built in code or loaded from a TOML document:
//!
//! ```toml
//! default_pattern = "[a-z0-9-]+"
//! max_optional_wildcards = 4
//! ```

use crate::error::ConfigError;
use crate::expand::MAX_OPTIONAL_WILDCARDS;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The token pattern used by wildcards without an explicit constraint.
///
/// Letters, digits, underscores, hyphens and percent-encoded bytes. It never
/// matches a slash, so a wildcard stays inside its path segment.
pub const DEFAULT_PATTERN: &str = r"[A-Za-z0-9_\-%]+";

/// Settings shared by every route of a routing table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pattern for wildcards without an explicit constraint.
    pub default_pattern: String,

    /// Routes with more optional wildcards than this are rejected.
    pub max_optional_wildcards: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_pattern: DEFAULT_PATTERN.to_owned(),
            max_optional_wildcards: 8,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = Regex::new(&self.default_pattern) {
            return Err(ConfigError::DefaultPattern {
                pattern: self.default_pattern.clone(),
                message: err.to_string(),
            });
        }

        if self.max_optional_wildcards > MAX_OPTIONAL_WILDCARDS {
            return Err(ConfigError::OptionalLimit {
                value: self.max_optional_wildcards,
                max: MAX_OPTIONAL_WILDCARDS,
            });
        }

        Ok(())
    }
}
