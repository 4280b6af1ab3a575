// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix used when none is given, e.g. `WAYPOINT_PATH_PREFIX`.
pub const DEFAULT_PREFIX: &str = "WAYPOINT";

/// Environment variable loader
///
/// With a prefix, only `PREFIX_*` variables are kept and their keys are
/// returned without the prefix, lowercased (`WAYPOINT_PATH_PREFIX` ->
/// `path_prefix`).
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Load the process environment
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.load_from(env::vars()))
    }

    /// Apply the prefix filter to an explicit set of variables
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| match self.prefix {
                Some(ref prefix) => key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value)),
                None => Some((key.to_lowercase(), value)),
            })
            .collect()
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }
}
