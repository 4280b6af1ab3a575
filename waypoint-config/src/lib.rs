//! Layered configuration for the Waypoint route generator.
//!
//! [`RouterConfig`] builds [`RouterOptions`] from, lowest to highest
//! precedence:
//!
//! 1. the built-in defaults (`/api/`, `POST`);
//! 2. a JSON, TOML or env file;
//! 3. a dotenv file;
//! 4. the process environment (`WAYPOINT_PATH_PREFIX`, `WAYPOINT_DEFAULT_METHOD`);
//! 5. explicit overrides.
//!
//! ```no_run
//! use waypoint_config::RouterConfig;
//!
//! let options = RouterConfig::new()
//!     .file("config/router.toml")
//!     .load()?;
//! # Ok::<(), waypoint_config::ConfigError>(())
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use waypoint_core::RouterOptions;

/// Builder that layers configuration sources into [`RouterOptions`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    file: Option<PathBuf>,
    dotenv: Option<PathBuf>,
    env: EnvLoader,
    env_vars: Option<HashMap<String, String>>,
    use_env: bool,
    overrides: Map<String, Value>,
}

impl RouterConfig {
    pub fn new() -> Self {
        Self {
            file: None,
            dotenv: None,
            env: EnvLoader::default(),
            env_vars: None,
            use_env: true,
            overrides: Map::new(),
        }
    }

    /// Read a configuration file; the format follows the extension.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read `PREFIX_*` variables from a dotenv file. The process
    /// environment still wins over values from the file.
    pub fn dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Use a different variable prefix than `WAYPOINT`.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = EnvLoader::new(Some(prefix.into()));
        self
    }

    /// Read these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Skip the environment layer.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Force a key regardless of the other layers.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Merge every layer, deserialize and validate.
    pub fn load(&self) -> Result<RouterOptions> {
        let mut merged = match serde_json::to_value(RouterOptions::default()) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(ConfigError::DeserializationError(e.to_string())),
        };

        if let Some(ref path) = self.file {
            let loader = ConfigLoader::auto(path)?;
            let data = loader.load_file(path)?;
            match (loader.format(), data) {
                (FileFormat::Env, Value::Object(map)) => {
                    let vars = map
                        .into_iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())));
                    merge_strings(&mut merged, self.env.load_from(vars));
                }
                (_, Value::Object(map)) => merge(&mut merged, map),
                (_, _) => {
                    return Err(ConfigError::ParseError(format!(
                        "{} must contain a table of settings",
                        path.display()
                    )));
                }
            }
        }

        if self.use_env {
            let mut vars = Vec::new();
            if let Some(ref path) = self.dotenv {
                let iter = dotenvy::from_path_iter(path)
                    .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
                for item in iter {
                    vars.push(item.map_err(|e| ConfigError::ParseError(e.to_string()))?);
                }
            }
            match self.env_vars {
                Some(ref explicit) => vars.extend(explicit.clone()),
                None => vars.extend(std::env::vars()),
            }
            merge_strings(&mut merged, self.env.load_from(vars));
        }

        merge(&mut merged, self.overrides.clone());

        let options: RouterOptions = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Load [`RouterOptions`] from the defaults and the `WAYPOINT_*` environment.
pub fn from_env() -> Result<RouterOptions> {
    RouterConfig::new().load()
}

fn merge(target: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        target.insert(normalize_key(&key), value);
    }
}

fn merge_strings(target: &mut Map<String, Value>, layer: HashMap<String, String>) {
    for (key, value) in layer {
        target.insert(normalize_key(&key), Value::String(value));
    }
}

fn normalize_key(key: &str) -> String {
    match key {
        "pathPrefix" => "path_prefix".to_string(),
        "method" => "default_method".to_string(),
        other => other.to_string(),
    }
}
