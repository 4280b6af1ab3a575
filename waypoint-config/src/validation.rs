// Configuration validation

use crate::{ConfigError, Result};
use waypoint_core::{HttpMethod, RouterOptions};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is in a list of allowed values
    pub fn one_of<T: PartialEq + std::fmt::Debug>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of {:?}",
                field, allowed
            )));
        }
        Ok(())
    }

    /// Validate a URL path prefix: plain segments only, no parameters,
    /// query, fragment, whitespace or empty inner segments
    pub fn is_path_prefix(value: &str, field: &str) -> Result<()> {
        if value.chars().any(|c| c.is_whitespace() || matches!(c, ':' | '?' | '#' | '%')) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a plain path, got {:?}",
                field, value
            )));
        }
        if value.trim_matches('/').contains("//") {
            return Err(ConfigError::ValidationError(format!(
                "{} must not contain empty segments, got {:?}",
                field, value
            )));
        }
        Ok(())
    }
}

/// Verbs a generated route may default to.
pub const ROUTABLE_METHODS: [HttpMethod; 5] = [
    HttpMethod::GET,
    HttpMethod::POST,
    HttpMethod::PUT,
    HttpMethod::DELETE,
    HttpMethod::PATCH,
];

impl Validate for RouterOptions {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_path_prefix(&self.path_prefix, "path_prefix")?;
        ConfigValidator::one_of(&self.default_method, &ROUTABLE_METHODS, "default_method")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of_validation() {
        let allowed = vec!["a", "b", "c"];
        assert!(ConfigValidator::one_of(&"a", &allowed, "field").is_ok());
        assert!(ConfigValidator::one_of(&"d", &allowed, "field").is_err());
    }

    #[test]
    fn test_path_prefix_validation() {
        for ok in ["/api/", "api", "", "/", "/api/v2"] {
            assert!(ConfigValidator::is_path_prefix(ok, "p").is_ok(), "{:?}", ok);
        }
        for bad in ["/api/:v", "/api?x", "/a b/", "/api//v2/", "/%2F"] {
            assert!(ConfigValidator::is_path_prefix(bad, "p").is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_router_options_validation() {
        assert!(RouterOptions::default().validate().is_ok());
        assert!(RouterOptions::new().default_method(HttpMethod::HEAD).validate().is_err());

        let err = RouterOptions::new().path_prefix("/api/:tenant").validate().unwrap_err();
        assert!(err.to_string().contains("path_prefix"));
    }
}
