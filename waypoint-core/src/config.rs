// Route generation options

use crate::HttpMethod;
use serde::{Deserialize, Serialize};

/// Options consumed by the [`ConfigGenerator`](crate::ConfigGenerator).
///
/// ```
/// use waypoint_core::{HttpMethod, RouterOptions};
///
/// let options = RouterOptions::new().path_prefix("/v2");
/// assert_eq!(options.normalized_prefix(), "/v2/");
/// assert_eq!(options.default_method, HttpMethod::POST);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Prepended to every generated URL
    #[serde(alias = "pathPrefix")]
    pub path_prefix: String,
    /// Reserved. Loaded and validated, but generation always uses POST for
    /// handlers outside the convention table.
    #[serde(alias = "method")]
    pub default_method: HttpMethod,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            path_prefix: "/api/".to_string(),
            default_method: HttpMethod::POST,
        }
    }
}

impl RouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    pub fn default_method(mut self, method: HttpMethod) -> Self {
        self.default_method = method;
        self
    }

    /// The prefix with exactly one leading and one trailing `/`.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.path_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RouterOptions::default();
        assert_eq!(options.path_prefix, "/api/");
        assert_eq!(options.default_method, HttpMethod::POST);
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(RouterOptions::new().normalized_prefix(), "/api/");
        assert_eq!(RouterOptions::new().path_prefix("api").normalized_prefix(), "/api/");
        assert_eq!(RouterOptions::new().path_prefix("/api/v1/").normalized_prefix(), "/api/v1/");
        assert_eq!(RouterOptions::new().path_prefix("").normalized_prefix(), "/");
        assert_eq!(RouterOptions::new().path_prefix("/").normalized_prefix(), "/");
    }

    #[test]
    fn test_deserialize_partial() {
        let options: RouterOptions = serde_json::from_str(r#"{"path_prefix": "/v1/"}"#).unwrap();
        assert_eq!(options.path_prefix, "/v1/");
        assert_eq!(options.default_method, HttpMethod::POST);

        let options: RouterOptions = serde_json::from_str(r#"{"default_method": "put"}"#).unwrap();
        assert_eq!(options.default_method, HttpMethod::PUT);
    }

    #[test]
    fn test_deserialize_short_names() {
        let options: RouterOptions =
            serde_json::from_str(r#"{"pathPrefix": "/rest", "method": "get"}"#).unwrap();
        assert_eq!(options.normalized_prefix(), "/rest/");
        assert_eq!(options.default_method, HttpMethod::GET);
    }
}
