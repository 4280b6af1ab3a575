//! Convention-based route generation.
//!
//! The generator walks a [`ControllerRegistry`] once and derives one
//! [`RouteDefinition`] per routable handler:
//!
//! | handler   | verb   | URL                         |
//! |-----------|--------|-----------------------------|
//! | `getAll`  | GET    | `/api/users`                |
//! | `get`     | GET    | `/api/users/:id`            |
//! | `create`  | POST   | `/api/users`                |
//! | `update`  | PUT    | `/api/users/:id`            |
//! | `delete`  | DELETE | `/api/users/:id`            |
//! | `archive` | POST   | `/api/users/archive/:id`    |
//!
//! Names outside the convention table get POST (unless the handler declares
//! a verb) and //! their own path segment. A parameter named `id` (or any parameter declared
//! [`ParamSource::Path`]) adds a `/:name` segment.

use crate::{
    Blueprint, ConfigurationError, ControllerRegistry, HandlerSpec, HttpMethod, ParamSource,
    ParamSpec, RouterOptions,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use waypoint_log::{Logger, debug, error, warn};

/// Handler names with a fixed verb and no extra path segment.
pub const CONVENTIONS: [(&str, HttpMethod); 5] = [
    ("getAll", HttpMethod::GET),
    ("get", HttpMethod::GET),
    ("create", HttpMethod::POST),
    ("update", HttpMethod::PUT),
    ("delete", HttpMethod::DELETE),
];

/// Verb the convention table assigns to `handler`, if any.
pub fn conventional_method(handler: &str) -> Option<HttpMethod> {
    CONVENTIONS
        .iter()
        .find(|(name, _)| *name == handler)
        .map(|(_, method)| method.clone())
}

/// One generated binding of verb + URL pattern + handler + parameters.
#[derive(Clone)]
pub struct RouteDefinition {
    pub url_pattern: String,
    pub method: HttpMethod,
    pub controller: Arc<dyn Blueprint>,
    pub controller_key: String,
    pub handler_name: String,
    pub params: Vec<ParamSpec>,
}

impl RouteDefinition {
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// `Controller.handler(a,b)`, as shown in logs.
    pub fn signature(&self) -> String {
        format!(
            "{}.{}({})",
            self.controller.name(),
            self.handler_name,
            self.param_names().collect::<Vec<_>>().join(",")
        )
    }
}

impl PartialEq for RouteDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.url_pattern == other.url_pattern
            && self.method == other.method
            && std::ptr::addr_eq(Arc::as_ptr(&self.controller), Arc::as_ptr(&other.controller))
            && self.controller_key == other.controller_key
            && self.handler_name == other.handler_name
            && self.params == other.params
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("url_pattern", &self.url_pattern)
            .field("controller", &self.controller.name())
            .field("handler_name", &self.handler_name)
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.url_pattern, self.signature())
    }
}

/// Ordered, immutable list of generated routes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route registered for exactly this verb and pattern.
    pub fn find(&self, method: &HttpMethod, url_pattern: &str) -> Option<&RouteDefinition> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.url_pattern == url_pattern)
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDefinition;
    type IntoIter = std::slice::Iter<'a, RouteDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Derives a [`RouteTable`] from a [`ControllerRegistry`].
pub struct ConfigGenerator {
    options: RouterOptions,
    logger: Arc<dyn Logger>,
}

impl ConfigGenerator {
    pub fn new(options: RouterOptions, logger: Arc<dyn Logger>) -> Self {
        Self { options, logger }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Generate the route table.
    ///
    /// Fails on the first controller that cannot be constructed, on an `id`
    /// parameter declared with a non-path source, and on two routes sharing a
    /// verb and URL pattern. Controllers without routable handlers are skipped
    /// with a warning.
    pub fn generate(&self, registry: &ControllerRegistry) -> Result<RouteTable, ConfigurationError> {
        let prefix = self.options.normalized_prefix();
        let mut routes = Vec::new();
        let mut seen: HashMap<(HttpMethod, String), String> = HashMap::new();

        for (key, blueprint) in registry.iter() {
            if !blueprint.is_constructible() {
                error!(self.logger, "controller is not a constructor: {} ({})", key, blueprint.name());
                return Err(ConfigurationError::NotConstructible {
                    entry: key.to_string(),
                });
            }

            let base = format!("{}{}", prefix, key.replace('.', "/"));
            let handlers: Vec<&HandlerSpec> = blueprint
                .handler_specs()
                .iter()
                .filter(|spec| spec.is_routable())
                .collect();

            if handlers.is_empty() {
                warn!(self.logger, "controller {} ({}) doesn't have handlers", blueprint.name(), key);
                continue;
            }

            for spec in handlers {
                let route = self.build_route(&base, key, blueprint, spec)?;

                let slot = (route.method.clone(), route.url_pattern.clone());
                if let Some(first) = seen.get(&slot) {
                    let err = ConfigurationError::RouteCollision {
                        method: route.method.clone(),
                        url: route.url_pattern.clone(),
                        first: first.clone(),
                        second: route.signature(),
                    };
                    error!(self.logger, "{}", err);
                    return Err(err);
                }
                seen.insert(slot, route.signature());

                debug!(self.logger, "generated {}", route);
                routes.push(route);
            }
        }

        Ok(RouteTable { routes })
    }

    fn build_route(
        &self,
        base: &str,
        key: &str,
        blueprint: &Arc<dyn Blueprint>,
        spec: &HandlerSpec,
    ) -> Result<RouteDefinition, ConfigurationError> {
        if let Some(declared) = spec
            .params
            .iter()
            .find(|p| p.is_id())
            .and_then(|p| p.source)
            .filter(|source| *source != ParamSource::Path)
        {
            return Err(ConfigurationError::InvalidParamSource {
                handler: format!("{}.{}", blueprint.name(), spec.name),
                declared,
            });
        }

        let conventional = conventional_method(&spec.name);
        let mut url_pattern = base.to_string();
        if conventional.is_none() {
            url_pattern.push('/');
            url_pattern.push_str(&spec.name);
        }
        for param in spec.params.iter().filter(|p| p.is_path_sourced()) {
            url_pattern.push_str("/:");
            url_pattern.push_str(&param.name);
        }

        let method = spec
            .method
            .clone()
            .or(conventional)
            .unwrap_or(HttpMethod::POST);

        Ok(RouteDefinition {
            url_pattern,
            method,
            controller: blueprint.clone(),
            controller_key: key.to_string(),
            handler_name: spec.name.clone(),
            params: spec.params.clone(),
        })
    }
}
