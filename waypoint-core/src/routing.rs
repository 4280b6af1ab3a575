// In-process router: the built-in host adapter

use crate::{Error, FrameworkAdapter, HttpMethod, HttpRequest, HttpResponse, RequestHandler};
use std::collections::HashMap;

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: RequestHandler,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Router for managing routes and dispatching requests
///
/// Routes are tried in registration order; the first verb + pattern match
/// handles the request.
#[derive(Default)]
pub struct Router {
    pub routes: Vec<Route>,
    methods: Option<Vec<HttpMethod>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router that only accepts registrations for `methods`.
    pub fn with_methods(methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self {
            routes: Vec::new(),
            methods: Some(methods.into_iter().collect()),
        }
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find a route that matches the request and run it
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        let full_path = std::mem::take(&mut request.path);
        let (path, query_string) = full_path
            .split_once('?')
            .map(|(p, q)| (p, Some(q)))
            .unwrap_or((full_path.as_str(), None));

        if let Some(query) = query_string {
            request.query_params = parse_query_string(query);
        }
        request.path = path.to_string();

        for route in &self.routes {
            if !route.method.matches(&request.method) {
                continue;
            }

            if let Some(params) = match_path(&route.path, path) {
                request.path_params = params;
                return Ok((route.handler)(request).await);
            }
        }

        Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
    }
}

impl FrameworkAdapter for Router {
    fn supports(&self, method: &HttpMethod) -> bool {
        self.methods
            .as_ref()
            .is_none_or(|allowed| allowed.contains(method))
    }

    fn register(&mut self, method: HttpMethod, url_pattern: &str, handler: RequestHandler) {
        self.add_route(Route {
            method,
            path: url_pattern.to_string(),
            handler,
        });
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), decode(path_part));
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of decoded parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((decode(&key.replace('+', " ")), decode(&value.replace('+', " "))))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_handler;

    fn echo_handler() -> RequestHandler {
        request_handler(|req: HttpRequest| async move {
            let body = format!("{:?}|{:?}", req.path_params.get("id"), req.query_params.get("q"));
            HttpResponse::ok().with_body(body.into_bytes())
        })
    }

    #[test]
    fn test_match_path_static() {
        let result = match_path("/users", "/users");
        assert!(result.is_some());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_match_path_with_param() {
        let params = match_path("/users/:id", "/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/users/:id", "/users").is_none());
    }

    #[test]
    fn test_match_path_multiple_params() {
        let params = match_path("/api/orgs/:org/:id", "/api/orgs/acme/456").unwrap();
        assert_eq!(params.get("org"), Some(&"acme".to_string()));
        assert_eq!(params.get("id"), Some(&"456".to_string()));
    }

    #[test]
    fn test_match_path_decodes_params() {
        let params = match_path("/files/:name", "/files/a%20b").unwrap();
        assert_eq!(params.get("name"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_match_path_root() {
        assert!(match_path("/", "/").is_some());
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("name=john&age=30");
        assert_eq!(params.get("name"), Some(&"john".to_string()));
        assert_eq!(params.get("age"), Some(&"30".to_string()));
    }

    #[test]
    fn test_parse_query_string_decodes() {
        let params = parse_query_string("name=john%20doe&email=test%40example.com&city=New+York");
        assert_eq!(params.get("name"), Some(&"john doe".to_string()));
        assert_eq!(params.get("email"), Some(&"test@example.com".to_string()));
        assert_eq!(params.get("city"), Some(&"New York".to_string()));
    }

    #[test]
    fn test_parse_query_string_empty_and_flags() {
        assert!(parse_query_string("").is_empty());

        let params = parse_query_string("flag&debug=true");
        assert_eq!(params.get("flag"), Some(&String::new()));
        assert_eq!(params.get("debug"), Some(&"true".to_string()));
    }

    #[test]
    fn test_with_methods_restricts_support() {
        let router = Router::with_methods([HttpMethod::GET, HttpMethod::POST]);
        assert!(router.supports(&HttpMethod::GET));
        assert!(!router.supports(&HttpMethod::PUT));
        assert!(Router::new().supports(&HttpMethod::OPTIONS));
    }

    #[tokio::test]
    async fn test_route_fills_params() {
        let mut router = Router::new();
        router.register(HttpMethod::GET, "/users/:id", echo_handler());

        let response = router
            .route(HttpRequest::new("GET".into(), "/users/9?q=a+b".into()))
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(response.body).unwrap(),
            r#"Some("9")|Some("a b")"#
        );
    }

    #[tokio::test]
    async fn test_route_not_found() {
        let mut router = Router::new();
        router.register(HttpMethod::GET, "/users", echo_handler());

        let err = router
            .route(HttpRequest::new("POST".into(), "/users".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RouteNotFound(ref m) if m == "POST /users"));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let mut router = Router::new();
        router.register(
            HttpMethod::GET,
            "/users/archive",
            request_handler(|_req| async { HttpResponse::new(201) }),
        );
        router.register(HttpMethod::GET, "/users/:id", echo_handler());

        let response = router
            .route(HttpRequest::new("GET".into(), "/users/archive".into()))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(router.routes().len(), 2);
    }
}
