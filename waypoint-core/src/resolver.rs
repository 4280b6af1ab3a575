// Argument resolution: parameter list + request view -> ordered arguments

use crate::{Error, HandlerError, HttpMethod, HttpRequest, ParamSource, ParamSpec};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Read-only view of the three argument sources of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestView {
    pub path: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Map<String, Value>,
}

impl RequestView {
    /// Build the view from a routed request.
    ///
    /// JSON object bodies and `application/x-www-form-urlencoded` bodies
    /// become body fields. Empty bodies and JSON values that are not objects
    /// contribute no fields. A body that does not parse is an error.
    pub fn from_request(request: &HttpRequest) -> Result<Self, Error> {
        Ok(Self {
            path: request.path_params.clone(),
            query: request.query_params.clone(),
            body: parse_body(request)?,
        })
    }

    /// Build the view a route needs.
    ///
    /// The body is only parsed when one of `params` resolves to
    /// [`ParamSource::Body`] for `method`; otherwise it is ignored, whatever
    /// its content.
    pub fn for_params(
        request: &HttpRequest,
        params: &[ParamSpec],
        method: &HttpMethod,
    ) -> Result<Self, Error> {
        let reads_body = params
            .iter()
            .any(|p| p.source_for(method) == ParamSource::Body);

        Ok(Self {
            path: request.path_params.clone(),
            query: request.query_params.clone(),
            body: if reads_body {
                parse_body(request)?
            } else {
                Map::new()
            },
        })
    }

    pub fn lookup(&self, source: ParamSource, name: &str) -> Option<Value> {
        match source {
            ParamSource::Path => self.path.get(name).cloned().map(Value::String),
            ParamSource::Query => self.query.get(name).cloned().map(Value::String),
            ParamSource::Body => self.body.get(name).cloned(),
        }
    }
}

fn parse_body(request: &HttpRequest) -> Result<Map<String, Value>, Error> {
    if request.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    if request.content_type() == Some("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&request.body)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        return Ok(pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect());
    }

    match serde_json::from_slice::<Value>(&request.body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(Error::Deserialization(e.to_string())),
    }
}

/// Resolve handler arguments, in declaration order.
///
/// Never fails: a missing value resolves to `None` and is passed through.
pub fn resolve(params: &[ParamSpec], method: &HttpMethod, view: &RequestView) -> Arguments {
    Arguments::from_pairs(params.iter().map(|param| {
        let value = view.lookup(param.source_for(method), &param.name);
        (param.name.clone(), value)
    }))
}

/// Ordered, named handler arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, Option<Value>)>,
}

impl Arguments {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<Value>)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Argument at `index`; `None` when absent or out of range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).and_then(|(_, v)| v.as_ref())
    }

    /// Argument named `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Argument named `name` when it is a string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// The argument, or a rejection naming the missing parameter.
    pub fn require(&self, name: &str) -> Result<&Value, HandlerError> {
        self.value(name)
            .ok_or_else(|| HandlerError::reject(format!("missing parameter '{}'", name)))
    }

    /// Deserialize an argument for the handler.
    ///
    /// Path and query values arrive as strings, so a string that does not
    /// deserialize directly is retried as JSON text (`"42"` -> `42`). A value
    /// of the wrong shape is a rejection.
    pub fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, HandlerError> {
        let Some(value) = self.value(name) else {
            return Ok(None);
        };

        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(first) => match value {
                Value::String(text) => serde_json::from_str::<T>(text).map(Some).map_err(|_| {
                    HandlerError::reject(format!("invalid parameter '{}': {}", name, first))
                }),
                _ => Err(HandlerError::reject(format!(
                    "invalid parameter '{}': {}",
                    name, first
                ))),
            },
        }
    }

    pub fn into_values(self) -> Vec<Option<Value>> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view() -> RequestView {
        let mut view = RequestView::default();
        view.path.insert("id".into(), "7".into());
        view.query.insert("name".into(), "from-query".into());
        view.query.insert("id".into(), "query-id".into());
        view.body.insert("name".into(), json!("from-body"));
        view.body.insert("id".into(), json!("body-id"));
        view
    }

    fn params(names: &[&str]) -> Vec<ParamSpec> {
        names.iter().map(|n| ParamSpec::new(*n)).collect()
    }

    #[test]
    fn test_get_reads_query() {
        let args = resolve(&params(&["id", "name"]), &HttpMethod::GET, &view());
        assert_eq!(args.get(0), Some(&json!("7")));
        assert_eq!(args.get(1), Some(&json!("from-query")));
    }

    #[test]
    fn test_non_get_reads_body() {
        for method in [HttpMethod::POST, HttpMethod::PUT, HttpMethod::DELETE] {
            let args = resolve(&params(&["id", "name"]), &method, &view());
            assert_eq!(args.str("id"), Some("7"), "{}", method);
            assert_eq!(args.str("name"), Some("from-body"), "{}", method);
        }
    }

    #[test]
    fn test_missing_values_pass_through() {
        let args = resolve(&params(&["ghost", "name"]), &HttpMethod::POST, &view());
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), None);
        assert_eq!(args.into_values(), vec![None, Some(json!("from-body"))]);
    }

    #[test]
    fn test_explicit_source_overrides_convention() {
        let specs = vec![ParamSpec::query("name"), ParamSpec::path("id")];
        let args = resolve(&specs, &HttpMethod::POST, &view());
        assert_eq!(args.str("name"), Some("from-query"));
        assert_eq!(args.str("id"), Some("7"));
    }

    #[test]
    fn test_order_follows_declaration() {
        let args = resolve(&params(&["name", "id"]), &HttpMethod::GET, &view());
        let names: Vec<&str> = args.names().collect();
        assert_eq!(names, vec!["name", "id"]);
    }

    #[test]
    fn test_view_from_json_body() {
        let request = HttpRequest::new("POST".into(), "/api/users".into())
            .with_json(&json!({"name": "ada", "age": 36}))
            .unwrap();
        let view = RequestView::from_request(&request).unwrap();
        assert_eq!(view.body.get("age"), Some(&json!(36)));
    }

    #[test]
    fn test_view_from_form_body() {
        let request = HttpRequest::new("POST".into(), "/api/users".into())
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(b"name=ada+lovelace&city=London".to_vec());
        let view = RequestView::from_request(&request).unwrap();
        assert_eq!(view.body.get("name"), Some(&json!("ada lovelace")));
        assert_eq!(view.body.get("city"), Some(&json!("London")));
    }

    #[test]
    fn test_view_empty_and_non_object_bodies() {
        let empty = HttpRequest::new("POST".into(), "/".into());
        assert!(RequestView::from_request(&empty).unwrap().body.is_empty());

        let array = HttpRequest::new("POST".into(), "/".into()).with_body(b"[1,2]".to_vec());
        assert!(RequestView::from_request(&array).unwrap().body.is_empty());
    }

    #[test]
    fn test_view_malformed_body() {
        let request = HttpRequest::new("POST".into(), "/".into()).with_body(b"{oops".to_vec());
        assert!(matches!(
            RequestView::from_request(&request),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn test_view_skips_body_nobody_reads() {
        let mut request = HttpRequest::new("GET".into(), "/api/users/7".into())
            .with_header("Content-Type", "text/plain")
            .with_body(b"hello".to_vec());
        request.path_params.insert("id".into(), "7".into());

        let view =
            RequestView::for_params(&request, &params(&["id", "q"]), &HttpMethod::GET).unwrap();
        assert_eq!(view.lookup(ParamSource::Path, "id"), Some(json!("7")));
        assert!(view.body.is_empty());

        let delete = RequestView::for_params(&request, &params(&["id"]), &HttpMethod::DELETE);
        assert!(delete.is_ok());

        let create = RequestView::for_params(&request, &params(&["name"]), &HttpMethod::POST);
        assert!(matches!(create, Err(Error::Deserialization(_))));
    }

    #[test]
    fn test_parse_string_numbers() {
        let args = Arguments::from_pairs([("id".to_string(), Some(json!("42")))]);
        assert_eq!(args.parse::<u64>("id").unwrap(), Some(42));
        assert_eq!(args.parse::<String>("id").unwrap(), Some("42".to_string()));
        assert_eq!(args.parse::<u64>("missing").unwrap(), None);
    }

    #[test]
    fn test_parse_wrong_shape_rejects() {
        let args = Arguments::from_pairs([("tags".to_string(), Some(json!({"a": 1})))]);
        let err = args.parse::<Vec<String>>("tags").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_require() {
        let args = Arguments::from_pairs([("name".to_string(), None)]);
        let err = args.require("name").unwrap_err();
        assert_eq!(err.body(), json!({"error": "missing parameter 'name'"}));
    }
}
