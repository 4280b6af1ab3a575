// Test HTTP Client

use waypoint_core::{Error, HttpMethod, HttpRequest, HttpResponse, Router};
use std::collections::HashMap;
use std::sync::Arc;

/// Test HTTP client for making requests to a bound router
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
}

impl TestClient {
    /// Create a new test client
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::POST, path, Some(body)).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PUT, path, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::DELETE, path, None).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PATCH, path, Some(body)).await
    }

    /// POST a JSON body
    pub async fn post_json<T: serde::Serialize>(&self, path: &str, data: &T) -> TestResponse {
        self.json(HttpMethod::POST, path, data).await
    }

    /// PUT a JSON body
    pub async fn put_json<T: serde::Serialize>(&self, path: &str, data: &T) -> TestResponse {
        self.json(HttpMethod::PUT, path, data).await
    }

    /// Send a JSON body with any method
    pub async fn json<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        data: &T,
    ) -> TestResponse {
        match TestRequestBuilder::new(method, path).json(data) {
            Ok(builder) => self.send(builder.build()).await,
            Err(error) => TestResponse::Error(error),
        }
    }

    /// Make a request with custom method
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let mut req = HttpRequest::new(method.as_str().to_string(), path.to_string());
        req.body = body.unwrap_or_default();
        self.send(req).await
    }

    /// Route a prepared request
    pub async fn send(&self, request: HttpRequest) -> TestResponse {
        match self.router.route(request).await {
            Ok(response) => TestResponse::Success(response),
            Err(error) => TestResponse::Error(error),
        }
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    query_params: Vec<(String, String)>,
}

impl TestRequestBuilder {
    /// Create a new request builder
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set JSON body
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Set a form-urlencoded body
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = encode_pairs(fields.iter().map(|(k, v)| (*k, *v))).into_bytes();
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Build the request
    pub fn build(self) -> HttpRequest {
        let query_string = if self.query_params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                encode_pairs(self.query_params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            )
        };

        let mut request = HttpRequest::new(
            self.method.as_str().to_string(),
            format!("{}{}", self.path, query_string),
        )
        .with_body(self.body);
        request.headers = self.headers;
        request
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Response from a test request
#[derive(Debug)]
pub enum TestResponse {
    Success(HttpResponse),
    Error(Error),
}

impl TestResponse {
    /// Assert the response is successful
    pub fn assert_success(&self) -> &HttpResponse {
        match self {
            TestResponse::Success(response) => response,
            TestResponse::Error(error) => {
                panic!("Expected success response, got error: {:?}", error)
            }
        }
    }

    /// Assert the response is an error
    pub fn assert_error(&self) -> &Error {
        match self {
            TestResponse::Error(error) => error,
            TestResponse::Success(_) => {
                panic!("Expected error response, got success")
            }
        }
    }

    /// The status code; routing errors report their mapped status
    pub fn status(&self) -> Option<u16> {
        match self {
            TestResponse::Success(response) => Some(response.status),
            TestResponse::Error(error) => Some(error.status_code()),
        }
    }

    /// Get the response body as string
    pub fn body_string(&self) -> Option<String> {
        match self {
            TestResponse::Success(response) => String::from_utf8(response.body.clone()).ok(),
            TestResponse::Error(_) => None,
        }
    }

    /// Get the response body as JSON
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        match self {
            TestResponse::Success(response) => serde_json::from_slice(&response.body)
                .map_err(|e| format!("Deserialization error: {}", e)),
            TestResponse::Error(error) => Err(format!("{:?}", error)),
        }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        match self {
            TestResponse::Success(response) => response.headers.get(key),
            TestResponse::Error(_) => None,
        }
    }
}
