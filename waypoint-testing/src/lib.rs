//! Testing utilities for Waypoint route tables.
//!
//! This crate drives generated routes end to end without a network server:
//! controllers are registered, routes generated and bound to an in-memory
//! [`Router`](waypoint_core::Router), and requests are sent through a
//! [`TestClient`].
//!
//! ## Features
//!
//! - 🧪 **TestApp** - Generate and bind a route table in one call
//! - 📡 **TestClient** - In-memory HTTP test client
//! - 🎭 **MockController** - Controllers with canned outcomes that record calls
//! - ✅ **Assertions** - Status, JSON and error body assertions
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use waypoint_core::HandlerSpec;
//! use waypoint_testing::*;
//!
//! # tokio_test::block_on(async {
//! let users = MockController::new("UsersController")
//!     .responds(HandlerSpec::new("getAll"), json!(["Alice", "Bob"]))
//!     .responds(HandlerSpec::new("get").params(["id"]), json!({"name": "Alice"}));
//!
//! let app = TestAppBuilder::new().mock("users", &users).build().unwrap();
//! let client = app.client();
//!
//! assert_json(&client.get("/api/users").await, &json!(["Alice", "Bob"]));
//! assert_status(&client.get("/api/users/1").await, 200);
//! assert_eq!(users.last_call("get").unwrap().str("id"), Some("1"));
//! # });
//! ```
//!
//! ## Testing Controllers
//!
//! ```
//! use serde_json::json;
//! use waypoint_core::{Arguments, Controller, HandlerSpec, RequestContext};
//! use waypoint_testing::*;
//!
//! struct Greeter;
//!
//! impl Controller for Greeter {
//!     fn create(_ctx: RequestContext) -> Self {
//!         Greeter
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let app = TestAppBuilder::new()
//!     .path_prefix("/v1")
//!     .controller::<Greeter, _>("greeter", |bp| {
//!         bp.handler(
//!             HandlerSpec::new("get").params(["id"]),
//!             |_g: Greeter, args: Arguments| async move {
//!                 Ok(json!({ "hello": args.str("id") }))
//!             },
//!         )
//!     })
//!     .build()
//!     .unwrap();
//!
//! let response = app.client().get("/v1/greeter/world").await;
//! assert_json(&response, &json!({"hello": "world"}));
//! # });
//! ```
//!
//! ## Assertions
//!
//! ```
//! use waypoint_testing::*;
//! use waypoint_core::HttpResponse;
//!
//! let response = HttpResponse::new(400)
//!     .with_header("Content-Type".to_string(), "application/json".to_string())
//!     .with_body(br#"{"error":"name is required"}"#.to_vec());
//!
//! let test_response = TestResponse::Success(response);
//!
//! assert_client_error(&test_response);
//! assert_error_body(&test_response, 400, "name is required");
//! assert_header(&test_response, "Content-Type", "application/json");
//! ```

mod assertions;
mod mock;
mod test_app;
mod test_client;

pub use assertions::{
    assert_body_contains, assert_client_error, assert_error_body, assert_header, assert_json,
    assert_json_content_type, assert_not_routed, assert_server_error, assert_status,
    assert_success,
};
pub use mock::{MockController, MockInstance, MockOutcome, RecordedCall};
pub use test_app::{TestApp, TestAppBuilder};
pub use test_client::{TestClient, TestRequestBuilder, TestResponse};
