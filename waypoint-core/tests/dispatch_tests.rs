//! End-to-end tests: registry -> generator -> dispatcher -> router

use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use waypoint_core::*;
use waypoint_log::MemoryLogger;

#[derive(Default)]
struct Store {
    next_id: u64,
    users: BTreeMap<u64, String>,
}

struct UsersController {
    store: Arc<Mutex<Store>>,
    ctx: RequestContext,
}

fn users(store: Arc<Mutex<Store>>) -> ControllerBlueprint<UsersController> {
    ControllerBlueprint::new("UsersController")
        .factory(move |ctx| UsersController {
            store: store.clone(),
            ctx,
        })
        .handler(HandlerSpec::new("create").params(["name"]), |c, args| async move {
            let name: String = args
                .parse("name")?
                .ok_or_else(|| HandlerError::reject("name is required"))?;
            let mut store = c.store.lock();
            store.next_id += 1;
            let id = store.next_id;
            store.users.insert(id, name.clone());
            Ok::<_, HandlerError>(json!({"id": id, "name": name}))
        })
        .handler(HandlerSpec::new("get").params(["id"]), |c, args| async move {
            let id: u64 = args.parse("id")?.ok_or_else(|| HandlerError::reject("id is required"))?;
            let store = c.store.lock();
            match store.users.get(&id) {
                Some(name) => Ok(json!({"id": id, "name": name})),
                None => Err(HandlerError::reject(format!("user {} not found", id))),
            }
        })
        .handler(HandlerSpec::new("update").params(["id", "name"]), |c, args| async move {
            let id: u64 = args.parse("id")?.unwrap_or_default();
            let name = args.str("name").unwrap_or_default().to_string();
            c.store.lock().users.insert(id, name.clone());
            Ok::<_, HandlerError>(json!({"id": id, "name": name}))
        })
        .handler(HandlerSpec::new("delete").params(["id"]), |c, args| async move {
            let id: u64 = args.parse("id")?.unwrap_or_default();
            Ok::<_, HandlerError>(c.store.lock().users.remove(&id).is_some())
        })
        .handler(HandlerSpec::new("getAll").params(["name"]), |c, args| async move {
            let filter = args.str("name").map(str::to_string);
            let store = c.store.lock();
            let list: Vec<Value> = store
                .users
                .iter()
                .filter(|(_, n)| filter.as_deref().is_none_or(|f| f == n.as_str()))
                .map(|(id, n)| json!({"id": id, "name": n}))
                .collect();
            Ok::<_, HandlerError>(list)
        })
        .handler(HandlerSpec::new("explode"), |_c, _args| async move {
            Err::<(), _>(HandlerError::internal_message("database unreachable"))
        })
        .handler(HandlerSpec::new("panics"), |_c, _args| async move {
            if true {
                panic!("handler bug");
            }
            Ok::<_, HandlerError>(())
        })
        .handler(HandlerSpec::new("redirect"), |c, _args| async move {
            c.ctx
                .response()
                .send(HttpResponse::new(302).with_header("Location".into(), "/api/users".into()))
                .map_err(HandlerError::internal)?;
            Ok::<_, HandlerError>(json!({"ignored": true}))
        })
        .handler(HandlerSpec::new("whoami"), |c, _args| async move {
            let agent = c.ctx.request().header("User-Agent").unwrap_or("unknown").to_string();
            Ok::<_, HandlerError>(agent)
        })
}

struct App {
    router: Router,
    logger: Arc<MemoryLogger>,
}

fn app_with(executor: Arc<dyn CompletionExecutor>) -> App {
    let logger = Arc::new(MemoryLogger::new());
    let registry = ControllerRegistry::new().register("users", users(Arc::default()));
    let table = ConfigGenerator::new(RouterOptions::default(), logger.clone())
        .generate(&registry)
        .unwrap();

    let mut router = Router::new();
    Dispatcher::new(logger.clone(), executor)
        .bind(&table, &mut router)
        .unwrap();

    App { router, logger }
}

fn app() -> App {
    app_with(Arc::new(InlineExecutor))
}

async fn call(app: &App, method: &str, path: &str, body: Option<Value>) -> HttpResponse {
    let mut request = HttpRequest::new(method.to_string(), path.to_string());
    if let Some(body) = body {
        request = request.with_json(&body).unwrap();
    }
    app.router.route(request).await.unwrap()
}

#[tokio::test]
async fn test_crud_round() {
    let app = app();

    let created = call(&app, "POST", "/api/users", Some(json!({"name": "ada"}))).await;
    assert_eq!(created.status, 200);
    assert_eq!(created.json::<Value>().unwrap(), json!({"id": 1, "name": "ada"}));

    let fetched = call(&app, "GET", "/api/users/1", None).await;
    assert_eq!(fetched.json::<Value>().unwrap()["name"], "ada");

    let updated = call(&app, "PUT", "/api/users/1", Some(json!({"name": "grace"}))).await;
    assert_eq!(updated.json::<Value>().unwrap(), json!({"id": 1, "name": "grace"}));

    let deleted = call(&app, "DELETE", "/api/users/1", None).await;
    assert_eq!(deleted.json::<Value>().unwrap(), json!(true));

    let listed = call(&app, "GET", "/api/users", None).await;
    assert_eq!(listed.json::<Value>().unwrap(), json!([]));
}

#[tokio::test]
async fn test_get_reads_query_and_post_reads_body() {
    let app = app();
    call(&app, "POST", "/api/users", Some(json!({"name": "ada"}))).await;
    call(&app, "POST", "/api/users", Some(json!({"name": "linus"}))).await;

    // GET ignores the body and reads `name` from the query.
    let filtered = call(&app, "GET", "/api/users?name=linus", Some(json!({"name": "ada"}))).await;
    assert_eq!(filtered.json::<Value>().unwrap(), json!([{"id": 2, "name": "linus"}]));

    // POST ignores the query and reads `name` from the body.
    let created = call(&app, "POST", "/api/users?name=query", Some(json!({"name": "body"}))).await;
    assert_eq!(created.json::<Value>().unwrap()["name"], "body");
}

#[tokio::test]
async fn test_id_comes_from_path_for_every_verb() {
    let app = app();
    call(&app, "POST", "/api/users", Some(json!({"name": "ada"}))).await;

    let updated = call(
        &app,
        "PUT",
        "/api/users/1?id=99",
        Some(json!({"id": 42, "name": "grace"})),
    )
    .await;
    assert_eq!(updated.json::<Value>().unwrap()["id"], 1);
}

#[tokio::test]
async fn test_rejection_is_400() {
    let app = app();

    let missing = call(&app, "GET", "/api/users/7", None).await;
    assert_eq!(missing.status, 400);
    assert_eq!(missing.json::<Value>().unwrap(), json!({"error": "user 7 not found"}));

    let no_name = call(&app, "POST", "/api/users", None).await;
    assert_eq!(no_name.status, 400);
    assert_eq!(no_name.json::<Value>().unwrap(), json!({"error": "name is required"}));
}

#[tokio::test]
async fn test_wrong_shape_is_400() {
    let app = app();

    let response = call(&app, "GET", "/api/users/abc", None).await;
    assert_eq!(response.status, 400);
    assert!(response.json::<Value>().unwrap()["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid parameter 'id'"));
}

#[tokio::test]
async fn test_internal_failure_is_500_and_logged() {
    let app = app();

    let response = call(&app, "POST", "/api/users/explode", None).await;
    assert_eq!(response.status, 500);
    assert_eq!(
        response.json::<Value>().unwrap(),
        json!({"error": "database unreachable"})
    );
    assert!(app.logger.contains(waypoint_log::Level::Error, "UsersController.explode() failed"));
}

#[tokio::test]
async fn test_panic_is_500_inline() {
    let app = app();

    let response = call(&app, "POST", "/api/users/panics", None).await;
    assert_eq!(response.status, 500);
    assert_eq!(
        response.json::<Value>().unwrap(),
        json!({"error": "panic: handler bug"})
    );
}

#[tokio::test]
async fn test_panic_is_500_on_tokio_executor() {
    let app = app_with(Arc::new(TokioExecutor::new()));

    let response = call(&app, "POST", "/api/users/panics", None).await;
    assert_eq!(response.status, 500);

    let ok = call(&app, "POST", "/api/users", Some(json!({"name": "ada"}))).await;
    assert_eq!(ok.status, 200);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = app();

    let request = HttpRequest::new("POST".into(), "/api/users".into())
        .with_header("Content-Type", "application/json")
        .with_body(b"{\"name\":".to_vec());
    let response = app.router.route(request).await.unwrap();

    assert_eq!(response.status, 400);
    assert!(response.json::<Value>().unwrap()["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request body"));
}

#[tokio::test]
async fn test_body_ignored_when_no_parameter_reads_it() {
    let app = app();
    call(&app, "POST", "/api/users", Some(json!({"name": "ada"}))).await;

    let request = HttpRequest::new("GET".into(), "/api/users/1".into())
        .with_header("Content-Type", "text/plain")
        .with_body(b"hello".to_vec());
    let response = app.router.route(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json::<Value>().unwrap(), json!({"id": 1, "name": "ada"}));

    let request = HttpRequest::new("DELETE".into(), "/api/users/1".into())
        .with_body(b"{not json".to_vec());
    let response = app.router.route(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json::<Value>().unwrap(), json!(true));
}

#[tokio::test]
async fn test_form_body() {
    let app = app();

    let request = HttpRequest::new("POST".into(), "/api/users".into())
        .with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
        .with_body(b"name=ada+lovelace".to_vec());
    let response = app.router.route(request).await.unwrap();

    assert_eq!(response.json::<Value>().unwrap()["name"], "ada lovelace");
}

#[tokio::test]
async fn test_controller_written_response_wins() {
    let app = app();

    let response = call(&app, "POST", "/api/users/redirect", None).await;
    assert_eq!(response.status, 302);
    assert_eq!(response.headers.get("Location").map(String::as_str), Some("/api/users"));
    assert!(app.logger.contains(waypoint_log::Level::Error, "tried to respond twice"));
}

#[tokio::test]
async fn test_controller_sees_request() {
    let app = app();

    let request = HttpRequest::new("POST".into(), "/api/users/whoami".into())
        .with_header("User-Agent", "waypoint-tests");
    let response = app.router.route(request).await.unwrap();

    assert_eq!(response.json::<Value>().unwrap(), json!("waypoint-tests"));
}

#[tokio::test]
async fn test_unmatched_request_is_not_found() {
    let app = app();

    let err = app
        .router
        .route(HttpRequest::new("PATCH".into(), "/api/users/1".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_unsupported_verb_keeps_earlier_routes() {
    let logger = Arc::new(MemoryLogger::new());
    let registry = ControllerRegistry::new().register("users", users(Arc::default()));
    let table = ConfigGenerator::new(RouterOptions::default(), logger.clone())
        .generate(&registry)
        .unwrap();

    let mut router = Router::with_methods([HttpMethod::POST, HttpMethod::GET]);
    let err = Dispatcher::with_logger(logger.clone())
        .bind(&table, &mut router)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "method not found: adapter cannot register PUT /api/users/:id"
    );
    let bound: Vec<String> = router
        .routes()
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(bound, vec!["POST /api/users", "GET /api/users/:id"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() {
    let app = Arc::new(app_with(Arc::new(TokioExecutor::new())));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                call(&app, "POST", "/api/users", Some(json!({"name": format!("user{}", i)}))).await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().status, 200);
    }

    let listed = call(&app, "GET", "/api/users", None).await;
    assert_eq!(listed.json::<Value>().unwrap().as_array().unwrap().len(), 16);
}
