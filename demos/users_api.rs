//! Users API
//!
//! Registers a users controller and an admin controller, generates the
//! route table and sends a few requests through the in-memory router.
//!
//! Options come from `WAYPOINT_*` environment variables, e.g.
//!
//! ```text
//! WAYPOINT_PATH_PREFIX=/v1 WAYPOINT_LOG_LEVEL=debug cargo run --example users_api
//! ```

use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use waypoint::prelude::*;
use waypoint::{ConsoleLogger, TokioExecutor};

#[derive(Default)]
struct Store {
    next_id: u64,
    users: BTreeMap<u64, String>,
}

struct UsersController {
    store: Arc<Mutex<Store>>,
}

fn users(store: Arc<Mutex<Store>>) -> ControllerBlueprint<UsersController> {
    ControllerBlueprint::new("UsersController")
        .factory(move |_ctx| UsersController {
            store: store.clone(),
        })
        .handler(HandlerSpec::new("getAll"), |c, _args| async move {
            let store = c.store.lock();
            let list: Vec<Value> = store
                .users
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect();
            Ok::<_, HandlerError>(list)
        })
        .handler(HandlerSpec::new("get").params(["id"]), |c, args| async move {
            let id: u64 = args.parse("id")?.ok_or_else(|| HandlerError::reject("id is required"))?;
            match c.store.lock().users.get(&id) {
                Some(name) => Ok(json!({"id": id, "name": name})),
                None => Err(HandlerError::reject(format!("user {} not found", id))),
            }
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
        .handler(HandlerSpec::new("delete").params(["id"]), |c, args| async move {
            let id: u64 = args.parse("id")?.unwrap_or_default();
            Ok::<_, HandlerError>(c.store.lock().users.remove(&id).is_some())
        })
}

struct AdminController;

impl Controller for AdminController {
    fn create(_ctx: RequestContext) -> Self {
        AdminController
    }
}

async fn send(router: &Router, method: &str, path: &str, body: Option<Value>) {
    let mut request = HttpRequest::new(method.to_string(), path.to_string());
    if let Some(body) = body {
        request = match request.with_json(&body) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("{} {} -> {}", method, path, e);
                return;
            }
        };
    }

    match router.route(request).await {
        Ok(response) => println!(
            "{} {} -> {} {}",
            method,
            path,
            response.status,
            String::from_utf8_lossy(&response.body)
        ),
        Err(e) => println!("{} {} -> {}", method, path, e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = waypoint_config::from_env()?;
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::from_env());

    let registry = ControllerRegistry::new()
        .register("users", users(Arc::default()))
        .controller::<AdminController, _>("admin.stats", |bp| {
            bp.handler(HandlerSpec::new("getAll"), |_c, _args| async move {
                Ok(json!({"uptime": "ok"}))
            })
            .handler(HandlerSpec::new("reset").method(HttpMethod::DELETE), |_c, _args| async move {
                Ok(json!({"reset": true}))
            })
        });

    let table = ConfigGenerator::new(options.clone(), logger.clone()).generate(&registry)?;
    println!("Generated {} routes:", table.len());
    for route in &table {
        println!("  {}", route);
    }

    let mut router = Router::new();
    Dispatcher::new(logger, Arc::new(TokioExecutor::new())).bind(&table, &mut router)?;

    let base = options.normalized_prefix();
    send(&router, "POST", &format!("{}users", base), Some(json!({"name": "ada"}))).await;
    send(&router, "POST", &format!("{}users", base), Some(json!({}))).await;
    send(&router, "GET", &format!("{}users/1", base), None).await;
    send(&router, "GET", &format!("{}users", base), None).await;
    send(&router, "DELETE", &format!("{}users/1", base), None).await;
    send(&router, "GET", &format!("{}admin/stats", base), None).await;
    send(&router, "DELETE", &format!("{}admin/stats/reset", base), None).await;
    send(&router, "PATCH", &format!("{}users/1", base), None).await;

    Ok(())
}
