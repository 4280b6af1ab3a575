//! Binding generated routes to a host framework, and the per-request
//! protocol run behind every binding.
//!
//! Each request goes through the same steps:
//!
//! 1. build a [`RequestView`] (a body that does not parse is a 400 when a
//!    parameter reads from it, and ignored otherwise);
//! 2. instantiate the controller with a fresh [`RequestContext`];
//! 3. resolve arguments from the route's fixed parameter list;
//! 4. run the handler through the [`CompletionExecutor`];
//! 5. write exactly one response: 200 with the JSON result, 400 for a
//!    rejection, 500 for an internal failure.
//!
//! Steps 2 to 4 run inside the executor, so a panic while building the
//! controller is reported the same way as a panic inside the handler.

use crate::{
    CompletionExecutor, ConfigurationError, ControllerInstance, FrameworkAdapter, HandlerError,
    HandlerFuture, HttpRequest, HttpResponse, InlineExecutor, RequestContext, RequestHandler,
    RequestView, ResponseWriter, RouteDefinition, RouteTable, request_handler, resolve,
};
use serde_json::{Value, json};
use std::sync::Arc;
use waypoint_log::{Logger, debug, error, info};

/// Registers routes with a [`FrameworkAdapter`] and answers their requests.
#[derive(Clone)]
pub struct Dispatcher {
    logger: Arc<dyn Logger>,
    executor: Arc<dyn CompletionExecutor>,
}

impl Dispatcher {
    pub fn new(logger: Arc<dyn Logger>, executor: Arc<dyn CompletionExecutor>) -> Self {
        Self { logger, executor }
    }

    /// Dispatcher using the [`InlineExecutor`].
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self::new(logger, Arc::new(InlineExecutor))
    }

    /// Register every route of `table`, in order.
    ///
    /// Stops at the first verb the adapter cannot register; routes bound
    /// before it stay bound. Returns the number of routes registered.
    pub fn bind<A>(&self, table: &RouteTable, adapter: &mut A) -> Result<usize, ConfigurationError>
    where
        A: FrameworkAdapter + ?Sized,
    {
        let mut bound = 0;
        for route in table {
            if !adapter.supports(&route.method) {
                let err = ConfigurationError::UnsupportedMethod {
                    method: route.method.clone(),
                    url: route.url_pattern.clone(),
                };
                error!(self.logger, "{}", err);
                return Err(err);
            }

            info!(self.logger, "{}", route);
            adapter.register(route.method.clone(), &route.url_pattern, self.handler_for(route));
            bound += 1;
        }
        Ok(bound)
    }

    /// The request handler registered for `route`.
    pub fn handler_for(&self, route: &RouteDefinition) -> RequestHandler {
        let dispatcher = self.clone();
        let route = Arc::new(route.clone());
        request_handler(move |request: HttpRequest| {
            let dispatcher = dispatcher.clone();
            let route = route.clone();
            async move { dispatcher.dispatch(&route, request).await }
        })
    }

    /// Run one request against `route` and produce its single response.
    pub async fn dispatch(&self, route: &RouteDefinition, request: HttpRequest) -> HttpResponse {
        let writer = ResponseWriter::new();

        let outcome = match RequestView::for_params(&request, &route.params, &route.method) {
            Ok(view) => {
                let ctx = RequestContext::new(Arc::new(request), writer.clone());
                self.executor.complete(invocation(route, ctx, view)).await
            }
            Err(err) => Err(HandlerError::reject(format!("invalid request body: {}", err))),
        };

        let response = self.respond(route, outcome);
        if let Err(err) = writer.send(response) {
            error!(
                self.logger,
                "{} tried to respond twice: {}",
                route.signature(),
                err
            );
        }

        writer.take().unwrap_or_else(HttpResponse::internal_server_error)
    }

    fn respond(&self, route: &RouteDefinition, outcome: Result<Value, HandlerError>) -> HttpResponse {
        let (status, body) = match outcome {
            Ok(value) => (200, value),
            Err(err) => {
                match err.trace() {
                    Some(trace) => error!(
                        self.logger,
                        "{} failed: {}\n{}",
                        route.signature(),
                        err,
                        trace
                    ),
                    None => debug!(self.logger, "{} rejected: {}", route.signature(), err),
                }
                (err.status_code(), err.body())
            }
        };

        HttpResponse::new(status)
            .with_json(&body)
            .unwrap_or_else(|_| {
                HttpResponse::internal_server_error()
                    .with_body(json!({"error": "response serialization failed"}).to_string().into_bytes())
            })
    }
}

fn invocation(route: &RouteDefinition, ctx: RequestContext, view: RequestView) -> HandlerFuture {
    let blueprint = route.controller.clone();
    let handler = route.handler_name.clone();
    let params = route.params.clone();
    let method = route.method.clone();

    Box::pin(async move {
        let instance = blueprint.instantiate(ctx)?;
        let args = resolve(&params, &method, &view);
        instance.invoke(&handler, args).await
    })
}
