//! Controller blueprints and handler descriptors.
//!
//! A blueprint is the static description of a controller: how to build one
//! per request and which handlers it exposes, in registration order. Each
//! handler carries a [`HandlerSpec`] naming its parameters, so route
//! generation never has to look inside the handler itself.
//!
//! ```
//! use waypoint_core::{Blueprint, ControllerBlueprint, HandlerSpec, RequestContext};
//!
//! struct Users;
//!
//! let blueprint = ControllerBlueprint::new("UsersController")
//!     .factory(|_ctx: RequestContext| Users)
//!     .handler(HandlerSpec::new("get").params(["id"]), |_users: Users, args| async move {
//!         Ok(args.value("id").cloned())
//!     });
//!
//! assert_eq!(blueprint.handler_specs().len(), 1);
//! ```

use crate::{
    Arguments, HandlerError, HandlerFuture, HttpMethod, HttpRequest, ResponseWriter,
};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Where a handler argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    Path,
    Query,
    Body,
}

/// One declared handler parameter.
///
/// `source: None` lets the resolver pick by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamSpec {
    pub name: String,
    pub source: Option<ParamSource>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name).from_source(ParamSource::Path)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name).from_source(ParamSource::Query)
    }

    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name).from_source(ParamSource::Body)
    }

    pub fn from_source(mut self, source: ParamSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_id(&self) -> bool {
        self.name == "id"
    }

    /// Whether this parameter contributes a `/:name` URL segment.
    pub fn is_path_sourced(&self) -> bool {
        self.is_id() || self.source == Some(ParamSource::Path)
    }

    /// Source used for a request with the given verb.
    pub fn source_for(&self, method: &HttpMethod) -> ParamSource {
        if let Some(source) = self.source {
            return source;
        }
        if self.is_id() {
            ParamSource::Path
        } else if *method == HttpMethod::GET {
            ParamSource::Query
        } else {
            ParamSource::Body
        }
    }
}

impl From<&str> for ParamSpec {
    fn from(name: &str) -> Self {
        ParamSpec::new(name)
    }
}

impl From<String> for ParamSpec {
    fn from(name: String) -> Self {
        ParamSpec::new(name)
    }
}

/// Name, ordered parameters and optional verb override of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub method: Option<HttpMethod>,
}

impl HandlerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            method: None,
        }
    }

    pub fn param(mut self, param: impl Into<ParamSpec>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamSpec>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Force the verb instead of inferring it from the name.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Handlers named `constructor` or starting with `_` are never routed.
    pub fn is_routable(&self) -> bool {
        !self.name.is_empty() && self.name != "constructor" && !self.name.starts_with('_')
    }
}

/// What a controller sees of the request it was built for.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request: Arc<HttpRequest>,
    response: ResponseWriter,
}

impl RequestContext {
    pub fn new(request: Arc<HttpRequest>, response: ResponseWriter) -> Self {
        Self { request, response }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Writer for controllers that answer the request themselves.
    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }
}

/// A controller type that can be built from a request context.
pub trait Controller: Sized + Send + 'static {
    fn create(ctx: RequestContext) -> Self;
}

/// A controller built for one request, ready to run one handler.
pub trait ControllerInstance: Send {
    fn invoke(self: Box<Self>, handler: &str, args: Arguments) -> HandlerFuture;
}

/// Type-erased blueprint stored in the registry and route table.
pub trait Blueprint: Send + Sync {
    /// Controller name used in logs.
    fn name(&self) -> &str;

    fn is_constructible(&self) -> bool;

    /// Registered handlers, in registration order.
    fn handler_specs(&self) -> &[HandlerSpec];

    fn instantiate(&self, ctx: RequestContext) -> Result<Box<dyn ControllerInstance>, HandlerError>;
}

type Factory<C> = Arc<dyn Fn(RequestContext) -> C + Send + Sync>;
type HandlerCall<C> = Arc<dyn Fn(C, Arguments) -> HandlerFuture + Send + Sync>;

/// Handler name and call, shared by every instance of a blueprint.
type HandlerTable<C> = Arc<Vec<(String, HandlerCall<C>)>>;

/// Builder and [`Blueprint`] implementation for controller type `C`.
pub struct ControllerBlueprint<C> {
    name: Arc<str>,
    factory: Option<Factory<C>>,
    specs: Vec<HandlerSpec>,
    calls: HandlerTable<C>,
}

impl<C: Send + 'static> ControllerBlueprint<C> {
    /// A blueprint with no factory yet; it is not constructible until one is set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            factory: None,
            specs: Vec::new(),
            calls: Arc::new(Vec::new()),
        }
    }

    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(RequestContext) -> C + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Register a handler. Registering a name twice replaces the earlier
    /// handler but keeps its position.
    pub fn handler<F, Fut, T>(mut self, spec: HandlerSpec, handler: F) -> Self
    where
        F: Fn(C, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, HandlerError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let call: HandlerCall<C> = Arc::new(move |controller: C, args: Arguments| -> HandlerFuture {
            let fut = handler(controller, args);
            Box::pin(async move {
                let value = fut.await?;
                Ok::<Value, HandlerError>(serde_json::to_value(value)?)
            })
        });

        let calls = Arc::make_mut(&mut self.calls);
        match self.specs.iter().position(|s| s.name == spec.name) {
            Some(index) => {
                calls[index] = (spec.name.clone(), call);
                self.specs[index] = spec;
            }
            None => {
                calls.push((spec.name.clone(), call));
                self.specs.push(spec);
            }
        }
        self
    }
}

impl<C: Controller> ControllerBlueprint<C> {
    /// Blueprint named after `C` and built with [`Controller::create`].
    pub fn of() -> Self {
        Self::new(short_type_name::<C>()).factory(C::create)
    }
}

impl<C: Send + 'static> Blueprint for ControllerBlueprint<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_constructible(&self) -> bool {
        self.factory.is_some()
    }

    fn handler_specs(&self) -> &[HandlerSpec] {
        &self.specs
    }

    fn instantiate(&self, ctx: RequestContext) -> Result<Box<dyn ControllerInstance>, HandlerError> {
        let factory = self.factory.as_ref().ok_or_else(|| {
            HandlerError::internal_message(format!("controller {} is not a constructor", self.name))
        })?;

        Ok(Box::new(Instance {
            name: self.name.clone(),
            controller: factory(ctx),
            calls: self.calls.clone(),
        }))
    }
}

struct Instance<C> {
    name: Arc<str>,
    controller: C,
    calls: HandlerTable<C>,
}

impl<C: Send + 'static> ControllerInstance for Instance<C> {
    fn invoke(self: Box<Self>, handler: &str, args: Arguments) -> HandlerFuture {
        let Instance {
            name,
            controller,
            calls,
        } = *self;

        match calls.iter().find(|(n, _)| n == handler) {
            Some((_, call)) => call(controller, args),
            None => {
                let err = HandlerError::internal_message(format!(
                    "controller {} has no handler {}",
                    name, handler
                ));
                Box::pin(async move { Err::<Value, _>(err) })
            }
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
