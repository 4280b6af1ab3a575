// Test Application Builder

use crate::{MockController, TestClient};
use std::sync::Arc;
use waypoint_core::{
    Blueprint, CompletionExecutor, ConfigGenerator, ConfigurationError, Controller,
    ControllerBlueprint, ControllerRegistry, Dispatcher, HttpMethod, InlineExecutor, RouteTable,
    Router, RouterOptions,
};
use waypoint_log::MemoryLogger;

/// A generated and bound route table, ready to take requests
pub struct TestApp {
    router: Arc<Router>,
    table: RouteTable,
    logger: Arc<MemoryLogger>,
}

impl TestApp {
    /// Create a test client for making requests
    pub fn client(&self) -> TestClient {
        TestClient::new(self.router.clone())
    }

    /// The generated route table
    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    /// Everything logged during generation, binding and requests
    pub fn logger(&self) -> &MemoryLogger {
        &self.logger
    }
}

/// Builder for test applications
pub struct TestAppBuilder {
    registry: ControllerRegistry,
    options: RouterOptions,
    executor: Arc<dyn CompletionExecutor>,
    methods: Option<Vec<HttpMethod>>,
}

impl TestAppBuilder {
    /// Create a new test app builder
    pub fn new() -> Self {
        Self {
            registry: ControllerRegistry::new(),
            options: RouterOptions::default(),
            executor: Arc::new(InlineExecutor),
            methods: None,
        }
    }

    /// Register a blueprint under a dotted key
    pub fn register<B: Blueprint + 'static>(mut self, key: &str, blueprint: B) -> Self {
        self.registry = self.registry.register(key, blueprint);
        self
    }

    /// Register a [`Controller`] type and its handlers
    pub fn controller<C, F>(mut self, key: &str, build: F) -> Self
    where
        C: Controller,
        F: FnOnce(ControllerBlueprint<C>) -> ControllerBlueprint<C>,
    {
        self.registry = self.registry.controller(key, build);
        self
    }

    /// Register a mock controller; calls are recorded on `mock`
    pub fn mock(self, key: &str, mock: &MockController) -> Self {
        self.register(key, mock.blueprint())
    }

    /// Set custom registry
    pub fn with_registry(self, registry: ControllerRegistry) -> Self {
        Self { registry, ..self }
    }

    /// Set custom generation options
    pub fn with_options(self, options: RouterOptions) -> Self {
        Self { options, ..self }
    }

    pub fn path_prefix(mut self, prefix: &str) -> Self {
        self.options = self.options.path_prefix(prefix);
        self
    }

    /// Run handlers through a different executor
    pub fn with_executor(self, executor: Arc<dyn CompletionExecutor>) -> Self {
        Self { executor, ..self }
    }

    /// Only let the router accept these verbs
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    /// Generate the route table and bind it to a fresh router
    pub fn build(self) -> Result<TestApp, ConfigurationError> {
        let logger = Arc::new(MemoryLogger::new());
        let table = ConfigGenerator::new(self.options, logger.clone()).generate(&self.registry)?;

        let mut router = match self.methods {
            Some(methods) => Router::with_methods(methods),
            None => Router::new(),
        };
        Dispatcher::new(logger.clone(), self.executor).bind(&table, &mut router)?;

        Ok(TestApp {
            router: Arc::new(router),
            table,
            logger,
        })
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
