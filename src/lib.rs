// Waypoint - convention-based REST routes for Rust
//
// Register controllers under dotted keys and get a route table mapping
// handler names to HTTP verbs and URL patterns, plus a dispatcher that
// resolves handler arguments from each request.

// Re-export core functionality
pub use waypoint_core::*;

// Re-export logging backends
pub use waypoint_log::{
    ConsoleLogger, FacadeLogger, Format, LogConfig, LogRecord, MemoryLogger, NoopLogger,
};

#[cfg(feature = "tracing")]
pub use waypoint_log::TracingLogger;

// Re-export optional crates
#[cfg(feature = "config")]
pub use waypoint_config;

#[cfg(feature = "testing")]
pub use waypoint_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arguments, Blueprint, ConfigGenerator, ConfigurationError, Controller,
        ControllerBlueprint, ControllerRegistry, Dispatcher, Error, HandlerError, HandlerSpec,
        HttpMethod, HttpRequest, HttpResponse, Level, Logger, ParamSource, ParamSpec,
        RequestContext, RouteDefinition, RouteTable, Router, RouterOptions,
    };
}
