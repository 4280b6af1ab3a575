// Core library for the Waypoint route generator
// This module contains the route model, the generation algorithm and the request dispatcher

pub mod adapter;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod generator;
pub mod http;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod routing;

// Re-export commonly used types
pub use adapter::*;
pub use config::*;
pub use controller::*;
pub use dispatcher::*;
pub use error::*;
pub use executor::*;
pub use generator::*;
pub use http::*;
pub use registry::*;
pub use resolver::*;
pub use response::*;
pub use routing::{Route, Router};

pub use waypoint_log::{Level, Logger};
