// Error types for route generation, binding and dispatch

use crate::{HttpMethod, ParamSource};
use serde::Serialize;
use serde_json::{Value, json};
use std::any::Any;
use std::backtrace::Backtrace;
use thiserror::Error;

/// Host-level errors surfaced by the built-in [`Router`](crate::Router).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => 404,
            Error::Deserialization(_) => 400,
            Error::Serialization(_) | Error::Internal(_) | Error::Configuration(_) => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }
}

/// Fatal errors raised while generating or binding a route table.
///
/// These abort startup; nothing retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("controller '{entry}' is not a constructor")]
    NotConstructible { entry: String },

    #[error("method not found: adapter cannot register {method} {url}")]
    UnsupportedMethod { method: HttpMethod, url: String },

    #[error("route collision: {method} {url} is generated by both {first} and {second}")]
    RouteCollision {
        method: HttpMethod,
        url: String,
        first: String,
        second: String,
    },

    #[error("parameter 'id' of {handler} must be read from the path, not {declared:?}")]
    InvalidParamSource {
        handler: String,
        declared: ParamSource,
    },
}

/// Terminal failure of a single request.
///
/// `Internal` carries a diagnostic trace and maps to 500; `Rejected` is a
/// client-attributable refusal and maps to 400.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("internal failure: {message}")]
    Internal { message: String, trace: String },

    #[error("request rejected: {0}")]
    Rejected(Value),
}

impl HandlerError {
    /// Wrap an unexpected error, capturing a backtrace as its trace.
    pub fn internal<E: std::error::Error>(err: E) -> Self {
        Self::internal_message(err.to_string())
    }

    /// Unexpected failure described by a message.
    ///
    /// The trace is only captured when `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` enables it.
    pub fn internal_message(message: impl Into<String>) -> Self {
        HandlerError::Internal {
            message: message.into(),
            trace: Backtrace::capture().to_string(),
        }
    }

    /// Refuse the request with a client-facing value.
    pub fn reject<T: Serialize>(value: T) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| Value::String(e.to_string()));
        HandlerError::Rejected(value)
    }

    /// Convert a panic payload into an internal failure.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::internal_message(format!("panic: {}", message))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Internal { .. } => 500,
            HandlerError::Rejected(_) => 400,
        }
    }

    /// The diagnostic trace, present only for internal failures.
    pub fn trace(&self) -> Option<&str> {
        match self {
            HandlerError::Internal { trace, .. } => Some(trace),
            HandlerError::Rejected(_) => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, HandlerError::Internal { .. })
    }

    /// Response body, `{ "error": ... }`. The trace never leaves the process.
    pub fn body(&self) -> Value {
        match self {
            HandlerError::Internal { message, .. } => json!({ "error": message }),
            HandlerError::Rejected(value) => json!({ "error": value }),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::internal(err)
    }
}

/// Violation of the one-response-per-request contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("response already sent with status {status}")]
    AlreadySent { status: u16 },
}
