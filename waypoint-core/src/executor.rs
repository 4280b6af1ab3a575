// Completion executors: run a handler invocation to a single outcome

use crate::HandlerError;
use futures_util::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

/// A boxed handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>;

/// Resolves a handler invocation to completion.
///
/// Implementations must turn a panic, whether raised while the handler is
/// being set up or while its future is polled, into
/// [`HandlerError::Internal`], so the dispatcher sees one `Result` either way.
pub trait CompletionExecutor: Send + Sync {
    fn complete(&self, invocation: HandlerFuture) -> HandlerFuture;
}

/// Polls the invocation on the calling task.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl CompletionExecutor for InlineExecutor {
    fn complete(&self, invocation: HandlerFuture) -> HandlerFuture {
        Box::pin(async move {
            match AssertUnwindSafe(invocation).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(HandlerError::from_panic(payload)),
            }
        })
    }
}

/// Runs each invocation as its own tokio task.
#[derive(Debug, Default, Clone)]
pub struct TokioExecutor {
    handle: Option<tokio::runtime::Handle>,
}

impl TokioExecutor {
    /// Spawn onto the runtime that polls the dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto a specific runtime.
    pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl CompletionExecutor for TokioExecutor {
    fn complete(&self, invocation: HandlerFuture) -> HandlerFuture {
        let handle = self.handle.clone();
        Box::pin(async move {
            let task = match handle {
                Some(handle) => handle.spawn(invocation),
                None => tokio::spawn(invocation),
            };
            match task.await {
                Ok(outcome) => outcome,
                Err(join) if join.is_panic() => Err(HandlerError::from_panic(join.into_panic())),
                Err(join) => Err(HandlerError::internal(join)),
            }
        })
    }
}
