// Host framework seam: per-verb route registration

use crate::{HttpMethod, HttpRequest, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Per-request handler handed to the host framework.
///
/// Always produces a response; errors are already normalized.
pub type RequestHandler =
    Arc<dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send + Sync>;

/// Box an async closure as a [`RequestHandler`].
pub fn request_handler<F, Fut>(handler: F) -> RequestHandler
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    Arc::new(
        move |request: HttpRequest| -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> {
            Box::pin(handler(request))
        },
    )
}

/// A host routing library that accepts one registration per verb and URL
/// pattern. Patterns use `:name` segments for path parameters.
pub trait FrameworkAdapter {
    /// Whether a registration function exists for `method`.
    fn supports(&self, method: &HttpMethod) -> bool;

    fn register(&mut self, method: HttpMethod, url_pattern: &str, handler: RequestHandler);
}

impl<A: FrameworkAdapter + ?Sized> FrameworkAdapter for &mut A {
    fn supports(&self, method: &HttpMethod) -> bool {
        (**self).supports(method)
    }

    fn register(&mut self, method: HttpMethod, url_pattern: &str, handler: RequestHandler) {
        (**self).register(method, url_pattern, handler)
    }
}

impl<A: FrameworkAdapter + ?Sized> FrameworkAdapter for Box<A> {
    fn supports(&self, method: &HttpMethod) -> bool {
        (**self).supports(method)
    }

    fn register(&mut self, method: HttpMethod, url_pattern: &str, handler: RequestHandler) {
        (**self).register(method, url_pattern, handler)
    }
}
