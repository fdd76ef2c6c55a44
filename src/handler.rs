//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Routes and middleware hold handlers of *different* concrete types, so each
//! one is erased behind `dyn ErasedHandler` once, at registration:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← stored as BoxedHandler
//!        ↓ middleware.layer(boxed)
//! Arc::new(Logged { next: boxed, .. })             ← still a BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable call per layer
//! ```
//!
//! Because a middleware consumes a [`BoxedHandler`] and returns one, layers
//! stack without any new types appearing in user code.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across worker threads.
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// signatures of the public `Handler` and `Middleware` traits.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `async fn` (or closure) with the shape:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and by [`Service`], so a wrapped handler can be wrapped again or routed.
/// The trait is sealed: only the impls in this module satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete `Fn` handler to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A cloneable, type-erased handler: the output of [`Router::into_service`]
/// and of wrapping a single handler in middleware.
///
/// [`Router::into_service`]: crate::Router::into_service
#[derive(Clone)]
pub struct Service(BoxedHandler);

impl Service {
    pub fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }

    pub(crate) fn from_boxed(handler: BoxedHandler) -> Self {
        Self(handler)
    }

    /// Runs the handler chain for one request.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service").finish_non_exhaustive()
    }
}

impl private::Sealed for Service {}

impl Handler for Service {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn get(uri: &str) -> Request {
        http::Request::get(uri)
            .body(Bytes::new())
            .map(Request::from)
            .expect("valid request")
    }

    #[tokio::test]
    async fn closure_handlers_convert_their_output() {
        let svc = Service::new(|_req: Request| async { StatusCode::ACCEPTED });
        let res = svc.call(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn services_rewrap_without_nesting() {
        let inner = Service::new(|req: Request| async move { req.uri().path().to_owned() });
        let outer = Service::new(inner);
        let res = outer.call(get("/echo")).await;
        assert_eq!(res.body().as_ref(), b"/echo");
    }
}
