//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware wraps the
//! whole routing step, so requests that match no route still pass through
//! every layer before they get their 404.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Service};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or turn it into a [`Service`] yourself.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use rlog::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Wrap every route, and the 404 fallback, in `middleware`.
    ///
    /// Layers stack outwards: the first one added sits closest to the
    /// handlers, the last one added sees each request first.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Freezes the routing table and applies the layers.
    pub fn into_service(self) -> Service {
        let endpoint: BoxedHandler = Arc::new(Endpoint { routes: self.routes });
        let handler = self
            .layers
            .iter()
            .fold(endpoint, |next, middleware| middleware.layer(next));
        Service::from_boxed(handler)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// The innermost handler: route lookup and the 404 fallback.
struct Endpoint {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Endpoint {
    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((Arc::clone(matched.value), params))
    }
}

impl ErasedHandler for Endpoint {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(&req.method, req.uri.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}
