//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured logging, request-id injection, metrics.
//! A middleware receives the next handler in the chain and returns a handler
//! with the same shape, so layers nest freely:
//!
//! ```rust,no_run
//! use rlog::middleware::RequestLogging;
//! use rlog::logger::Logger;
//! use rlog::{Request, Router};
//! use http::Method;
//!
//! # async fn index(_: Request) -> &'static str { "hi" }
//! let app = Router::new()
//!     .on(Method::GET, "/", index)
//!     .layer(RequestLogging::new(Logger::current()));
//! ```
//!
//! Built-in middleware:
//! - [`RequestLogging`]: request-scoped logger with a `requestID`, plus
//!   "started" / "handled" records carrying method, url, status and latency.

mod request_log;

pub use request_log::RequestLogging;

use crate::handler::BoxedHandler;

/// A handler-to-handler transformation.
///
/// Implement [`layer`](Middleware::layer) by returning a handler that does its
/// own work around a call to `next`.
pub trait Middleware: Send + Sync + 'static {
    fn layer(&self, next: BoxedHandler) -> BoxedHandler;
}
