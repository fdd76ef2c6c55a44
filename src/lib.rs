//! # rlog
//!
//! Request-scoped structured logging for HTTP handlers, on a minimal
//! hyper-based framework.
//!
//! ## The contract
//!
//! Put [`RequestLogging`](middleware::RequestLogging) in front of your
//! handlers and every request gets:
//!
//! - a fresh v4 UUID, attached as the `requestID` field to every record
//!   logged on that request's behalf;
//! - a `New request` record with `method` and `url` before the handler runs;
//! - a `The request is handled` record with `httpStatus` and `duration`
//!   after it returns.
//!
//! Handlers fetch the request's logger from the request context with
//! [`logger::from_context`]. Without the middleware they get a silent logger
//! instead, so the same handler code runs unchanged in unit tests.
//!
//! What rlog does not do: configure levels, encoders or outputs. Those belong
//! to the `tracing` subscriber you hand it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use rlog::logger::{self, Logger};
//! use rlog::middleware::RequestLogging;
//! use rlog::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rlog::Error> {
//!     tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
//!
//!     let app = Router::new()
//!         .on(Method::GET, "/users/{id}", get_user)
//!         .layer(RequestLogging::new(Logger::current()));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let log = logger::from_context(req.context());
//!     let id = req.param("id").unwrap_or("unknown");
//!     log.in_scope(|| tracing::info!(user = id, "loading user"));
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod context;
pub mod logger;
pub mod middleware;

pub use error::Error;
pub use handler::{Handler, Service};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

#[doc(hidden)]
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler};
