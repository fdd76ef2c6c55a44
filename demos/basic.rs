//! Minimal rlog example: a couple of JSON endpoints behind request logging.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i http://localhost:3000/missing
//!
//! Every line logged for one request carries the same `requestID`, which is
//! also returned in the `x-request-id` response header.

use http::header::{HeaderName, HeaderValue, LOCATION};
use http::{Method, StatusCode};
use rlog::logger::{self, Logger};
use rlog::middleware::RequestLogging;
use rlog::{Request, Response, Router, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), rlog::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let logging = RequestLogging::new(Logger::current())
        .response_header(HeaderName::from_static("x-request-id"));

    let app = Router::new()
        .on(Method::GET,  "/users/{id}", get_user)
        .on(Method::POST, "/users",      create_user)
        .layer(logging);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    logger::from_context(req.context()).in_scope(|| tracing::info!(user = id, "loading user"));
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    let log = logger::from_context(req.context());
    if req.body().is_empty() {
        log.warn("rejecting empty body");
        return Response::status(StatusCode::BAD_REQUEST);
    }

    log.in_scope(|| tracing::info!(bytes = req.body().len(), "creating user"));
    Response::builder()
        .status(StatusCode::CREATED)
        .header(LOCATION, HeaderValue::from_static("/users/99"))
        .json(r#"{"id":"99","name":"new_user"}"#)
}
