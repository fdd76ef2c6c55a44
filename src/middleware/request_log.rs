//! Per-request logging.
//!
//! For every request, in order:
//!
//! 1. draw a fresh [`RequestId`] and derive a child of the base logger that
//!    carries it as `requestID`;
//! 2. bind that logger into the request's context, where handlers find it
//!    with [`logger::from_context`];
//! 3. log `New request` at INFO with `method` and `url`;
//! 4. run the wrapped handler;
//! 5. log `The request is handled` (DEBUG by default) with `httpStatus` and
//!    `duration`.
//!
//! Step 5 runs when the wrapped handler returns a response. If the handler
//! panics, or the connection is dropped and the future cancelled, there is no
//! completion record.

use std::sync::Arc;
use std::time::Instant;

use http::header::{HeaderName, HeaderValue};
use tracing::Level;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Service};
use crate::logger::{self, Logger, RequestId};
use crate::middleware::Middleware;
use crate::request::Request;

/// Emits an event at a level only known at runtime.
macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($rest)+),
            Level::WARN => tracing::warn!($($rest)+),
            Level::INFO => tracing::info!($($rest)+),
            Level::DEBUG => tracing::debug!($($rest)+),
            _ => tracing::trace!($($rest)+),
        }
    };
}

/// Request-scoped logging middleware.
///
/// The base logger's subscriber owns filtering and formatting. With a
/// subscriber at INFO, only the `New request` records show; enable DEBUG to
/// see completions.
///
/// ```rust
/// use rlog::logger::{self, Logger};
/// use rlog::middleware::RequestLogging;
/// use rlog::Request;
///
/// async fn handler(req: Request) -> &'static str {
///     logger::from_context(req.context()).info("doing the work");
///     "done"
/// }
///
/// let svc = RequestLogging::new(Logger::current()).wrap(handler);
/// ```
#[derive(Clone, Debug)]
pub struct RequestLogging {
    logger: Logger,
    completion_level: Level,
    response_header: Option<HeaderName>,
}

impl RequestLogging {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            completion_level: Level::DEBUG,
            response_header: None,
        }
    }

    /// Level of the `The request is handled` record. Defaults to DEBUG.
    pub fn completion_level(mut self, level: Level) -> Self {
        self.completion_level = level;
        self
    }

    /// Also send the request identifier back to the client in `name`
    /// (typically `x-request-id`). Off by default.
    pub fn response_header(mut self, name: HeaderName) -> Self {
        self.response_header = Some(name);
        self
    }

    /// Wraps a single handler. The result is a handler too, so it can be
    /// routed or wrapped again.
    pub fn wrap(&self, handler: impl Handler) -> Service {
        Service::from_boxed(self.layer(handler.into_boxed_handler()))
    }
}

impl Middleware for RequestLogging {
    fn layer(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(Logged {
            next,
            logger: self.logger.clone(),
            completion_level: self.completion_level,
            response_header: self.response_header.clone(),
        })
    }
}

struct Logged {
    next: BoxedHandler,
    logger: Logger,
    completion_level: Level,
    response_header: Option<HeaderName>,
}

impl ErasedHandler for Logged {
    fn call(&self, req: Request) -> BoxFuture {
        let id = RequestId::new();
        let log = self.logger.for_request(id);
        let ctx = logger::bind(req.context(), log.clone());
        let req = req.with_context(ctx);

        log.in_scope(|| {
            tracing::info!(method = %req.method(), url = %req.uri(), "New request");
        });

        let start = Instant::now();
        let handled = self.next.call(req);
        let level = self.completion_level;
        let header = self.response_header.clone();

        Box::pin(async move {
            let mut res = handled.await;
            let duration = start.elapsed();
            // The returned head is what goes on the wire; 200 unless the
            // handler chose otherwise.
            let status = res.status_code().as_u16();

            log.in_scope(|| {
                event_at!(level, httpStatus = status, duration = ?duration, "The request is handled");
            });

            if let Some(name) = header {
                if let Ok(value) = HeaderValue::try_from(id.to_string()) {
                    res.headers_mut().insert(name, value);
                }
            }
            res
        })
    }
}
