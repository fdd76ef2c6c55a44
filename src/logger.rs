//! Request-scoped loggers and their home in the request [`Context`].
//!
//! A [`Logger`] is a thin handle over `tracing`: the [`Dispatch`] decides
//! where records go and which levels survive, the [`Span`] carries the fields
//! every record from this logger inherits. The middleware derives one logger
//! per request with a `requestID` field and binds it into the request's
//! context; handlers fetch it back with [`from_context`].
//!
//! ```rust
//! use rlog::context::Context;
//! use rlog::logger;
//!
//! // Nothing bound: a silent logger comes back, never `None`.
//! let log = logger::from_context(&Context::new());
//! log.info("goes nowhere");
//! assert!(log.is_nop());
//! ```

use std::fmt;

use tracing::subscriber::NoSubscriber;
use tracing::{Dispatch, Level, Span};
use uuid::Uuid;

use crate::context::{Context, Key};

// ── RequestId ────────────────────────────────────────────────────────────────

/// A random (v4) request identifier.
///
/// Displays in canonical form: 36 characters, lowercase, hyphenated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Draws a fresh identifier from the OS entropy source.
    ///
    /// # Panics
    ///
    /// Panics if the entropy source is unavailable. There is no sensible way
    /// to keep handling a request without its identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

// ── Logger ───────────────────────────────────────────────────────────────────

/// A structured logger bound to a `tracing` dispatcher.
///
/// Cloning is cheap (two reference-count increments). Loggers are never
/// mutated; [`Logger::for_request`] derives a child instead.
#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
    span: Span,
    request_id: Option<RequestId>,
}

impl Logger {
    /// A logger that sends every record to `dispatch`.
    ///
    /// Level filters, encoders and output destinations all belong to the
    /// subscriber behind `dispatch`; the logger never configures them.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch, span: Span::none(), request_id: None }
    }

    /// A logger over the calling thread's default dispatcher, which is the
    /// global subscriber unless a scoped one is active.
    pub fn current() -> Self {
        tracing::dispatcher::get_default(|dispatch| Self::new(dispatch.clone()))
    }

    /// A logger whose every operation is silent.
    pub fn nop() -> Self {
        Self::new(Dispatch::none())
    }

    pub fn is_nop(&self) -> bool {
        self.dispatch.is::<NoSubscriber>()
    }

    /// The identifier this logger was derived with, if it is request-scoped.
    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// The span whose fields every record from this logger carries.
    ///
    /// Useful with [`tracing::Instrument`] to attribute spawned work to the
    /// request.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Derives a child logger carrying `requestID = id`.
    ///
    /// The span sits at ERROR so it is enabled whenever any record from the
    /// child is, whatever level the subscriber filters at.
    pub fn for_request(&self, id: RequestId) -> Self {
        let span = self.in_scope(|| tracing::span!(Level::ERROR, "request", requestID = %id));
        Self {
            dispatch: self.dispatch.clone(),
            span,
            request_id: Some(id),
        }
    }

    /// Runs `f` with this logger's dispatcher installed and its span entered.
    ///
    /// Any `tracing` macro inside `f` lands on this logger, so callers can
    /// attach whatever structured fields they need:
    ///
    /// ```rust
    /// # let log = rlog::logger::Logger::nop();
    /// log.in_scope(|| tracing::warn!(user_id = 42, "quota almost exhausted"));
    /// ```
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, || self.span.in_scope(f))
    }

    /// Logs `message` at ERROR. The record's target is `rlog::logger`, not the
    /// caller's module; use [`in_scope`](Logger::in_scope) with a `tracing`
    /// macro when per-module filter directives need to select it.
    pub fn error(&self, message: &str) {
        self.in_scope(|| tracing::error!("{message}"));
    }

    /// Logs `message` at WARN, with target `rlog::logger`.
    pub fn warn(&self, message: &str) {
        self.in_scope(|| tracing::warn!("{message}"));
    }

    /// Logs `message` at INFO, with target `rlog::logger`.
    pub fn info(&self, message: &str) {
        self.in_scope(|| tracing::info!("{message}"));
    }

    /// Logs `message` at DEBUG, with target `rlog::logger`.
    pub fn debug(&self, message: &str) {
        self.in_scope(|| tracing::debug!("{message}"));
    }
}

impl From<Dispatch> for Logger {
    fn from(dispatch: Dispatch) -> Self { Self::new(dispatch) }
}

// ── Context store ────────────────────────────────────────────────────────────

/// Private to this module: nothing else can read or overwrite the entry.
struct LoggerKey;

impl Key for LoggerKey {
    type Value = Logger;
}

/// Returns a child of `ctx` carrying `logger`.
pub fn bind(ctx: &Context, logger: Logger) -> Context {
    ctx.with_value::<LoggerKey>(logger)
}

/// Returns the logger bound into `ctx`, or a silent one if there is none.
///
/// Safe to call from any code path, with or without the middleware in front.
pub fn from_context(ctx: &Context) -> Logger {
    ctx.value::<LoggerKey>().cloned().unwrap_or_else(Logger::nop)
}
