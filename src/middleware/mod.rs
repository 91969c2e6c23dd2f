//! Ordered middleware chain composed around a terminal transport executor.
mod logging;
mod retry;
mod timeout;


pub use logging::LoggingMiddleware;
pub use retry::{Backoff, ExponentialBackoff, RetryMiddleware};
pub use timeout::TimeoutMiddleware;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::transport::{Request, Response, Transport};

/// A decorator around request execution.
///
/// Implementations may delegate via `next.run(request)`, short-circuit with
/// a synthesized response, or return an error. The stack imposes only
/// ordering; per-invocation state (retry counters, deadlines) lives in the
/// call's own frame, so one middleware instance serves any number of
/// concurrent executions.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handles `request`, normally by delegating to `next`.
    ///
    /// # Errors
    ///
    /// Returns the middleware's own error or the delegated call's error,
    /// unchanged.
    async fn handle(&self, request: Request, next: Next<'_>) -> ClientResult<Response>;
}

/// Ordered middleware list composed around a terminal transport.
///
/// The first pushed middleware is the outermost wrapper: it observes the
/// request first and the response last. Every execution borrows a fresh
/// [`Next`] cursor over the list, so a single stack instance is safe across
/// concurrent executions.
#[derive(Clone, Default)]
pub struct HandlerStack {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl HandlerStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<M>(&mut self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs `request` through the chain down to `transport`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the chain or the transport surfaced.
    pub async fn run(&self, transport: &dyn Transport, request: Request) -> ClientResult<Response> {
        Next {
            transport,
            rest: &self.middlewares,
        }
        .run(request)
        .await
    }
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerStack")
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Execution-local cursor over the remaining chain.
///
/// Copyable so retrying middleware can re-enter the tail of the chain for
/// each attempt without touching shared state.
#[derive(Clone, Copy)]
pub struct Next<'chain> {
    transport: &'chain dyn Transport,
    rest: &'chain [Arc<dyn Middleware>],
}

impl Next<'_> {
    /// Delegates to the next middleware, or to the terminal transport once
    /// the chain is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the delegated call's error unchanged.
    pub async fn run(self, request: Request) -> ClientResult<Response> {
        match self.rest.split_first() {
            Some((middleware, rest)) => {
                middleware
                    .handle(
                        request,
                        Next {
                            transport: self.transport,
                            rest,
                        },
                    )
                    .await
            }
            None => self.transport.execute(request).await,
        }
    }
}
