use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ClientResult;
use crate::transport::{Request, Response};

use super::{Middleware, Next};

/// Records the request line before delegation and the outcome after.
///
/// Observes only: the request and response pass through untouched and
/// errors are never suppressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(&self, request: Request, next: Next<'_>) -> ClientResult<Response> {
        debug!(method = %request.method(), url = %request.url(), "sending request");
        match next.run(request).await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "request completed");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "request failed");
                Err(err)
            }
        }
    }
}
