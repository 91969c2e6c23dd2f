use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, timeout};

use crate::error::{ClientError, ClientResult};
use crate::transport::{Request, Response};

use super::{Middleware, Next};

/// Bounds the wrapped chain to a fixed duration.
///
/// The inner future is dropped when the bound elapses, releasing its
/// resources on every exit path. The deadline is also recorded on the
/// request so inner middleware can avoid sleeping past it.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    duration: Duration,
}

impl TimeoutMiddleware {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Middleware for TimeoutMiddleware {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> ClientResult<Response> {
        if let Some(deadline) = Instant::now().checked_add(self.duration) {
            request.set_deadline(deadline);
        }
        match timeout(self.duration, next.run(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ClientError::Timeout {
                elapsed: self.duration,
            }),
        }
    }
}
