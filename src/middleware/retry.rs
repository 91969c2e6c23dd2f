use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::transport::{Request, Response};

use super::{Middleware, Next};

/// Inter-attempt delay policy for [`RetryMiddleware`].
pub trait Backoff: Send + Sync {
    /// Delay before retrying after the given zero-based failed attempt.
    fn delay(&self, attempt: u32) -> Duration;
}

/// Exponential backoff: `base * 2^attempt`, capped.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(10),
        }
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

/// Re-invokes the wrapped handler on retriable errors, up to `max_retries`
/// additional attempts beyond the first.
///
/// Timeout/cancellation-class errors abort retrying immediately, and a
/// backoff sleep that would cross the request deadline is abandoned in
/// favor of a cancellation error.
pub struct RetryMiddleware {
    max_retries: u32,
    backoff: Box<dyn Backoff>,
}

impl RetryMiddleware {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Box::new(ExponentialBackoff::default()),
        }
    }

    #[must_use]
    pub fn with_backoff<B>(max_retries: u32, backoff: B) -> Self
    where
        B: Backoff + 'static,
    {
        Self {
            max_retries,
            backoff: Box::new(backoff),
        }
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    async fn handle(&self, request: Request, next: Next<'_>) -> ClientResult<Response> {
        let mut attempt: u32 = 0;
        loop {
            let err = match next.run(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_terminal() => return Err(err),
                Err(err) => err,
            };

            if attempt >= self.max_retries {
                return Err(err);
            }

            let delay = self.backoff.delay(attempt);
            let Some(wake) = Instant::now().checked_add(delay) else {
                return Err(ClientError::Cancelled);
            };
            if let Some(deadline) = request.deadline()
                && wake >= deadline
            {
                // Sleeping would outlive the caller's deadline; give up now
                // and report the cancellation instead of the attempt error.
                return Err(ClientError::Cancelled);
            }

            debug!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying after error"
            );
            sleep_until(wake).await;
            attempt = attempt.saturating_add(1);
        }
    }
}
