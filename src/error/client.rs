use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{BodyError, BuildError};

/// Top-level error surfaced to callers and promise rejections.
///
/// Cloneable so that every waiter on a rejected promise observes the same
/// terminal value; non-cloneable sources are held behind `Arc`.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("Request timed out after {elapsed:?}.")]
    Timeout { elapsed: Duration },
    #[error("Request cancelled: deadline reached before the next attempt.")]
    Cancelled,
    #[error("Worker task failed: {reason}")]
    TaskJoin { reason: String },
    #[error("Request build error: {0}")]
    Build(#[from] BuildError),
    #[error("Body preparation error: {0}")]
    Body(#[from] BodyError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Wraps a transport-level failure, surfacing it unchanged.
    pub fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Transport {
            source: Arc::new(source),
        }
    }

    /// True for timeout/cancellation-class errors that retrying cannot
    /// recover from.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout { .. } | ClientError::Cancelled
        )
    }
}
