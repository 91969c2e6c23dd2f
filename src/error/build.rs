use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header name '{name}'.")]
    InvalidHeaderName { name: String },
    #[error("Invalid header value for '{name}'.")]
    InvalidHeaderValue { name: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: Arc<reqwest::Error>,
    },
}
