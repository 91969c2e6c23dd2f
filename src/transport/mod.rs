//! Transport executor seam and the reqwest-backed default implementation.
mod request;
mod response;

#[cfg(test)]
pub(crate) mod test_support;

pub use request::Request;
pub use response::Response;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Terminal executor performing the actual network call.
///
/// The middleware chain bottoms out here; custom implementations can be
/// injected through the client builder to stub out the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the call described by the fully prepared `request`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the network call fails or the response
    /// body cannot be read.
    async fn execute(&self, request: Request) -> ClientResult<Response>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> ClientResult<Response> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(ClientError::transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ClientError::transport)?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );

        Ok(Response::new(status, headers, body))
    }
}
