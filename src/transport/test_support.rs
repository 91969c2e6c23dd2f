use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tokio::time::sleep;

use crate::error::{ClientError, ClientResult};

use super::{Request, Response, Transport};

type Responder = dyn Fn(&Request) -> ClientResult<Response> + Send + Sync;

/// Scripted transport for pipeline tests.
///
/// Sleeps for a fixed delay, then for any `delay_ms` query parameter on the
/// request URL, before invoking the responder. Counts calls so tests can
/// assert how often the terminal executor ran.
pub(crate) struct MockTransport {
    delay: Option<Duration>,
    calls: AtomicUsize,
    responder: Box<Responder>,
}

impl MockTransport {
    pub(crate) fn with<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> ClientResult<Response> + Send + Sync + 'static,
    {
        Self {
            delay: None,
            calls: AtomicUsize::new(0),
            responder: Box::new(responder),
        }
    }

    pub(crate) fn ok(status: u16, body: &'static str) -> Self {
        Self::with(move |_request| Ok(reply(status, body)))
    }

    pub(crate) fn failing(message: &'static str) -> Self {
        Self::with(move |_request| {
            Err(ClientError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            )))
        })
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: Request) -> ClientResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if let Some(delay) = scripted_delay(&request) {
            sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

pub(crate) fn reply(status: u16, body: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    Response::new(status, HeaderMap::new(), Bytes::from(body.to_owned()))
}

fn scripted_delay(request: &Request) -> Option<Duration> {
    request
        .url()
        .query_pairs()
        .find(|(key, _)| key == "delay_ms")
        .and_then(|(_, value)| value.parse().ok())
        .map(Duration::from_millis)
}
