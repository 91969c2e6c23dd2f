//! End-to-end pipeline tests against a stub transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use sling::{
    Client, ClientError, ClientResult, ConcurrentRequest, LoggingMiddleware, Request,
    RequestOptions, Response, RetryMiddleware, TimeoutMiddleware, Transport, wait_all,
};

/// Fails the first `failures` calls with a connection error, then echoes
/// the request path as the response body.
struct FlakyTransport {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyTransport {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn execute(&self, request: Request) -> ClientResult<Response> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(ClientError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection dropped",
            )));
        }
        Ok(Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(request.url().path().to_owned()),
        ))
    }
}

/// Echoes selected request headers and the body back for inspection.
struct EchoTransport;

#[async_trait]
impl Transport for EchoTransport {
    async fn execute(&self, request: Request) -> ClientResult<Response> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = request.headers().get("content-type") {
            headers.insert("x-echo-content-type", content_type.clone());
        }
        if let Some(authorization) = request.headers().get("authorization") {
            headers.insert("x-echo-authorization", authorization.clone());
        }
        let body = request.body().cloned().unwrap_or_default();
        Ok(Response::new(StatusCode::OK, headers, body))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn retry_and_timeout_recover_a_flaky_endpoint() -> Result<(), String> {
    let transport = Arc::new(FlakyTransport::new(2));
    let client = Client::builder()
        .base_url("https://api.example.com")
        .middleware(LoggingMiddleware)
        .middleware(TimeoutMiddleware::new(Duration::from_secs(2)))
        .middleware(RetryMiddleware::new(3))
        .transport(Arc::clone(&transport) as Arc<dyn Transport>)
        .build()
        .map_err(|err| err.to_string())?;

    let response = client
        .get("/users/42", RequestOptions::new())
        .await
        .map_err(|err| err.to_string())?;
    if response.text() != "/users/42" {
        return Err(format!("unexpected body: {}", response.text()));
    }
    if transport.calls.load(Ordering::SeqCst) != 3 {
        return Err(format!(
            "unexpected call count: {}",
            transport.calls.load(Ordering::SeqCst)
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn retry_gives_up_once_attempts_are_exhausted() -> Result<(), String> {
    let transport = Arc::new(FlakyTransport::new(usize::MAX));
    let client = Client::builder()
        .base_url("https://api.example.com")
        .middleware(RetryMiddleware::new(2))
        .transport(Arc::clone(&transport) as Arc<dyn Transport>)
        .build()
        .map_err(|err| err.to_string())?;

    match client.get("/users/42", RequestOptions::new()).await {
        Err(ClientError::Transport { .. }) => {}
        Err(other) => return Err(format!("unexpected error: {other}")),
        Ok(_response) => return Err("expected the request to fail".into()),
    }
    if transport.calls.load(Ordering::SeqCst) != 3 {
        return Err(format!(
            "unexpected call count: {}",
            transport.calls.load(Ordering::SeqCst)
        ));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn json_and_auth_reach_the_transport_fully_prepared() -> Result<(), String> {
    let client = Client::builder()
        .base_url("https://api.example.com")
        .transport(Arc::new(EchoTransport))
        .build()
        .map_err(|err| err.to_string())?;

    let options = RequestOptions::new()
        .json(&serde_json::json!({"name": "ada"}))
        .map_err(|err| err.to_string())?
        .auth(sling::Auth::bearer("token-1"));
    let response = client
        .post("/users", options)
        .await
        .map_err(|err| err.to_string())?;

    if response.header("x-echo-content-type") != Some("application/json") {
        return Err("content type was not applied".into());
    }
    if response.header("x-echo-authorization") != Some("Bearer token-1") {
        return Err("authorization was not applied".into());
    }
    let decoded: serde_json::Value = response.json().map_err(|err| err.to_string())?;
    if decoded.get("name").and_then(serde_json::Value::as_str) != Some("ada") {
        return Err(format!("unexpected echoed body: {decoded}"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn concurrent_batches_keep_order_under_a_limit() -> Result<(), String> {
    let transport = Arc::new(FlakyTransport::new(0));
    let client = Client::builder()
        .base_url("https://api.example.com")
        .transport(transport)
        .build()
        .map_err(|err| err.to_string())?;

    let requests = (0..5)
        .map(|index| ConcurrentRequest::new(Method::GET, format!("/items/{index}")))
        .collect();
    let results = client.send_concurrent_with_limit(requests, 2).await;

    if results.len() != 5 {
        return Err(format!("unexpected result count: {}", results.len()));
    }
    for (position, result) in results.iter().enumerate() {
        if result.index != position {
            return Err(format!("result {position} carries index {}", result.index));
        }
        let body = result
            .outcome
            .as_ref()
            .map_err(|err| err.to_string())?
            .text();
        if body != format!("/items/{position}") {
            return Err(format!("result {position} echoed {body}"));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn promises_chain_and_settle_from_background_tasks() -> Result<(), String> {
    let transport = Arc::new(FlakyTransport::new(0));
    let client = Client::builder()
        .base_url("https://api.example.com")
        .transport(transport)
        .build()
        .map_err(|err| err.to_string())?;

    let promises = vec![
        client.get_async("/items/0", RequestOptions::new()).then(|response| {
            Ok(Response::new(
                response.status(),
                HeaderMap::new(),
                Bytes::from(format!("mapped:{}", response.text())),
            ))
        }),
        client.get_async("/items/1", RequestOptions::new()),
    ];
    let results = wait_all(promises).await;

    let first = results
        .first()
        .ok_or("missing first result")?
        .outcome
        .as_ref()
        .map_err(|err| err.to_string())?
        .text();
    if first != "mapped:/items/0" {
        return Err(format!("unexpected mapped body: {first}"));
    }
    let second = results
        .get(1)
        .ok_or("missing second result")?
        .outcome
        .as_ref()
        .map_err(|err| err.to_string())?
        .text();
    if second != "/items/1" {
        return Err(format!("unexpected body: {second}"));
    }
    Ok(())
}
